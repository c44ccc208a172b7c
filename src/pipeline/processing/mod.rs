// Pipeline processing: normalization, validation, derivation and duplicate resolution

pub mod conflation;
pub mod enrich;
pub mod normalize;
pub mod quality_gate;

// Re-export key types and functions
pub use conflation::{resolve_duplicates, RowPlanet};
pub use enrich::{DefaultEnricher, Enricher};
pub use normalize::{DefaultNormalizer, Normalizer, StageOutput};
pub use quality_gate::{DefaultQualityGate, QualityGate};
