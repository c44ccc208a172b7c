pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod logging;
pub mod observability;
pub mod pipeline;
pub mod query;

// Use cases and their adapters
pub mod app;
pub mod infra;

pub use config::CatalogConfig;
pub use domain::{Habitability, Measure, NormalizedPlanet, PlanetType, StarType};
pub use error::{CatalogError, QueryError, Result};
pub use pipeline::{Pipeline, PipelineOutput, PipelineSummary};
pub use query::QueryEngine;
