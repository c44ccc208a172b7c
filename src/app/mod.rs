pub mod ingest_use_case;
pub mod ports;

pub use ingest_use_case::{IngestReport, IngestUseCase};
