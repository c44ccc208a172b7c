// Pipeline ingestion: raw catalog rows and the sources that produce them

pub mod raw_record;
pub mod source;

// Re-export key types and functions for external use
pub use raw_record::RawRecord;
pub use source::{parse_raw_records, JsonFileSource, RowSource, VecSource};
