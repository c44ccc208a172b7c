use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::RawRecord;
use crate::error::{CatalogError, Result};

/// Anything that can hand the pipeline a batch of raw rows.
pub trait RowSource: Send + Sync {
    fn rows(&self) -> Result<Vec<RawRecord>>;
}

/// Rows already in memory.
pub struct VecSource {
    rows: Vec<RawRecord>,
}

impl VecSource {
    pub fn new(rows: Vec<RawRecord>) -> Self {
        Self { rows }
    }
}

impl RowSource for VecSource {
    fn rows(&self) -> Result<Vec<RawRecord>> {
        Ok(self.rows.clone())
    }
}

/// A JSON export of the catalog: an array of row objects, a single object,
/// or JSON Lines (one row per line) for `.jsonl` files.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_json_lines(&self) -> bool {
        matches!(
            self.path.extension().and_then(|e| e.to_str()),
            Some("jsonl") | Some("ndjson")
        )
    }
}

impl RowSource for JsonFileSource {
    fn rows(&self) -> Result<Vec<RawRecord>> {
        let text = fs::read_to_string(&self.path).map_err(|e| {
            CatalogError::SourceUnreadable(format!("{}: {}", self.path.display(), e))
        })?;

        let rows = if self.is_json_lines() {
            parse_json_lines(&text)
        } else {
            parse_raw_records(&text)?
        };

        info!(
            path = %self.path.display(),
            rows = rows.len(),
            "Loaded raw catalog rows"
        );
        Ok(rows)
    }
}

/// Parse a JSON document into raw rows. Only a document that is not JSON at
/// all, or is neither an array nor an object, aborts the batch.
pub fn parse_raw_records(text: &str) -> Result<Vec<RawRecord>> {
    let document: Value = serde_json::from_str(text)
        .map_err(|e| CatalogError::SourceUnreadable(format!("invalid JSON document: {}", e)))?;

    match document {
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .map(|(row, value)| RawRecord::new(row, value))
            .collect()),
        obj @ Value::Object(_) => Ok(vec![RawRecord::new(0, obj)]),
        other => Err(CatalogError::SourceUnreadable(format!(
            "expected an array of rows, found {}",
            json_kind(&other)
        ))),
    }
}

/// A line that fails to parse still becomes a row, which the normalizer then
/// rejects; one bad line never drops the batch.
fn parse_json_lines(text: &str) -> Vec<RawRecord> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(row, line)| match serde_json::from_str::<Value>(line) {
            Ok(value) => RawRecord::new(row, value),
            Err(e) => {
                debug!(row, error = %e, "Unparseable JSON line");
                RawRecord::new(row, Value::String(line.to_string()))
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_array_rows_keep_source_order() {
        let rows = parse_raw_records(r#"[{"pl_name": "a"}, {"pl_name": "b"}, 7]"#).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].row, 1);
        assert_eq!(rows[1].get("pl_name").unwrap(), "b");
        assert!(!rows[2].is_object());
    }

    #[test]
    fn test_single_object_is_one_row() {
        let rows = parse_raw_records(r#"{"pl_name": "solo"}"#).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_unreadable_document_aborts() {
        assert!(matches!(
            parse_raw_records("not json"),
            Err(CatalogError::SourceUnreadable(_))
        ));
        assert!(matches!(
            parse_raw_records("42"),
            Err(CatalogError::SourceUnreadable(_))
        ));
    }

    #[test]
    fn test_json_lines_keep_bad_lines_as_rows() {
        let mut file = tempfile::Builder::new().suffix(".jsonl").tempfile().unwrap();
        writeln!(file, r#"{{"pl_name": "a"}}"#).unwrap();
        writeln!(file, "{{broken").unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"pl_name": "c"}}"#).unwrap();

        let rows = JsonFileSource::new(file.path()).rows().unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_object());
        assert!(!rows[1].is_object());
        assert_eq!(rows[2].row, 2);
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let source = JsonFileSource::new("/nonexistent/catalog.json");
        assert!(matches!(source.rows(), Err(CatalogError::SourceUnreadable(_))));
    }
}
