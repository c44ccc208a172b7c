use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One loosely typed row from the external catalog. Consumed once by the
/// normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Position of the row in the source; drives duplicate tie-breaks
    pub row: usize,
    /// The row as read. Anything other than a JSON object is rejected later.
    pub value: Value,
}

impl RawRecord {
    pub fn new(row: usize, value: Value) -> Self {
        Self { row, value }
    }

    /// Build a row from column/value pairs.
    pub fn from_pairs<I, K>(row: usize, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let map = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .collect::<serde_json::Map<String, Value>>();
        Self::new(row, Value::Object(map))
    }

    pub fn is_object(&self) -> bool {
        self.value.is_object()
    }

    /// Value of a column, treating JSON null the same as an absent column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.value.get(column).filter(|v| !v.is_null())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_columns_read_as_absent() {
        let record = RawRecord::new(0, json!({"pl_name": "a", "pl_rade": null}));
        assert!(record.get("pl_name").is_some());
        assert!(record.get("pl_rade").is_none());
        assert!(record.get("missing").is_none());
    }

    #[test]
    fn test_non_object_rows_have_no_columns() {
        let record = RawRecord::new(3, json!([1, 2, 3]));
        assert!(!record.is_object());
        assert!(record.get("pl_name").is_none());
    }
}
