use crate::error::{ExportError, ExportResult};
use medoffice_types::Record;

/// One column of a report: the record field it reads and the label shown
/// in the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub key: String,
    pub label: String,
}

impl Column {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// A row-major grid with one header row; the intermediate form every
/// export format renders from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularDocument {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl TabularDocument {
    /// Projects records onto the given columns, in column order, with the
    /// fixed `—` fallback for null/missing values. Empty input is a
    /// handled "nothing to export" condition.
    pub fn from_records(records: &[Record], columns: &[Column]) -> ExportResult<Self> {
        if records.is_empty() {
            return Err(ExportError::Empty);
        }
        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.display_value(&column.key))
                    .collect()
            })
            .collect();
        Ok(Self {
            columns: columns.to_vec(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn columns() -> Vec<Column> {
        vec![Column::new("name", "Name"), Column::new("phone", "Phone")]
    }

    #[test]
    fn test_rows_follow_column_order_with_fallback() {
        let records = vec![
            Record::from_value(json!({"id": 1, "name": "Ana", "phone": "555-0101"})).unwrap(),
            Record::from_value(json!({"id": 2, "name": "Bruno", "phone": null})).unwrap(),
        ];
        let doc = TabularDocument::from_records(&records, &columns()).unwrap();
        assert_eq!(doc.rows.len(), 2);
        assert_eq!(doc.rows[0], vec!["Ana", "555-0101"]);
        assert_eq!(doc.rows[1], vec!["Bruno", "—"]);
    }

    #[test]
    fn test_empty_record_set_is_nothing_to_export() {
        let err = TabularDocument::from_records(&[], &columns()).unwrap_err();
        assert!(matches!(err, ExportError::Empty));
    }
}
