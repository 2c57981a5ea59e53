//! Single-sheet spreadsheet rendering (CSV).

use crate::document::TabularDocument;
use crate::error::ExportResult;

pub fn render_spreadsheet(doc: &TabularDocument) -> ExportResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(doc.columns.iter().map(|c| c.label.as_str()))?;
    for row in &doc.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    let bytes = writer
        .into_inner()
        .map_err(|e| e.into_error())?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Column;

    #[test]
    fn test_header_row_then_data_rows() {
        let doc = TabularDocument {
            columns: vec![Column::new("name", "Name"), Column::new("phone", "Phone")],
            rows: vec![
                vec!["Ana".to_string(), "555-0101".to_string()],
                vec!["Bruno, Jr.".to_string(), "—".to_string()],
            ],
        };
        let bytes = render_spreadsheet(&doc).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Name,Phone"));
        assert_eq!(lines.next(), Some("Ana,555-0101"));
        // Embedded comma forces quoting.
        assert_eq!(lines.next(), Some("\"Bruno, Jr.\",—"));
        assert_eq!(lines.next(), None);
    }
}
