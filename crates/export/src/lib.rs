//! # medoffice-export
//!
//! Renders an ordered set of flat records into downloadable report files:
//! a landscape paginated printable document, a single-sheet spreadsheet
//! (CSV) and a self-contained styled HTML page.
//!
//! Rendering is a pure in-memory transform: a failed transform reports a
//! handled "nothing to export" condition and never produces a partial
//! file. Callers write the returned byte buffer to disk only once it
//! exists in full.

pub mod document;
pub mod error;
pub mod html;
pub mod printable;
pub mod spreadsheet;

pub use document::{Column, TabularDocument};
pub use error::{ExportError, ExportResult};

use chrono::NaiveDate;

/// The three report formats every view offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Landscape paginated fixed-width document with repeated header and
    /// a `page N of M` footer on every page.
    Printable,
    /// Single-sheet spreadsheet (CSV).
    Spreadsheet,
    /// Self-contained styled HTML page.
    Html,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Printable => "txt",
            ExportFormat::Spreadsheet => "csv",
            ExportFormat::Html => "html",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "printable" | "print" | "txt" => Ok(ExportFormat::Printable),
            "spreadsheet" | "csv" => Ok(ExportFormat::Spreadsheet),
            "html" => Ok(ExportFormat::Html),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExportFormat::Printable => "printable",
            ExportFormat::Spreadsheet => "spreadsheet",
            ExportFormat::Html => "html",
        };
        write!(f, "{name}")
    }
}

/// A fully rendered report, ready to be written out in one piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
}

/// `{reportname}_{ISO-date}.{ext}`, with the report name normalised to a
/// filesystem-friendly slug.
pub fn export_file_name(report: &str, format: ExportFormat, date: NaiveDate) -> String {
    let slug: String = report
        .trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{slug}_{date}.{ext}", ext = format.extension())
}

/// Renders `doc` in `format` and names the file after `report` and `date`.
pub fn export(
    doc: &TabularDocument,
    format: ExportFormat,
    report: &str,
    title: &str,
    date: NaiveDate,
) -> ExportResult<ExportFile> {
    if doc.rows.is_empty() {
        return Err(ExportError::Empty);
    }
    let bytes = match format {
        ExportFormat::Printable => printable::render_printable(doc, title)?,
        ExportFormat::Spreadsheet => spreadsheet::render_spreadsheet(doc)?,
        ExportFormat::Html => html::render_html(doc, title)?,
    };
    Ok(ExportFile {
        name: export_file_name(report, format, date),
        bytes,
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names_follow_report_and_iso_date() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        assert_eq!(
            export_file_name("patients", ExportFormat::Spreadsheet, date),
            "patients_2026-08-23.csv"
        );
        assert_eq!(
            export_file_name("Audit Log", ExportFormat::Html, date),
            "audit_log_2026-08-23.html"
        );
        assert_eq!(
            export_file_name("backups", ExportFormat::Printable, date),
            "backups_2026-08-23.txt"
        );
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Spreadsheet);
        assert_eq!("Printable".parse::<ExportFormat>().unwrap(), ExportFormat::Printable);
        assert_eq!("html".parse::<ExportFormat>().unwrap(), ExportFormat::Html);
        assert!("docx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_export_rejects_empty_documents_without_output() {
        let doc = TabularDocument {
            columns: vec![Column::new("name", "Name")],
            rows: vec![],
        };
        let date = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        let err = export(&doc, ExportFormat::Spreadsheet, "patients", "Patients", date);
        assert!(matches!(err, Err(ExportError::Empty)));
    }
}
