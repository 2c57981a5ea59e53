#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Empty input: the export is aborted and no file is produced.
    #[error("nothing to export")]
    Empty,
    #[error("unknown export format {0:?}")]
    UnknownFormat(String),
    #[error("failed to encode spreadsheet: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write report buffer: {0}")]
    Write(#[from] std::io::Error),
}

pub type ExportResult<T> = std::result::Result<T, ExportError>;
