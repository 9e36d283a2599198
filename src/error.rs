// Error taxonomy for the reconciliation run
// Fatal preconditions only; row-level coercion never raises

use std::path::PathBuf;

use thiserror::Error;

use crate::model::Source;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ReconError>;

/// Fatal precondition failures. Any of these aborts the whole run before
/// matching begins; no partial category tables are ever produced.
#[derive(Debug, Error)]
pub enum ReconError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when a required column is absent from one input after
    /// header-name trimming.
    #[error("{set} file is missing required column '{column}'")]
    MissingColumn { set: Source, column: String },

    /// Raised when an input cannot be parsed as tabular data at all.
    #[error("failed to read {set} file as CSV: {error}")]
    Csv { set: Source, error: csv::Error },

    /// Errors bubbled up from the Excel reader implementation.
    #[error("failed to read {set} file as a workbook: {error}")]
    Workbook {
        set: Source,
        error: calamine::XlsxError,
    },

    /// Raised when a workbook has no worksheet to read.
    #[error("{set} workbook contains no worksheets")]
    EmptyWorkbook { set: Source },

    /// Raised when the input path has an extension we cannot ingest.
    #[error("unsupported input format for {path}: expected .xlsx or .csv")]
    UnsupportedFormat { path: PathBuf },

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),
}
