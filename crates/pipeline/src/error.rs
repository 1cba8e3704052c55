//! Error types for the orchestration layer.

use autotrans_sheet::SheetError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that stop a file, or stop file enumeration.
///
/// Row and cell problems never show up here; they are recorded as
/// [`RowOutcome`](crate::RowOutcome)s instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Reading, writing or closing a table failed. Aborts the file.
    #[error("Table error: {0}")]
    Table(#[from] SheetError),

    /// The input path could not be inspected.
    #[error("Cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory could not be walked.
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}
