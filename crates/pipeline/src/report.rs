//! Outcomes of rows, files and runs.

use crate::error::PipelineError;
use std::fmt;
use std::path::PathBuf;

/// What happened to one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// First row with header skipping enabled.
    SkippedHeader,
    /// The row has no cell at the source column.
    SourceOutOfRange,
    /// The target cell already held text.
    SkippedNotEmpty,
    /// The target cell now holds the backend's output.
    Translated,
    /// The backend failed; the target cell is unchanged.
    Failed { error: String },
}

impl RowOutcome {
    pub fn is_translated(&self) -> bool {
        matches!(self, RowOutcome::Translated)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RowOutcome::Failed { .. })
    }
}

/// Per-file counts, in row order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcomes: Vec<RowOutcome>,
}

impl FileReport {
    pub fn new(path: impl Into<PathBuf>, outcomes: Vec<RowOutcome>) -> Self {
        Self {
            path: path.into(),
            outcomes,
        }
    }

    pub fn rows(&self) -> usize {
        self.outcomes.len()
    }

    pub fn translated(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_translated()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    /// Rows left alone on purpose or because the source cell was missing.
    pub fn skipped(&self) -> usize {
        self.rows() - self.translated() - self.failed()
    }
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} translated, {} skipped, {} failed",
            self.path.display(),
            self.translated(),
            self.skipped(),
            self.failed()
        )
    }
}

/// A file that could not be processed.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: PipelineError,
}

/// Result of a whole run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
}

impl RunSummary {
    /// Every file was read, processed and written back.
    ///
    /// Rows whose translation failed do not count against this.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn files(&self) -> usize {
        self.reports.len() + self.failures.len()
    }

    pub fn translated(&self) -> usize {
        self.reports.iter().map(FileReport::translated).sum()
    }

    pub fn skipped(&self) -> usize {
        self.reports.iter().map(FileReport::skipped).sum()
    }

    pub fn failed_rows(&self) -> usize {
        self.reports.iter().map(FileReport::failed).sum()
    }
}
