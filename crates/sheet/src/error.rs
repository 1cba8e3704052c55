use thiserror::Error;

/// Errors that can occur while reading or writing a table
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Row {row} is out of range (table has {rows} rows)")]
    RowOutOfBounds { row: usize, rows: usize },

    #[error("Column {col} is out of range in row {row} (row has {cols} columns)")]
    ColumnOutOfBounds { row: usize, col: usize, cols: usize },

    #[error("Unsupported table format: {0}")]
    UnsupportedFormat(String),

    #[error("Table is closed")]
    Closed,

    #[error("XLSX error: {0}")]
    Xlsx(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SheetError {
    /// True for the addressing errors raised by the row/cell helpers.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            SheetError::RowOutOfBounds { .. } | SheetError::ColumnOutOfBounds { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;
