//! Whole-grid table access for autotrans
//!
//! A [`Table`] hands out the complete contents of one file as a [`Grid`] of
//! text cells and takes a complete grid back. Two storage formats are
//! supported: delimited text (CSV/TSV) and Excel workbooks (XLSX).
//!
//! # Examples
//!
//! ```no_run
//! use autotrans_sheet::{open_table, Table};
//!
//! let mut table = open_table("phrases.csv").unwrap();
//! let mut grid = table.read().unwrap();
//! grid[0].push("translated".to_string());
//! table.write(&grid).unwrap();
//! table.close().unwrap();
//! ```

mod atomic;
mod csv;
mod error;
mod table;
mod xlsx;

use std::path::Path;

/// Re-export CSV table and options.
pub use self::csv::{CsvOptions, CsvTable};
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export the table capability and grid types.
pub use table::{Grid, Row, Table};
/// Re-export the XLSX table.
pub use xlsx::XlsxTable;

/// Open the table adapter matching the file extension.
///
/// `.csv` and `.tsv` open as delimited text, `.xlsx` as a workbook. The
/// comparison ignores case. Missing files are created empty.
///
/// # Errors
///
/// Returns [`SheetError::UnsupportedFormat`] for any other extension.
pub fn open_table<P: AsRef<Path>>(path: P) -> Result<Box<dyn Table>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => Ok(Box::new(CsvTable::open(path)?)),
        "tsv" => Ok(Box::new(CsvTable::open_with_options(
            path,
            CsvOptions::tsv(),
        )?)),
        "xlsx" => Ok(Box::new(XlsxTable::open(path)?)),
        "" => Err(SheetError::UnsupportedFormat(format!(
            "{} has no extension",
            path.display()
        ))),
        other => Err(SheetError::UnsupportedFormat(format!(".{other}"))),
    }
}
