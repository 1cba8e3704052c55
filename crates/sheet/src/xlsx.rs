use crate::atomic::replace_file;
use crate::error::{Result, SheetError};
use crate::table::{Grid, Row, Table};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use rust_xlsxwriter::{Formula, Workbook, Worksheet};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

/// Largest number of rows a worksheet can hold.
const MAX_ROWS: usize = 1_048_576;
/// Largest number of columns a worksheet can hold.
const MAX_COLS: usize = autotrans_core::MAX_COLUMNS;

/// Name used for the worksheet of a freshly created workbook.
const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// An Excel workbook. The grid is the first worksheet.
///
/// Writing replaces the first worksheet's cells and carries the remaining
/// worksheets over with their values and formulas. Formulas on the first
/// worksheet survive where the grid leaves the cell unchanged. Cell styles
/// are not preserved.
#[derive(Debug)]
pub struct XlsxTable {
    path: PathBuf,
    closed: bool,
}

fn xlsx_error(e: impl std::fmt::Display) -> SheetError {
    SheetError::Xlsx(e.to_string())
}

/// Render a number the way a spreadsheet shows it: integral values without `.0`.
fn format_number(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// Convert calamine Data to cell text
fn data_to_text(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::Bool(b) => String::from(if *b { "TRUE" } else { "FALSE" }),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        // Excel stores dates as days since 1899-12-30
        Data::DateTime(dt) => format_number(dt.as_f64()),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#ERROR: {e:?}"),
    }
}

/// Build a grid anchored at A1 from a calamine range.
///
/// A range starts at its first used cell, so leading empty rows and columns
/// are restored here. Trailing empty cells of each row are dropped.
fn range_to_grid(range: &Range<Data>) -> Grid {
    let Some((start_row, start_col)) = range.start() else {
        return Grid::new();
    };

    let mut grid: Grid = vec![Row::new(); start_row as usize];
    for cells in range.rows() {
        let mut row: Row = vec![String::new(); start_col as usize];
        row.extend(cells.iter().map(data_to_text));
        while row.last().is_some_and(String::is_empty) {
            row.pop();
        }
        grid.push(row);
    }

    grid
}

fn coordinates(row_idx: usize, col_idx: usize) -> Result<(u32, u16)> {
    if row_idx >= MAX_ROWS {
        return Err(SheetError::RowOutOfBounds {
            row: row_idx + 1,
            rows: MAX_ROWS,
        });
    }
    if col_idx >= MAX_COLS {
        return Err(SheetError::ColumnOutOfBounds {
            row: row_idx + 1,
            col: col_idx + 1,
            cols: MAX_COLS,
        });
    }
    Ok((row_idx as u32, col_idx as u16))
}

/// Write grid text into a worksheet. Empty cells stay blank.
fn write_grid(worksheet: &mut Worksheet, grid: &Grid) -> Result<()> {
    for (row_idx, row) in grid.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let (row_num, col_num) = coordinates(row_idx, col_idx)?;
            if cell.is_empty() {
                continue;
            }
            worksheet
                .write_string(row_num, col_num, cell)
                .map_err(xlsx_error)?;
        }
    }
    Ok(())
}

/// Copy an untouched worksheet, keeping its cell types.
fn write_range(worksheet: &mut Worksheet, range: &Range<Data>) -> Result<()> {
    let Some((start_row, start_col)) = range.start() else {
        return Ok(());
    };

    for (offset_row, cells) in range.rows().enumerate() {
        for (offset_col, cell) in cells.iter().enumerate() {
            let (row_num, col_num) = coordinates(
                start_row as usize + offset_row,
                start_col as usize + offset_col,
            )?;

            match cell {
                Data::Empty => {}
                Data::Bool(b) => {
                    worksheet
                        .write_boolean(row_num, col_num, *b)
                        .map_err(xlsx_error)?;
                }
                Data::Int(i) => {
                    // Note: Excel stores all numbers as f64, so integers > 2^53
                    // may lose precision
                    worksheet
                        .write_number(row_num, col_num, *i as f64)
                        .map_err(xlsx_error)?;
                }
                Data::Float(f) => {
                    worksheet
                        .write_number(row_num, col_num, *f)
                        .map_err(xlsx_error)?;
                }
                Data::DateTime(dt) => {
                    worksheet
                        .write_number(row_num, col_num, dt.as_f64())
                        .map_err(xlsx_error)?;
                }
                other => {
                    worksheet
                        .write_string(row_num, col_num, data_to_text(other))
                        .map_err(xlsx_error)?;
                }
            }
        }
    }

    Ok(())
}

impl XlsxTable {
    /// Open a workbook, creating an empty one if the file is missing
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            let mut workbook = Workbook::new();
            workbook
                .add_worksheet()
                .set_name(DEFAULT_SHEET_NAME)
                .map_err(xlsx_error)?;
            workbook.save(&path).map_err(xlsx_error)?;
        }

        Ok(Self {
            path,
            closed: false,
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(SheetError::Closed);
        }
        Ok(())
    }

    fn workbook(&self) -> Result<Xlsx<BufReader<File>>> {
        open_workbook(&self.path).map_err(xlsx_error)
    }
}

/// Text of the cell at (`row_idx`, `col_idx`). Missing cells read as empty.
fn cell_text(grid: &Grid, row_idx: usize, col_idx: usize) -> &str {
    grid.get(row_idx)
        .and_then(|row| row.get(col_idx))
        .map_or("", String::as_str)
}

/// Re-emit the formulas of a source worksheet.
///
/// A formula is kept only where the cell text in `after` still equals the
/// cached value in `before`; cells the grid changed keep the new text. The
/// cached value is written as the formula result.
fn keep_formulas(
    worksheet: &mut Worksheet,
    formulas: &Range<String>,
    before: &Grid,
    after: &Grid,
) -> Result<()> {
    let Some((start_row, start_col)) = formulas.start() else {
        return Ok(());
    };

    for (offset_row, cells) in formulas.rows().enumerate() {
        for (offset_col, formula) in cells.iter().enumerate() {
            if formula.is_empty() {
                continue;
            }

            let row_idx = start_row as usize + offset_row;
            let col_idx = start_col as usize + offset_col;
            let current = cell_text(after, row_idx, col_idx);
            if current != cell_text(before, row_idx, col_idx) {
                continue;
            }

            let (row_num, col_num) = coordinates(row_idx, col_idx)?;
            let formula = Formula::new(formula.as_str()).set_result(current);
            worksheet
                .write_formula(row_num, col_num, formula)
                .map_err(xlsx_error)?;
        }
    }

    Ok(())
}

impl Table for XlsxTable {
    fn read(&self) -> Result<Grid> {
        self.ensure_open()?;

        let mut workbook = self.workbook()?;
        let Some(name) = workbook.sheet_names().first().cloned() else {
            return Ok(Grid::new());
        };

        let range = workbook.worksheet_range(&name).map_err(xlsx_error)?;
        Ok(range_to_grid(&range))
    }

    fn write(&mut self, grid: &Grid) -> Result<()> {
        self.ensure_open()?;

        let mut source = self.workbook()?;
        let names = source.sheet_names().to_vec();

        let mut workbook = Workbook::new();
        if names.is_empty() {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(DEFAULT_SHEET_NAME).map_err(xlsx_error)?;
            write_grid(worksheet, grid)?;
        }

        for (index, name) in names.iter().enumerate() {
            let values = source.worksheet_range(name).map_err(xlsx_error)?;
            let formulas = source.worksheet_formula(name).map_err(xlsx_error)?;
            let before = range_to_grid(&values);

            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name).map_err(xlsx_error)?;

            if index == 0 {
                write_grid(worksheet, grid)?;
                keep_formulas(worksheet, &formulas, &before, grid)?;
            } else {
                write_range(worksheet, &values)?;
                keep_formulas(worksheet, &formulas, &before, &before)?;
            }
        }

        let buffer = workbook.save_to_buffer().map_err(xlsx_error)?;
        replace_file(&self.path, |file| {
            file.write_all(&buffer)?;
            Ok(())
        })
    }

    fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.closed = true;
        Ok(())
    }
}
