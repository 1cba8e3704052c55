use crate::error::{Result, SheetError};

/// One row of text cells. Rows in a grid may differ in length.
pub type Row = Vec<String>;

/// A whole table held in memory.
pub type Grid = Vec<Row>;

/// Whole-grid access to one tabular file.
///
/// `read` and `write` always move the complete grid. The row and cell helpers
/// are read-modify-write compositions of the two and address rows and columns
/// 1-based, like the configuration does.
///
/// After `close` every call fails with [`SheetError::Closed`].
pub trait Table: Send {
    /// Read the current grid.
    fn read(&self) -> Result<Grid>;

    /// Replace the stored grid. Readers never observe a half-written file.
    fn write(&mut self, grid: &Grid) -> Result<()>;

    /// Flush and release the handle. Must be called once.
    fn close(&mut self) -> Result<()>;

    /// Replace row `row` (1-based).
    fn update_line(&mut self, row: usize, data: Row) -> Result<()> {
        let mut grid = self.read()?;
        let index = row_index(row, grid.len())?;
        grid[index] = data;
        self.write(&grid)
    }

    /// Replace the cell at `row`, `col` (both 1-based). The cell must exist.
    fn update_cell(&mut self, row: usize, col: usize, value: &str) -> Result<()> {
        let mut grid = self.read()?;
        let index = row_index(row, grid.len())?;
        let cells = &mut grid[index];
        if col == 0 || col > cells.len() {
            return Err(SheetError::ColumnOutOfBounds {
                row,
                col,
                cols: cells.len(),
            });
        }
        cells[col - 1] = value.to_string();
        self.write(&grid)
    }

    /// Add a row after the last one.
    fn append(&mut self, data: Row) -> Result<()> {
        let mut grid = self.read()?;
        grid.push(data);
        self.write(&grid)
    }

    /// Insert a row so that it becomes row `row` (1-based, up to `len + 1`).
    fn insert(&mut self, row: usize, data: Row) -> Result<()> {
        let mut grid = self.read()?;
        if row == 0 || row > grid.len() + 1 {
            return Err(SheetError::RowOutOfBounds {
                row,
                rows: grid.len(),
            });
        }
        grid.insert(row - 1, data);
        self.write(&grid)
    }

    /// Remove row `row` (1-based) and return it.
    fn delete(&mut self, row: usize) -> Result<Row> {
        let mut grid = self.read()?;
        let index = row_index(row, grid.len())?;
        let removed = grid.remove(index);
        self.write(&grid)?;
        Ok(removed)
    }
}

/// Convert a 1-based row number into an index into a grid of `rows` rows.
fn row_index(row: usize, rows: usize) -> Result<usize> {
    if row == 0 || row > rows {
        return Err(SheetError::RowOutOfBounds { row, rows });
    }
    Ok(row - 1)
}
