use crate::atomic::replace_file;
use crate::error::{Result, SheetError};
use crate::table::{Grid, Row, Table};
use std::fs::{File, OpenOptions};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// CSV reader/writer options
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: ',')
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions { delimiter: b',' }
    }
}

impl CsvOptions {
    /// Create options for TSV (tab-separated values)
    #[must_use]
    pub fn tsv() -> Self {
        CsvOptions { delimiter: b'\t' }
    }
}

/// A delimited text file.
///
/// Every `read` parses the file from disk, so it always reflects the last
/// successful `write`. Rows may have different lengths.
#[derive(Debug)]
pub struct CsvTable {
    path: PathBuf,
    options: CsvOptions,
    closed: bool,
}

impl CsvTable {
    /// Open a comma separated file, creating it empty if missing
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, CsvOptions::default())
    }

    /// Open a delimited file with custom options, creating it empty if missing
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: CsvOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            options,
            closed: false,
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(SheetError::Closed);
        }
        Ok(())
    }
}

impl Table for CsvTable {
    fn read(&self) -> Result<Grid> {
        self.ensure_open()?;

        let file = File::open(&self.path)?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let mut grid = Grid::new();
        for result in reader.records() {
            let record = result?;
            let row: Row = record.iter().map(str::to_string).collect();
            grid.push(row);
        }

        Ok(grid)
    }

    fn write(&mut self, grid: &Grid) -> Result<()> {
        self.ensure_open()?;

        let delimiter = self.options.delimiter;
        replace_file(&self.path, |file| {
            let mut writer = csv::WriterBuilder::new()
                .delimiter(delimiter)
                .flexible(true)
                .from_writer(file);

            for row in grid {
                writer.write_record(row)?;
            }

            writer.flush()?;
            Ok(())
        })
    }

    fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.closed = true;
        Ok(())
    }
}
