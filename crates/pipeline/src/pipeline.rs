use crate::error::Result;
use crate::report::{FileFailure, FileReport, RowOutcome, RunSummary};
use autotrans_core::AppConfig;
use autotrans_sheet::{open_table, Grid, Row, Table};
use autotrans_translate::Translator;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Drives translation of whole tables.
///
/// Everything runs sequentially: one file, one row and one backend call at a
/// time. A table is read once, translated in memory and written back once.
pub struct Pipeline<'a> {
    config: &'a AppConfig,
    translator: &'a dyn Translator,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a AppConfig, translator: &'a dyn Translator) -> Self {
        Self { config, translator }
    }

    /// Apply the row policy to every row of `grid`, in order.
    ///
    /// Per row: skip the header if configured, skip rows without a source
    /// cell, pad the row up to the target column, skip filled targets if
    /// configured, then translate. A backend failure leaves the target cell
    /// as it was and moves on to the next row.
    pub async fn translate_grid(&self, grid: &mut Grid) -> Vec<RowOutcome> {
        let mut outcomes = Vec::with_capacity(grid.len());
        for (index, row) in grid.iter_mut().enumerate() {
            let outcome = self.translate_row(index, row).await;
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn translate_row(&self, index: usize, row: &mut Row) -> RowOutcome {
        let line = index + 1;
        if self.config.skip_table_header && index == 0 {
            return RowOutcome::SkippedHeader;
        }

        let source = self.config.source_index();
        let target = self.config.target_index();

        if row.len() <= source {
            error!(
                target: "translation",
                "Row {line}: Source column index {} is out of range",
                source + 1
            );
            return RowOutcome::SourceOutOfRange;
        }

        if row.len() <= target {
            row.resize(target + 1, String::new());
        }

        if self.config.skip_if_not_empty && !row[target].is_empty() {
            warn!(target: "translation", "Row {line}: cell is not empty, skipping translation");
            return RowOutcome::SkippedNotEmpty;
        }

        let translation = &self.config.translation;
        let result = self
            .translator
            .translate(
                &row[source],
                translation.source_language.as_deref(),
                &translation.target_language,
            )
            .await;

        match result {
            Ok(translated) => {
                info!(target: "translation", "Row {line}: {} -> {translated}", row[source]);
                row[target] = translated;
                RowOutcome::Translated
            }
            Err(e) => {
                error!(
                    target: "translation",
                    backend = self.translator.name(),
                    "Row {line}: {e}"
                );
                RowOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Read, translate and write back one table, then close it.
    ///
    /// The grid is written exactly once, after every row has been handled.
    /// `close` is attempted even when reading or writing failed; the earlier
    /// error is the one returned. The report's path is left empty.
    pub async fn process_table(&self, table: &mut dyn Table) -> Result<FileReport> {
        let processed = self.translate_table(table).await;
        let closed = table.close();

        let outcomes = processed?;
        closed?;
        Ok(FileReport::new(PathBuf::new(), outcomes))
    }

    async fn translate_table(&self, table: &mut dyn Table) -> Result<Vec<RowOutcome>> {
        let mut grid = table.read()?;
        let outcomes = self.translate_grid(&mut grid).await;
        table.write(&grid)?;
        Ok(outcomes)
    }

    /// Open the table at `path` by extension and process it.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Table` for an unsupported extension or any
    /// read, write or close failure.
    pub async fn process_file(&self, path: &Path) -> Result<FileReport> {
        let mut table = open_table(path)?;
        let mut report = self.process_table(table.as_mut()).await?;
        report.path = path.to_path_buf();
        Ok(report)
    }

    /// Process every file in order.
    ///
    /// A file that fails is logged and recorded; the files after it are still
    /// processed.
    pub async fn run(&self, files: &[PathBuf]) -> RunSummary {
        let mut summary = RunSummary::default();

        for path in files {
            match self.process_file(path).await {
                Ok(report) => {
                    info!(
                        target: "translation",
                        translated = report.translated(),
                        skipped = report.skipped(),
                        failed = report.failed(),
                        "Translation completed for file: {}",
                        path.display()
                    );
                    summary.reports.push(report);
                }
                Err(e) => {
                    error!(target: "system", "Failed to process {}: {e}", path.display());
                    summary.failures.push(FileFailure {
                        path: path.clone(),
                        error: e,
                    });
                }
            }
        }

        summary
    }
}
