//! Row policy and file handling tests for the pipeline.

use async_trait::async_trait;
use autotrans_core::AppConfig;
use autotrans_pipeline::{Pipeline, PipelineError, RowOutcome};
use autotrans_sheet::{Grid, SheetError, Table};
use autotrans_translate::{TranslateError, TranslateResult, Translator};
use std::sync::Mutex;
use tempfile::tempdir;

// ===== Fakes =====

#[derive(Debug, Clone, PartialEq)]
struct Call {
    text: String,
    source_language: Option<String>,
    target_language: String,
}

/// Prefixes the target language and records every call.
#[derive(Default)]
struct RecordingTranslator {
    calls: Mutex<Vec<Call>>,
    fail_on: Option<String>,
}

impl RecordingTranslator {
    fn failing_on(text: &str) -> Self {
        Self {
            fail_on: Some(text.to_string()),
            ..Self::default()
        }
    }

    fn texts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.text.clone())
            .collect()
    }
}

#[async_trait]
impl Translator for RecordingTranslator {
    async fn translate(
        &self,
        text: &str,
        source_language: Option<&str>,
        target_language: &str,
    ) -> TranslateResult<String> {
        self.calls.lock().unwrap().push(Call {
            text: text.to_string(),
            source_language: source_language.map(str::to_string),
            target_language: target_language.to_string(),
        });

        if self.fail_on.as_deref() == Some(text) {
            return Err(TranslateError::ResponseFormat);
        }
        Ok(format!("[{target_language}] {text}"))
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// In-memory table that counts writes.
#[derive(Default)]
struct MemoryTable {
    grid: Grid,
    writes: usize,
    closed: bool,
    fail_write: bool,
}

impl MemoryTable {
    fn new(grid: Grid) -> Self {
        Self {
            grid,
            ..Self::default()
        }
    }
}

impl Table for MemoryTable {
    fn read(&self) -> autotrans_sheet::Result<Grid> {
        if self.closed {
            return Err(SheetError::Closed);
        }
        Ok(self.grid.clone())
    }

    fn write(&mut self, grid: &Grid) -> autotrans_sheet::Result<()> {
        if self.closed {
            return Err(SheetError::Closed);
        }
        if self.fail_write {
            return Err(SheetError::Io(std::io::Error::other("disk full")));
        }
        self.writes += 1;
        self.grid = grid.clone();
        Ok(())
    }

    fn close(&mut self) -> autotrans_sheet::Result<()> {
        if self.closed {
            return Err(SheetError::Closed);
        }
        self.closed = true;
        Ok(())
    }
}

// ===== Helpers =====

fn config(source: usize, target: usize, skip_header: bool, skip_not_empty: bool) -> AppConfig {
    AppConfig::from_toml_str(&format!(
        r#"
        source_column = {source}
        target_column = {target}
        skip_table_header = {skip_header}
        skip_if_not_empty = {skip_not_empty}

        [translation]
        service = "google"
        target_language = "zh-CN"
    "#
    ))
    .unwrap()
}

fn grid(rows: &[&[&str]]) -> Grid {
    rows.iter()
        .map(|r| r.iter().map(|s| (*s).to_string()).collect())
        .collect()
}

// ===== Row Policy Tests =====

#[tokio::test]
async fn test_source_out_of_range_row_is_untouched() {
    let config = config(3, 4, false, false);
    let translator = RecordingTranslator::default();
    let pipeline = Pipeline::new(&config, &translator);

    let mut data = grid(&[&["only one"], &["a", "b", "c"]]);
    let outcomes = pipeline.translate_grid(&mut data).await;

    assert_eq!(
        outcomes,
        vec![RowOutcome::SourceOutOfRange, RowOutcome::Translated]
    );
    assert_eq!(data[0], vec!["only one".to_string()]);
    assert_eq!(data[1][3], "[zh-CN] c");
    assert_eq!(translator.texts(), vec!["c".to_string()]);
}

#[tokio::test]
async fn test_filled_target_is_skipped() {
    let config = config(1, 2, false, true);
    let translator = RecordingTranslator::default();
    let pipeline = Pipeline::new(&config, &translator);

    let mut data = grid(&[&["Hello", "你好"], &["World", ""]]);
    let outcomes = pipeline.translate_grid(&mut data).await;

    assert_eq!(
        outcomes,
        vec![RowOutcome::SkippedNotEmpty, RowOutcome::Translated]
    );
    assert_eq!(data[0][1], "你好");
    assert_eq!(translator.texts(), vec!["World".to_string()]);
}

#[tokio::test]
async fn test_filled_target_is_overwritten_without_skip() {
    let config = config(1, 2, false, false);
    let translator = RecordingTranslator::default();
    let pipeline = Pipeline::new(&config, &translator);

    let mut data = grid(&[&["Hello", "stale"]]);
    pipeline.translate_grid(&mut data).await;

    assert_eq!(data[0][1], "[zh-CN] Hello");
}

#[tokio::test]
async fn test_short_row_is_extended_to_target() {
    let config = config(1, 5, false, true);
    let translator = RecordingTranslator::default();
    let pipeline = Pipeline::new(&config, &translator);

    let mut data = grid(&[&["Hello"], &["Bye", "x"]]);
    pipeline.translate_grid(&mut data).await;

    assert_eq!(
        data[0],
        vec![
            "Hello".to_string(),
            String::new(),
            String::new(),
            String::new(),
            "[zh-CN] Hello".to_string(),
        ]
    );
    assert_eq!(data[1].len(), 5);
    assert_eq!(data[1][1], "x");
}

#[tokio::test]
async fn test_same_source_and_target_column() {
    let config = config(1, 1, false, false);
    let translator = RecordingTranslator::default();
    let pipeline = Pipeline::new(&config, &translator);

    let mut data = grid(&[&["Hello", "keep"]]);
    pipeline.translate_grid(&mut data).await;

    assert_eq!(data[0], vec!["[zh-CN] Hello".to_string(), "keep".to_string()]);
}

#[tokio::test]
async fn test_header_is_never_sent_or_changed() {
    let config = config(1, 3, true, false);
    let translator = RecordingTranslator::default();
    let pipeline = Pipeline::new(&config, &translator);

    let mut data = grid(&[&["English"], &["Hello"]]);
    let outcomes = pipeline.translate_grid(&mut data).await;

    assert_eq!(outcomes[0], RowOutcome::SkippedHeader);
    assert_eq!(data[0], vec!["English".to_string()]);
    assert_eq!(translator.texts(), vec!["Hello".to_string()]);
}

#[tokio::test]
async fn test_header_is_translated_without_skip() {
    let config = config(1, 2, false, false);
    let translator = RecordingTranslator::default();
    let pipeline = Pipeline::new(&config, &translator);

    let mut data = grid(&[&["English"], &["Hello"]]);
    pipeline.translate_grid(&mut data).await;

    assert_eq!(
        translator.texts(),
        vec!["English".to_string(), "Hello".to_string()]
    );
}

#[tokio::test]
async fn test_backend_failure_continues_with_next_row() {
    let config = config(1, 2, false, false);
    let translator = RecordingTranslator::failing_on("broken");
    let pipeline = Pipeline::new(&config, &translator);

    let mut data = grid(&[&["broken", "old"], &["fine"]]);
    let outcomes = pipeline.translate_grid(&mut data).await;

    assert!(matches!(
        outcomes[0],
        RowOutcome::Failed { ref error } if error.contains("unexpected response format")
    ));
    assert_eq!(outcomes[1], RowOutcome::Translated);
    assert_eq!(data[0][1], "old");
    assert_eq!(data[1][1], "[zh-CN] fine");
}

#[tokio::test]
async fn test_empty_source_cell_is_still_sent() {
    let config = config(1, 2, false, false);
    let translator = RecordingTranslator::default();
    let pipeline = Pipeline::new(&config, &translator);

    let mut data = grid(&[&[""]]);
    pipeline.translate_grid(&mut data).await;

    assert_eq!(translator.texts(), vec![String::new()]);
}

#[tokio::test]
async fn test_languages_are_passed_through() {
    let mut config = config(1, 2, false, false);
    let translator = RecordingTranslator::default();

    Pipeline::new(&config, &translator)
        .translate_grid(&mut grid(&[&["a"]]))
        .await;

    config.translation.source_language = Some(String::new());
    Pipeline::new(&config, &translator)
        .translate_grid(&mut grid(&[&["b"]]))
        .await;

    let calls = translator.calls.lock().unwrap();
    assert_eq!(calls[0].source_language, None);
    assert_eq!(calls[1].source_language, Some(String::new()));
    assert!(calls.iter().all(|c| c.target_language == "zh-CN"));
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let config = config(1, 2, true, true);
    let translator = RecordingTranslator::default();
    let pipeline = Pipeline::new(&config, &translator);

    let mut data = grid(&[&["en", "zh"], &["Hello"], &["World"]]);
    pipeline.translate_grid(&mut data).await;
    let after_first = data.clone();
    let calls_after_first = translator.texts().len();

    let outcomes = pipeline.translate_grid(&mut data).await;

    assert_eq!(data, after_first);
    assert_eq!(translator.texts().len(), calls_after_first);
    assert!(outcomes.iter().all(|o| !o.is_translated()));
}

// ===== Table Processing Tests =====

#[tokio::test]
async fn test_header_table_written_once() {
    let config = config(1, 2, true, false);
    let translator = RecordingTranslator::default();
    let pipeline = Pipeline::new(&config, &translator);

    let mut table = MemoryTable::new(grid(&[
        &["English", "Chinese"],
        &["Hello", ""],
        &["World", ""],
    ]));
    let report = pipeline.process_table(&mut table).await.unwrap();

    assert_eq!(table.writes, 1);
    assert!(table.closed);
    assert_eq!(
        table.grid,
        grid(&[
            &["English", "Chinese"],
            &["Hello", "[zh-CN] Hello"],
            &["World", "[zh-CN] World"],
        ])
    );
    assert_eq!(report.translated(), 2);
    assert_eq!(report.skipped(), 1);
}

#[tokio::test]
async fn test_empty_table_still_written_once() {
    let config = config(1, 2, false, false);
    let translator = RecordingTranslator::default();
    let pipeline = Pipeline::new(&config, &translator);

    let mut table = MemoryTable::default();
    let report = pipeline.process_table(&mut table).await.unwrap();

    assert_eq!(table.writes, 1);
    assert_eq!(report.rows(), 0);
}

#[tokio::test]
async fn test_write_failure_is_surfaced_and_table_closed() {
    let config = config(1, 2, false, false);
    let translator = RecordingTranslator::default();
    let pipeline = Pipeline::new(&config, &translator);

    let mut table = MemoryTable::new(grid(&[&["Hello"]]));
    table.fail_write = true;

    let err = pipeline.process_table(&mut table).await.unwrap_err();

    assert!(matches!(err, PipelineError::Table(SheetError::Io(_))));
    assert!(table.closed);
    assert_eq!(table.grid, grid(&[&["Hello"]]));
}

#[tokio::test]
async fn test_closed_table_reports_read_error() {
    let config = config(1, 2, false, false);
    let translator = RecordingTranslator::default();
    let pipeline = Pipeline::new(&config, &translator);

    let mut table = MemoryTable::new(grid(&[&["Hello"]]));
    table.close().unwrap();

    let err = pipeline.process_table(&mut table).await.unwrap_err();

    assert!(matches!(err, PipelineError::Table(SheetError::Closed)));
    assert!(translator.texts().is_empty());
}

// ===== File Tests =====

#[tokio::test]
async fn test_csv_file_end_to_end() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("phrases.csv");
    std::fs::write(&path, "English,Chinese\nHello,\n\"Hello, world\",\n").unwrap();

    let config = config(1, 2, true, true);
    let translator = RecordingTranslator::default();
    let report = Pipeline::new(&config, &translator)
        .process_file(&path)
        .await
        .unwrap();

    assert_eq!(report.path, path);
    assert_eq!(report.translated(), 2);
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "English,Chinese\nHello,[zh-CN] Hello\n\"Hello, world\",\"[zh-CN] Hello, world\"\n"
    );
}

#[tokio::test]
async fn test_xlsx_file_end_to_end() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("phrases.xlsx");

    let mut fixture = autotrans_sheet::open_table(&path).unwrap();
    fixture
        .write(&grid(&[&["English", "Chinese"], &["Hello"], &["World", ""]]))
        .unwrap();
    fixture.close().unwrap();

    let config = config(1, 2, true, true);
    let translator = RecordingTranslator::default();
    let report = Pipeline::new(&config, &translator)
        .process_file(&path)
        .await
        .unwrap();

    assert_eq!(report.path, path);
    assert_eq!(report.translated(), 2);
    assert_eq!(
        translator.texts(),
        vec!["Hello".to_string(), "World".to_string()]
    );

    let written = autotrans_sheet::open_table(&path).unwrap();
    assert_eq!(
        written.read().unwrap(),
        grid(&[
            &["English", "Chinese"],
            &["Hello", "[zh-CN] Hello"],
            &["World", "[zh-CN] World"],
        ])
    );
}

#[tokio::test]
async fn test_failing_file_does_not_stop_run() {
    let dir = tempdir().unwrap();
    let unsupported = dir.path().join("a_notes.txt");
    let good = dir.path().join("b_phrases.csv");
    std::fs::write(&unsupported, "Hello\n").unwrap();
    std::fs::write(&good, "Hello\n").unwrap();

    let config = config(1, 2, false, false);
    let translator = RecordingTranslator::default();
    let files = autotrans_pipeline::collect_files(dir.path()).unwrap();
    let summary = Pipeline::new(&config, &translator).run(&files).await;

    assert!(!summary.is_success());
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].path, unsupported);
    assert!(matches!(
        summary.failures[0].error,
        PipelineError::Table(SheetError::UnsupportedFormat(_))
    ));
    assert_eq!(summary.reports.len(), 1);
    assert_eq!(summary.translated(), 1);
    assert_eq!(
        std::fs::read_to_string(&good).unwrap(),
        "Hello,[zh-CN] Hello\n"
    );
    assert_eq!(std::fs::read_to_string(&unsupported).unwrap(), "Hello\n");
}
