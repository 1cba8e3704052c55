//! # autotrans-pipeline
//!
//! Translates one column of tabular files into another.
//!
//! [`collect_files`] turns the input path into a list of files, and
//! [`Pipeline`] runs each of them through the row policy with a single
//! [`Translator`](autotrans_translate::Translator) chosen for the whole run.
//!
//! # Examples
//!
//! ```no_run
//! use autotrans_core::AppConfig;
//! use autotrans_pipeline::{collect_files, Pipeline};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load("config.toml")?;
//! let translator = autotrans_translate::from_config(&config.translation)?;
//! let files = collect_files("data/")?;
//!
//! let summary = Pipeline::new(&config, translator.as_ref()).run(&files).await;
//! assert!(summary.is_success());
//! # Ok(())
//! # }
//! ```

pub mod error;
mod files;
mod pipeline;
pub mod report;

pub use error::{PipelineError, Result};
pub use files::collect_files;
pub use pipeline::Pipeline;
pub use report::{FileFailure, FileReport, RowOutcome, RunSummary};
