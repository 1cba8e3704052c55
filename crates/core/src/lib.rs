//! # autotrans-core
//!
//! Core types shared by the autotrans crates.
//!
//! This crate provides:
//! - The run configuration (`AppConfig`) loaded once from TOML
//! - Configuration error types

/// Run configuration and TOML loading.
pub mod config;
/// Error types and result aliases.
pub mod error;

/// Re-export configuration types.
pub use config::{
    AppConfig, ChatMessageConfig, GlossaryConfig, GlossaryEntryConfig, GoogleConfig, LlmConfig,
    OpenAiConfig, TranslationConfig, MAX_COLUMNS,
};
/// Re-export core error types.
pub use error::{ConfigError, ConfigResult};
