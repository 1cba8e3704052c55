//! # autotrans-translate
//!
//! Translation backends behind one text-in/text-out contract.
//!
//! Two backends are provided:
//! - [`GoogleTranslator`]: a single GET against the public web translation
//!   endpoint, answering with loosely shaped nested arrays
//! - [`OpenAiTranslator`]: a chat completion request built from configured
//!   preamble messages, glossaries, and the subject text
//!
//! The backend for a run is chosen once with [`from_config`].

use async_trait::async_trait;
use autotrans_core::TranslationConfig;
use reqwest::Client;
use std::time::Duration;

/// Error types and result aliases.
pub mod error;
/// Web query backend.
pub mod google;
/// Chat completion backend.
pub mod openai;

/// Re-export translation error types.
pub use error::{TranslateError, TranslateResult};
/// Re-export the web query backend.
pub use google::{extract_translation, GoogleTranslator};
/// Re-export the chat completion backend.
pub use openai::{build_messages, parse_preamble, ChatMessage, OpenAiTranslator, Role};

/// Request timeout applied when the configuration sets none.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A translation capability.
///
/// Implementations hold only credentials and connection settings, so one
/// instance serves a whole run. `source_language` of `None` asks the backend
/// to detect the language; `Some("")` is passed through as an explicit tag.
///
/// The chat backend accepts the language arguments but does not apply them:
/// its language pair is fixed by the configured preamble messages.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate one piece of text.
    async fn translate(
        &self,
        text: &str,
        source_language: Option<&str>,
        target_language: &str,
    ) -> TranslateResult<String>;

    /// Short backend name used in log output.
    fn name(&self) -> &'static str;
}

/// Build the backend named by `config.service`.
///
/// # Errors
///
/// Returns `UnsupportedService` for an unknown identifier and `InvalidRole`
/// when the chat preamble holds a bad role. Both are configuration errors
/// and should stop the run before any file is opened.
pub fn from_config(config: &TranslationConfig) -> TranslateResult<Box<dyn Translator>> {
    match config.service.as_str() {
        "google" => Ok(Box::new(GoogleTranslator::new(&config.google)?)),
        "openai" => Ok(Box::new(OpenAiTranslator::new(
            &config.openai,
            &config.large_language_model,
        )?)),
        other => Err(TranslateError::UnsupportedService(other.to_string())),
    }
}

/// Build the shared HTTP client for a backend.
pub(crate) fn http_client(timeout_secs: Option<u64>) -> TranslateResult<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(
            timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        ))
        .build()?;

    Ok(client)
}

/// Turn a non-success response into `TranslateError::Status`.
pub(crate) async fn check_status(response: reqwest::Response) -> TranslateResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(TranslateError::Status {
        status: status.as_u16(),
        body,
    })
}
