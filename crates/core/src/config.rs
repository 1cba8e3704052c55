//! Run configuration.
//!
//! The configuration is read once at startup, validated, and then handed by
//! reference to the translator factory and the pipeline. Nothing mutates it
//! afterwards.
//!
//! # Examples
//!
//! ```
//! use autotrans_core::AppConfig;
//!
//! let config = AppConfig::from_toml_str(r#"
//!     source_column = 1
//!     target_column = 2
//!     skip_table_header = true
//!
//!     [translation]
//!     service = "google"
//!     target_language = "zh-CN"
//! "#).unwrap();
//!
//! assert_eq!(config.source_index(), 0);
//! assert_eq!(config.target_index(), 1);
//! assert!(config.translation.source_language.is_none());
//! ```

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Default endpoint of the web query backend.
pub const DEFAULT_GOOGLE_BASE_URL: &str = "https://translate.google.com/translate_a/single";

/// Default endpoint root of the chat completion backend.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Highest usable column number. Matches the XLSX worksheet width.
pub const MAX_COLUMNS: usize = 16_384;

/// Starter configuration written by `AppConfig::write_template`.
const TEMPLATE: &str = r#"# Column holding the text to translate (1-based).
source_column = 1
# Column receiving the translation (1-based). Short rows are padded.
target_column = 2

# Leave the first row alone.
skip_table_header = true
# Do not overwrite target cells that already hold text.
skip_if_not_empty = true

[translation]
# Backend: "google" or "openai".
service = "google"
# Omit source_language to let the backend auto-detect it.
# source_language = "en"
target_language = "zh-CN"

[translation.google]
base_url = "https://translate.google.com/translate_a/single"
timeout_secs = 30

[translation.openai]
base_url = "https://api.openai.com/v1"
api_key = ""
model = "gpt-4o-mini"
timeout_secs = 60

# The chat backend does not apply source_language/target_language itself.
# State the language pair and the output format in these messages.
[[translation.openai.messages]]
role = "system"
content = "Translate the user's text into Simplified Chinese. Reply with the translation only, as plain text."

[translation.large_language_model]
glossary_prompt = "Use the following glossaries when translating:"

# [[translation.large_language_model.glossaries]]
# name = "Tech"
# description = "Hardware terms"
#
# [[translation.large_language_model.glossaries.entries]]
# source = "CPU"
# target = "处理器"
"#;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Column holding the source text (1-based).
    pub source_column: usize,
    /// Column receiving the translated text (1-based).
    pub target_column: usize,
    /// Never touch the first row.
    #[serde(default)]
    pub skip_table_header: bool,
    /// Leave rows whose target cell already holds text.
    #[serde(default)]
    pub skip_if_not_empty: bool,
    /// Backend selection and backend settings.
    pub translation: TranslationConfig,
}

/// The `[translation]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Backend identifier (`google` or `openai`).
    pub service: String,
    /// Source language tag. `None` means auto-detect; `Some("")` is kept as is.
    #[serde(default)]
    pub source_language: Option<String>,
    /// Target language tag.
    pub target_language: String,
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub large_language_model: LlmConfig,
}

/// Settings for the web query backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleConfig {
    #[serde(default = "default_google_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            base_url: default_google_base_url(),
            timeout_secs: None,
        }
    }
}

/// Settings for the chat completion backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Preamble sent before the glossaries and the subject text.
    #[serde(default)]
    pub messages: Vec<ChatMessageConfig>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            api_key: String::new(),
            model: String::new(),
            timeout_secs: None,
            messages: Vec::new(),
        }
    }
}

/// One preamble message. The role is checked by the chat backend when it is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageConfig {
    pub role: String,
    pub content: String,
}

/// Glossary injection for LLM backends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Sent once before the glossaries, only when at least one glossary exists.
    #[serde(default)]
    pub glossary_prompt: String,
    #[serde(default)]
    pub glossaries: Vec<GlossaryConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub entries: Vec<GlossaryEntryConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntryConfig {
    pub source: String,
    pub target: String,
}

fn default_google_base_url() -> String {
    DEFAULT_GOOGLE_BASE_URL.to_string()
}

fn default_openai_base_url() -> String {
    DEFAULT_OPENAI_BASE_URL.to_string()
}

impl AppConfig {
    /// Load and validate a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration text.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the pipeline relies on.
    pub fn validate(&self) -> ConfigResult<()> {
        for (key, column) in [
            ("source_column", self.source_column),
            ("target_column", self.target_column),
        ] {
            if !(1..=MAX_COLUMNS).contains(&column) {
                return Err(ConfigError::invalid(format!(
                    "{key} must be between 1 and {MAX_COLUMNS}, got {column}"
                )));
            }
        }
        if self.translation.service.trim().is_empty() {
            return Err(ConfigError::invalid("translation.service must be set"));
        }
        if self.translation.target_language.trim().is_empty() {
            return Err(ConfigError::invalid(
                "translation.target_language must be set",
            ));
        }
        Ok(())
    }

    /// 0-based index of the source column.
    pub fn source_index(&self) -> usize {
        self.source_column - 1
    }

    /// 0-based index of the target column.
    pub fn target_index(&self) -> usize {
        self.target_column - 1
    }

    /// The commented starter configuration.
    pub fn template() -> &'static str {
        TEMPLATE
    }

    /// Write the starter configuration to `path`. Never overwrites.
    pub fn write_template<P: AsRef<Path>>(path: P) -> ConfigResult<()> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::AlreadyExists {
                    ConfigError::AlreadyExists(path.to_path_buf())
                } else {
                    ConfigError::Io {
                        path: path.to_path_buf(),
                        source,
                    }
                }
            })?;

        file.write_all(TEMPLATE.as_bytes())
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
    }
}
