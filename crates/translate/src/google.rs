//! Web query backend.
//!
//! One GET request per call. The endpoint answers with nested arrays whose
//! depth and element types are not stable, so the body is kept as a
//! `serde_json::Value` and searched rather than decoded into a fixed schema.

use crate::error::{TranslateError, TranslateResult};
use crate::{check_status, http_client, Translator};
use async_trait::async_trait;
use autotrans_core::GoogleConfig;
use reqwest::Client;
use serde_json::Value as JsonValue;
use tracing::debug;

/// Source language sent when none is configured.
const AUTO_DETECT: &str = "auto";

/// Client for the `translate_a/single` web endpoint.
pub struct GoogleTranslator {
    client: Client,
    base_url: String,
}

impl GoogleTranslator {
    /// Create a backend for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns `TranslateError::Http` if the HTTP client cannot be built.
    pub fn new(config: &GoogleConfig) -> TranslateResult<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        source_language: Option<&str>,
        target_language: &str,
    ) -> TranslateResult<String> {
        let source_language = source_language.unwrap_or(AUTO_DETECT);
        debug!(
            target: "translation",
            backend = "google",
            sl = source_language,
            tl = target_language,
            "Sending translation request"
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("client", "gtx"),
                ("tl", target_language),
                ("dt", "t"),
                ("q", text),
                ("sl", source_language),
            ])
            .send()
            .await?;

        let body: JsonValue = check_status(response).await?.json().await?;
        extract_translation(&body)
    }

    fn name(&self) -> &'static str {
        "google"
    }
}

/// Pull the translated text out of a web query response.
///
/// The text is the first element of the first non-empty array found one
/// level below a top-level element, e.g. `"你好世界！"` in
/// `[[["你好世界！", "Hello, world!", ...]], null, "en"]`. Nulls and
/// non-array nodes on the way are skipped.
///
/// # Errors
///
/// `ResponseEmpty` when the top level holds no elements, `ResponseFormat` when
/// no text sits at the expected position.
pub fn extract_translation(body: &JsonValue) -> TranslateResult<String> {
    let items = match body {
        JsonValue::Null => return Err(TranslateError::ResponseEmpty),
        JsonValue::Array(items) => items,
        _ => return Err(TranslateError::ResponseFormat),
    };

    if items.is_empty() {
        return Err(TranslateError::ResponseEmpty);
    }

    items
        .iter()
        .find_map(|item| find_text(item, 1))
        .map(str::to_string)
        .ok_or(TranslateError::ResponseFormat)
}

/// Depth 0 is a segment array whose first element is the candidate text.
fn find_text(node: &JsonValue, depth: usize) -> Option<&str> {
    let children = node.as_array().filter(|children| !children.is_empty())?;
    if depth == 0 {
        return children[0].as_str();
    }
    children
        .iter()
        .find_map(|child| find_text(child, depth - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_first_segment() {
        let body = json!([
            [["你好世界！", "Hello, world!", null, null, 10]],
            null,
            "en",
            null,
            null,
            null,
            1.0,
            []
        ]);

        assert_eq!(extract_translation(&body).unwrap(), "你好世界！");
    }

    #[test]
    fn test_extract_skips_nulls_and_non_strings() {
        let body = json!([
            null,
            [],
            [null, [], [42, "not this"], ["found"]],
            [["later"]]
        ]);

        assert_eq!(extract_translation(&body).unwrap(), "found");
    }

    #[test]
    fn test_extract_empty_string_is_a_result() {
        let body = json!([[["", ""]]]);
        assert_eq!(extract_translation(&body).unwrap(), "");
    }

    #[test]
    fn test_extract_no_leaf_is_format_error() {
        assert!(matches!(
            extract_translation(&json!([[]])),
            Err(TranslateError::ResponseFormat)
        ));
        assert!(matches!(
            extract_translation(&json!([["flat", "strings"]])),
            Err(TranslateError::ResponseFormat)
        ));
        assert!(matches!(
            extract_translation(&json!({"error": "quota"})),
            Err(TranslateError::ResponseFormat)
        ));
    }

    #[test]
    fn test_extract_empty_response() {
        assert!(matches!(
            extract_translation(&json!([])),
            Err(TranslateError::ResponseEmpty)
        ));
        assert!(matches!(
            extract_translation(&JsonValue::Null),
            Err(TranslateError::ResponseEmpty)
        ));
    }
}
