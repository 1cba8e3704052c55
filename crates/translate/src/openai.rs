//! Chat completion backend.

use crate::error::{TranslateError, TranslateResult};
use crate::{check_status, http_client, Translator};
use async_trait::async_trait;
use autotrans_core::{ChatMessageConfig, LlmConfig, OpenAiConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    System,
    Developer,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::System => "system",
            Role::Developer => "developer",
            Role::Assistant => "assistant",
        }
    }
}

impl FromStr for Role {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "system" => Ok(Role::System),
            "developer" => Ok(Role::Developer),
            "assistant" => Ok(Role::Assistant),
            other => Err(TranslateError::InvalidRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a message sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Check and convert the configured preamble messages.
///
/// # Errors
///
/// Returns `InvalidRole` naming the first role outside
/// user/system/developer/assistant.
pub fn parse_preamble(messages: &[ChatMessageConfig]) -> TranslateResult<Vec<ChatMessage>> {
    messages
        .iter()
        .map(|message| {
            Ok(ChatMessage::new(
                message.role.parse()?,
                message.content.clone(),
            ))
        })
        .collect()
}

/// Assemble the message sequence for one translation call.
///
/// Order: the preamble, then the glossary prompt as an assistant message
/// (only when at least one glossary is configured), then one assistant
/// message per glossary, then `text` as the final user message. A glossary
/// renders as `"{name}: {description}\n"` followed by one
/// `"{source} -> {target}\n"` line per entry.
pub fn build_messages(preamble: &[ChatMessage], llm: &LlmConfig, text: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(preamble.len() + llm.glossaries.len() + 2);
    messages.extend_from_slice(preamble);

    if !llm.glossaries.is_empty() {
        messages.push(ChatMessage::new(Role::Assistant, llm.glossary_prompt.as_str()));
    }

    for glossary in &llm.glossaries {
        let mut content = format!("{}: {}\n", glossary.name, glossary.description);
        for entry in &glossary.entries {
            content.push_str(&entry.source);
            content.push_str(" -> ");
            content.push_str(&entry.target);
            content.push('\n');
        }
        messages.push(ChatMessage::new(Role::Assistant, content));
    }

    messages.push(ChatMessage::new(Role::User, text));
    messages
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// The language arguments of [`Translator::translate`] are not sent. The
/// language pair and the reply format are set by the preamble messages.
pub struct OpenAiTranslator {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    preamble: Vec<ChatMessage>,
    llm: LlmConfig,
}

impl OpenAiTranslator {
    /// Create a backend from its settings and the glossary configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRole` if a preamble message has an unknown role, or
    /// `Http` if the HTTP client cannot be built.
    pub fn new(config: &OpenAiConfig, llm: &LlmConfig) -> TranslateResult<Self> {
        let preamble = parse_preamble(&config.messages)?;

        Ok(Self {
            client: http_client(config.timeout_secs)?,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            preamble,
            llm: llm.clone(),
        })
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Translator for OpenAiTranslator {
    async fn translate(
        &self,
        text: &str,
        _source_language: Option<&str>,
        _target_language: &str,
    ) -> TranslateResult<String> {
        let messages = build_messages(&self.preamble, &self.llm, text);
        debug!(
            target: "translation",
            backend = "openai",
            model = %self.model,
            messages = messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: &self.model,
                messages: &messages,
            })
            .send()
            .await?;

        let body = check_status(response).await?.text().await?;
        let completion: ChatResponse = serde_json::from_str(&body)?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or(TranslateError::NoChoices)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autotrans_core::{GlossaryConfig, GlossaryEntryConfig};

    fn preamble_config(role: &str, content: &str) -> ChatMessageConfig {
        ChatMessageConfig {
            role: role.to_string(),
            content: content.to_string(),
        }
    }

    fn tech_glossary() -> LlmConfig {
        LlmConfig {
            glossary_prompt: "Use glossary:".to_string(),
            glossaries: vec![GlossaryConfig {
                name: "Tech".to_string(),
                description: String::new(),
                entries: vec![GlossaryEntryConfig {
                    source: "CPU".to_string(),
                    target: "处理器".to_string(),
                }],
            }],
        }
    }

    #[test]
    fn test_message_sequence_with_glossary() {
        let preamble = parse_preamble(&[preamble_config("system", "Translate only.")]).unwrap();
        let messages = build_messages(&preamble, &tech_glossary(), "The CPU is fast");

        assert_eq!(
            messages,
            vec![
                ChatMessage::new(Role::System, "Translate only."),
                ChatMessage::new(Role::Assistant, "Use glossary:"),
                ChatMessage::new(Role::Assistant, "Tech: \nCPU -> 处理器\n"),
                ChatMessage::new(Role::User, "The CPU is fast"),
            ]
        );
    }

    #[test]
    fn test_message_sequence_without_glossary() {
        let llm = LlmConfig {
            glossary_prompt: "Use glossary:".to_string(),
            glossaries: Vec::new(),
        };
        let messages = build_messages(&[], &llm, "hello");

        assert_eq!(messages, vec![ChatMessage::new(Role::User, "hello")]);
    }

    #[test]
    fn test_glossary_without_entries_still_rendered() {
        let llm = LlmConfig {
            glossary_prompt: String::new(),
            glossaries: vec![GlossaryConfig {
                name: "Names".to_string(),
                description: "Keep as is".to_string(),
                entries: Vec::new(),
            }],
        };
        let messages = build_messages(&[], &llm, "x");

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], ChatMessage::new(Role::Assistant, ""));
        assert_eq!(messages[1].content, "Names: Keep as is\n");
    }

    #[test]
    fn test_preamble_order_and_roles() {
        let preamble = parse_preamble(&[
            preamble_config("developer", "a"),
            preamble_config("user", "b"),
            preamble_config("assistant", "c"),
        ])
        .unwrap();

        let roles: Vec<Role> = preamble.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::Developer, Role::User, Role::Assistant]);
    }

    #[test]
    fn test_invalid_role() {
        let err = parse_preamble(&[
            preamble_config("system", "ok"),
            preamble_config("System", "case matters"),
        ])
        .unwrap_err();

        assert!(matches!(err, TranslateError::InvalidRole(ref r) if r == "System"));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::new(Role::Developer, "x")).unwrap();
        assert_eq!(json, r#"{"role":"developer","content":"x"}"#);
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = OpenAiConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..OpenAiConfig::default()
        };
        let translator = OpenAiTranslator::new(&config, &LlmConfig::default()).unwrap();

        assert_eq!(translator.endpoint(), "http://localhost:8080/v1/chat/completions");
    }
}
