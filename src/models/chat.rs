//! Chat data models
//!
//! Inbound OpenAI-style chat request and the normalized completion envelope

use crate::utils::error::{helpers::validation_error, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Inbound chat request
///
/// Clients send either an upstream-compatible `contents` array or an
/// OpenAI-style `messages` array. Other fields (e.g. `model`) are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// OpenAI-style message list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<ChatMessage>>,
    /// Upstream-compatible content list, forwarded verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<Vec<Value>>,
    /// Client-requested model, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// OpenAI-style message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Value,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            content: Value::String(text.into()),
        }
    }

    /// Text carried by the message
    ///
    /// Accepts a plain string or an array of `{ "type": "text", "text": ... }` parts.
    pub fn text(&self) -> Option<String> {
        let text = match &self.content {
            Value::String(text) => text.clone(),
            Value::Array(parts) => parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("\n"),
            _ => return None,
        };

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl ChatRequest {
    /// Build the upstream `contents` array
    ///
    /// `contents` wins when present and non-empty; otherwise the first message's
    /// text becomes a single user turn.
    pub fn into_contents(self) -> AppResult<Vec<Value>> {
        if let Some(contents) = self.contents {
            if !contents.is_empty() {
                return Ok(contents);
            }
        }

        let first = self
            .messages
            .and_then(|messages| messages.into_iter().next())
            .ok_or_else(|| validation_error("Request body must include 'contents' or 'messages[0].content'"))?;

        let text = first.text().ok_or_else(|| {
            validation_error("'messages[0].content' must be a non-empty string or a list of text parts")
        })?;

        Ok(vec![json!({ "parts": [{ "text": text }] })])
    }
}

/// Normalized completion envelope: `{ choices: [{ message: { role, content } }] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub role: String,
    pub content: String,
}

impl ChatCompletion {
    /// Wrap assistant text in the single-choice envelope
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            choices: vec![ChatChoice {
                message: AssistantMessage {
                    role: "assistant".to_string(),
                    content: content.into(),
                },
            }],
        }
    }
}
