//! Logging utilities
//!
//! Shared logging helpers for prompt and completion summaries

use crate::models::chat::ChatCompletion;
use crate::models::gemini::GenerateContentRequest;
use serde_json::{json, Value};

/// Set to true to log full upstream request bodies at debug level
/// Default is false to keep prompts out of the logs
pub const VERBOSE_REQUEST_LOGGING: bool = false;

/// Truncate a string with a note about original length
pub fn truncate_content(s: &str, max_len: usize) -> String {
    let total = s.chars().count();
    if total > max_len {
        let kept: String = s.chars().take(max_len).collect();
        format!("{}... ({} chars truncated)", kept, total - max_len)
    } else {
        s.to_string()
    }
}

/// Summarize one upstream content turn: role plus truncated part texts
fn summarize_content(content: &Value) -> Value {
    let parts: Vec<Value> = content
        .get("parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .map(|part| match part.get("text").and_then(Value::as_str) {
                    Some(text) => Value::String(truncate_content(text, 200)),
                    None => json!("[non-text part]"),
                })
                .collect()
        })
        .unwrap_or_default();

    json!({
        "role": content.get("role").cloned().unwrap_or(Value::Null),
        "parts": parts,
    })
}

/// Create a filtered summary of the upstream request for logging
pub fn create_upstream_request_log_summary(request: &GenerateContentRequest) -> Value {
    if VERBOSE_REQUEST_LOGGING {
        return serde_json::to_value(request).unwrap_or(json!({"error": "serialize failed"}));
    }

    let contents: Vec<Value> = request.contents.iter().take(3).map(summarize_content).collect();

    json!({
        "turns": request.contents.len(),
        "contents": contents,
        "generationConfig": request.generation_config,
    })
}

/// Create a filtered summary of the completion returned to the client
pub fn create_completion_log_summary(completion: &ChatCompletion) -> Value {
    let choices: Vec<Value> = completion
        .choices
        .iter()
        .map(|choice| {
            json!({
                "role": choice.message.role,
                "content": truncate_content(&choice.message.content, 200),
            })
        })
        .collect();

    json!({ "choices": choices })
}
