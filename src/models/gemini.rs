//! Generative-language upstream data models
//!
//! Request and response structures of the `generateContent` endpoint

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `generateContent` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    /// Conversation turns, passed through as received
    pub contents: Vec<Value>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "maxOutputTokens")]
    pub max_output_tokens: Option<u32>,
}

/// `generateContent` response body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
    #[serde(rename = "usageMetadata", default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(rename = "finishReason", default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidatePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageMetadata {
    #[serde(rename = "promptTokenCount")]
    pub prompt_token_count: Option<u32>,
    #[serde(rename = "candidatesTokenCount")]
    pub candidates_token_count: Option<u32>,
    #[serde(rename = "totalTokenCount")]
    pub total_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// Text of the first candidate's first part
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .as_ref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_text() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "first"}, {"text": "second"}]}, "finishReason": "STOP"},
                {"content": {"parts": [{"text": "other candidate"}]}}
            ]
        }))
        .unwrap();

        assert_eq!(response.first_text(), Some("first"));
    }

    #[test]
    fn test_first_text_missing() {
        let blocked: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }))
        .unwrap();
        assert_eq!(blocked.first_text(), None);

        assert_eq!(GenerateContentResponse::default().first_text(), None);
    }

    #[test]
    fn test_generation_config_field_names() {
        let request = GenerateContentRequest {
            contents: vec![json!({"parts": [{"text": "hi"}]})],
            generation_config: GenerationConfig {
                temperature: Some(0.5),
                max_output_tokens: Some(100),
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 100);
        assert_eq!(value["generationConfig"]["temperature"], 0.5);
    }
}
