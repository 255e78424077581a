//! Generative-language upstream client
//!
//! Sends `generateContent` requests and reshapes replies into the chat completion envelope

use crate::config::Settings;
use crate::models::chat::ChatCompletion;
use crate::models::gemini::{GenerateContentRequest, GenerateContentResponse, GenerationConfig};
use crate::utils::error::{helpers::upstream_error, AppError, AppResult, NO_ADDITIONAL_DETAILS};
use crate::utils::logging::{create_completion_log_summary, create_upstream_request_log_summary};
use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, error};

/// Successful upstream reply, already in the client-facing shape
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    /// Upstream HTTP status, echoed to the client
    pub status: u16,
    pub completion: ChatCompletion,
}

/// Client for the `generateContent` endpoint
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    url: String,
    generation_config: GenerationConfig,
}

impl GeminiClient {
    /// Create a new client instance
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.upstream_timeout())
            .user_agent(concat!("linguix-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create upstream HTTP client")?;

        Ok(Self {
            client,
            url: settings.generate_content_url(),
            generation_config: GenerationConfig {
                temperature: Some(settings.upstream.temperature),
                max_output_tokens: Some(settings.upstream.max_output_tokens),
            },
        })
    }

    /// Full `generateContent` URL, without the credential
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Build the upstream body for the given turns
    pub fn build_request(&self, contents: Vec<Value>) -> GenerateContentRequest {
        GenerateContentRequest {
            contents,
            generation_config: self.generation_config.clone(),
        }
    }

    /// Send one `generateContent` call with `api_key` as the credential
    pub async fn generate(&self, api_key: &str, contents: Vec<Value>) -> AppResult<UpstreamReply> {
        let request = self.build_request(contents);

        if let Ok(summary) = serde_json::to_string_pretty(&create_upstream_request_log_summary(&request)) {
            debug!("📤 Upstream Request:\n{}", summary);
        }

        let response = self
            .client
            .post(&self.url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Upstream request failed: {}", e);
                upstream_error(e.without_url().to_string())
            })?;

        self.handle_response(response).await
    }

    /// Handle HTTP response
    async fn handle_response(&self, response: Response) -> AppResult<UpstreamReply> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| upstream_error(format!("Failed to read upstream response: {}", e.without_url())))?;

        if !status.is_success() {
            error!("Upstream request failed: {} - {}", status, body);
            return Err(AppError::Upstream {
                status: Some(status.as_u16()),
                message: format!("Request failed with status code {}", status.as_u16()),
                details: error_details(&body),
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| AppError::Upstream {
            status: None,
            message: format!("Failed to parse upstream response: {}", e),
            details: error_details(&body),
        })?;

        let text = parsed.first_text().ok_or_else(|| AppError::Upstream {
            status: None,
            message: "Upstream response contained no candidate text".to_string(),
            details: error_details(&body),
        })?;

        let completion = ChatCompletion::from_text(text);
        if let Ok(summary) = serde_json::to_string_pretty(&create_completion_log_summary(&completion)) {
            debug!("📋 Chat Completion:\n{}", summary);
        }

        Ok(UpstreamReply {
            status: status.as_u16(),
            completion,
        })
    }
}

/// Upstream body as JSON when it parses, as a string otherwise
pub fn error_details(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::String(NO_ADDITIONAL_DETAILS.to_string());
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}
