//! Groq API client for SQL synthesis
//!
//! Thin chat-completions client configured for deterministic output:
//! zero-temperature decoding, bounded output length, no streaming.
//! Uses a long-lived reqwest::Client for connection pooling.

use crate::error::TrackerError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

const GROQ_MODEL: &str = "llama-3.3-70b-versatile";

/// Bounded timeout for the single long-latency step of the pipeline.
/// Expiry is treated as "generation unavailable" by the caller.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reusable Groq client (connection-pooled)
pub struct GroqClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GroqClient {
    pub fn new(api_key: String) -> crate::Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TrackerError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
        })
    }

    /// Complete one request: fixed system instructions plus the user text.
    /// Returns the raw completion text.
    pub async fn complete(&self, system_instructions: &str, user_text: &str) -> crate::Result<String> {
        if self.api_key.is_empty() {
            return Err(TrackerError::GenerationUnavailable(
                "GROQ_API_KEY not configured".to_string(),
            ));
        }

        let request = ChatRequest {
            model: GROQ_MODEL.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_instructions.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_text.to_string(),
                },
            ],
            temperature: 0.0,
            max_tokens: 200,
            top_p: 1.0,
            stream: false,
        };

        info!("Calling Groq API");

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Groq API request failed: {}", e);
                TrackerError::GenerationUnavailable(format!("Groq API error: {}", e))
            })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Groq API error response: {}", error_text);
            return Err(TrackerError::GenerationUnavailable(format!(
                "Groq API error: {}",
                error_text
            )));
        }

        let completion: ChatResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Groq response: {}", e);
            TrackerError::LlmError(format!("Groq parse error: {}", e))
        })?;

        let answer = completion
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| TrackerError::LlmError("Empty response from Groq".to_string()))?;

        info!("Received response from Groq");

        Ok(answer)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
