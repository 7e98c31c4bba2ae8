//! Text generation. The rest of the service only sees `prompt in, text out`.

use async_trait::async_trait;
use std::time::Duration;

const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("AI not configured (set CLAUDE_API_KEY)")]
    NotConfigured,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider returned no text")]
    EmptyResponse,
}

#[async_trait]
pub trait AiGateway: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError>;
}

/// Anthropic Messages API client.
pub struct ClaudeGateway {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl ClaudeGateway {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl AiGateway for ClaudeGateway {
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        if self.api_key.is_empty() {
            return Err(GatewayError::NotConfigured);
        }

        let response = self
            .client
            .post(ANTHROPIC_MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&serde_json::json!({
                "model": self.model,
                "max_tokens": MAX_TOKENS,
                "messages": [{
                    "role": "user",
                    "content": prompt
                }]
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status { status, body });
        }

        let body: serde_json::Value = response.json().await?;
        let text = body["content"][0]["text"]
            .as_str()
            .filter(|t| !t.trim().is_empty())
            .ok_or(GatewayError::EmptyResponse)?;

        tracing::debug!(chars = text.len(), model = %self.model, "AI reply received");
        Ok(text.to_string())
    }
}
