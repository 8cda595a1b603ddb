//! Vision inference HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::{VisionError, VisionResult};
use crate::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ContentPart, ImageUrl,
    MessageContent, Role,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Configuration for the vision client.
#[derive(Debug, Clone)]
pub struct VisionClientConfig {
    /// Bearer token for the service
    pub api_key: String,
    /// Base URL, without the `/chat/completions` suffix
    pub base_url: String,
    pub model: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Upper bound on reply length
    pub max_tokens: u32,
}

impl Default for VisionClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(60),
            max_tokens: 10,
        }
    }
}

impl VisionClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> VisionResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .or_else(|_| std::env::var("OPEN_AI_API_KEY"))
            .map_err(|_| VisionError::config_error("OPENAI_API_KEY not set"))?;

        Ok(Self {
            api_key,
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(
                std::env::var("VISION_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            max_tokens: 10,
        })
    }
}

/// Vision inference seam.
///
/// One call is one request; retrying is the caller's job.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Send `instruction` and one image, returning the raw reply text.
    async fn complete(&self, instruction: &str, image_data_url: &str) -> VisionResult<String>;
}

/// Client for a chat-completions vision endpoint.
pub struct VisionClient {
    http: Client,
    config: VisionClientConfig,
}

impl VisionClient {
    /// Create a new vision client.
    pub fn new(config: VisionClientConfig) -> VisionResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(VisionError::config_error("API key is empty"));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(VisionError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> VisionResult<Self> {
        Self::new(VisionClientConfig::from_env()?)
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn build_request(&self, instruction: &str, image_data_url: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: Role::System,
                    content: MessageContent::Text(instruction.to_string()),
                },
                ChatMessage {
                    role: Role::User,
                    content: MessageContent::Parts(vec![ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image_data_url.to_string(),
                            detail: Some("low".to_string()),
                        },
                    }]),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: 0.0,
        }
    }
}

#[async_trait]
impl VisionModel for VisionClient {
    async fn complete(&self, instruction: &str, image_data_url: &str) -> VisionResult<String> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let request = self.build_request(instruction, image_data_url);

        debug!(
            model = %self.config.model,
            payload_bytes = image_data_url.len(),
            "Sending vision inference request"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(VisionError::RequestFailed { status, body });
        }

        let body = response.bytes().await?;
        let completion: ChatCompletionResponse = serde_json::from_slice(&body)?;

        completion
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| VisionError::InvalidResponse("no content in response".to_string()))
    }
}
