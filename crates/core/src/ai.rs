//! Language-model access.
//!
//! Generation sits behind the [`TextGenerator`] trait so the generation service and the REST
//! layer can be exercised with an in-process fake. [`OpenAiClient`] is the production
//! implementation and talks to the OpenAI Responses API.

use crate::config::AiConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Per-request timeout; a full SOAP note plus care plan can take a while.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

const INITIAL_BACKOFF_MS: u64 = 500;

const MAX_BACKOFF_MS: u64 = 5000;

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("OPENAI_API_KEY is not configured")]
    NotConfigured,
    #[error("prompt cannot be empty")]
    EmptyPrompt,
    #[error("empty response from language model")]
    EmptyResponse,
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("failed to reach language model API: {0}")]
    Request(#[source] reqwest::Error),
    #[error("language model API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode language model response: {0}")]
    InvalidResponse(#[source] reqwest::Error),
}

/// Something that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the trimmed generated text.
    ///
    /// # Errors
    ///
    /// Implementations return [`AiError::EmptyPrompt`] for a blank prompt and
    /// [`AiError::EmptyResponse`] when nothing usable came back.
    async fn generate(&self, prompt: &str) -> Result<String, AiError>;
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsesReply {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Default, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentPart {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: String,
}

impl ResponsesReply {
    /// Concatenation of every `output_text` part, in order.
    fn output_text(&self) -> String {
        self.output
            .iter()
            .flat_map(|item| item.content.iter())
            .filter(|part| part.kind == "output_text")
            .map(|part| part.text.as_str())
            .collect()
    }
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    if err.is_connect() || err.is_timeout() {
        return true;
    }
    err.status().is_some_and(is_retryable_status)
}

fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS
}

/// Exponential backoff with a little jitter, capped at [`MAX_BACKOFF_MS`].
fn calculate_backoff(attempt: u32) -> Duration {
    let base_delay = INITIAL_BACKOFF_MS.saturating_mul(2u64.saturating_pow(attempt));
    let capped_delay = base_delay.min(MAX_BACKOFF_MS);
    let jitter = u64::from(
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .subsec_millis(),
    ) % 100;
    Duration::from_millis(capped_delay + jitter)
}

/// Client for the OpenAI Responses API (`POST {base}/v1/responses`).
///
/// A client can be built without an API key so the rest of the service keeps working; every
/// generation call then fails with [`AiError::NotConfigured`].
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
    max_attempts: u32,
}

impl OpenAiClient {
    /// Creates a client from validated settings.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::ClientBuild`] if the HTTP client cannot be initialised.
    pub fn new(config: &AiConfig) -> Result<Self, AiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(AiError::ClientBuild)?;

        Ok(Self {
            client,
            endpoint: format!("{}/v1/responses", config.base_url()),
            api_key: config.api_key().map(str::to_owned),
            model: config.model().to_owned(),
            temperature: config.temperature(),
            max_output_tokens: config.max_output_tokens(),
            max_attempts: config.max_attempts(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send_once(&self, api_key: &str, prompt: &str) -> Result<String, Attempt> {
        let request = ResponsesRequest {
            model: &self.model,
            input: prompt,
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if is_retryable_error(&e) {
                    Attempt::Retry(AiError::Request(e))
                } else {
                    Attempt::Fail(AiError::Request(e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = AiError::Status {
                status: status.as_u16(),
                body,
            };
            return Err(if is_retryable_status(status) {
                Attempt::Retry(err)
            } else {
                Attempt::Fail(err)
            });
        }

        let reply: ResponsesReply = response
            .json()
            .await
            .map_err(|e| Attempt::Fail(AiError::InvalidResponse(e)))?;
        Ok(reply.output_text())
    }
}

/// Outcome of a failed attempt.
enum Attempt {
    Retry(AiError),
    Fail(AiError),
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        if prompt.trim().is_empty() {
            return Err(AiError::EmptyPrompt);
        }
        let api_key = self.api_key.as_deref().ok_or(AiError::NotConfigured)?;

        debug!(model = %self.model, endpoint = %self.endpoint, "requesting generation");

        let mut last_error = AiError::EmptyResponse;
        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let backoff = calculate_backoff(attempt - 1);
                warn!(
                    "generation attempt {} failed ({}), retrying in {:?}",
                    attempt, last_error, backoff
                );
                tokio::time::sleep(backoff).await;
            }

            match self.send_once(api_key, prompt).await {
                Ok(text) => {
                    let text = text.trim();
                    if text.is_empty() {
                        return Err(AiError::EmptyResponse);
                    }
                    return Ok(text.to_owned());
                }
                Err(Attempt::Retry(err)) => last_error = err,
                Err(Attempt::Fail(err)) => {
                    error!("generation failed: {}", err);
                    return Err(err);
                }
            }
        }

        error!(
            "generation failed after {} attempts: {}",
            self.max_attempts, last_error
        );
        Err(last_error)
    }
}
