//! Gemini API client implementation
//!
//! Implements the LlmClient trait for Google's Generative Language API with
//! support for both blocking and streaming responses. Streaming uses the
//! `streamGenerateContent` method with `alt=sse`; unlike protocols with an
//! explicit stop event, the end of the SSE body is the normal-completion
//! signal, with `finishReason` on the final candidate closing the stream
//! eagerly.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest_eventsource::{Event, EventSource};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{CompletionRequest, LlmClient, LlmError};
use crate::config::LlmConfig;

/// Maximum number of retries for transient errors
const MAX_RETRIES: u32 = 3;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

/// Check if an event-stream error is worth a fresh connection attempt
fn is_retryable_stream_error(error: &reqwest_eventsource::Error) -> bool {
    match error {
        reqwest_eventsource::Error::Transport(_) => true,
        reqwest_eventsource::Error::InvalidStatusCode(status, _) => is_retryable_status(status.as_u16()),
        _ => false,
    }
}

/// Gemini API client
pub struct GeminiClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
    temperature: f32,
}

impl GeminiClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable named in config.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(model = %config.model, "from_config: called");
        let api_key = config
            .api_key()
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.clone(),
            http,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Build the request URL for a Generative Language API method
    ///
    /// The API key travels in the query string; streaming additionally asks
    /// for server-sent event framing.
    fn build_url(&self, method: &str, sse: bool) -> String {
        debug!(%method, %sse, "build_url: called");
        let mut url = format!(
            "{}/models/{}:{}?key={}",
            self.base_url, self.model, method, self.api_key
        );
        if sse {
            url.push_str("&alt=sse");
        }
        url
    }

    /// Build the request body for the Gemini API
    fn build_request_body(&self, request: &CompletionRequest) -> GeminiRequest {
        debug!(%self.model, %request.max_tokens, "build_request_body: called");
        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: request.instruction.clone(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                max_output_tokens: request.max_tokens.min(self.max_tokens),
                temperature: self.temperature,
            },
        }
    }

    /// Extract the generated text from a non-streaming response
    fn parse_response(&self, api_response: GeminiResponse) -> Result<String, LlmError> {
        debug!("parse_response: called");
        if let Some(error) = api_response.error {
            debug!(message = %error.message, "parse_response: inline error object");
            return Err(LlmError::InvalidResponse(format!("Gemini API error: {}", error.message)));
        }

        let content = api_response
            .candidates
            .and_then(|candidates| candidates.into_iter().next())
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|text| !text.is_empty());

        content.ok_or_else(|| LlmError::InvalidResponse("No content in response".to_string()))
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        debug!(%self.model, %request.max_tokens, "complete: called");
        let url = self.build_url("generateContent", false);
        let body = self.build_request_body(&request);

        let mut last_error = None;
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let backoff = INITIAL_BACKOFF_MS * 2u64.pow(attempt - 1);
                warn!(
                    attempt,
                    backoff_ms = backoff,
                    "complete: retrying after transient error"
                );
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            let response = match self.http.post(url.clone()).json(&body).send().await {
                Ok(r) => r,
                Err(e) => {
                    debug!(attempt, error = %e, "complete: network error");
                    last_error = Some(LlmError::Network(e));
                    continue;
                }
            };

            let status = response.status().as_u16();

            if status == 429 {
                debug!("complete: rate limited (429)");
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(60);

                return Err(LlmError::RateLimited {
                    retry_after: Duration::from_secs(retry_after),
                });
            }

            if is_retryable_status(status) && attempt < MAX_RETRIES {
                let text = response.text().await.unwrap_or_default();
                debug!(attempt, status, "complete: retryable error");
                last_error = Some(LlmError::ApiError { status, message: text });
                continue;
            }

            if !response.status().is_success() {
                debug!(%status, "complete: API error");
                let text = response.text().await.unwrap_or_default();
                return Err(LlmError::ApiError { status, message: text });
            }

            debug!("complete: success");
            let api_response: GeminiResponse = response.json().await?;
            return self.parse_response(api_response);
        }

        Err(last_error.unwrap_or_else(|| LlmError::InvalidResponse("Max retries exceeded".to_string())))
    }

    async fn stream(&self, request: CompletionRequest, delta_tx: mpsc::Sender<String>) -> Result<(), LlmError> {
        debug!(%self.model, %request.max_tokens, "stream: called");
        let url = self.build_url("streamGenerateContent", true);
        let body = self.build_request_body(&request);

        'attempt: for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let backoff = INITIAL_BACKOFF_MS * 2u64.pow(attempt - 1);
                warn!(attempt, backoff_ms = backoff, "stream: retrying connection after error");
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            let mut es = EventSource::new(self.http.post(url.clone()).json(&body))
                .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

            // Whether any delta reached the caller on this connection. Once
            // one has, a retry would replay output, so errors become final.
            let mut delivered = false;

            while let Some(event) = es.next().await {
                match event {
                    Ok(Event::Open) => {
                        debug!("stream: Event::Open");
                    }
                    Ok(Event::Message(msg)) => {
                        let chunk: GeminiResponse = serde_json::from_str(&msg.data).map_err(LlmError::Json)?;

                        if let Some(error) = chunk.error {
                            debug!(message = %error.message, "stream: inline error object");
                            return Err(LlmError::InvalidResponse(format!(
                                "Gemini API error: {}",
                                error.message
                            )));
                        }

                        let mut finished = false;
                        for candidate in chunk.candidates.unwrap_or_default() {
                            if let Some(content) = candidate.content {
                                for part in content.parts {
                                    if delta_tx.send(part.text).await.is_err() {
                                        debug!("stream: receiver dropped, closing");
                                        es.close();
                                        return Ok(());
                                    }
                                    delivered = true;
                                }
                            }
                            if let Some(reason) = candidate.finish_reason {
                                debug!(%reason, "stream: finish reason received");
                                finished = true;
                            }
                        }

                        if finished {
                            es.close();
                            return Ok(());
                        }
                    }
                    Err(reqwest_eventsource::Error::StreamEnded) => {
                        debug!("stream: ended");
                        return Ok(());
                    }
                    Err(e) => {
                        es.close();
                        if !delivered && attempt < MAX_RETRIES && is_retryable_stream_error(&e) {
                            debug!(attempt, error = %e, "stream: transient error before first delta");
                            continue 'attempt;
                        }
                        debug!(error = %e, "stream: fatal error");
                        let message = e.to_string();
                        return Err(match e {
                            reqwest_eventsource::Error::InvalidStatusCode(status, _) => LlmError::ApiError {
                                status: status.as_u16(),
                                message,
                            },
                            reqwest_eventsource::Error::Transport(err) => LlmError::Network(err),
                            _ => LlmError::InvalidResponse(message),
                        });
                    }
                }
            }

            // Source drained without StreamEnded: treat as normal completion
            return Ok(());
        }

        Err(LlmError::InvalidResponse("Max retries exceeded".to_string()))
    }
}

// Gemini API request/response types

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
    #[allow(dead_code)]
    code: Option<i32>,
}
