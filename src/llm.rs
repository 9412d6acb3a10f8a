//! Local model transport (§6). An HTTP-like client for the two RPCs the
//! detectors, extractor, and orchestrator call against a local inference
//! endpoint (e.g. Ollama): `Completion` (`/api/generate`) and `Chat` (`/api/chat`).

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry behavior for transient transport failures, mirroring this codebase's
/// LLM client retry helper: exponential backoff with a small jitter, bounded
/// by `max_retries`.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 200,
            max_delay_ms: 2_000,
        }
    }
}

impl RetryConfig {
    fn is_retryable(status: StatusCode) -> bool {
        matches!(status.as_u16(), 429 | 500 | 502 | 503 | 529)
    }

    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = self.base_delay_ms.saturating_mul(1u64 << attempt.min(6));
        Duration::from_millis(exp.min(self.max_delay_ms))
    }
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Deserialize)]
struct GenerateReply {
    response: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    message: ChatReplyMessage,
}

/// Parameters common to a single completion/chat call.
#[derive(Debug, Clone)]
pub struct CallOptions {
    pub temperature: f32,
    pub num_predict: Option<i32>,
    pub stop: Vec<String>,
    pub timeout: Duration,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            num_predict: None,
            stop: Vec::new(),
            timeout: Duration::from_secs(20),
        }
    }
}

/// Client for the local model transport.
pub struct LocalModelClient {
    http: Client,
    endpoint: String,
    model: String,
    retry: RetryConfig,
}

impl LocalModelClient {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            retry: RetryConfig::default(),
        }
    }

    /// `POST /api/generate`. Returns `Ok(None)` on a timeout or transport
    /// failure after retries are exhausted — callers fall back conservatively
    /// per §4.2/§4.4 rather than propagating a hard error.
    pub async fn generate(&self, prompt: &str, opts: &CallOptions) -> Option<String> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: opts.temperature,
                num_predict: opts.num_predict,
                stop: if opts.stop.is_empty() {
                    None
                } else {
                    Some(opts.stop.clone())
                },
            },
        };
        self.call_with_retry(|| {
            self.http
                .post(format!("{}/api/generate", self.endpoint))
                .json(&body)
                .timeout(opts.timeout)
        })
        .await
        .and_then(|text| serde_json::from_str::<GenerateReply>(&text).ok())
        .map(|r| r.response)
    }

    /// `POST /api/chat`.
    pub async fn chat(&self, messages: &[ChatMessage], opts: &CallOptions) -> Option<String> {
        let body = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: GenerateOptions {
                temperature: opts.temperature,
                num_predict: opts.num_predict,
                stop: if opts.stop.is_empty() {
                    None
                } else {
                    Some(opts.stop.clone())
                },
            },
        };
        self.call_with_retry(|| {
            self.http
                .post(format!("{}/api/chat", self.endpoint))
                .json(&body)
                .timeout(opts.timeout)
        })
        .await
        .and_then(|text| serde_json::from_str::<ChatReply>(&text).ok())
        .map(|r| r.message.content)
    }

    async fn call_with_retry<F>(&self, build: F) -> Option<String>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        for attempt in 0..=self.retry.max_retries {
            match build().send().await {
                Ok(resp) if resp.status().is_success() => {
                    return resp.text().await.ok();
                }
                Ok(resp) if RetryConfig::is_retryable(resp.status()) => {
                    tracing::debug!(status = %resp.status(), attempt, "local model transport retrying");
                }
                Ok(resp) => {
                    tracing::warn!(status = %resp.status(), "local model transport non-retryable error");
                    return None;
                }
                Err(e) => {
                    tracing::debug!(error = %e, attempt, "local model transport error");
                }
            }
            if attempt < self.retry.max_retries {
                tokio::time::sleep(self.retry.delay_for_attempt(attempt)).await;
            }
        }
        None
    }
}
