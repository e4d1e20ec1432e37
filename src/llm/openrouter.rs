//! `OpenRouter` chat-completions client
//!
//! One POST per question, bounded by a hard timeout, never retried.

use super::observer::{notify, CallAnnotation, CompletionObserver, TracingObserver};
use super::types::{Completion, CompletionOutcome, ConversationRequest};
use super::{CompletionError, ConversationService};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_REFERER: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Body tokens that mark a 402/429 as a billing problem rather than a plain failure
const BILLING_TOKENS: [&str; 4] = ["credit", "quota", "payment", "billing"];

/// Longest slice of an error body kept in diagnostics
const MAX_ERROR_DETAIL: usize = 200;

/// OpenRouter-compatible completion client
pub struct OpenRouterClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    referer: String,
    timeout: Duration,
    observer: Arc<dyn CompletionObserver>,
}

impl OpenRouterClient {
    /// Create a client. A missing key is not an error here; every call
    /// then resolves to `ConfigMissing` without touching the network.
    pub fn new(api_key: Option<String>) -> Result<Self, CompletionError> {
        // A redirect would repeat the POST; 3xx is classified like any other non-2xx
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| CompletionError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            timeout: DEFAULT_TIMEOUT,
            observer: Arc::new(TracingObserver),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = referer.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn CompletionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Send the request and classify whatever comes back.
    /// Returns the HTTP status alongside the outcome for the call annotation.
    async fn exchange(
        &self,
        api_key: &str,
        request: &ConversationRequest,
    ) -> (Option<u16>, CompletionOutcome) {
        let body = ChatCompletionRequest::from_request(request);

        let response = match self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", &self.referer)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return (None, Err(CompletionError::timed_out(format!("Request timeout: {e}"))));
            }
            Err(e) => {
                return (None, Err(CompletionError::transport(format!("Request failed: {e}"))));
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                return (
                    Some(status.as_u16()),
                    Err(CompletionError::transport(format!("Failed to read response: {e}"))
                        .with_status(status.as_u16())),
                );
            }
        };

        (Some(status.as_u16()), classify(status, &text))
    }
}

#[async_trait]
impl ConversationService for OpenRouterClient {
    async fn complete(&self, request: &ConversationRequest) -> CompletionOutcome {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("No API key configured, skipping completion call");
            return Err(CompletionError::config_missing("API key is not configured"));
        };

        let start = Instant::now();
        let (status, outcome) = match timeout(self.timeout, self.exchange(api_key, request)).await {
            Ok(result) => result,
            Err(_) => (
                None,
                Err(CompletionError::timed_out(format!(
                    "No response within {} ms",
                    self.timeout.as_millis()
                ))),
            ),
        };

        notify(
            self.observer.as_ref(),
            &CallAnnotation {
                model: request.model.clone(),
                duration: start.elapsed(),
                status,
                failure: outcome.as_ref().err().map(|e| e.kind),
            },
        );

        outcome
    }
}

/// Classify a received response by status and body
fn classify(status: StatusCode, body: &str) -> CompletionOutcome {
    let code = status.as_u16();

    if !status.is_success() {
        if matches!(code, 402 | 429) && is_billing_related(body) {
            return Err(CompletionError::rate_limited(format!(
                "Billing limit reached: {}",
                error_detail(body)
            ))
            .with_status(code));
        }
        return Err(
            CompletionError::upstream(format!("HTTP {status}: {}", error_detail(body)))
                .with_status(code),
        );
    }

    let response: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        CompletionError::upstream(format!("Failed to parse response: {e}")).with_status(code)
    })?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|text| !text.trim().is_empty())
        .map(Completion::new)
        .ok_or_else(|| {
            CompletionError::upstream("No message content in first choice").with_status(code)
        })
}

fn is_billing_related(body: &str) -> bool {
    let lowered = body.to_lowercase();
    BILLING_TOKENS.iter().any(|token| lowered.contains(token))
}

/// Error message from a JSON error body, or a bounded prefix of the raw body
fn error_detail(body: &str) -> String {
    if let Ok(error_resp) = serde_json::from_str::<ErrorResponse>(body) {
        return error_resp.error.message;
    }
    body.chars().take(MAX_ERROR_DETAIL).collect()
}

// Chat-completions wire types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

impl<'a> ChatCompletionRequest<'a> {
    fn from_request(request: &'a ConversationRequest) -> Self {
        let mut messages = Vec::with_capacity(2);
        if !request.system_prompt.is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: &request.system_prompt,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.user_prompt,
        });

        Self {
            model: &request.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
