//! LLM agent module for summarisation.
//!
//! Talks to any OpenAI-compatible chat-completions endpoint (Groq by default)
//! with a single, non-streaming request per summary.

pub use crate::summary::{SummaryRequest, SummaryResult};

use crate::config::{ApiConfig, AgentConfig, ConfigError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("LLM API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    ParseError(String),
    #[error("LLM returned no choices")]
    EmptyResponse,
    #[error("{0}")]
    ConfigError(#[from] ConfigError),
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Build the prompt: style instruction, blank line, then at most `budget`
/// characters of the text. Truncation ignores sentence boundaries.
pub fn build_prompt(request: &SummaryRequest, budget: usize) -> String {
    let end = request
        .text
        .char_indices()
        .nth(budget)
        .map(|(idx, _)| idx)
        .unwrap_or(request.text.len());

    format!("{}\n\n{}", request.style.instruction(), &request.text[..end])
}

/// Summariser backed by a chat-completions API
#[derive(Clone)]
pub struct Summarizer {
    http_client: Client,
    base_url: String,
    api: ApiConfig,
    temperature: f32,
    prompt_budget: usize,
}

impl std::fmt::Debug for Summarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Summarizer")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api.key.as_ref().map(|_| "<redacted>"))
            .field("temperature", &self.temperature)
            .field("prompt_budget", &self.prompt_budget)
            .finish()
    }
}

impl Summarizer {
    /// Build the client. A missing key is only reported when summarising.
    pub fn new(agent: &AgentConfig, api: &ApiConfig) -> Result<Self, AgentError> {
        let mut builder = Client::builder();
        if let Some(secs) = agent.timeout_secs.filter(|s| *s > 0) {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder
            .build()
            .map_err(|e| AgentError::RequestFailed(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: agent.base_url.trim_end_matches('/').to_string(),
            api: api.clone(),
            temperature: agent.temperature,
            prompt_budget: agent.prompt_budget,
        })
    }

    /// Run one completion and time it
    pub async fn summarize(&self, request: &SummaryRequest) -> Result<SummaryResult, AgentError> {
        let api_key = self.api.api_key()?;

        let prompt = build_prompt(request, self.prompt_budget);
        let body = ChatRequest {
            model: &request.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: self.temperature,
        };

        let start = Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Completion request failed");
                AgentError::RequestFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Completion API error");
            return Err(AgentError::Api {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::ParseError(e.to_string()))?;

        let elapsed = start.elapsed();

        let text = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or(AgentError::EmptyResponse)?;

        debug!(
            model = %request.model,
            style = %request.style,
            prompt_chars = prompt.chars().count(),
            duration_ms = elapsed.as_millis() as u64,
            "Chat completion"
        );

        Ok(SummaryResult { text, elapsed })
    }
}
