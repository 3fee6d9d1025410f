//! Language-model client for graph element extraction.
//!
//! The model is treated as an opaque capability: prompt text in, completion
//! text out. [`CompletionBackend`] is the seam; [`ChatCompletionClient`]
//! implements it against any OpenAI-compatible `/chat/completions` endpoint.

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

/// Errors from the LLM transport.
#[derive(Debug, Error, Diagnostic)]
pub enum LlmError {
    #[error("model request to {url} failed: {message}")]
    #[diagnostic(
        code(memgraph::llm::request_failed),
        help("Check network access and that OPENAI_BASE_URL points at a chat completions API.")
    )]
    RequestFailed { url: String, message: String },

    #[error("model endpoint returned status {status}: {body}")]
    #[diagnostic(
        code(memgraph::llm::status),
        help("A 401 means the API key was rejected; a 429 means the provider is rate limiting.")
    )]
    Status { status: u16, body: String },

    #[error("failed to parse model response: {message}")]
    #[diagnostic(
        code(memgraph::llm::parse_error),
        help("The endpoint returned an unexpected response envelope.")
    )]
    ParseError { message: String },
}

/// Anything that can turn a prompt into completion text.
pub trait CompletionBackend {
    /// Send a single-turn prompt and return the model's text.
    fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

impl<B: CompletionBackend + ?Sized> CompletionBackend for &B {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).complete(prompt)
    }
}

impl<B: CompletionBackend + ?Sized> CompletionBackend for Box<B> {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).complete(prompt)
    }
}

/// Connection settings for the chat completions endpoint.
#[derive(Clone)]
pub struct LlmConfig {
    /// Bearer credential.
    pub api_key: String,
    /// Base URL, without the trailing `/chat/completions`.
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";

impl LlmConfig {
    /// Settings with the given key and default endpoint parameters.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            temperature: 0.2,
            timeout_secs: 120,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Blocking client for an OpenAI-compatible chat completions API.
pub struct ChatCompletionClient {
    config: LlmConfig,
    agent: ureq::Agent,
}

impl ChatCompletionClient {
    pub fn new(config: LlmConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self { config, agent }
    }

    /// Get the model name being used.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.config.temperature,
        })
    }
}

impl CompletionBackend for ChatCompletionClient {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let url = self.config.endpoint();
        tracing::debug!(model = %self.config.model, prompt_len = prompt.len(), "sending completion request");

        let resp = self
            .agent
            .post(&url)
            .set("Authorization", &format!("Bearer {}", self.config.api_key))
            .set("Content-Type", "application/json")
            .send_json(self.request_body(prompt));

        let resp = match resp {
            Ok(resp) => resp,
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                return Err(LlmError::Status { status, body });
            }
            Err(e) => {
                return Err(LlmError::RequestFailed {
                    url,
                    message: e.to_string(),
                });
            }
        };

        let json: serde_json::Value = resp.into_json().map_err(|e| LlmError::ParseError {
            message: e.to_string(),
        })?;

        completion_text(&json)
    }
}

/// Pull `choices[0].message.content` out of a chat completions envelope.
fn completion_text(json: &serde_json::Value) -> Result<String, LlmError> {
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| LlmError::ParseError {
            message: "missing 'choices[0].message.content' field".into(),
        })
}

impl std::fmt::Debug for ChatCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}
