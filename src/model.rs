//! Language-model capability and its backends.
//!
//! The rest of the crate only needs `generate(prompt) -> text`. Backends:
//!
//! - [`AnthropicModel`] - Claude Messages API
//! - [`OllamaModel`] - a local Ollama server
//! - [`MockModel`] - deterministic offline answers (`COGNOS_USE_MOCK=1`)
//!
//! [`build_model`] picks one from [`Config`] and bounds every call with the
//! configured timeout.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::{Config, ProviderKind};
use crate::http_client::{HttpClient, ReqwestHttpClient};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model unavailable: {0}")]
    Unavailable(String),

    #[error("model did not answer within {0}s")]
    Timeout(u64),

    #[error("malformed model output: {0}")]
    Malformed(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

/// Builds the configured backend, wrapped with the configured timeout.
pub fn build_model(config: &Config) -> Arc<dyn LanguageModel> {
    let inner: Box<dyn LanguageModel> = match config.model.provider {
        ProviderKind::Mock => {
            info!("Using mock model");
            Box::new(MockModel::new())
        }
        ProviderKind::Ollama => {
            info!("Using Ollama model '{}'", config.model.ollama_model);
            Box::new(OllamaModel::new(Box::new(ReqwestHttpClient::new()), config))
        }
        ProviderKind::Anthropic => {
            info!("Using Claude model '{}'", config.model.anthropic_model);
            Box::new(AnthropicModel::new(Box::new(ReqwestHttpClient::new()), config))
        }
    };

    Arc::new(TimedModel::new(inner, config.model.timeout_secs))
}

// =============================================================================
// Timeout wrapper
// =============================================================================

pub struct TimedModel {
    inner: Box<dyn LanguageModel>,
    timeout_secs: u64,
}

impl TimedModel {
    pub fn new(inner: Box<dyn LanguageModel>, timeout_secs: u64) -> Self {
        Self {
            inner,
            timeout_secs,
        }
    }
}

#[async_trait]
impl LanguageModel for TimedModel {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        if self.timeout_secs == 0 {
            return self.inner.generate(prompt).await;
        }

        match tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            self.inner.generate(prompt),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                warn!("{} timed out after {}s", self.inner.name(), self.timeout_secs);
                Err(ModelError::Timeout(self.timeout_secs))
            }
        }
    }
}

// =============================================================================
// Anthropic
// =============================================================================

const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";

pub struct AnthropicModel {
    http: Box<dyn HttpClient>,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl AnthropicModel {
    pub fn new(http: Box<dyn HttpClient>, config: &Config) -> Self {
        Self {
            http,
            api_key: config.get_api_key().map(str::to_string),
            model: config.model.anthropic_model.clone(),
            max_tokens: config.model.max_tokens,
            temperature: config.model.temperature,
        }
    }
}

#[async_trait]
impl LanguageModel for AnthropicModel {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ModelError::Unavailable(
                "No Anthropic API key found. Run `cognos --set-api-key <key>` or export ANTHROPIC_API_KEY"
                    .to_string(),
            )
        })?;

        let request_body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let response = self
            .http
            .post_json(
                ANTHROPIC_URL,
                &[
                    ("x-api-key", api_key),
                    ("content-type", "application/json"),
                    ("anthropic-version", "2023-06-01"),
                ],
                &request_body,
            )
            .await?;

        if !response.is_success() {
            return Err(ModelError::Unavailable(format!(
                "Claude API returned {}: {}",
                response.status, response.body
            )));
        }
        debug!("Claude API response: {}", response.body);

        let value: serde_json::Value = serde_json::from_str(&response.body)
            .map_err(|e| ModelError::Malformed(e.to_string()))?;

        value
            .get("content")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|item| item.get("text"))
            .and_then(|text| text.as_str())
            .map(|text| text.trim().to_string())
            .ok_or_else(|| ModelError::Malformed("response has no text content".to_string()))
    }
}

// =============================================================================
// Ollama
// =============================================================================

pub struct OllamaModel {
    http: Box<dyn HttpClient>,
    url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OllamaModel {
    pub fn new(http: Box<dyn HttpClient>, config: &Config) -> Self {
        Self {
            http,
            url: format!("{}/api/generate", config.model.ollama_url.trim_end_matches('/')),
            model: config.model.ollama_model.clone(),
            max_tokens: config.model.max_tokens,
            temperature: config.model.temperature,
        }
    }
}

#[async_trait]
impl LanguageModel for OllamaModel {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let request_body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "num_predict": self.max_tokens,
                "temperature": self.temperature,
                "stop": ["Human:", "User:"]
            }
        });

        let response = self
            .http
            .post_json(&self.url, &[("content-type", "application/json")], &request_body)
            .await
            .map_err(|e| match e {
                ModelError::Http(err) if err.is_connect() => {
                    ModelError::Unavailable(format!("Ollama not reachable at {}: {}", self.url, err))
                }
                other => other,
            })?;

        if !response.is_success() {
            return Err(ModelError::Unavailable(format!(
                "Ollama returned {}: {}",
                response.status, response.body
            )));
        }

        let value: serde_json::Value = serde_json::from_str(&response.body)
            .map_err(|e| ModelError::Malformed(e.to_string()))?;

        value
            .get("response")
            .and_then(|r| r.as_str())
            .map(|text| text.trim().to_string())
            .ok_or_else(|| ModelError::Malformed("response has no 'response' field".to_string()))
    }
}

// =============================================================================
// Mock
// =============================================================================

/// Offline model. Answers scripted responses first, then falls back to a
/// keyword mapping of the request embedded in the prompt.
#[derive(Default)]
pub struct MockModel {
    responses: Mutex<Vec<String>>,
    fail: bool,
}

impl MockModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn respond_to(prompt: &str) -> String {
        let Some(request) = prompt
            .lines()
            .find_map(|line| line.strip_prefix("User request:"))
            .map(|r| r.trim().to_lowercase())
        else {
            return "This will run the requested command.".to_string();
        };

        let last_word = request
            .split_whitespace()
            .last()
            .unwrap_or_default()
            .trim_matches(|c: char| !c.is_alphanumeric() && c != '-' && c != '_' && c != '.')
            .to_string();

        let tool_response = |tool: &str, args: serde_json::Value, message: &str| {
            json!({
                "action": "execute",
                "command": null,
                "message": message,
                "tool_calls": [{"tool": tool, "args": args}]
            })
            .to_string()
        };

        if request.contains("environment") || request.contains(" env") {
            if request.contains("switch") || request.contains("activate") {
                return tool_response("switch_env", json!({"name": last_word}), "Switching environment");
            }
            return tool_response("create_env", json!({"name": last_word}), "Creating environment");
        }
        if request.contains("delete") || request.contains("remove") {
            return tool_response(
                "run_command",
                json!({"command": format!("rm -rf {}", last_word)}),
                "Deleting",
            );
        }
        if request.contains("folder") || request.contains("directory") {
            return json!({
                "action": "info",
                "command": null,
                "message": "Searching",
                "tool_calls": [{"tool": "search_folder", "args": {"pattern": last_word}}]
            })
            .to_string();
        }
        if request.contains("disk") {
            return tool_response("run_command", json!({"command": "df -h"}), "Checking disk usage");
        }
        if request.contains("file") || request.contains("what's here") {
            return tool_response("run_command", json!({"command": "ls -la"}), "Listing files");
        }
        if request.contains("choose") || request.contains("options") {
            return json!({
                "action": "question",
                "command": null,
                "message": "Which one?",
                "tool_calls": [{
                    "tool": "list_options",
                    "args": {"options": ["first", "second"], "message": "Which one?"}
                }]
            })
            .to_string();
        }

        format!("I'm not sure how to help with: {}", request)
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        if self.fail {
            return Err(ModelError::Unavailable("mock model failure".to_string()));
        }
        let mut responses = self
            .responses
            .lock()
            .map_err(|_| ModelError::Unavailable("mock model poisoned".to_string()))?;
        if responses.is_empty() {
            Ok(Self::respond_to(prompt))
        } else {
            Ok(responses.remove(0))
        }
    }
}
