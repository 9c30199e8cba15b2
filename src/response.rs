//! Structured proposals produced by the model and by tools.
//!
//! The model is asked to answer with a single JSON object:
//!
//! ```json
//! {
//!   "action": "execute",
//!   "command": "ls -la",
//!   "message": "Listing files",
//!   "tool_calls": [{"tool": "run_command", "args": {"command": "ls -la"}}]
//! }
//! ```
//!
//! [`parse`] decodes that shape and degrades to an `info` response carrying the
//! raw text whenever the model says something else.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Outcome category of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Execute,
    Info,
    Question,
}

/// A single tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl ToolCall {
    pub fn new(tool: &str, args: Value) -> Self {
        let args = match args {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            tool: tool.to_string(),
            args,
        }
    }
}

/// What a tool hands back to the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    pub action: Action,
    pub message: String,
    pub command: Option<String>,
    pub results: Option<Vec<String>>,
    pub options: Option<Vec<String>>,
}

impl ToolResult {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            action: Action::Info,
            message: message.into(),
            command: None,
            results: None,
            options: None,
        }
    }

    pub fn execute(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            action: Action::Execute,
            message: message.into(),
            command: Some(command.into()),
            results: None,
            options: None,
        }
    }

    pub fn question(message: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            action: Action::Question,
            message: message.into(),
            command: None,
            results: None,
            options: Some(options),
        }
    }

    pub fn with_results(mut self, results: Vec<String>) -> Self {
        self.results = Some(results);
        self
    }
}

/// Result of interpreting one line of user input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub action: Action,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "tool_calls")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<String>>,
}

impl AgentResponse {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            action: Action::Info,
            command: None,
            message: message.into(),
            tool_calls: Vec::new(),
            options: None,
            results: None,
        }
    }

    pub fn execute(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            action: Action::Execute,
            command: Some(command.into()),
            ..Self::info(message)
        }
    }

    /// The command to run, if this response proposes one.
    pub fn executable_command(&self) -> Option<&str> {
        match self.action {
            Action::Execute => self
                .command
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty()),
            _ => None,
        }
    }

    /// Folds a tool's result into this response. Later results win.
    ///
    /// Only non-empty fields overwrite. The action changes only when the
    /// result proposes a command to execute or a question with options, so a
    /// lookup such as `search_folder` never discards the model's command.
    pub fn merge(&mut self, result: ToolResult) {
        if let Some(command) = result.command.filter(|c| !c.trim().is_empty()) {
            if result.action == Action::Execute {
                self.action = Action::Execute;
            }
            self.command = Some(command);
        }

        if let Some(options) = result.options.filter(|o| !o.is_empty()) {
            if result.action == Action::Question {
                self.action = Action::Question;
            }
            self.options = Some(options);
        }

        if !result.message.is_empty() {
            self.message = result.message;
        }
        if let Some(results) = result.results {
            self.results = Some(results);
        }
    }
}

/// Decodes raw model output. Never fails: anything that is not the expected
/// JSON object becomes an `info` response whose message is the raw text.
pub fn parse(raw: &str) -> AgentResponse {
    match serde_json::from_str::<AgentResponse>(raw.trim()) {
        Ok(mut response) => {
            if response
                .command
                .as_deref()
                .is_some_and(|c| c.trim().is_empty())
            {
                response.command = None;
            }
            response
        }
        Err(e) => {
            debug!("Model output is not a structured response: {}", e);
            AgentResponse::info(raw)
        }
    }
}
