//! Local tools the model can call, and the registry that dispatches to them.
//!
//! Tools never touch the system beyond read-only checks: they vet and shape
//! a proposal (a [`ToolResult`]) that the dispatcher may later execute.

pub mod environment;
pub mod filesystem;
pub mod system;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::response::ToolResult;

pub use environment::{CreateEnvTool, SwitchEnvTool};
pub use filesystem::{ListOptionsTool, SearchFolderTool};
pub use system::RunCommandTool;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArgs { tool: String, message: String },

    #[error("Error using tool {tool}: {message}")]
    Execution { tool: String, message: String },
}

/// A named operation with a fixed argument contract.
pub trait Tool: Send + Sync {
    /// One line shown to the model and by `--list-tools`.
    fn description(&self) -> &str;

    fn execute(&self, args: &Map<String, Value>) -> Result<ToolResult, ToolError>;
}

/// Deserializes a tool's argument map into its typed argument struct.
pub(crate) fn decode_args<T: DeserializeOwned>(
    tool: &str,
    args: &Map<String, Value>,
) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(args.clone())).map_err(|e| ToolError::InvalidArgs {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

/// Quotes a word for `sh` when it contains anything beyond a safe set.
pub(crate) fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+=:@%~".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Fixed mapping from tool name to implementation, built once at startup.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in tool.
    pub fn with_defaults(max_search_results: usize, venv_root: PathBuf, default_python: &str) -> Self {
        let mut registry = Self::new();
        registry.register("search_folder", Box::new(SearchFolderTool::new(max_search_results)));
        registry.register("list_options", Box::new(ListOptionsTool));
        registry.register("run_command", Box::new(RunCommandTool));
        registry.register(
            "create_env",
            Box::new(CreateEnvTool::new(venv_root.clone(), default_python)),
        );
        registry.register("switch_env", Box::new(SwitchEnvTool::new(venv_root)));
        registry
    }

    pub fn register(&mut self, name: &str, tool: Box<dyn Tool>) {
        self.tools.insert(name.to_string(), tool);
    }

    pub fn call(&self, name: &str, args: &Map<String, Value>) -> Result<ToolResult, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        debug!("Calling tool '{}' with {:?}", name, args);
        tool.execute(args)
    }

    /// Tool names and descriptions, sorted by name.
    pub fn list(&self) -> BTreeMap<String, String> {
        self.tools
            .iter()
            .map(|(name, tool)| (name.clone(), tool.description().to_string()))
            .collect()
    }
}
