//! Shell command vetting.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use super::{decode_args, Tool, ToolError};
use crate::response::ToolResult;
use crate::safety;

#[derive(Debug, Deserialize)]
struct RunCommandArgs {
    #[serde(default)]
    command: String,
}

/// Checks a proposed command against the deny-list and forwards it unchanged.
///
/// Nothing is executed here; execution happens in the dispatcher after the
/// safety policy and, when needed, the user have agreed.
pub struct RunCommandTool;

impl Tool for RunCommandTool {
    fn description(&self) -> &str {
        "Execute shell commands safely with user confirmation"
    }

    fn execute(&self, args: &Map<String, Value>) -> Result<ToolResult, ToolError> {
        let args: RunCommandArgs = decode_args("run_command", args)?;
        let command = args.command;

        if command.trim().is_empty() {
            return Ok(ToolResult::info("No command provided"));
        }

        if let Some(pattern) = safety::denied_pattern(&command) {
            warn!("Blocked command '{}' (matched '{}')", command, pattern);
            return Ok(ToolResult::info(format!(
                "Command '{}' is potentially dangerous and blocked for safety",
                command
            )));
        }

        let message = format!("Ready to execute: {}", command);
        Ok(ToolResult::execute(command, message))
    }
}
