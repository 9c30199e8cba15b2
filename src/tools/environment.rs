//! Python virtual environment helpers.
//!
//! Environments live under one root directory (`~/venvs` by default). The
//! tools only build the command; nothing is created or activated here.

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{decode_args, shell_quote, Tool, ToolError};
use crate::response::ToolResult;

const NAME_REQUIRED: &str = "Environment name is required";

/// Rejects names that would escape the environment root.
fn invalid_name(name: &str) -> Option<String> {
    if name == "." || name == ".." || name.contains('/') || name.contains('\\') {
        Some(format!("Invalid environment name '{}'", name))
    } else {
        None
    }
}

// =============================================================================
// create_env
// =============================================================================

#[derive(Debug, Deserialize)]
struct CreateEnvArgs {
    #[serde(default)]
    name: String,
    #[serde(default)]
    python_version: Option<String>,
}

pub struct CreateEnvTool {
    venv_root: PathBuf,
    default_python: String,
}

impl CreateEnvTool {
    pub fn new(venv_root: PathBuf, default_python: &str) -> Self {
        Self {
            venv_root,
            default_python: default_python.to_string(),
        }
    }
}

impl Tool for CreateEnvTool {
    fn description(&self) -> &str {
        "Create Python virtual environments"
    }

    fn execute(&self, args: &Map<String, Value>) -> Result<ToolResult, ToolError> {
        let args: CreateEnvArgs = decode_args("create_env", args)?;
        let name = args.name.trim();
        if name.is_empty() {
            return Ok(ToolResult::info(NAME_REQUIRED));
        }
        if let Some(message) = invalid_name(name) {
            return Ok(ToolResult::info(message));
        }

        let python = args
            .python_version
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(&self.default_python);
        let env_path = self.venv_root.join(name);
        let command = format!(
            "{} -m venv {}",
            shell_quote(python),
            shell_quote(&env_path.to_string_lossy())
        );

        Ok(ToolResult::execute(
            command,
            format!(
                "Ready to create virtual environment '{}' at {}",
                name,
                env_path.display()
            ),
        ))
    }
}

// =============================================================================
// switch_env
// =============================================================================

#[derive(Debug, Deserialize)]
struct SwitchEnvArgs {
    #[serde(default)]
    name: String,
}

pub struct SwitchEnvTool {
    venv_root: PathBuf,
}

impl SwitchEnvTool {
    pub fn new(venv_root: PathBuf) -> Self {
        Self { venv_root }
    }
}

impl Tool for SwitchEnvTool {
    fn description(&self) -> &str {
        "Switch between Python virtual environments"
    }

    fn execute(&self, args: &Map<String, Value>) -> Result<ToolResult, ToolError> {
        let args: SwitchEnvArgs = decode_args("switch_env", args)?;
        let name = args.name.trim();
        if name.is_empty() {
            return Ok(ToolResult::info(NAME_REQUIRED));
        }
        if let Some(message) = invalid_name(name) {
            return Ok(ToolResult::info(message));
        }

        let env_path = self.venv_root.join(name);
        let activate = env_path.join("bin").join("activate");
        if !activate.exists() {
            return Ok(ToolResult::info(format!(
                "Virtual environment '{}' not found at {}",
                name,
                env_path.display()
            )));
        }

        // `.` rather than `source`: the host shell is POSIX sh.
        Ok(ToolResult::execute(
            format!(". {}", shell_quote(&activate.to_string_lossy())),
            format!("Ready to activate virtual environment '{}'", name),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Action;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_create_env_builds_venv_command() {
        let tool = CreateEnvTool::new(PathBuf::from("/home/ada/venvs"), "python3");
        let result = tool.execute(&args(json!({"name": "web"}))).unwrap();

        assert_eq!(result.action, Action::Execute);
        assert_eq!(
            result.command.as_deref(),
            Some("python3 -m venv /home/ada/venvs/web")
        );
        assert!(result.message.contains("'web'"));
    }

    #[test]
    fn test_create_env_honors_python_version() {
        let tool = CreateEnvTool::new(PathBuf::from("/envs"), "python3");
        let result = tool
            .execute(&args(json!({"name": "old", "python_version": "python3.9"})))
            .unwrap();
        assert_eq!(result.command.as_deref(), Some("python3.9 -m venv /envs/old"));
    }

    #[test]
    fn test_create_env_does_not_touch_filesystem() {
        let tmp = TempDir::new().unwrap();
        let tool = CreateEnvTool::new(tmp.path().to_path_buf(), "python3");
        tool.execute(&args(json!({"name": "web"}))).unwrap();
        assert!(!tmp.path().join("web").exists());
    }

    #[test]
    fn test_create_env_requires_name() {
        let tool = CreateEnvTool::new(PathBuf::from("/envs"), "python3");
        let result = tool.execute(&args(json!({"name": ""}))).unwrap();
        assert_eq!(result.action, Action::Info);
        assert_eq!(result.message, NAME_REQUIRED);
        assert!(result.command.is_none());
    }

    #[test]
    fn test_create_env_rejects_path_names() {
        let tool = CreateEnvTool::new(PathBuf::from("/envs"), "python3");
        let result = tool.execute(&args(json!({"name": "../etc"}))).unwrap();
        assert_eq!(result.action, Action::Info);
        assert!(result.command.is_none());
    }

    #[test]
    fn test_switch_env_missing_environment() {
        let tmp = TempDir::new().unwrap();
        let tool = SwitchEnvTool::new(tmp.path().to_path_buf());
        let result = tool.execute(&args(json!({"name": "ghost"}))).unwrap();

        assert_eq!(result.action, Action::Info);
        assert!(result.message.contains("not found"));
        assert!(result.command.is_none());
    }

    #[test]
    fn test_switch_env_sources_activate_script() {
        let tmp = TempDir::new().unwrap();
        let bin = tmp.path().join("web").join("bin");
        fs::create_dir_all(&bin).unwrap();
        fs::write(bin.join("activate"), "# activate").unwrap();

        let tool = SwitchEnvTool::new(tmp.path().to_path_buf());
        let result = tool.execute(&args(json!({"name": "web"}))).unwrap();

        assert_eq!(result.action, Action::Execute);
        let command = result.command.unwrap();
        assert!(command.starts_with(". "));
        assert!(command.ends_with("web/bin/activate"));
    }

    #[test]
    fn test_switch_env_requires_name() {
        let tool = SwitchEnvTool::new(PathBuf::from("/envs"));
        let result = tool.execute(&Map::new()).unwrap();
        assert_eq!(result.message, NAME_REQUIRED);
    }
}
