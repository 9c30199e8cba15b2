//! Turns a natural-language request into a structured proposal.
//!
//! The orchestrator builds a prompt from the system instruction, the host
//! context and the request, asks the model, parses its answer and runs any
//! tool calls it contains. Failures never escape: they become `info`
//! responses carrying the error text.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::model::LanguageModel;
use crate::providers::HostContext;
use crate::response::{parse, AgentResponse};
use crate::tools::ToolRegistry;

const SYSTEM_INSTRUCTION: &str = r#"You are CognOS, an assistant that helps users operate their system from plain-language requests.

When the user asks for a file or directory operation, ALWAYS call the matching tool instead of describing what to do.

Common mappings:
- "show files" / "list files" / "what's here" -> run_command with "ls -la"
- "find directory X" -> search_folder with pattern X
- "go to directory" -> run_command with "cd <path>"
- "create environment" -> create_env
- "switch environment" -> switch_env"#;

const RESPONSE_FORMAT: &str = r#"ALWAYS answer with a single JSON object in this format:
{
    "action": "execute",
    "command": "actual shell command",
    "message": "explanation of what will be done",
    "tool_calls": [{"tool": "run_command", "args": {"command": "ls -la"}}]
}"#;

pub struct Orchestrator {
    model: Arc<dyn LanguageModel>,
    registry: ToolRegistry,
    host: Box<dyn HostContext>,
}

impl Orchestrator {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        registry: ToolRegistry,
        host: Box<dyn HostContext>,
    ) -> Self {
        Self {
            model,
            registry,
            host,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    fn system_prompt(&self) -> String {
        let tools: String = self
            .registry
            .list()
            .iter()
            .map(|(name, description)| format!("- {}: {}\n", name, description))
            .collect();

        format!(
            "{}\n\nAvailable tools:\n{}\n{}",
            SYSTEM_INSTRUCTION, tools, RESPONSE_FORMAT
        )
    }

    pub fn build_prompt(&self, text: &str) -> String {
        format!(
            "System: {}\n\nContext:\n- Current directory: {}\n- User: {}\n- Operating system: {}\n\nUser request: {}\n\nResponse (JSON):",
            self.system_prompt(),
            self.host.current_dir().display(),
            self.host.user(),
            self.host.os_name(),
            text.trim()
        )
    }

    /// Interprets one request. Never fails.
    pub async fn interpret(&self, text: &str) -> AgentResponse {
        info!("Interpreting request: {}", text);

        let raw = match self.model.generate(&self.build_prompt(text)).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Model {} failed: {}", self.model.name(), e);
                return AgentResponse::info(format!("Error: {}", e));
            }
        };
        debug!("Raw model output: {}", raw);

        let mut response = parse(&raw);
        self.run_tool_calls(&mut response);
        response
    }

    /// Runs the response's tool calls in order. A failing call only replaces
    /// the message; the remaining calls still run.
    fn run_tool_calls(&self, response: &mut AgentResponse) {
        let calls = std::mem::take(&mut response.tool_calls);

        for call in &calls {
            match self.registry.call(&call.tool, &call.args) {
                Ok(result) => response.merge(result),
                Err(e) => {
                    warn!("Tool call '{}' failed: {}", call.tool, e);
                    response.message = e.to_string();
                }
            }
        }

        response.tool_calls = calls;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MockModel;
    use crate::providers::StaticHostContext;
    use crate::response::Action;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn host() -> Box<dyn HostContext> {
        Box::new(StaticHostContext {
            current_dir: PathBuf::from("/home/ada/project"),
            user: "ada".to_string(),
            os_name: "Linux".to_string(),
        })
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::with_defaults(10, PathBuf::from("/tmp/cognos-venvs"), "python3")
    }

    fn scripted(responses: &[&str]) -> Orchestrator {
        let model = MockModel::with_responses(responses.iter().map(|r| r.to_string()).collect());
        Orchestrator::new(Arc::new(model), registry(), host())
    }

    // =========================================================================
    // Prompt
    // =========================================================================

    #[test]
    fn test_prompt_embeds_context_and_request() {
        let orchestrator = scripted(&[]);
        let prompt = orchestrator.build_prompt("  list my files ");

        assert!(prompt.starts_with("System: You are CognOS"));
        assert!(prompt.contains("- Current directory: /home/ada/project"));
        assert!(prompt.contains("- User: ada"));
        assert!(prompt.contains("- Operating system: Linux"));
        assert!(prompt.contains("\nUser request: list my files\n"));
        assert!(prompt.ends_with("Response (JSON):"));
    }

    #[test]
    fn test_prompt_lists_registered_tools() {
        let prompt = scripted(&[]).build_prompt("x");
        for name in ["create_env", "list_options", "run_command", "search_folder", "switch_env"] {
            assert!(prompt.contains(&format!("- {}: ", name)), "missing {}", name);
        }
    }

    // =========================================================================
    // Interpretation
    // =========================================================================

    #[tokio::test]
    async fn test_tool_command_overrides_model_command() {
        let orchestrator = scripted(&[r#"{
            "action": "execute",
            "command": "ls",
            "message": "listing",
            "tool_calls": [{"tool": "run_command", "args": {"command": "ls -la"}}]
        }"#]);

        let response = orchestrator.interpret("show files").await;
        assert_eq!(response.action, Action::Execute);
        assert_eq!(response.command.as_deref(), Some("ls -la"));
        assert_eq!(response.message, "Ready to execute: ls -la");
        assert_eq!(response.tool_calls.len(), 1);
    }

    #[tokio::test]
    async fn test_single_run_command_round_trip() {
        let orchestrator = scripted(&[
            r#"{"action": "info", "message": "", "tool_calls": [{"tool": "run_command", "args": {"command": "ls"}}]}"#,
        ]);

        let response = orchestrator.interpret("list").await;
        assert_eq!(response.executable_command(), Some("ls"));
    }

    #[tokio::test]
    async fn test_later_tool_calls_win() {
        let orchestrator = scripted(&[r#"{
            "action": "execute",
            "command": null,
            "message": "",
            "tool_calls": [
                {"tool": "run_command", "args": {"command": "pwd"}},
                {"tool": "run_command", "args": {"command": "whoami"}}
            ]
        }"#]);

        let response = orchestrator.interpret("who").await;
        assert_eq!(response.command.as_deref(), Some("whoami"));
    }

    #[tokio::test]
    async fn test_blocked_tool_call_proposes_nothing() {
        let orchestrator = scripted(&[r#"{
            "action": "execute",
            "command": null,
            "message": "wiping",
            "tool_calls": [{"tool": "run_command", "args": {"command": "sudo rm -rf /"}}]
        }"#]);

        let response = orchestrator.interpret("wipe everything").await;
        assert!(response.command.is_none());
        assert!(response.executable_command().is_none());
        assert!(response.message.contains("blocked for safety"));
    }

    #[tokio::test]
    async fn test_lookup_tool_keeps_model_command() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("src")).unwrap();
        let raw = serde_json::json!({
            "action": "execute",
            "command": "cd src",
            "message": "Going to src",
            "tool_calls": [{
                "tool": "search_folder",
                "args": {"pattern": "src", "path": tmp.path().to_string_lossy()}
            }]
        })
        .to_string();

        let orchestrator = scripted(&[raw.as_str()]);
        let response = orchestrator.interpret("go to the src folder").await;

        assert_eq!(response.action, Action::Execute);
        assert_eq!(response.executable_command(), Some("cd src"));
        assert_eq!(response.message, "Found 1 directories matching 'src'");
        assert_eq!(response.results.map(|r| r.len()), Some(1));
    }

    #[tokio::test]
    async fn test_unknown_tool_sets_message_and_continues() {
        let orchestrator = scripted(&[r#"{
            "action": "execute",
            "command": null,
            "message": "",
            "tool_calls": [
                {"tool": "teleport", "args": {}},
                {"tool": "run_command", "args": {"command": "df -h"}}
            ]
        }"#]);

        let response = orchestrator.interpret("disk").await;
        assert_eq!(response.command.as_deref(), Some("df -h"));
        assert_eq!(response.message, "Ready to execute: df -h");
    }

    #[tokio::test]
    async fn test_unknown_tool_alone_reports_name() {
        let orchestrator = scripted(&[
            r#"{"action": "info", "message": "hm", "tool_calls": [{"tool": "teleport"}]}"#,
        ]);

        let response = orchestrator.interpret("beam me up").await;
        assert_eq!(response.action, Action::Info);
        assert_eq!(response.message, "Unknown tool: teleport");
    }

    #[tokio::test]
    async fn test_plain_text_answer_becomes_info() {
        let orchestrator = scripted(&["Sure, just run ls."]);
        let response = orchestrator.interpret("how do I list files").await;

        assert_eq!(response.action, Action::Info);
        assert_eq!(response.message, "Sure, just run ls.");
        assert!(response.executable_command().is_none());
    }

    #[tokio::test]
    async fn test_model_failure_becomes_info() {
        let orchestrator = Orchestrator::new(Arc::new(MockModel::failing()), registry(), host());
        let response = orchestrator.interpret("anything").await;

        assert_eq!(response.action, Action::Info);
        assert!(response.message.starts_with("Error: "));
        assert!(response.command.is_none());
    }

    #[tokio::test]
    async fn test_question_carries_options() {
        let orchestrator = scripted(&[r#"{
            "action": "info",
            "message": "",
            "tool_calls": [{"tool": "list_options", "args": {"options": ["a", "b"], "message": "Pick:"}}]
        }"#]);

        let response = orchestrator.interpret("choose").await;
        assert_eq!(response.action, Action::Question);
        assert_eq!(response.options, Some(vec!["a".to_string(), "b".to_string()]));
        assert!(response.message.starts_with("Pick:"));
    }

    #[tokio::test]
    async fn test_search_results_are_merged() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("src")).unwrap();
        let raw = serde_json::json!({
            "action": "info",
            "message": "",
            "tool_calls": [{
                "tool": "search_folder",
                "args": {"pattern": "src", "path": tmp.path().to_string_lossy()}
            }]
        })
        .to_string();

        let orchestrator = scripted(&[raw.as_str()]);
        let response = orchestrator.interpret("find src folder").await;

        assert_eq!(response.action, Action::Info);
        let results = response.results.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].ends_with("src"));
    }

    #[tokio::test]
    async fn test_keyword_mock_drives_tools() {
        let orchestrator = Orchestrator::new(Arc::new(MockModel::new()), registry(), host());
        let response = orchestrator.interpret("show me files").await;
        assert_eq!(response.executable_command(), Some("ls -la"));
    }
}
