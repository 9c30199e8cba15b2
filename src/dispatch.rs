//! Routes one line of input from classification to execution.
//!
//! ```text
//! Received -> Classified -> DirectExec ----------------------------> Executed
//!                        \-> Interpreted -> Informed
//!                                       \-> AutoExec -----------------> Executed
//!                                       \-> ConfirmPending -> Executed | Cancelled
//! ```
//!
//! Only auto-approved commands run under the shell timeout. Commands the user
//! typed or confirmed may be interactive and run untimed.
//!
//! Every line starts fresh; nothing carries over between calls.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::agent::Orchestrator;
use crate::classifier::{self, InputKind};
use crate::config::Config;
use crate::confirm::ConfirmationPrompt;
use crate::executor::{program_on_path, Executor, SystemShellRunner};
use crate::explain::Explainer;
use crate::model::{build_model, LanguageModel};
use crate::providers::SystemHostContext;
use crate::response::{Action, AgentResponse};
use crate::safety::{self, SafetyVerdict};
use crate::tools::ToolRegistry;

/// Terminal state reached for one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Blank input.
    Ignored,
    /// The command ran; its exit code is the result.
    Executed,
    /// Nothing to run; the message was shown.
    Informed,
    /// The user declined at the prompt.
    Cancelled,
    /// The shell could not start or the command timed out.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub outcome: Outcome,
    pub exit_code: i32,
}

impl DispatchOutcome {
    fn new(outcome: Outcome, exit_code: i32) -> Self {
        Self { outcome, exit_code }
    }
}

#[derive(Debug, Clone, Copy)]
enum Timing {
    Limited,
    Interactive,
}

pub struct Dispatcher {
    orchestrator: Orchestrator,
    explainer: Explainer,
    executor: Executor,
    prompt: ConfirmationPrompt,
}

impl Dispatcher {
    pub fn new(orchestrator: Orchestrator, explainer: Explainer, executor: Executor) -> Self {
        Self {
            orchestrator,
            explainer,
            executor,
            prompt: ConfirmationPrompt::new(),
        }
    }

    /// Wires the real model, tools, host context and shell from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let model: Arc<dyn LanguageModel> = build_model(config);
        let registry = ToolRegistry::with_defaults(
            config.tools.max_search_results,
            config.venv_root()?,
            &config.tools.default_python,
        );

        let orchestrator = Orchestrator::new(model.clone(), registry, Box::new(SystemHostContext));
        let explainer = Explainer::new(model, config.explanation.prefer_model);
        let executor = Executor::new(
            Box::new(SystemShellRunner::new(&config.shell.program)),
            config.shell.timeout_secs,
            config.shell.log_commands,
        );

        Ok(Self::new(orchestrator, explainer, executor))
    }

    pub fn tools(&self) -> &ToolRegistry {
        self.orchestrator.registry()
    }

    pub async fn explain(&self, command: &str) -> String {
        self.explainer.explain(command).await
    }

    /// Handles one line using the process's stdin and stdout.
    pub async fn handle_line(&self, line: &str) -> Result<DispatchOutcome> {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut output = std::io::stdout();
        self.handle_line_with_io(line, &mut input, &mut output).await
    }

    /// Handles one line with injected I/O for the confirmation prompt and
    /// user-facing messages.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing to `output` or reading `input` fails.
    /// Execution failures are reported on `output` and mapped to exit code 1.
    pub async fn handle_line_with_io<R: BufRead, W: Write>(
        &self,
        line: &str,
        input: &mut R,
        output: &mut W,
    ) -> Result<DispatchOutcome> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(DispatchOutcome::new(Outcome::Ignored, 0));
        }

        match classifier::classify(line) {
            InputKind::Direct => {
                let program = safety::first_token(line);
                debug!("Direct command '{}' (on PATH: {})", program, program_on_path(program));
                self.run(line, Timing::Interactive, output).await
            }
            InputKind::Natural => {
                let response = self.orchestrator.interpret(line).await;
                self.handle_response(&response, input, output).await
            }
        }
    }

    async fn handle_response<R: BufRead, W: Write>(
        &self,
        response: &AgentResponse,
        input: &mut R,
        output: &mut W,
    ) -> Result<DispatchOutcome> {
        let Some(command) = response.executable_command() else {
            show_response(response, output)?;
            return Ok(DispatchOutcome::new(Outcome::Informed, 0));
        };

        match safety::classify(command) {
            SafetyVerdict::AutoApproved => {
                info!("Auto-approved: {}", command);
                self.run(command, Timing::Limited, output).await
            }
            SafetyVerdict::NeedsConfirmation => {
                let explanation = self.explainer.explain(command).await;
                if self.prompt.confirm_with_io(&explanation, input, output)? {
                    self.run(command, Timing::Interactive, output).await
                } else {
                    self.prompt.show_cancelled_with_io(output)?;
                    Ok(DispatchOutcome::new(Outcome::Cancelled, 0))
                }
            }
        }
    }

    async fn run<W: Write>(
        &self,
        command: &str,
        timing: Timing,
        output: &mut W,
    ) -> Result<DispatchOutcome> {
        output.flush()?;
        let result = match timing {
            Timing::Limited => self.executor.execute(command).await,
            Timing::Interactive => self.executor.execute_interactive(command).await,
        };
        match result {
            Ok(code) => Ok(DispatchOutcome::new(Outcome::Executed, code)),
            Err(e) => {
                writeln!(output, "Error: {}", e)?;
                Ok(DispatchOutcome::new(Outcome::Failed, 1))
            }
        }
    }
}

fn show_response<W: Write>(response: &AgentResponse, output: &mut W) -> Result<()> {
    if !response.message.is_empty() {
        writeln!(output, "{}", response.message)?;
    }

    if let (Action::Question, Some(options)) = (response.action, &response.options) {
        // list_options already numbers them inside the message.
        let already_listed = options
            .first()
            .is_some_and(|first| response.message.contains(&format!("1. {}", first)));
        if !already_listed {
            for (i, option) in options.iter().enumerate() {
                writeln!(output, "{}. {}", i + 1, option)?;
            }
        }
    }

    for result in response.results.iter().flatten() {
        writeln!(output, "  {}", result)?;
    }
    Ok(())
}
