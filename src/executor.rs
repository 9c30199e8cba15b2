//! Shell command execution.
//!
//! Commands run through the host shell (`sh -c <command>` by default) with
//! the caller's standard streams, so interactive programs behave normally.
//! Each run is bounded by the configured timeout; a command that overruns is
//! killed and reported as [`ExecError::TimedOut`].

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info};

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("Failed to start shell process: {0}")]
    SpawnFailed(String),

    #[error("Command timed out after {timeout_secs}s")]
    TimedOut { timeout_secs: u64 },
}

// =============================================================================
// Traits for Dependency Injection
// =============================================================================

/// Runs a command line through a shell.
///
/// This abstraction enables testing without spawning real processes.
#[async_trait]
pub trait ShellRunner: Send + Sync {
    /// Runs `command` to completion and returns its exit code.
    async fn run(&self, command: &str, timeout: Option<Duration>) -> Result<i32, ExecError>;
}

/// Checks if a program exists in PATH.
pub fn program_on_path(program: &str) -> bool {
    which::which(program).is_ok()
}

// =============================================================================
// Default Implementation
// =============================================================================

/// Runs commands with `<shell> -c`, inheriting stdin, stdout and stderr.
pub struct SystemShellRunner {
    program: String,
}

impl SystemShellRunner {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

#[async_trait]
impl ShellRunner for SystemShellRunner {
    async fn run(&self, command: &str, timeout: Option<Duration>) -> Result<i32, ExecError> {
        let shell = which::which(&self.program)
            .map_err(|e| ExecError::SpawnFailed(format!("shell '{}' not found: {}", self.program, e)))?;
        debug!("Running via {}: {}", shell.display(), command);

        let mut child = tokio::process::Command::new(&shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExecError::SpawnFailed(e.to_string()))?;

        let status = match timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => status,
                Err(_) => {
                    let _ = child.kill().await;
                    return Err(ExecError::TimedOut {
                        timeout_secs: limit.as_secs(),
                    });
                }
            },
            None => child.wait().await,
        }
        .map_err(|e| ExecError::SpawnFailed(e.to_string()))?;

        // Terminated by a signal: no exit code of its own.
        Ok(status.code().unwrap_or(1))
    }
}

// =============================================================================
// Executor Implementation
// =============================================================================

/// Executes approved commands and keeps the audit trail.
///
/// # Example
///
/// ```no_run
/// use cognos::executor::{Executor, SystemShellRunner};
///
/// # async fn demo() {
/// let executor = Executor::new(Box::new(SystemShellRunner::new("sh")), 30, true);
/// let code = executor.execute("ls -la").await;
/// # let _ = code;
/// # }
/// ```
pub struct Executor {
    runner: Box<dyn ShellRunner>,
    timeout: Option<Duration>,
    log_commands: bool,
}

impl Executor {
    /// Creates a new executor.
    ///
    /// # Arguments
    ///
    /// * `runner` - How commands reach the shell
    /// * `timeout_secs` - Per-command limit; `0` disables it
    /// * `log_commands` - Record every executed command on the audit target
    pub fn new(runner: Box<dyn ShellRunner>, timeout_secs: u64, log_commands: bool) -> Self {
        Self {
            runner,
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            log_commands,
        }
    }

    /// Runs `command` under the configured timeout and returns its exit code.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell cannot be started or the command
    /// outlives the timeout.
    pub async fn execute(&self, command: &str) -> Result<i32, ExecError> {
        self.execute_with(command, self.timeout).await
    }

    /// Runs a command the user typed or confirmed. It may wait on the
    /// terminal (an editor, a commit message), so no timeout applies.
    pub async fn execute_interactive(&self, command: &str) -> Result<i32, ExecError> {
        self.execute_with(command, None).await
    }

    async fn execute_with(&self, command: &str, timeout: Option<Duration>) -> Result<i32, ExecError> {
        let result = self.runner.run(command, timeout).await;

        match &result {
            Ok(code) => {
                if self.log_commands {
                    info!(target: "cognos::audit", user = %current_user(), exit_code = *code, "{}", command);
                }
            }
            Err(e) => error!("Error executing command '{}': {}", command, e),
        }

        result
    }
}

fn current_user() -> String {
    std::env::var("USER").unwrap_or_else(|_| "unknown".to_string())
}
