//! Host-context providers for dependency injection.
//!
//! The orchestrator embeds the working directory, user and OS into every
//! prompt. Reading them through a trait keeps prompt construction testable.

use std::path::PathBuf;

/// Describes the host the assistant is running on.
pub trait HostContext: Send + Sync {
    fn current_dir(&self) -> PathBuf;

    fn user(&self) -> String;

    fn os_name(&self) -> String;
}

/// Reads the real process environment.
pub struct SystemHostContext;

impl HostContext for SystemHostContext {
    fn current_dir(&self) -> PathBuf {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }

    fn user(&self) -> String {
        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }

    fn os_name(&self) -> String {
        match std::env::consts::OS {
            "linux" => "Linux".to_string(),
            "macos" => "macOS".to_string(),
            "windows" => "Windows".to_string(),
            other => other.to_string(),
        }
    }
}

/// Fixed values, for tests and reproducible prompts.
#[derive(Debug, Clone)]
pub struct StaticHostContext {
    pub current_dir: PathBuf,
    pub user: String,
    pub os_name: String,
}

impl HostContext for StaticHostContext {
    fn current_dir(&self) -> PathBuf {
        self.current_dir.clone()
    }

    fn user(&self) -> String {
        self.user.clone()
    }

    fn os_name(&self) -> String {
        self.os_name.clone()
    }
}
