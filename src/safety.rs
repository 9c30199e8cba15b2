//! Confirmation policy for shell commands.
//!
//! Read-only inspection commands run without asking. Everything else needs an
//! explicit yes from the user. The deny-list is enforced by the `run_command`
//! tool, which refuses to forward a matching command at all.

/// Substrings that block a command, matched case-insensitively.
pub const DENY_LIST: &[&str] = &[
    "rm -rf /",
    "rm -rf /*",
    "mkfs",
    "dd if=",
    "format",
    "del /f /s /q",
    "shutdown",
    "reboot",
    "halt",
    "passwd",
    "userdel",
    "usermod",
];

const READ_ONLY_COMMANDS: &[&str] = &[
    "ls", "ll", "la", "pwd", "whoami", "date", "uptime", "df", "free", "cat", "head", "tail",
    "less", "more", "grep", "find", "which", "echo", "printenv", "history",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyVerdict {
    AutoApproved,
    NeedsConfirmation,
}

/// Returns the deny-list entry contained in `command`, if any.
pub fn denied_pattern(command: &str) -> Option<&'static str> {
    let lower = command.trim().to_lowercase();
    DENY_LIST.iter().copied().find(|pattern| lower.contains(pattern))
}

/// Decided by the first word alone.
pub fn classify(command: &str) -> SafetyVerdict {
    let first = first_token(command).to_lowercase();
    if READ_ONLY_COMMANDS.contains(&first.as_str()) || first.starts_with("ls") {
        SafetyVerdict::AutoApproved
    } else {
        SafetyVerdict::NeedsConfirmation
    }
}

// =============================================================================
// Command parsing helpers
// =============================================================================

/// First whitespace-delimited word, or `""` for a blank command.
pub fn first_token(command: &str) -> &str {
    command.split_whitespace().next().unwrap_or("")
}

/// Shell words of `command`, quotes resolved. Unbalanced quoting falls back
/// to plain whitespace splitting with quotes trimmed per word.
pub fn words(command: &str) -> Vec<String> {
    shell_words::split(command).unwrap_or_else(|_| {
        command
            .split_whitespace()
            .map(|word| unquote(word).to_string())
            .collect()
    })
}

/// Words after the program name.
pub fn arguments(command: &str) -> Vec<String> {
    words(command).into_iter().skip(1).collect()
}

/// Arguments that are not flags.
pub fn operands(command: &str) -> Vec<String> {
    arguments(command)
        .into_iter()
        .filter(|arg| !arg.starts_with('-') && !arg.is_empty())
        .collect()
}

/// Short or long flags passed to the program.
pub fn flags(command: &str) -> Vec<String> {
    arguments(command)
        .into_iter()
        .filter(|arg| arg.starts_with('-') && arg.len() > 1)
        .collect()
}

pub fn unquote(word: &str) -> &str {
    word.trim_matches(|c: char| c == '\'' || c == '"')
}
