//! Decides whether a line is a shell command or a natural-language request.

/// How an input line should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Run verbatim through the shell.
    Direct,
    /// Interpret through the model.
    Natural,
}

const SHELL_COMMANDS: &[&str] = &[
    "ls", "cd", "pwd", "cat", "grep", "find", "chmod", "chown", "git", "python", "pip", "sudo",
    "apt", "systemctl",
];

const NATURAL_INDICATORS: &[&str] = &[
    "please", "can you", "help me", "show me", "find", "search", "go to", "navigate", "open",
    "create", "make", "install",
];

/// Lines with more words than this read as sentences.
const SENTENCE_WORD_THRESHOLD: usize = 3;

/// Classifies a non-empty input line.
///
/// A known shell command in first position always wins, then any
/// natural-language indicator phrase, then the word count.
pub fn classify(text: &str) -> InputKind {
    let words: Vec<&str> = text.split_whitespace().collect();
    let first = words.first().map(|w| w.to_lowercase()).unwrap_or_default();

    if SHELL_COMMANDS.contains(&first.as_str()) {
        return InputKind::Direct;
    }

    let lower = text.to_lowercase();
    if NATURAL_INDICATORS.iter().any(|indicator| lower.contains(indicator)) {
        return InputKind::Natural;
    }

    if words.len() > SENTENCE_WORD_THRESHOLD {
        InputKind::Natural
    } else {
        InputKind::Direct
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_prefix_is_direct_even_with_indicators() {
        assert_eq!(classify("ls -la"), InputKind::Direct);
        assert_eq!(
            classify("find . -name please help me find the files I want"),
            InputKind::Direct
        );
        assert_eq!(classify("git commit -m 'make it work please'"), InputKind::Direct);
    }

    #[test]
    fn test_shell_prefix_is_case_insensitive() {
        assert_eq!(classify("LS"), InputKind::Direct);
        assert_eq!(classify("Sudo apt update"), InputKind::Direct);
    }

    #[test]
    fn test_indicator_phrase_is_natural() {
        assert_eq!(classify("show me files"), InputKind::Natural);
        assert_eq!(classify("Please list"), InputKind::Natural);
        assert_eq!(classify("open docs"), InputKind::Natural);
    }

    #[test]
    fn test_indicator_matches_as_substring() {
        // "makefile" contains "make"
        assert_eq!(classify("vim makefile"), InputKind::Natural);
    }

    #[test]
    fn test_short_unknown_input_is_direct() {
        assert_eq!(classify("htop"), InputKind::Direct);
        assert_eq!(classify("docker ps -a"), InputKind::Direct);
    }

    #[test]
    fn test_long_unknown_input_is_natural() {
        assert_eq!(classify("what is taking up disk space"), InputKind::Natural);
        assert_eq!(classify("docker ps -a -q"), InputKind::Natural);
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(classify("   pwd   "), InputKind::Direct);
    }
}
