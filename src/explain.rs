//! One-sentence descriptions of a pending command, shown before asking for
//! confirmation.
//!
//! [`describe`] is a fast template lookup that always produces an answer.
//! [`Explainer`] can ask the model first when configured to, and falls back
//! to [`describe`] on any failure or unusable answer.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::model::LanguageModel;
use crate::safety::{first_token, flags, operands, unquote};

/// Model answers shorter than this are discarded.
const MIN_MODEL_EXPLANATION_LEN: usize = 5;

pub struct Explainer {
    model: Option<Arc<dyn LanguageModel>>,
    prefer_model: bool,
}

impl Explainer {
    /// Template-only explainer.
    pub fn heuristic() -> Self {
        Self {
            model: None,
            prefer_model: false,
        }
    }

    pub fn new(model: Arc<dyn LanguageModel>, prefer_model: bool) -> Self {
        Self {
            model: Some(model),
            prefer_model,
        }
    }

    /// Never fails and never returns an empty string.
    pub async fn explain(&self, command: &str) -> String {
        if let (Some(model), true) = (&self.model, self.prefer_model) {
            match model.generate(&explanation_prompt(command)).await {
                Ok(raw) => {
                    if let Some(sentence) = clean_model_answer(&raw) {
                        return sentence;
                    }
                    debug!("Discarding unusable model explanation: {:?}", raw);
                }
                Err(e) => warn!("Model explanation failed, using template: {}", e),
            }
        }
        describe(command)
    }
}

fn explanation_prompt(command: &str) -> String {
    format!(
        "Explain in one short sentence what this shell command will do. \
Answer with the sentence only.

Command: rm -rf build
Explanation: This will permanently delete the 'build' directory and everything in it.

Command: mkdir logs
Explanation: This will create a new directory called 'logs'.

Command: {}
Explanation:",
        command.trim()
    )
}

fn clean_model_answer(raw: &str) -> Option<String> {
    let line = raw.lines().map(str::trim).find(|l| !l.is_empty())?;
    let line = line.strip_prefix("Explanation:").unwrap_or(line);
    let sentence = line
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
        .trim();
    (sentence.chars().count() >= MIN_MODEL_EXPLANATION_LEN).then(|| sentence.to_string())
}

fn is_recursive(command: &str) -> bool {
    flags(command).iter().any(|flag| {
        *flag == "--recursive"
            || (!flag.starts_with("--") && flag.contains(|c: char| c == 'r' || c == 'R'))
    })
}

/// Describes `text` after `echo`, including a trailing redirection.
fn describe_echo(command: &str) -> String {
    let rest = command.trim_start()["echo".len()..].trim();
    let (text, target, verb) = if let Some((text, file)) = rest.split_once(">>") {
        (text, Some(file), "append")
    } else if let Some((text, file)) = rest.split_once('>') {
        (text, Some(file), "write")
    } else {
        (rest, None, "print")
    };
    let text = unquote(text.trim());

    match target.map(|f| unquote(f.trim())).filter(|f| !f.is_empty()) {
        Some(file) => format!("This will {} '{}' to the file '{}'.", verb, text, file),
        None if text.is_empty() => "This will print an empty line.".to_string(),
        None => format!("This will print '{}'.", text),
    }
}

/// Template description of `command`. Total: unknown commands get a generic
/// sentence.
pub fn describe(command: &str) -> String {
    let command = command.trim();
    let fallback = || format!("This will execute: {}", command);
    let program = first_token(command).to_lowercase();
    let args = operands(command);
    let target = args.first();
    let destination = (args.len() >= 2).then(|| args.last()).flatten();

    match program.as_str() {
        "touch" => target.map_or_else(fallback, |t| {
            format!(
                "This will create an empty file named '{}' (or update its timestamp if it already exists).",
                t
            )
        }),
        "mkdir" => target.map_or_else(fallback, |t| {
            format!("This will create a new directory named '{}'.", t)
        }),
        "rm" => target.map_or_else(fallback, |t| {
            if is_recursive(command) {
                format!("This will permanently delete '{}' and all its contents.", t)
            } else {
                format!("This will permanently delete '{}'.", t)
            }
        }),
        "cp" => match (target, destination) {
            (Some(t), Some(d)) => format!("This will copy '{}' to '{}'.", t, d),
            _ => fallback(),
        },
        "mv" => match (target, destination) {
            (Some(t), Some(d)) => format!("This will move '{}' to '{}'.", t, d),
            _ => fallback(),
        },
        "cat" => target.map_or_else(fallback, |t| {
            format!("This will display the contents of '{}'.", t)
        }),
        "echo" => describe_echo(command),
        "cd" => match target {
            Some(t) => format!("This will change the current directory to '{}'.", t),
            None => "This will change the current directory to your home directory.".to_string(),
        },
        "ls" => match target {
            Some(t) => format!("This will list the contents of '{}'.", t),
            None => "This will list the contents of the current directory.".to_string(),
        },
        "pwd" => "This will show the current working directory.".to_string(),
        _ => fallback(),
    }
}
