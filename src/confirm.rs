//! Yes/no confirmation before running a command that can change state.

use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::info;

/// Asks the user to approve a pending command.
///
/// Only `y` or `yes` (any case) approves. Anything else, including an empty
/// line or end of input, cancels.
///
/// # Example
///
/// ```
/// use cognos::confirm::ConfirmationPrompt;
/// use std::io::Cursor;
///
/// let prompt = ConfirmationPrompt::new();
/// let mut input = Cursor::new(b"yes\n");
/// let mut output = Vec::new();
///
/// let approved = prompt.confirm_with_io("This will create a new directory named 'out'.", &mut input, &mut output)?;
/// assert!(approved);
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct ConfirmationPrompt;

impl ConfirmationPrompt {
    pub fn new() -> Self {
        Self
    }

    /// Shows `explanation`, then blocks for a single line of input.
    ///
    /// # Errors
    ///
    /// Returns an error if I/O operations fail.
    pub fn confirm_with_io<R: BufRead, W: Write>(
        &self,
        explanation: &str,
        input: &mut R,
        output: &mut W,
    ) -> Result<bool> {
        write!(output, "{}\nContinue? (y/n): ", explanation)?;
        output.flush()?;

        let mut line = String::new();
        input.read_line(&mut line)?;
        let approved = Self::is_affirmative(&line);

        info!("User {} the command", if approved { "approved" } else { "declined" });
        Ok(approved)
    }

    pub fn is_affirmative(answer: &str) -> bool {
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }

    pub fn show_cancelled_with_io<W: Write>(&self, output: &mut W) -> Result<()> {
        writeln!(output, "Command cancelled.")?;
        Ok(())
    }
}
