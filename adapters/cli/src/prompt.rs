//! Answers replacement questions for command-line placements.

use std::io::{BufRead, Write};

use log::warn;
use wizard_dungeon_system_editor::{Confirm, ReplacePrompt};

/// Asks on a terminal and waits for a `y`/`n` answer.
#[derive(Debug)]
pub(crate) struct TerminalConfirm<R, W> {
    input: R,
    output: W,
}

impl<R, W> TerminalConfirm<R, W> {
    pub(crate) fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R, W> Confirm for TerminalConfirm<R, W>
where
    R: BufRead,
    W: Write,
{
    fn confirm(&mut self, prompt: &ReplacePrompt) -> bool {
        if let Err(error) = write!(self.output, "{prompt} [y/N] ").and_then(|()| self.output.flush())
        {
            warn!("[Prompt] Could not ask for confirmation: {error}");
            return false;
        }

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(error) => {
                warn!("[Prompt] Could not read confirmation: {error}");
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
