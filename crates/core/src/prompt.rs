//! Line-oriented interactive input used by generation handlers.
//!
//! The CLI implements [`Prompt`] over stdin/stdout; [`ScriptedPrompt`] replays
//! a fixed list of answers.

use std::collections::VecDeque;
use std::io;

/// A source of answers to questions.
pub trait Prompt {
    /// Show `message` and read one line of input, without the trailing newline.
    fn ask(&mut self, message: &str) -> io::Result<String>;

    /// Show an informational line.
    fn say(&mut self, message: &str) -> io::Result<()>;
}

/// Ask a yes/no question. Only `y`/`Y` counts as yes.
pub fn confirm(prompt: &mut dyn Prompt, message: &str) -> io::Result<bool> {
    Ok(prompt.ask(message)?.trim().eq_ignore_ascii_case("y"))
}

/// Ask a question whose empty answer means "none".
pub fn ask_optional(prompt: &mut dyn Prompt, message: &str) -> io::Result<Option<String>> {
    let answer = prompt.ask(message)?;
    Ok(if answer.is_empty() { None } else { Some(answer) })
}

/// Collect answers until an empty line is entered.
pub fn ask_list(prompt: &mut dyn Prompt, message: &str) -> io::Result<Vec<String>> {
    let mut items = Vec::new();
    loop {
        let answer = prompt.ask(message)?;
        if answer.is_empty() {
            return Ok(items);
        }
        items.push(answer);
    }
}

/// Replays queued answers and records everything shown.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    transcript: Vec<String>,
}

impl ScriptedPrompt {
    /// Create a prompt that answers with `answers`, in order.
    #[must_use]
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    /// Messages shown so far (questions and informational lines).
    #[must_use]
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Answers not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&mut self, message: &str) -> io::Result<String> {
        self.transcript.push(message.to_string());
        self.answers.pop_front().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("no scripted answer for '{message}'"),
            )
        })
    }

    fn say(&mut self, message: &str) -> io::Result<()> {
        self.transcript.push(message.to_string());
        Ok(())
    }
}
