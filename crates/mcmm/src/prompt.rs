//! Terminal implementation of [`Prompt`].

use std::io::{self, BufRead, Write};

use mcmm_core::prompt::Prompt;

/// Reads answers line by line and writes questions without a trailing newline.
pub struct StdinPrompt {
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
}

impl StdinPrompt {
    /// Prompt on stdout, read from stdin.
    #[must_use]
    pub fn new() -> Self {
        Self::with_io(io::stdin().lock(), io::stdout())
    }

    /// Prompt on stderr, keeping stdout free for machine-readable output.
    #[must_use]
    pub fn on_stderr() -> Self {
        Self::with_io(io::stdin().lock(), io::stderr())
    }

    /// Use arbitrary streams.
    pub fn with_io(input: impl BufRead + 'static, output: impl Write + 'static) -> Self {
        Self {
            input: Box::new(input),
            output: Box::new(output),
        }
    }
}

impl Default for StdinPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StdinPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdinPrompt").finish_non_exhaustive()
    }
}

impl Prompt for StdinPrompt {
    fn ask(&mut self, message: &str) -> io::Result<String> {
        write!(self.output, "{message}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            ));
        }
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }

    fn say(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{message}")?;
        self.output.flush()
    }
}
