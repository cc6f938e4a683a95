//! Turn-taking loop
//!
//! Each turn captures one utterance, asks the generator for a reply when
//! speech was recognized, prints it, and then asks the user whether to go on.
//! Exactly one utterance and one reply are in flight at a time.

use std::io::{BufRead, ErrorKind, Write};

use crate::llm::ResponseGenerator;
use crate::voice::{Recognizer, SpeechCapture, Utterance};
use crate::{Error, Result};

/// Continuation token that ends the loop
const QUIT_TOKEN: &str = "quit";

/// Prompt shown after every turn
const CONTINUE_PROMPT: &str = "\nType 'quit' to exit or press Enter to continue: ";

/// Loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Ready for the next turn
    AwaitingInput,
    /// The user asked to stop
    Terminated,
}

/// Drives capture, generation, and the continuation prompt
pub struct InteractionLoop<R, G> {
    capture: SpeechCapture<R>,
    generator: G,
    state: LoopState,
    turns: usize,
}

impl<R: Recognizer, G: ResponseGenerator> InteractionLoop<R, G> {
    /// Create a loop in the `AwaitingInput` state
    #[must_use]
    pub const fn new(capture: SpeechCapture<R>, generator: G) -> Self {
        Self {
            capture,
            generator,
            state: LoopState::AwaitingInput,
            turns: 0,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> LoopState {
        self.state
    }

    /// Turns completed so far
    #[must_use]
    pub const fn turns(&self) -> usize {
        self.turns
    }

    /// Run turns until the user types `quit`
    ///
    /// Returns the number of completed turns.
    ///
    /// # Errors
    ///
    /// Returns error if the console cannot be read or written, including
    /// end of input at the continuation prompt
    pub async fn run<I, O>(&mut self, input: &mut I, output: &mut O) -> Result<usize>
    where
        I: BufRead,
        O: Write,
    {
        tracing::info!(generator = self.generator.name(), "interaction loop started");

        while self.state == LoopState::AwaitingInput {
            self.turn(input, output).await?;
        }

        tracing::info!(turns = self.turns, "interaction loop terminated");
        Ok(self.turns)
    }

    /// Run a single turn and return the resulting state
    ///
    /// # Errors
    ///
    /// Returns error if the console cannot be read or written
    pub async fn turn<I, O>(&mut self, input: &mut I, output: &mut O) -> Result<LoopState>
    where
        I: BufRead,
        O: Write,
    {
        let utterance = self.capture.capture(output).await?;

        match utterance {
            Utterance::Recognized { text } => {
                writeln!(output, "\nUser: {text}")?;
                match self.generator.generate(&text).await {
                    Ok(reply) => writeln!(output, "Bot: {reply}")?,
                    Err(e) => {
                        tracing::warn!(error = %e, "reply generation failed");
                        writeln!(output, "Bot could not reply: {e}")?;
                    }
                }
            }
            Utterance::NoMatch { .. } | Utterance::Canceled { .. } => {
                writeln!(output, "No valid speech input detected. Please try again.")?;
            }
        }

        write!(output, "{CONTINUE_PROMPT}")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(Error::Io(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                "console input closed",
            )));
        }

        self.turns += 1;
        if is_quit(&line) {
            self.state = LoopState::Terminated;
        }

        tracing::debug!(turn = self.turns, state = ?self.state, "turn finished");
        Ok(self.state)
    }
}

/// Whether a continuation line asks to stop
#[must_use]
pub fn is_quit(line: &str) -> bool {
    line.trim().to_lowercase() == QUIT_TOKEN
}
