//! Line-oriented terminal driver.
//!
//! Implements the [`Driver`] trait on top of any async line source and any
//! writer. The binary wires it to stdin and stdout; tests feed it byte slices
//! and capture the output in a buffer.

use std::io::{self, Write};

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use whitelist_app::{DappState, DappView, Driver, UserIntent};

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error reading input or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Writes one status line per render and reads one command per input line:
/// `connect`, `join`, `quit`, or an empty line for the intent currently
/// offered.
pub struct TerminalDriver<R, W> {
    lines: Lines<R>,
    out: W,
    offered: Option<UserIntent>,
}

impl TerminalDriver<BufReader<Stdin>, io::Stdout> {
    /// Driver reading stdin and writing stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), io::stdout())
    }
}

impl<R, W> TerminalDriver<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    /// Create a driver over `input` and `out`.
    pub fn new(input: R, out: W) -> Self {
        Self { lines: input.lines(), out, offered: None }
    }

    /// Output written so far.
    pub fn output(&self) -> &W {
        &self.out
    }
}

impl<R, W> Driver for TerminalDriver<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    type Error = TerminalError;

    async fn poll_intent(&mut self) -> Result<Option<UserIntent>, TerminalError> {
        while let Some(line) = self.lines.next_line().await? {
            match parse_command(&line) {
                Some(Command::Intent(intent)) => return Ok(Some(intent)),
                Some(Command::Offered) => {
                    if let Some(intent) = self.offered {
                        return Ok(Some(intent));
                    }
                },
                None => writeln!(self.out, "unknown command {:?} (connect, join, quit)", line.trim())?,
            }
        }
        Ok(None)
    }

    fn render(&mut self, view: &DappView) -> Result<(), TerminalError> {
        self.offered = view.intent;
        writeln!(self.out, "{}", status_line(view))?;
        self.out.flush()?;
        Ok(())
    }

    fn alert(&mut self, message: &str) -> Result<(), TerminalError> {
        writeln!(self.out, "! {message}")?;
        self.out.flush()?;
        Ok(())
    }

    fn stop(&mut self) {
        if let Err(error) = self.out.flush() {
            tracing::warn!(%error, "failed to flush terminal output");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Intent(UserIntent),
    /// Empty line: take whatever the view offers.
    Offered,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" => Some(Command::Offered),
        "c" | "connect" => Some(Command::Intent(UserIntent::Connect)),
        "j" | "join" => Some(Command::Intent(UserIntent::Join)),
        "q" | "quit" | "exit" => Some(Command::Intent(UserIntent::Quit)),
        _ => None,
    }
}

/// One line describing the view.
pub fn status_line(view: &DappView) -> String {
    let action = if view.is_loading() || view.busy {
        "Loading..."
    } else {
        match view.state {
            DappState::Connected { joined: true } => "Thanks for joining the Whitelist!",
            DappState::Connected { joined: false } => "Join the Whitelist",
            DappState::Disconnected => "Connect your wallet",
            DappState::Connecting | DappState::Joining => "Loading...",
        }
    };

    let mut line = match view.count {
        Some(count) => format!("{count} have already joined the Whitelist. {action}"),
        None => action.to_string(),
    };
    if view.intent.is_some() {
        line.push_str(" [enter]");
    }
    line
}
