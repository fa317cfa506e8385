//! Terminal client for the whitelist dapp.
//!
//! The `whitelist` binary runs the interactive session through
//! [`TerminalDriver`] and offers one-shot `status`, `join` and `deploy`
//! subcommands against a JSON-RPC node.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod artifact;
pub mod commands;
pub mod terminal;

pub use artifact::{ArtifactError, load_creation_code};
pub use commands::{CliError, JoinOutcome, Status};
pub use terminal::{TerminalDriver, TerminalError, status_line};
