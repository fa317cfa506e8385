//! Compiled contract artifacts.
//!
//! Accepts the two common layouts: a top-level `bytecode` hex string, and a
//! `bytecode` object whose `object` field holds the hex string.

use std::{fs, io, path::Path};

use serde::Deserialize;
use thiserror::Error;
use whitelist_proto::Bytes;

/// Artifact loading errors.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The artifact file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Artifact path.
        path: String,
        /// Underlying error.
        source: io::Error,
    },

    /// The artifact is not valid JSON or has no usable `bytecode` field.
    #[error("invalid artifact {path}: {source}")]
    Json {
        /// Artifact path.
        path: String,
        /// Underlying error.
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct Artifact {
    bytecode: Bytecode,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Bytecode {
    Hex(Bytes),
    Object { object: Bytes },
}

/// Read the contract creation code from the artifact at `path`.
pub fn load_creation_code(path: &Path) -> Result<Bytes, ArtifactError> {
    let display = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|source| ArtifactError::Io { path: display.clone(), source })?;
    parse_creation_code(&text).map_err(|source| ArtifactError::Json { path: display, source })
}

fn parse_creation_code(text: &str) -> Result<Bytes, serde_json::Error> {
    let artifact: Artifact = serde_json::from_str(text)?;
    Ok(match artifact.bytecode {
        Bytecode::Hex(code) | Bytecode::Object { object: code } => code,
    })
}
