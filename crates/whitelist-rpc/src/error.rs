//! Transport errors and their mapping onto [`WalletError`].

use thiserror::Error;
use whitelist_core::WalletError;

/// EIP-1193 code for a request the user declined.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Errors from the JSON-RPC transport.
#[derive(Error, Debug)]
pub enum RpcClientError {
    /// The HTTP request failed before a response arrived.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success HTTP status.
    #[error("unexpected http status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The node answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message from the node.
        message: String,
    },

    /// The response could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl RpcClientError {
    pub(crate) fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<RpcClientError> for WalletError {
    fn from(err: RpcClientError) -> Self {
        match err {
            RpcClientError::Rpc { code: USER_REJECTED_CODE, message } => Self::UserRejected(message),
            RpcClientError::Rpc { code, message } => Self::Rpc { code, message },
            RpcClientError::Http(e) if e.is_connect() => Self::Unavailable(e.to_string()),
            other => Self::Transport(other.to_string()),
        }
    }
}
