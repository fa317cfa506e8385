//! Error types for wallet and contract operations.
//!
//! Two layers:
//!
//! - [`WalletError`]: what a wallet implementation reports (transport
//!   failures, user rejections, timeouts). A reverted transaction is not an
//!   error at this layer; its receipt reports `success == false`
//! - [`DappError`]: the classification the state machine acts on
//!
//! Only [`DappError::WrongNetwork`] is user-facing. Every other variant is
//! recorded in the logs and leaves the displayed state untouched or stale.

use std::time::Duration;

use thiserror::Error;

/// Errors reported by wallet and provider implementations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// No wallet is reachable, or it refused to connect.
    #[error("wallet unavailable: {0}")]
    Unavailable(String),

    /// The user declined a signature or account request.
    #[error("user rejected the request: {0}")]
    UserRejected(String),

    /// The node answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message from the node.
        message: String,
    },

    /// The call did not complete within its bound.
    #[error("timed out after {elapsed:?}")]
    Timeout {
        /// How long we waited.
        elapsed: Duration,
    },

    /// Network or encoding failure below the RPC layer.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Errors surfaced to the dapp state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DappError {
    /// The wallet is attached to a chain other than the target.
    ///
    /// Blocks the session and is the only error shown to the user.
    #[error("wrong network: expected chain {expected}, wallet is on chain {actual}")]
    WrongNetwork {
        /// Configured target chain id.
        expected: u64,
        /// Chain id reported by the wallet.
        actual: u64,
    },

    /// No provider or signer could be obtained.
    ///
    /// Blocks the session. Logged only.
    #[error("provider unavailable: {reason}")]
    ProviderUnavailable {
        /// Underlying cause.
        reason: String,
    },

    /// A read call failed or returned malformed data.
    ///
    /// Leaves displayed data stale. Logged only.
    #[error("rpc error: {reason}")]
    Rpc {
        /// Underlying cause.
        reason: String,
    },

    /// The user declined to sign the join transaction.
    #[error("transaction rejected: {reason}")]
    TransactionRejected {
        /// Underlying cause.
        reason: String,
    },

    /// The join transaction could not be submitted, reverted, or timed out.
    #[error("transaction failed: {reason}")]
    TransactionFailed {
        /// Underlying cause.
        reason: String,
    },
}

impl DappError {
    /// Returns true if this error must interrupt the user.
    ///
    /// Network mismatch is the only case; other failures are diagnostics.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::WrongNetwork { .. })
    }

    /// Error for operations that need a session when none is active.
    pub fn no_session() -> Self {
        Self::ProviderUnavailable { reason: "no active wallet session".to_string() }
    }

    pub(crate) fn unavailable(err: WalletError) -> Self {
        Self::ProviderUnavailable { reason: err.to_string() }
    }

    pub(crate) fn rpc(err: impl std::fmt::Display) -> Self {
        Self::Rpc { reason: err.to_string() }
    }

    /// Classify a failure while asking the signer to send a transaction.
    pub(crate) fn submission(err: WalletError) -> Self {
        match err {
            WalletError::UserRejected(reason) => Self::TransactionRejected { reason },
            other => Self::TransactionFailed { reason: other.to_string() },
        }
    }

    pub(crate) fn confirmation(err: WalletError) -> Self {
        Self::TransactionFailed { reason: err.to_string() }
    }
}
