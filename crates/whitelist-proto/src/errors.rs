//! Protocol error types.

use thiserror::Error;

/// Errors from encoding or decoding contract data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Return data did not match the declared ABI of the call.
    #[error("failed to decode {call} return data: {reason}")]
    Decode {
        /// Contract function whose return data was malformed.
        call: &'static str,
        /// Decoder message.
        reason: String,
    },

    /// Calldata selector does not belong to the whitelist interface.
    #[error("unknown selector in calldata: {reason}")]
    UnknownCall {
        /// Decoder message.
        reason: String,
    },
}
