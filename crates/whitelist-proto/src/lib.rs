//! Wire surface of the whitelist dapp.
//!
//! Everything the client exchanges with the chain passes through the types in
//! this crate: the fixed contract ABI ([`abi`]) and the call, transaction and
//! receipt value types handed to provider implementations ([`types`]).
//!
//! The crate has no I/O. Encoding and decoding are pure functions so both the
//! JSON-RPC wallet and the simulation harness share one definition of the
//! contract surface.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod abi;
pub mod errors;
pub mod types;

pub use alloy_primitives::{Address, B256, Bytes, TxHash, U256, address};
pub use errors::ProtocolError;
pub use types::{CallRequest, Network, TransactionReceipt, TransactionRequest};
