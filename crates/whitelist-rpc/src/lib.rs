//! JSON-RPC wallet for the whitelist dapp.
//!
//! Plays the part of the injected browser wallet for terminal clients: the
//! node behind the RPC endpoint manages the accounts and signs transactions
//! submitted with `eth_sendTransaction`.
//!
//! # Components
//!
//! - [`RpcClient`]: JSON-RPC 2.0 over HTTP
//! - [`HttpWallet`]: [`whitelist_core::Wallet`] implementation handing out
//!   [`HttpProvider`] and [`HttpSigner`] handles
//! - [`ChangeDetector`]: turns polled chain and account state into
//!   [`whitelist_core::WalletNotification`]s
//!
//! Nodes do not push chain or account changes over plain HTTP, so the wallet
//! polls `eth_chainId` and `eth_accounts` from a background task once a
//! subscription is registered.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod client;
pub mod error;
pub mod wallet;
pub mod watcher;

pub use client::RpcClient;
pub use error::{RpcClientError, USER_REJECTED_CODE};
pub use wallet::{DEFAULT_POLL_INTERVAL, HttpPending, HttpProvider, HttpSigner, HttpWallet};
pub use watcher::ChangeDetector;
