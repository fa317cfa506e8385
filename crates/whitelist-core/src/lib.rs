//! Wallet connection and contract client for the whitelist dapp.
//!
//! This crate holds the two request/response collaborators of the dapp. Both
//! are free of UI state; the state machine that drives them lives in
//! `whitelist-app`.
//!
//! # Components
//!
//! - [`ConnectionProvider`]: acquires a provider from an injected [`Wallet`],
//!   validates the chain, escalates to a signer, and owns the
//!   [`WalletSession`]
//! - [`WhitelistContract`]: typed client for the three contract calls
//! - [`DappConfig`]: target network, contract address and timeouts
//! - [`DappError`]: the error taxonomy surfaced to the state machine
//!
//! # Capabilities
//!
//! Wallet implementations plug in through [`Wallet`], [`ReadProvider`],
//! [`SigningProvider`] and [`PendingTransaction`]. Read-only and signing
//! handles are distinct types, so escalation is a typed choice rather than a
//! runtime shape check.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod connection;
pub mod contract;
pub mod deploy;
pub mod error;
pub mod provider;
pub mod session;

pub use config::DappConfig;
pub use connection::{ConnectionProvider, Notifications};
pub use contract::{JoinTransaction, WhitelistContract};
pub use deploy::{DeployError, deploy_whitelist};
pub use error::{DappError, WalletError};
pub use provider::{
    NotificationSink, PendingTransaction, ReadProvider, SigningProvider, Wallet,
    WalletNotification,
};
pub use session::WalletSession;
pub use whitelist_proto::{Address, TxHash, U256};
