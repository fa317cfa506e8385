//! Wallet capability traits.
//!
//! A wallet is injected into the [`crate::ConnectionProvider`] as an explicit
//! dependency exposing `{connect, network, signer}`. The handles it hands out
//! are split by capability:
//!
//! - [`ReadProvider`]: chain queries and read-only contract calls
//! - [`SigningProvider`]: everything a reader can do, plus the account
//!   address and transaction submission
//!
//! Handles are cheap to clone and immutable from the caller's point of view;
//! only the connection provider creates or revokes them.
//!
//! # Implementations
//!
//! - **JSON-RPC**: `whitelist-rpc` talks to a node with managed accounts
//! - **Simulation**: `whitelist-harness` answers from an in-memory chain

use std::{future::Future, time::Duration};

use tokio::sync::mpsc;
use whitelist_proto::{
    Address, Bytes, CallRequest, Network, TransactionReceipt, TransactionRequest, TxHash,
};

use crate::WalletError;

/// Read-only access to the chain.
pub trait ReadProvider: Clone + Send + Sync + 'static {
    /// Network the provider is attached to.
    fn network(&self) -> impl Future<Output = Result<Network, WalletError>> + Send;

    /// Execute a read-only contract call and return the raw return data.
    fn call(&self, request: CallRequest) -> impl Future<Output = Result<Bytes, WalletError>> + Send;
}

/// A submitted transaction that has not been confirmed yet.
pub trait PendingTransaction: Send + 'static {
    /// Hash of the submitted transaction.
    fn hash(&self) -> TxHash;

    /// Wait until the transaction is mined and return its receipt.
    ///
    /// A reverted transaction still yields a receipt, with `success` unset.
    fn wait(self) -> impl Future<Output = Result<TransactionReceipt, WalletError>> + Send;
}

/// An account capable of signing transactions.
pub trait SigningProvider: ReadProvider {
    /// Handle to a submitted transaction.
    type Pending: PendingTransaction;

    /// Address of the signing account.
    fn address(&self) -> impl Future<Output = Result<Address, WalletError>> + Send;

    /// Sign and submit a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::UserRejected`] if the user declines to sign.
    fn send_transaction(
        &self,
        request: TransactionRequest,
    ) -> impl Future<Output = Result<Self::Pending, WalletError>> + Send;
}

/// Injected wallet dependency.
pub trait Wallet: Send + Sync + 'static {
    /// Read-only handle type.
    type Reader: ReadProvider;

    /// Signing handle type.
    type Signer: SigningProvider;

    /// Ask the wallet for a provider.
    fn connect(&self) -> impl Future<Output = Result<Self::Reader, WalletError>> + Send;

    /// Escalate a provider to a signer for the wallet's active account.
    fn signer(
        &self,
        reader: &Self::Reader,
    ) -> impl Future<Output = Result<Self::Signer, WalletError>> + Send;

    /// Register for network and account change notifications.
    ///
    /// The wallet keeps the sink and pushes a [`WalletNotification`] every
    /// time the active chain or account changes.
    fn subscribe(&self, sink: NotificationSink) -> Result<(), WalletError>;
}

/// External change reported by the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletNotification {
    /// The wallet switched to another chain.
    ChainChanged {
        /// New chain id.
        chain_id: u64,
    },

    /// The wallet's exposed accounts changed.
    AccountsChanged {
        /// Accounts now exposed, active account first.
        accounts: Vec<Address>,
    },
}

/// Sending half of the notification subscription.
#[derive(Debug, Clone)]
pub struct NotificationSink {
    tx: mpsc::UnboundedSender<WalletNotification>,
}

impl NotificationSink {
    /// Wrap the sending half of a notification channel.
    pub fn new(tx: mpsc::UnboundedSender<WalletNotification>) -> Self {
        Self { tx }
    }

    /// Deliver a notification. Returns `false` if nobody is listening anymore.
    pub fn notify(&self, notification: WalletNotification) -> bool {
        self.tx.send(notification).is_ok()
    }

    /// Whether the receiving side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Bound a wallet call by `limit`.
pub(crate) async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, WalletError>>,
) -> Result<T, WalletError> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| WalletError::Timeout { elapsed: limit })?
}
