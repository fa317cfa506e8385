//! [`Wallet`] implementation over a JSON-RPC node.

use std::time::Duration;

use whitelist_core::{
    NotificationSink, PendingTransaction, ReadProvider, SigningProvider, Wallet, WalletError,
};
use whitelist_proto::{
    Address, Bytes, CallRequest, Network, TransactionReceipt, TransactionRequest, TxHash,
};

use crate::{
    RpcClient,
    watcher::{self, SharedDetector},
};

/// Interval between receipt lookups and watcher polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Wallet backed by a node that manages its own accounts.
#[derive(Debug, Clone)]
pub struct HttpWallet {
    client: RpcClient,
    poll_interval: Duration,
    detector: SharedDetector,
}

impl HttpWallet {
    /// Wallet for the node at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: RpcClient::new(url),
            poll_interval: DEFAULT_POLL_INTERVAL,
            detector: SharedDetector::default(),
        }
    }

    /// Override the polling interval.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Underlying RPC client.
    pub fn client(&self) -> &RpcClient {
        &self.client
    }
}

impl Wallet for HttpWallet {
    type Reader = HttpProvider;
    type Signer = HttpSigner;

    async fn connect(&self) -> Result<HttpProvider, WalletError> {
        let chain_id = self
            .client
            .chain_id()
            .await
            .map_err(|e| WalletError::Unavailable(format!("{}: {e}", self.client.url())))?;

        tracing::debug!(url = self.client.url(), chain_id, "node reachable");
        self.detector.seen_chain(chain_id);
        Ok(HttpProvider {
            client: self.client.clone(),
            poll_interval: self.poll_interval,
            detector: self.detector.clone(),
        })
    }

    async fn signer(&self, reader: &HttpProvider) -> Result<HttpSigner, WalletError> {
        let accounts = reader.client.accounts().await?;
        reader.detector.seen_accounts(accounts.clone());
        let address = accounts
            .first()
            .copied()
            .ok_or_else(|| WalletError::Unavailable("node manages no accounts".to_string()))?;

        Ok(HttpSigner { provider: reader.clone(), address })
    }

    fn subscribe(&self, sink: NotificationSink) -> Result<(), WalletError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| WalletError::Unavailable(format!("cannot start watcher: {e}")))?;
        runtime.spawn(watcher::watch(
            self.client.clone(),
            self.detector.clone(),
            sink,
            self.poll_interval,
        ));
        Ok(())
    }
}

/// Read-only node handle.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    client: RpcClient,
    poll_interval: Duration,
    detector: SharedDetector,
}

impl ReadProvider for HttpProvider {
    async fn network(&self) -> Result<Network, WalletError> {
        let chain_id = self.client.chain_id().await?;
        self.detector.seen_chain(chain_id);
        Ok(Network { chain_id })
    }

    async fn call(&self, request: CallRequest) -> Result<Bytes, WalletError> {
        Ok(self.client.call(&request).await?)
    }
}

/// Node-managed account.
#[derive(Debug, Clone)]
pub struct HttpSigner {
    provider: HttpProvider,
    address: Address,
}

impl ReadProvider for HttpSigner {
    async fn network(&self) -> Result<Network, WalletError> {
        self.provider.network().await
    }

    async fn call(&self, request: CallRequest) -> Result<Bytes, WalletError> {
        self.provider.call(request).await
    }
}

impl SigningProvider for HttpSigner {
    type Pending = HttpPending;

    async fn address(&self) -> Result<Address, WalletError> {
        Ok(self.address)
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<HttpPending, WalletError> {
        let request = request.with_from(self.address);
        let hash = self.provider.client.send_transaction(&request).await?;

        Ok(HttpPending {
            client: self.provider.client.clone(),
            hash,
            poll_interval: self.provider.poll_interval,
        })
    }
}

/// Submitted transaction, confirmed by polling for its receipt.
#[derive(Debug)]
pub struct HttpPending {
    client: RpcClient,
    hash: TxHash,
    poll_interval: Duration,
}

impl PendingTransaction for HttpPending {
    fn hash(&self) -> TxHash {
        self.hash
    }

    async fn wait(self) -> Result<TransactionReceipt, WalletError> {
        loop {
            if let Some(receipt) = self.client.transaction_receipt(self.hash).await? {
                return Ok(receipt);
            }
            tracing::trace!(tx_hash = %self.hash, "receipt pending");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
