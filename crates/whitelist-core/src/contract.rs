//! Whitelist contract client.
//!
//! Typed wrapper over the fixed contract ABI. Each operation takes the
//! capability handle it needs as an immutable input and performs exactly one
//! attempt; retry policy belongs to the caller.

use std::time::Duration;

use whitelist_proto::{
    Address, CallRequest, TransactionReceipt, TransactionRequest, TxHash, U256, abi,
};

use crate::{
    DappConfig, DappError, PendingTransaction, ReadProvider, SigningProvider, provider::bounded,
};

/// Client for the deployed whitelist contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistContract {
    /// Contract address.
    address: Address,
    /// Bound for read calls.
    call_timeout: Duration,
    /// Bound for signing, and separately for confirmation.
    confirmation_timeout: Duration,
}

impl WhitelistContract {
    /// Create a client for the contract at `address`.
    pub fn new(address: Address, call_timeout: Duration, confirmation_timeout: Duration) -> Self {
        Self { address, call_timeout, confirmation_timeout }
    }

    /// Create a client from the dapp configuration.
    pub fn from_config(config: &DappConfig) -> Self {
        Self::new(config.contract_address, config.call_timeout, config.confirmation_timeout)
    }

    /// Contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Number of whitelisted addresses.
    ///
    /// # Errors
    ///
    /// Returns [`DappError::Rpc`] on transport failure, timeout, or malformed
    /// return data.
    pub async fn get_whitelist_count<P: ReadProvider>(&self, provider: &P) -> Result<U256, DappError> {
        let request = CallRequest::new(self.address, abi::encode_count_call());
        let data = bounded(self.call_timeout, provider.call(request)).await.map_err(DappError::rpc)?;
        let count = abi::decode_count_return(&data).map_err(DappError::rpc)?;

        tracing::debug!(%count, "fetched whitelist count");
        Ok(count)
    }

    /// Whether `address` is on the whitelist.
    ///
    /// # Errors
    ///
    /// Returns [`DappError::Rpc`] on transport failure, timeout, or malformed
    /// return data.
    pub async fn is_whitelisted<S: SigningProvider>(
        &self,
        signer: &S,
        address: Address,
    ) -> Result<bool, DappError> {
        let request = CallRequest::new(self.address, abi::encode_membership_call(address));
        let data = bounded(self.call_timeout, signer.call(request)).await.map_err(DappError::rpc)?;
        let listed = abi::decode_membership_return(&data).map_err(DappError::rpc)?;

        tracing::debug!(%address, listed, "fetched whitelist membership");
        Ok(listed)
    }

    /// Submit `addAddressToWhitelist()` for the signer's account.
    ///
    /// The returned handle must be awaited with [`JoinTransaction::wait`]
    /// before the join is considered final.
    ///
    /// # Errors
    ///
    /// - [`DappError::TransactionRejected`] if the user declined to sign
    /// - [`DappError::TransactionFailed`] if submission failed or timed out
    pub async fn join_whitelist<S: SigningProvider>(
        &self,
        signer: &S,
    ) -> Result<JoinTransaction<S::Pending>, DappError> {
        let request = TransactionRequest::call(self.address, abi::encode_join_call());
        let pending = bounded(self.confirmation_timeout, signer.send_transaction(request))
            .await
            .map_err(DappError::submission)?;

        tracing::info!(tx_hash = %pending.hash(), "join transaction submitted");
        Ok(JoinTransaction { pending, timeout: self.confirmation_timeout })
    }
}

/// Submitted join transaction awaiting confirmation.
#[derive(Debug)]
pub struct JoinTransaction<P> {
    pending: P,
    timeout: Duration,
}

impl<P: PendingTransaction> JoinTransaction<P> {
    /// Transaction hash.
    pub fn hash(&self) -> TxHash {
        self.pending.hash()
    }

    /// Wait for the transaction to be mined.
    ///
    /// # Errors
    ///
    /// Returns [`DappError::TransactionFailed`] if the transaction reverted,
    /// the wallet lost track of it, or confirmation timed out.
    pub async fn wait(self) -> Result<TransactionReceipt, DappError> {
        let tx_hash = self.pending.hash();
        let receipt =
            bounded(self.timeout, self.pending.wait()).await.map_err(DappError::confirmation)?;

        if !receipt.success {
            tracing::warn!(%tx_hash, "join transaction reverted");
            return Err(DappError::TransactionFailed {
                reason: format!("transaction {tx_hash} reverted"),
            });
        }

        tracing::info!(%tx_hash, block = ?receipt.block_number, "join transaction confirmed");
        Ok(receipt)
    }
}
