//! Whitelist contract deployment.
//!
//! Off the interactive path: deploys the contract once with its capacity as
//! the sole constructor argument and reports the created address.

use std::time::Duration;

use thiserror::Error;
use whitelist_proto::{Address, TransactionRequest, TxHash, abi};

use crate::{PendingTransaction, SigningProvider, WalletError, provider::bounded};

/// Deployment errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeployError {
    /// The creation code is empty.
    #[error("contract creation code is empty")]
    EmptyCreationCode,

    /// The deployment transaction could not be submitted.
    #[error("failed to submit deployment: {0}")]
    Submit(WalletError),

    /// The deployment was submitted but not confirmed.
    #[error("failed to confirm deployment: {0}")]
    Confirm(WalletError),

    /// The deployment transaction reverted.
    #[error("deployment {tx_hash} reverted")]
    Reverted {
        /// Hash of the deployment transaction.
        tx_hash: TxHash,
    },

    /// The receipt did not name a created contract.
    #[error("receipt for {tx_hash} carries no contract address")]
    MissingAddress {
        /// Hash of the deployment transaction.
        tx_hash: TxHash,
    },
}

/// Deploy the whitelist contract and wait for confirmation.
pub async fn deploy_whitelist<S: SigningProvider>(
    signer: &S,
    creation_code: &[u8],
    max_whitelisted: u8,
    timeout: Duration,
) -> Result<Address, DeployError> {
    if creation_code.is_empty() {
        return Err(DeployError::EmptyCreationCode);
    }

    let data = abi::encode_deployment(creation_code, max_whitelisted);
    let pending = bounded(timeout, signer.send_transaction(TransactionRequest::deploy(data)))
        .await
        .map_err(DeployError::Submit)?;
    let tx_hash = pending.hash();
    tracing::info!(%tx_hash, max_whitelisted, "deployment submitted");

    let receipt = bounded(timeout, pending.wait()).await.map_err(DeployError::Confirm)?;
    if !receipt.success {
        return Err(DeployError::Reverted { tx_hash });
    }

    receipt.contract_address.ok_or(DeployError::MissingAddress { tx_hash })
}
