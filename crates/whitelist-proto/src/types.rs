//! Call, transaction and receipt value types.
//!
//! These are the immutable inputs and outputs of provider operations. Field
//! names serialize in the camelCase shape used by Ethereum JSON-RPC so a
//! transport can pass them through unchanged.

use alloy_primitives::{Address, Bytes, TxHash};
use serde::{Deserialize, Serialize};

/// Network the provider is currently attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    /// Chain id reported by the provider.
    pub chain_id: u64,
}

/// Read-only contract call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    /// Contract being called.
    pub to: Address,
    /// ABI-encoded calldata.
    pub data: Bytes,
}

impl CallRequest {
    /// Create a call against `to` with the given calldata.
    pub fn new(to: Address, data: Bytes) -> Self {
        Self { to, data }
    }
}

/// State-changing transaction submitted through a signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Sending account. Filled in by the signer when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    /// Destination. `None` creates a contract.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    /// Calldata, or creation code for deployments.
    pub data: Bytes,
}

impl TransactionRequest {
    /// Transaction calling the contract at `to`.
    pub fn call(to: Address, data: Bytes) -> Self {
        Self { from: None, to: Some(to), data }
    }

    /// Contract creation transaction.
    pub fn deploy(data: Bytes) -> Self {
        Self { from: None, to: None, data }
    }

    /// Set the sending account.
    #[must_use]
    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Whether this transaction creates a contract.
    pub fn is_deployment(&self) -> bool {
        self.to.is_none()
    }
}

/// Receipt of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    /// Hash of the mined transaction.
    pub transaction_hash: TxHash,
    /// Block the transaction was included in.
    pub block_number: Option<u64>,
    /// Execution status. `false` means the transaction reverted.
    pub success: bool,
    /// Address of the created contract, for deployments.
    pub contract_address: Option<Address>,
}
