//! Dapp configuration.
//!
//! Defaults reproduce the deployment the client was built for: the Goerli
//! test network and a whitelist capped at ten addresses.

use std::time::Duration;

use whitelist_proto::{Address, address};

/// Chain id of the Goerli test network.
pub const GOERLI_CHAIN_ID: u64 = 5;

/// Human-readable name of the target network, used in user-facing alerts.
pub const NETWORK_NAME: &str = "Goerli";

/// Address of the deployed whitelist contract.
pub const WHITELIST_CONTRACT_ADDRESS: Address =
    address!("a6e9c7f8d3b1e4e2a5c0d9f7b2e1c4a3d5f6e7b8");

/// Maximum number of whitelisted addresses, passed to the constructor.
pub const MAX_WHITELISTED_ADDRESSES: u8 = 10;

/// Upper bound for a single wallet or RPC call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound for signing and confirming a transaction.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(300);

/// Dapp configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DappConfig {
    /// The single chain id a session may be established on.
    pub chain_id: u64,
    /// Display name of the target network.
    pub network_name: String,
    /// Deployed whitelist contract.
    pub contract_address: Address,
    /// Whitelist capacity. Only consumed when deploying.
    pub max_whitelisted_addresses: u8,
    /// Timeout for connect, network, account and read calls.
    pub call_timeout: Duration,
    /// Timeout for transaction signing and for confirmation, each.
    pub confirmation_timeout: Duration,
}

impl Default for DappConfig {
    fn default() -> Self {
        Self {
            chain_id: GOERLI_CHAIN_ID,
            network_name: NETWORK_NAME.to_string(),
            contract_address: WHITELIST_CONTRACT_ADDRESS,
            max_whitelisted_addresses: MAX_WHITELISTED_ADDRESSES,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        }
    }
}

impl DappConfig {
    /// Message shown when the wallet is attached to another network.
    pub fn wrong_network_message(&self) -> String {
        format!("Change the network to {}", self.network_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_goerli() {
        let config = DappConfig::default();
        assert_eq!(config.chain_id, 5);
        assert_eq!(config.max_whitelisted_addresses, 10);
        assert_eq!(config.wrong_network_message(), "Change the network to Goerli");
    }
}
