//! Ready-made simulation setups.
//!
//! A [`Scenario`] wires a chain with the whitelist contract installed at the
//! configured address, a wallet on the target network, and the default dapp
//! configuration. Tests then build a runtime or the lower-level clients from
//! it and mutate the pieces to inject faults.

use whitelist_app::Runtime;
use whitelist_core::{ConnectionProvider, DappConfig, Notifications, WhitelistContract};
use whitelist_proto::Address;

use crate::{InvariantRegistry, SimChain, SimDriver, SimDriverHandle, SimWallet};

/// Chain, wallet and configuration for one simulated user.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Dapp configuration.
    pub config: DappConfig,
    /// Simulated chain hosting the contract.
    pub chain: SimChain,
    /// Simulated wallet on the target network.
    pub wallet: SimWallet,
    /// The wallet's initial account.
    pub account: Address,
}

impl Scenario {
    /// Build a scenario from a seed with the default configuration.
    pub fn new(seed: u64) -> Self {
        Self::with_config(DappConfig::default(), seed)
    }

    /// Build a scenario from a seed and configuration.
    pub fn with_config(config: DappConfig, seed: u64) -> Self {
        let chain = SimChain::new(config.chain_id, seed);
        chain.install_whitelist(config.contract_address, config.max_whitelisted_addresses);
        let account = chain.random_address();
        let wallet = SimWallet::new(chain.clone(), account);
        Self { config, chain, wallet, account }
    }

    /// Whitelist `members` random accounts other than the user's.
    #[must_use]
    pub fn prefilled(self, members: usize) -> Self {
        for _ in 0..members {
            let other = self.chain.random_address();
            self.chain.add_member(self.config.contract_address, other);
        }
        self
    }

    /// Whitelist the user's own account.
    #[must_use]
    pub fn already_joined(self) -> Self {
        self.chain.add_member(self.config.contract_address, self.account);
        self
    }

    /// Runtime over this scenario's wallet with standard invariants checked
    /// on every render.
    pub fn runtime(&self) -> (Runtime<SimDriver, SimWallet>, SimDriverHandle) {
        let (driver, handle) = SimDriver::new();
        let driver = driver.with_invariants(InvariantRegistry::standard(), self.config.chain_id);
        (Runtime::new(driver, self.wallet.clone(), &self.config), handle)
    }

    /// Connection provider over this scenario's wallet.
    pub fn connection(&self) -> (ConnectionProvider<SimWallet>, Notifications) {
        ConnectionProvider::from_config(self.wallet.clone(), &self.config)
    }

    /// Contract client for the configured address.
    pub fn contract(&self) -> WhitelistContract {
        WhitelistContract::from_config(&self.config)
    }

    /// On-chain whitelist size.
    pub fn member_count(&self) -> usize {
        self.chain.member_count(self.config.contract_address).unwrap_or_default()
    }

    /// Whether the user's account is on-chain whitelisted.
    pub fn is_joined(&self) -> bool {
        self.chain.is_member(self.config.contract_address, self.account)
    }
}
