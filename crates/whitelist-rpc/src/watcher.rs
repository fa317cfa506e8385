//! Polling replacement for wallet change events.
//!
//! The watcher and the wallet's own `eth_chainId` and `eth_accounts` reads
//! share one [`ChangeDetector`]. A switch that lands between the read made
//! while connecting and the watcher's first poll is therefore still reported.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::time::MissedTickBehavior;
use whitelist_core::{NotificationSink, WalletNotification};
use whitelist_proto::Address;

use crate::RpcClient;

/// Remembers the last observed chain and accounts and reports changes.
///
/// The first observation of each only sets the baseline.
#[derive(Debug, Default, Clone)]
pub struct ChangeDetector {
    chain_id: Option<u64>,
    accounts: Option<Vec<Address>>,
}

impl ChangeDetector {
    /// Record the current chain id.
    pub fn observe_chain(&mut self, chain_id: u64) -> Option<WalletNotification> {
        let previous = self.chain_id.replace(chain_id);
        previous
            .is_some_and(|previous| previous != chain_id)
            .then_some(WalletNotification::ChainChanged { chain_id })
    }

    /// Record the current account list.
    pub fn observe_accounts(&mut self, accounts: Vec<Address>) -> Option<WalletNotification> {
        match self.accounts.replace(accounts.clone()) {
            Some(previous) if previous != accounts => {
                Some(WalletNotification::AccountsChanged { accounts })
            },
            _ => None,
        }
    }
}

/// Detector shared by a wallet, the handles it hands out and its watcher.
#[derive(Debug, Default, Clone)]
pub(crate) struct SharedDetector(Arc<Mutex<ChangeDetector>>);

impl SharedDetector {
    pub(crate) fn lock(&self) -> MutexGuard<'_, ChangeDetector> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a chain id read outside the watcher.
    ///
    /// The reader already acts on the value, so a change is not re-reported.
    pub(crate) fn seen_chain(&self, chain_id: u64) {
        if let Some(notification) = self.lock().observe_chain(chain_id) {
            tracing::debug!(?notification, "change observed by a direct read");
        }
    }

    /// Record an account list read outside the watcher.
    pub(crate) fn seen_accounts(&self, accounts: Vec<Address>) {
        if let Some(notification) = self.lock().observe_accounts(accounts) {
            tracing::debug!(?notification, "change observed by a direct read");
        }
    }
}

/// Poll the node until the listener goes away.
pub(crate) async fn watch(
    client: RpcClient,
    detector: SharedDetector,
    sink: NotificationSink,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while !sink.is_closed() {
        ticker.tick().await;

        let chain = client.chain_id().await.map(|id| detector.lock().observe_chain(id));
        let accounts = client.accounts().await.map(|a| detector.lock().observe_accounts(a));
        for observed in [chain, accounts] {
            match observed {
                Ok(Some(notification)) => {
                    tracing::info!(?notification, "wallet change detected");
                    if !sink.notify(notification) {
                        return;
                    }
                },
                Ok(None) => {},
                Err(error) => tracing::debug!(%error, "watcher poll failed"),
            }
        }
    }

    tracing::debug!("notification watcher stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_is_a_baseline() {
        let mut detector = ChangeDetector::default();
        assert_eq!(detector.observe_chain(5), None);
        assert_eq!(detector.observe_accounts(vec![Address::repeat_byte(1)]), None);
    }

    #[test]
    fn chain_switch_is_reported_once() {
        let mut detector = ChangeDetector::default();
        let _ = detector.observe_chain(5);

        assert_eq!(detector.observe_chain(1), Some(WalletNotification::ChainChanged { chain_id: 1 }));
        assert_eq!(detector.observe_chain(1), None);
        assert_eq!(detector.observe_chain(5), Some(WalletNotification::ChainChanged { chain_id: 5 }));
    }

    #[test]
    fn account_changes_include_reordering_and_removal() {
        let alice = Address::repeat_byte(0xa1);
        let bob = Address::repeat_byte(0xb0);
        let mut detector = ChangeDetector::default();
        let _ = detector.observe_accounts(vec![alice, bob]);

        assert_eq!(detector.observe_accounts(vec![bob, alice]), Some(
            WalletNotification::AccountsChanged { accounts: vec![bob, alice] }
        ));
        assert_eq!(detector.observe_accounts(vec![]), Some(WalletNotification::AccountsChanged {
            accounts: vec![]
        }));
        assert_eq!(detector.observe_accounts(vec![]), None);
    }

    #[test]
    fn direct_read_sets_the_watcher_baseline() {
        let detector = SharedDetector::default();
        detector.seen_chain(1);
        detector.seen_accounts(vec![Address::repeat_byte(0xa1)]);

        let watcher = detector.clone();
        assert_eq!(
            watcher.lock().observe_chain(5),
            Some(WalletNotification::ChainChanged { chain_id: 5 })
        );
        assert_eq!(watcher.lock().observe_accounts(vec![]), Some(
            WalletNotification::AccountsChanged { accounts: vec![] }
        ));
    }

    #[test]
    fn direct_read_is_not_reported_again() {
        let detector = SharedDetector::default();
        let _ = detector.lock().observe_chain(1);
        detector.seen_chain(5);

        assert_eq!(detector.lock().observe_chain(5), None);
    }
}
