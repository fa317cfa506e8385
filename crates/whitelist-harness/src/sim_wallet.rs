//! Simulated wallet attached to a [`SimChain`].
//!
//! `SimWallet` implements [`Wallet`] so the same connection provider and
//! runtime code that drives a JSON-RPC wallet runs against the simulation.
//! Tests switch its network or account to trigger change notifications.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use whitelist_core::{
    NotificationSink, ReadProvider, SigningProvider, Wallet, WalletError, WalletNotification,
};
use whitelist_proto::{Address, Bytes, CallRequest, Network, TransactionRequest};

use crate::{SimChain, SimPending};

#[derive(Debug)]
struct WalletState {
    chain_id: u64,
    accounts: Vec<Address>,
    sinks: Vec<NotificationSink>,
    available: bool,
    hang_connect: bool,
    deny_accounts: bool,
    connects: usize,
    subscriptions: usize,
    signer_requests: usize,
}

/// Simulated browser wallet.
#[derive(Debug, Clone)]
pub struct SimWallet {
    chain: SimChain,
    state: Arc<Mutex<WalletState>>,
}

impl SimWallet {
    /// Create a wallet on `chain`'s network exposing `account`.
    pub fn new(chain: SimChain, account: Address) -> Self {
        let state = WalletState {
            chain_id: chain.chain_id(),
            accounts: vec![account],
            sinks: Vec::new(),
            available: true,
            hang_connect: false,
            deny_accounts: false,
            connects: 0,
            subscriptions: 0,
            signer_requests: 0,
        };
        Self { chain, state: Arc::new(Mutex::new(state)) }
    }

    /// Start on a different network than the chain's.
    #[must_use]
    pub fn on_network(self, chain_id: u64) -> Self {
        self.set_network(chain_id);
        self
    }

    /// Change the reported network without notifying subscribers.
    pub fn set_network(&self, chain_id: u64) {
        self.lock().chain_id = chain_id;
    }

    /// Chain the wallet sends calls to.
    pub fn chain(&self) -> &SimChain {
        &self.chain
    }

    /// Network the wallet reports.
    pub fn chain_id(&self) -> u64 {
        self.lock().chain_id
    }

    /// Active account.
    pub fn account(&self) -> Option<Address> {
        self.lock().accounts.first().copied()
    }

    /// Switch network and notify subscribers.
    pub fn switch_chain(&self, chain_id: u64) {
        let mut state = self.lock();
        state.chain_id = chain_id;
        notify(&mut state, &WalletNotification::ChainChanged { chain_id });
    }

    /// Switch the active account and notify subscribers.
    pub fn switch_account(&self, account: Address) {
        let mut state = self.lock();
        state.accounts = vec![account];
        notify(&mut state, &WalletNotification::AccountsChanged { accounts: vec![account] });
    }

    /// Make the wallet refuse (or accept again) connection requests.
    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
    }

    /// Make connection requests never return.
    pub fn set_hang_connect(&self, hang: bool) {
        self.lock().hang_connect = hang;
    }

    /// Make the user decline account access.
    pub fn set_deny_accounts(&self, deny: bool) {
        self.lock().deny_accounts = deny;
    }

    /// Number of connection requests received.
    pub fn connect_count(&self) -> usize {
        self.lock().connects
    }

    /// Number of notification subscriptions registered.
    pub fn subscription_count(&self) -> usize {
        self.lock().subscriptions
    }

    /// Number of signer escalations requested.
    pub fn signer_requests(&self) -> usize {
        self.lock().signer_requests
    }

    fn lock(&self) -> MutexGuard<'_, WalletState> {
        lock(&self.state)
    }
}

impl Wallet for SimWallet {
    type Reader = SimProvider;
    type Signer = SimSigner;

    async fn connect(&self) -> Result<SimProvider, WalletError> {
        let hang = {
            let mut state = self.lock();
            state.connects += 1;
            if !state.available {
                return Err(WalletError::Unavailable("no injected wallet".to_string()));
            }
            state.hang_connect
        };
        if hang {
            std::future::pending::<()>().await;
        }

        Ok(SimProvider { chain: self.chain.clone(), wallet: Arc::clone(&self.state) })
    }

    async fn signer(&self, reader: &SimProvider) -> Result<SimSigner, WalletError> {
        let account = {
            let mut state = self.lock();
            state.signer_requests += 1;
            if state.deny_accounts {
                return Err(WalletError::UserRejected("user rejected account access".to_string()));
            }
            state.accounts.first().copied()
        };

        let address =
            account.ok_or_else(|| WalletError::Unavailable("wallet exposes no accounts".to_string()))?;
        Ok(SimSigner { provider: reader.clone(), address })
    }

    fn subscribe(&self, sink: NotificationSink) -> Result<(), WalletError> {
        let mut state = self.lock();
        state.subscriptions += 1;
        state.sinks.push(sink);
        Ok(())
    }
}

/// Read-only handle into the simulation.
#[derive(Debug, Clone)]
pub struct SimProvider {
    chain: SimChain,
    wallet: Arc<Mutex<WalletState>>,
}

impl ReadProvider for SimProvider {
    async fn network(&self) -> Result<Network, WalletError> {
        Ok(Network { chain_id: lock(&self.wallet).chain_id })
    }

    async fn call(&self, request: CallRequest) -> Result<Bytes, WalletError> {
        if self.chain.faults().hang_reads {
            std::future::pending::<()>().await;
        }
        self.chain.call(&request)
    }
}

/// Signing handle for one account.
#[derive(Debug, Clone)]
pub struct SimSigner {
    provider: SimProvider,
    address: Address,
}

impl ReadProvider for SimSigner {
    async fn network(&self) -> Result<Network, WalletError> {
        self.provider.network().await
    }

    async fn call(&self, request: CallRequest) -> Result<Bytes, WalletError> {
        self.provider.call(request).await
    }
}

impl SigningProvider for SimSigner {
    type Pending = SimPending;

    async fn address(&self) -> Result<Address, WalletError> {
        Ok(self.address)
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<SimPending, WalletError> {
        let request = request.with_from(self.address);
        self.provider.chain.submit(self.address, &request)
    }
}

fn lock(state: &Mutex<WalletState>) -> MutexGuard<'_, WalletState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn notify(state: &mut WalletState, notification: &WalletNotification) {
    state.sinks.retain(|sink| sink.notify(notification.clone()));
    tracing::debug!(?notification, listeners = state.sinks.len(), "wallet notification");
}
