//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the dapp
//! state completely decoupled from the wallet and the chain.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Tracks the connection state and the joined and busy flags.
//! - Caches the last observed whitelist count.
//! - Tags every operation with the current session so late results from a
//!   torn-down session are dropped.
//! - Decides which failures interrupt the user. Only a network mismatch does.

use whitelist_core::{DappConfig, DappError, WalletNotification};
use whitelist_proto::{Address, TxHash, U256};

use crate::{AppAction, AppEvent, DappState, DappView, SessionId, UserIntent};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Current state.
    state: DappState,
    /// Epoch of the current session.
    session: SessionId,
    /// The only chain a session may be established on.
    target_chain_id: u64,
    /// Alert text for a network mismatch.
    wrong_network_message: String,
    /// Chain of the validated session. `None` when not connected.
    chain_id: Option<u64>,
    /// Connected address. `None` until membership is read.
    address: Option<Address>,
    /// Connected address is whitelisted. Sticky within a session.
    joined: bool,
    /// Join transaction submitted and not yet settled.
    busy: bool,
    /// Last observed whitelist count. `None` until the first read.
    count: Option<U256>,
    /// Submitted join transaction. `None` if none is pending.
    pending_tx: Option<TxHash>,
    /// Most recent failure, kept for diagnostics.
    last_error: Option<DappError>,
}

impl App {
    /// Create a new App for the given configuration.
    pub fn new(config: &DappConfig) -> Self {
        Self {
            state: DappState::Disconnected,
            session: SessionId::default(),
            target_chain_id: config.chain_id,
            wrong_network_message: config.wrong_network_message(),
            chain_id: None,
            address: None,
            joined: false,
            busy: false,
            count: None,
            pending_tx: None,
            last_error: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::WalletChanged(notification) => self.restart(&notification),
            event if event.session() != Some(self.session) => {
                tracing::debug!(?event, current = %self.session, "discarding stale result");
                vec![]
            },
            AppEvent::WalletConnected { chain_id, .. } => self.on_wallet_connected(chain_id),
            AppEvent::ConnectFailed { error, .. } => self.on_connect_failed(error),
            AppEvent::CountFetched { count, .. } => self.on_count_fetched(count),
            AppEvent::CountFailed { error, .. } => self.on_count_failed(error),
            AppEvent::MembershipFetched { address, joined, .. } => {
                self.on_membership_fetched(address, joined)
            },
            AppEvent::MembershipFailed { error, .. } => self.on_membership_failed(error),
            AppEvent::JoinSubmitted { tx_hash, .. } => self.on_join_submitted(tx_hash),
            AppEvent::JoinConfirmed { .. } => self.on_join_confirmed(),
            AppEvent::JoinFailed { error, .. } => self.on_join_failed(error),
        }
    }

    /// Process a user intent and return actions.
    pub fn intent(&mut self, intent: UserIntent) -> Vec<AppAction> {
        match intent {
            UserIntent::Connect => self.connect(),
            UserIntent::Join => self.join(),
            UserIntent::Quit => vec![AppAction::Quit],
        }
    }

    /// Start a wallet session.
    ///
    /// No-op unless disconnected, so repeated calls settle in the same state
    /// as a single call.
    pub fn connect(&mut self) -> Vec<AppAction> {
        if self.state != DappState::Disconnected {
            tracing::debug!(state = ?self.state, "connect ignored, session already started");
            return vec![];
        }

        self.session = self.session.next();
        self.state = DappState::Connecting;
        tracing::debug!(session = %self.session, "connecting wallet");
        vec![AppAction::Render, AppAction::Connect { session: self.session }]
    }

    /// Submit the join transaction.
    ///
    /// Only available when connected, not joined and not busy.
    pub fn join(&mut self) -> Vec<AppAction> {
        match self.state {
            DappState::Connected { joined: false } if !self.busy => {
                self.state = DappState::Joining;
                vec![AppAction::Render, AppAction::SubmitJoin { session: self.session }]
            },
            state => {
                tracing::debug!(?state, busy = self.busy, "join ignored");
                vec![]
            },
        }
    }

    /// Discard all session state and return to [`DappState::Disconnected`].
    ///
    /// Results still in flight for the old session are dropped when they
    /// arrive.
    pub fn reset(&mut self) -> Vec<AppAction> {
        self.session = self.session.next();
        self.state = DappState::Disconnected;
        self.chain_id = None;
        self.address = None;
        self.joined = false;
        self.busy = false;
        self.count = None;
        self.pending_tx = None;
        vec![AppAction::Render]
    }

    /// Build the renderer input.
    pub fn view(&self) -> DappView {
        let intent = match self.state {
            DappState::Disconnected => Some(UserIntent::Connect),
            DappState::Connected { joined: false } if !self.busy => Some(UserIntent::Join),
            _ => None,
        };

        DappView {
            state: self.state,
            joined: self.joined,
            busy: self.busy,
            count: self.count,
            chain_id: self.chain_id,
            address: self.address,
            pending_tx: self.pending_tx,
            intent,
        }
    }

    /// Current state.
    pub fn state(&self) -> DappState {
        self.state
    }

    /// Current session epoch.
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Connected address is whitelisted.
    pub fn joined(&self) -> bool {
        self.joined
    }

    /// Join transaction awaiting confirmation.
    pub fn busy(&self) -> bool {
        self.busy
    }

    /// Last observed whitelist count.
    pub fn count(&self) -> Option<U256> {
        self.count
    }

    /// Chain of the validated session.
    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    /// Connected address.
    pub fn address(&self) -> Option<Address> {
        self.address
    }

    /// Most recent failure.
    pub fn last_error(&self) -> Option<&DappError> {
        self.last_error.as_ref()
    }

    /// Configured target chain.
    pub fn target_chain_id(&self) -> u64 {
        self.target_chain_id
    }

    fn restart(&mut self, notification: &WalletNotification) -> Vec<AppAction> {
        tracing::info!(?notification, "wallet changed, restarting session");
        let mut actions = self.reset();
        actions.push(AppAction::Reconnect);
        actions
    }

    fn on_wallet_connected(&mut self, chain_id: u64) -> Vec<AppAction> {
        if !self.awaiting_wallet() {
            return self.unexpected("wallet connected");
        }

        if chain_id != self.target_chain_id {
            return self.on_connect_failed(DappError::WrongNetwork {
                expected: self.target_chain_id,
                actual: chain_id,
            });
        }

        tracing::info!(chain_id, session = %self.session, "wallet connected");
        self.chain_id = Some(chain_id);
        vec![AppAction::FetchCount { session: self.session }]
    }

    fn on_connect_failed(&mut self, error: DappError) -> Vec<AppAction> {
        if self.state != DappState::Connecting {
            return self.unexpected("connect failed");
        }

        self.state = DappState::Disconnected;
        self.chain_id = None;
        let actions = if error.is_user_facing() {
            tracing::warn!(%error, "wallet on the wrong network");
            vec![AppAction::Alert { message: self.wrong_network_message.clone() }, AppAction::Render]
        } else {
            tracing::error!(%error, "wallet connection failed");
            vec![AppAction::Render]
        };
        self.last_error = Some(error);
        actions
    }

    fn on_count_fetched(&mut self, count: U256) -> Vec<AppAction> {
        if self.awaiting_wallet() {
            return self.unexpected("count fetched");
        }

        self.count = Some(count);
        match self.state {
            DappState::Connecting => {
                vec![AppAction::Render, AppAction::FetchMembership { session: self.session }]
            },
            DappState::Joining if self.joined && !self.busy => self.settle_join(),
            DappState::Connected { .. } => vec![AppAction::Render],
            _ => vec![],
        }
    }

    fn on_count_failed(&mut self, error: DappError) -> Vec<AppAction> {
        if self.awaiting_wallet() {
            return self.unexpected("count failed");
        }

        tracing::error!(%error, "failed to read whitelist count");
        self.last_error = Some(error);
        match self.state {
            DappState::Connecting => vec![AppAction::FetchMembership { session: self.session }],
            DappState::Joining if self.joined && !self.busy => self.settle_join(),
            _ => vec![],
        }
    }

    fn on_membership_fetched(&mut self, address: Address, joined: bool) -> Vec<AppAction> {
        if self.state != DappState::Connecting || self.awaiting_wallet() {
            return self.unexpected("membership fetched");
        }

        self.address = Some(address);
        self.joined |= joined;
        self.state = DappState::Connected { joined: self.joined };
        tracing::info!(%address, joined = self.joined, "session established");
        vec![AppAction::Render]
    }

    fn on_membership_failed(&mut self, error: DappError) -> Vec<AppAction> {
        if self.state != DappState::Connecting || self.awaiting_wallet() {
            return self.unexpected("membership failed");
        }

        tracing::error!(%error, "failed to read whitelist membership");
        self.last_error = Some(error);
        self.state = DappState::Connected { joined: self.joined };
        vec![AppAction::Render]
    }

    fn on_join_submitted(&mut self, tx_hash: TxHash) -> Vec<AppAction> {
        if self.state != DappState::Joining || self.busy {
            return self.unexpected("join submitted");
        }

        tracing::info!(%tx_hash, "join transaction submitted");
        self.busy = true;
        self.pending_tx = Some(tx_hash);
        vec![AppAction::Render, AppAction::AwaitJoin { session: self.session }]
    }

    fn on_join_confirmed(&mut self) -> Vec<AppAction> {
        if self.state != DappState::Joining || !self.busy {
            return self.unexpected("join confirmed");
        }

        tracing::info!(tx_hash = ?self.pending_tx, "join transaction confirmed");
        self.busy = false;
        self.joined = true;
        vec![AppAction::Render, AppAction::FetchCount { session: self.session }]
    }

    fn on_join_failed(&mut self, error: DappError) -> Vec<AppAction> {
        if self.state != DappState::Joining {
            return self.unexpected("join failed");
        }

        tracing::error!(%error, tx_hash = ?self.pending_tx, "join failed");
        self.last_error = Some(error);
        self.busy = false;
        self.pending_tx = None;
        self.state = DappState::Connected { joined: self.joined };
        vec![AppAction::Render]
    }

    /// Connecting, and the wallet has not reported its network yet.
    fn awaiting_wallet(&self) -> bool {
        self.state == DappState::Connecting && self.chain_id.is_none()
    }

    fn settle_join(&mut self) -> Vec<AppAction> {
        self.pending_tx = None;
        self.state = DappState::Connected { joined: true };
        vec![AppAction::Render]
    }

    fn unexpected(&self, what: &'static str) -> Vec<AppAction> {
        tracing::warn!(event = what, state = ?self.state, "ignoring event in unexpected state");
        vec![]
    }
}

#[cfg(test)]
mod tests {
    use whitelist_proto::address;

    use super::*;

    const ALICE: Address = address!("00000000000000000000000000000000000000a1");

    fn app() -> App {
        App::new(&DappConfig::default())
    }

    fn connected_app(joined: bool) -> App {
        let mut app = app();
        let _ = app.connect();
        let session = app.session();
        let _ = app.handle(AppEvent::WalletConnected { session, chain_id: 5 });
        let _ = app.handle(AppEvent::CountFetched { session, count: U256::from(4) });
        let _ = app.handle(AppEvent::MembershipFetched { session, address: ALICE, joined });
        app
    }

    #[test]
    fn connect_tags_a_fresh_session() {
        let mut app = app();
        let before = app.session();
        let actions = app.connect();

        assert_eq!(app.state(), DappState::Connecting);
        assert!(app.session() > before);
        assert_eq!(actions, vec![AppAction::Render, AppAction::Connect { session: app.session() }]);
    }

    #[test]
    fn connect_twice_is_noop() {
        let mut app = app();
        let _ = app.connect();
        let session = app.session();

        assert!(app.connect().is_empty());
        assert_eq!(app.session(), session);
    }

    #[test]
    fn connected_flow_fetches_count_then_membership() {
        let mut app = app();
        let _ = app.connect();
        let session = app.session();

        let actions = app.handle(AppEvent::WalletConnected { session, chain_id: 5 });
        assert_eq!(actions, vec![AppAction::FetchCount { session }]);

        let actions = app.handle(AppEvent::CountFetched { session, count: U256::from(4) });
        assert_eq!(actions, vec![AppAction::Render, AppAction::FetchMembership { session }]);

        let actions =
            app.handle(AppEvent::MembershipFetched { session, address: ALICE, joined: false });
        assert_eq!(actions, vec![AppAction::Render]);

        let view = app.view();
        assert_eq!(view.state, DappState::Connected { joined: false });
        assert_eq!(view.count, Some(U256::from(4)));
        assert_eq!(view.address, Some(ALICE));
        assert_eq!(view.intent, Some(UserIntent::Join));
    }

    #[test]
    fn wrong_network_alerts_and_disconnects() {
        let mut app = app();
        let _ = app.connect();
        let session = app.session();

        let actions = app.handle(AppEvent::ConnectFailed {
            session,
            error: DappError::WrongNetwork { expected: 5, actual: 1 },
        });

        assert_eq!(app.state(), DappState::Disconnected);
        assert!(matches!(actions.as_slice(), [
            AppAction::Alert { message },
            AppAction::Render
        ] if message == "Change the network to Goerli"));
    }

    #[test]
    fn connected_on_foreign_chain_is_never_promoted() {
        let mut app = app();
        let _ = app.connect();
        let session = app.session();

        let actions = app.handle(AppEvent::WalletConnected { session, chain_id: 1 });

        assert_eq!(app.state(), DappState::Disconnected);
        assert!(actions.iter().any(|a| matches!(a, AppAction::Alert { .. })));
        assert!(!actions.iter().any(|a| matches!(a, AppAction::FetchCount { .. })));
    }

    #[test]
    fn provider_unavailable_is_silent() {
        let mut app = app();
        let _ = app.connect();
        let session = app.session();

        let actions = app.handle(AppEvent::ConnectFailed {
            session,
            error: DappError::ProviderUnavailable { reason: "no wallet".into() },
        });

        assert_eq!(app.state(), DappState::Disconnected);
        assert_eq!(actions, vec![AppAction::Render]);
        assert!(matches!(app.last_error(), Some(DappError::ProviderUnavailable { .. })));
    }

    #[test]
    fn count_failure_keeps_count_unknown_and_continues() {
        let mut app = app();
        let _ = app.connect();
        let session = app.session();
        let _ = app.handle(AppEvent::WalletConnected { session, chain_id: 5 });

        let actions =
            app.handle(AppEvent::CountFailed { session, error: DappError::Rpc { reason: "x".into() } });

        assert_eq!(actions, vec![AppAction::FetchMembership { session }]);
        assert_eq!(app.count(), None);
    }

    #[test]
    fn membership_failure_connects_without_joined() {
        let mut app = app();
        let _ = app.connect();
        let session = app.session();
        let _ = app.handle(AppEvent::WalletConnected { session, chain_id: 5 });
        let _ = app.handle(AppEvent::CountFetched { session, count: U256::from(2) });

        let _ = app.handle(AppEvent::MembershipFailed {
            session,
            error: DappError::ProviderUnavailable { reason: "signer".into() },
        });

        assert_eq!(app.state(), DappState::Connected { joined: false });
        assert_eq!(app.address(), None);
    }

    #[test]
    fn join_lifecycle() {
        let mut app = connected_app(false);
        let session = app.session();

        let actions = app.join();
        assert_eq!(actions, vec![AppAction::Render, AppAction::SubmitJoin { session }]);
        assert_eq!(app.state(), DappState::Joining);
        assert!(!app.busy());

        let tx_hash = TxHash::repeat_byte(7);
        let actions = app.handle(AppEvent::JoinSubmitted { session, tx_hash });
        assert_eq!(actions, vec![AppAction::Render, AppAction::AwaitJoin { session }]);
        assert!(app.busy());
        assert_eq!(app.view().pending_tx, Some(tx_hash));
        assert_eq!(app.view().intent, None);

        let actions = app.handle(AppEvent::JoinConfirmed { session });
        assert_eq!(actions, vec![AppAction::Render, AppAction::FetchCount { session }]);
        assert!(app.joined());
        assert!(!app.busy());

        let actions = app.handle(AppEvent::CountFetched { session, count: U256::from(5) });
        assert_eq!(actions, vec![AppAction::Render]);
        assert_eq!(app.state(), DappState::Connected { joined: true });
        assert_eq!(app.count(), Some(U256::from(5)));
        assert_eq!(app.view().pending_tx, None);
    }

    #[test]
    fn join_settles_even_if_refresh_fails() {
        let mut app = connected_app(false);
        let session = app.session();
        let _ = app.join();
        let _ = app.handle(AppEvent::JoinSubmitted { session, tx_hash: TxHash::ZERO });
        let _ = app.handle(AppEvent::JoinConfirmed { session });

        let _ =
            app.handle(AppEvent::CountFailed { session, error: DappError::Rpc { reason: "x".into() } });

        assert_eq!(app.state(), DappState::Connected { joined: true });
        assert_eq!(app.count(), Some(U256::from(4)));
    }

    #[test]
    fn join_failure_returns_to_connected() {
        let mut app = connected_app(false);
        let session = app.session();
        let _ = app.join();

        let actions = app.handle(AppEvent::JoinFailed {
            session,
            error: DappError::TransactionRejected { reason: "denied".into() },
        });

        assert_eq!(actions, vec![AppAction::Render]);
        assert_eq!(app.state(), DappState::Connected { joined: false });
        assert!(!app.busy());
        assert_eq!(app.view().intent, Some(UserIntent::Join));
    }

    #[test]
    fn join_unavailable_when_joined() {
        let mut app = connected_app(true);

        assert!(app.join().is_empty());
        assert_eq!(app.state(), DappState::Connected { joined: true });
        assert_eq!(app.view().intent, None);
    }

    #[test]
    fn join_unavailable_when_disconnected() {
        let mut app = app();
        assert!(app.join().is_empty());
        assert_eq!(app.state(), DappState::Disconnected);
    }

    #[test]
    fn stale_results_are_discarded() {
        let mut app = app();
        let _ = app.connect();
        let stale = app.session();
        let _ = app.reset();
        let _ = app.connect();

        let actions = app.handle(AppEvent::WalletConnected { session: stale, chain_id: 5 });
        assert!(actions.is_empty());

        let actions = app.handle(AppEvent::CountFetched { session: stale, count: U256::from(9) });
        assert!(actions.is_empty());
        assert_eq!(app.count(), None);
        assert_eq!(app.state(), DappState::Connecting);
    }

    #[test]
    fn wallet_change_resets_and_reconnects() {
        let mut app = connected_app(true);
        let old = app.session();

        let actions = app.handle(AppEvent::WalletChanged(WalletNotification::AccountsChanged {
            accounts: vec![],
        }));

        assert_eq!(app.state(), DappState::Disconnected);
        assert!(!app.joined());
        assert_eq!(app.count(), None);
        assert_eq!(app.address(), None);
        assert!(app.session() > old);
        assert_eq!(actions, vec![AppAction::Render, AppAction::Reconnect]);

        let reconnect = app.connect();
        assert_eq!(app.state(), DappState::Connecting);
        assert_eq!(reconnect.last(), Some(&AppAction::Connect { session: app.session() }));
    }

    #[test]
    fn joined_is_sticky_within_session() {
        let mut app = app();
        let _ = app.connect();
        let session = app.session();
        let _ = app.handle(AppEvent::WalletConnected { session, chain_id: 5 });
        app.joined = true;

        let _ = app.handle(AppEvent::MembershipFetched { session, address: ALICE, joined: false });

        assert_eq!(app.state(), DappState::Connected { joined: true });
    }

    #[test]
    fn quit_intent() {
        let mut app = app();
        assert_eq!(app.intent(UserIntent::Quit), vec![AppAction::Quit]);
    }
}
