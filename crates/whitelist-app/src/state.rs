//! Observable application state types.
//!
//! [`DappView`] is the view model handed to the renderer: the state enum, the
//! auxiliary joined and busy flags, the last observed count, and the single
//! intent the UI should offer.

use std::fmt;

use whitelist_proto::{Address, TxHash, U256};

/// Epoch of a wallet session.
///
/// Incremented on every connect attempt and every reset. Results tagged with
/// an older id are discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

impl SessionId {
    /// Raw epoch value.
    pub fn get(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Dapp state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DappState {
    /// No wallet session. Initial state and reset target.
    Disconnected,
    /// Connecting and reading the initial count and membership.
    Connecting,
    /// Session established.
    Connected {
        /// Whether the connected address is whitelisted.
        joined: bool,
    },
    /// Join transaction in progress.
    Joining,
}

/// User intents the renderer can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserIntent {
    /// Connect the wallet.
    Connect,
    /// Join the whitelist.
    Join,
    /// Quit the application.
    Quit,
}

/// Renderer input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DappView {
    /// Current state.
    pub state: DappState,
    /// Connected address is whitelisted.
    pub joined: bool,
    /// Join transaction submitted and awaiting confirmation.
    pub busy: bool,
    /// Last observed whitelist count. `None` until first read.
    pub count: Option<U256>,
    /// Chain of the validated session. `None` when not connected.
    pub chain_id: Option<u64>,
    /// Connected address. `None` until resolved.
    pub address: Option<Address>,
    /// Submitted join transaction. `None` if none is pending.
    pub pending_tx: Option<TxHash>,
    /// The intent the UI should offer. `None` if no action is available.
    pub intent: Option<UserIntent>,
}

impl DappView {
    /// Whether the session is established (joining counts as connected).
    pub fn is_connected(&self) -> bool {
        matches!(self.state, DappState::Connected { .. } | DappState::Joining)
    }

    /// Whether the page is still loading the initial session data.
    pub fn is_loading(&self) -> bool {
        self.state == DappState::Connecting
    }
}
