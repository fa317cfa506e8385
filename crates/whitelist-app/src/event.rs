//! Application input events.
//!
//! This module defines [`AppEvent`], the results of operations executed by
//! the runtime plus the external wallet change notification. User intents
//! enter the [`crate::App`] through its methods instead.

use whitelist_core::{DappError, WalletNotification};
use whitelist_proto::{Address, TxHash, U256};

use crate::SessionId;

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Wallet connected on the target chain.
    WalletConnected {
        /// Session the result belongs to.
        session: SessionId,
        /// Chain id of the new wallet session.
        chain_id: u64,
    },

    /// Wallet connection failed.
    ConnectFailed {
        /// Session the result belongs to.
        session: SessionId,
        /// Cause.
        error: DappError,
    },

    /// Whitelist count read.
    CountFetched {
        /// Session the result belongs to.
        session: SessionId,
        /// On-chain count.
        count: U256,
    },

    /// Whitelist count could not be read.
    CountFailed {
        /// Session the result belongs to.
        session: SessionId,
        /// Cause.
        error: DappError,
    },

    /// Membership of the connected address read.
    MembershipFetched {
        /// Session the result belongs to.
        session: SessionId,
        /// Connected account.
        address: Address,
        /// Whether the account is whitelisted.
        joined: bool,
    },

    /// Membership could not be read.
    MembershipFailed {
        /// Session the result belongs to.
        session: SessionId,
        /// Cause.
        error: DappError,
    },

    /// Join transaction signed and submitted.
    JoinSubmitted {
        /// Session the result belongs to.
        session: SessionId,
        /// Submitted transaction.
        tx_hash: TxHash,
    },

    /// Join transaction mined successfully.
    JoinConfirmed {
        /// Session the result belongs to.
        session: SessionId,
    },

    /// Join was rejected, failed to submit, reverted, or timed out.
    JoinFailed {
        /// Session the result belongs to.
        session: SessionId,
        /// Cause.
        error: DappError,
    },

    /// The wallet switched network or account.
    WalletChanged(WalletNotification),
}

impl AppEvent {
    /// Session a result belongs to. `None` for external notifications.
    pub fn session(&self) -> Option<SessionId> {
        match self {
            Self::WalletConnected { session, .. }
            | Self::ConnectFailed { session, .. }
            | Self::CountFetched { session, .. }
            | Self::CountFailed { session, .. }
            | Self::MembershipFetched { session, .. }
            | Self::MembershipFailed { session, .. }
            | Self::JoinSubmitted { session, .. }
            | Self::JoinConfirmed { session }
            | Self::JoinFailed { session, .. } => Some(*session),
            Self::WalletChanged(_) => None,
        }
    }
}
