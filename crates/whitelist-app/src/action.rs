//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.
//!
//! Operations carry the [`SessionId`] they were issued for. The runtime skips
//! operations whose session is no longer current.

use crate::SessionId;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Interrupt the user with a message.
    Alert {
        /// Text to show.
        message: String,
    },

    /// Quit the application.
    Quit,

    /// Start a fresh session once the disconnected view has been rendered.
    Reconnect,

    /// Connect the wallet and validate the network.
    Connect {
        /// Session the result belongs to.
        session: SessionId,
    },

    /// Read the whitelist count through the read-only handle.
    FetchCount {
        /// Session the result belongs to.
        session: SessionId,
    },

    /// Escalate to the signer and check the connected address.
    FetchMembership {
        /// Session the result belongs to.
        session: SessionId,
    },

    /// Submit the join transaction.
    SubmitJoin {
        /// Session the result belongs to.
        session: SessionId,
    },

    /// Wait for the submitted join transaction to be mined.
    AwaitJoin {
        /// Session the result belongs to.
        session: SessionId,
    },
}

impl AppAction {
    /// Session an operation belongs to. `None` for UI actions.
    pub fn session(&self) -> Option<SessionId> {
        match self {
            Self::Connect { session }
            | Self::FetchCount { session }
            | Self::FetchMembership { session }
            | Self::SubmitJoin { session }
            | Self::AwaitJoin { session } => Some(*session),
            Self::Render | Self::Alert { .. } | Self::Quit | Self::Reconnect => None,
        }
    }
}
