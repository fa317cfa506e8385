//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use whitelist_app::{DappState, DappView, UserIntent};

use super::{Invariant, InvariantKind, InvariantResult, SystemSnapshot, Violation};

/// Run `holds` on every view, reporting the first failure.
fn each_view(
    kind: InvariantKind,
    state: &SystemSnapshot,
    holds: impl Fn(&DappView) -> bool,
) -> InvariantResult {
    match state.views.iter().position(|view| !holds(view)) {
        None => Ok(()),
        Some(index) => Err(Violation {
            invariant: kind,
            message: format!("view {index}: {:?}", state.views[index]),
        }),
    }
}

/// Busy is only set while joining.
///
/// The busy indicator covers the window between submission and settlement
/// of the join transaction and nothing else.
pub struct BusyOnlyWhileJoining;

impl Invariant for BusyOnlyWhileJoining {
    fn kind(&self) -> InvariantKind {
        InvariantKind::BusyOnlyWhileJoining
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        each_view(self.kind(), state, |view| !view.busy || view.state == DappState::Joining)
    }
}

/// A session is only established on the target chain.
///
/// Any connected or joining view must carry the target chain id. A session
/// promoted on a foreign chain would issue contract calls to the wrong
/// network.
pub struct ConnectedOnlyOnTargetChain;

impl Invariant for ConnectedOnlyOnTargetChain {
    fn kind(&self) -> InvariantKind {
        InvariantKind::ConnectedOnlyOnTargetChain
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let target = state.target_chain_id;
        each_view(self.kind(), state, |view| !view.is_connected() || view.chain_id == Some(target))
    }
}

/// The offered intent matches the state.
///
/// Connect is offered only when disconnected. Join is offered only when
/// connected, not joined and not busy.
pub struct IntentMatchesState;

impl Invariant for IntentMatchesState {
    fn kind(&self) -> InvariantKind {
        InvariantKind::IntentMatchesState
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        each_view(self.kind(), state, |view| match view.intent {
            Some(UserIntent::Connect) => view.state == DappState::Disconnected,
            Some(UserIntent::Join) => {
                view.state == DappState::Connected { joined: false } && !view.busy
            },
            Some(UserIntent::Quit) => false,
            None => true,
        })
    }
}

/// Joined never reverts within a session.
///
/// Once a view shows the address as joined, a later view may only clear the
/// flag after the session was torn down.
pub struct JoinedMonotonic;

impl Invariant for JoinedMonotonic {
    fn kind(&self) -> InvariantKind {
        InvariantKind::JoinedMonotonic
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for (index, window) in state.views.windows(2).enumerate() {
            let (before, after) = (&window[0], &window[1]);
            let reset = matches!(after.state, DappState::Disconnected | DappState::Connecting);
            if before.joined && !after.joined && !reset {
                return Err(Violation {
                    invariant: self.kind(),
                    message: format!(
                        "view {}: joined cleared in {:?} without a reset",
                        index + 1,
                        after.state
                    ),
                });
            }
        }
        Ok(())
    }
}

/// A pending transaction only exists while joining.
pub struct PendingTxWhileJoining;

impl Invariant for PendingTxWhileJoining {
    fn kind(&self) -> InvariantKind {
        InvariantKind::PendingTxWhileJoining
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        each_view(self.kind(), state, |view| {
            view.pending_tx.is_none() || view.state == DappState::Joining
        })
    }
}

/// The joined flag agrees with the connected state.
pub struct StateFlagsAgree;

impl Invariant for StateFlagsAgree {
    fn kind(&self) -> InvariantKind {
        InvariantKind::StateFlagsAgree
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        each_view(self.kind(), state, |view| match view.state {
            DappState::Connected { joined } => joined == view.joined,
            DappState::Disconnected => !view.joined && !view.busy,
            DappState::Connecting | DappState::Joining => true,
        })
    }
}
