//! View invariants for the dapp state machine.
//!
//! Each check looks at the history of rendered [`whitelist_app::DappView`]s
//! collected in a [`SystemSnapshot`]. Most checks only need the latest view;
//! [`JoinedMonotonic`] compares consecutive views.
//!
//! The simulation driver records a view on every render and asserts the
//! registry, so every runtime scenario doubles as an invariant test. The
//! property tests feed the App directly and record after each step.
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! let mut history = SystemSnapshot::from_app(&app);
//! let _ = app.connect();
//! history.record_app(&app);
//! registry.assert_all(&history, "after connect");
//! ```

mod checks;
mod snapshot;

pub use checks::{
    BusyOnlyWhileJoining, ConnectedOnlyOnTargetChain, IntentMatchesState, JoinedMonotonic,
    PendingTxWhileJoining, StateFlagsAgree,
};
pub use snapshot::SystemSnapshot;

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Identifies an invariant in violation reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvariantKind {
    /// Busy is only set while joining.
    BusyOnlyWhileJoining,
    /// A session is only established on the target chain.
    ConnectedOnlyOnTargetChain,
    /// The offered intent matches the state.
    IntentMatchesState,
    /// Joined never reverts without a session reset.
    JoinedMonotonic,
    /// A pending transaction only exists while joining.
    PendingTxWhileJoining,
    /// The joined flag agrees with the connected state.
    StateFlagsAgree,
}

impl std::fmt::Display for InvariantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// A failed check.
#[derive(Debug, Clone)]
pub struct Violation {
    /// The violated invariant.
    pub invariant: InvariantKind,
    /// The offending view, rendered for humans.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// A property of the rendered view history.
pub trait Invariant: Send + Sync {
    /// Which invariant this is.
    fn kind(&self) -> InvariantKind;

    /// Check the recorded history.
    fn check(&self, history: &SystemSnapshot) -> InvariantResult;
}

/// Set of invariants checked together.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InvariantRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<_> = self.invariants.iter().map(|i| i.kind()).collect();
        f.debug_struct("InvariantRegistry").field("invariants", &kinds).finish()
    }
}

impl InvariantRegistry {
    /// Registry without checks.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Every view invariant the dapp guarantees:
    /// - [`BusyOnlyWhileJoining`]: busy implies joining
    /// - [`ConnectedOnlyOnTargetChain`]: sessions live on the target chain
    /// - [`IntentMatchesState`]: connect and join are offered only when valid
    /// - [`JoinedMonotonic`]: joined only clears through a reset
    /// - [`PendingTxWhileJoining`]: a pending hash implies joining
    /// - [`StateFlagsAgree`]: `Connected { joined }` matches the flag
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(BusyOnlyWhileJoining);
        registry.add(ConnectedOnlyOnTargetChain);
        registry.add(IntentMatchesState);
        registry.add(JoinedMonotonic);
        registry.add(PendingTxWhileJoining);
        registry.add(StateFlagsAgree);
        registry
    }

    /// Register `invariant`.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Run every check and collect the violations.
    pub fn check_all(&self, history: &SystemSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<Violation> =
            self.invariants.iter().filter_map(|invariant| invariant.check(history).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Panic with every violation and the last view if any check fails.
    #[allow(clippy::panic)]
    pub fn assert_all(&self, history: &SystemSnapshot, context: &str) {
        let Err(violations) = self.check_all(history) else {
            return;
        };
        let report: Vec<String> = violations.iter().map(ToString::to_string).collect();
        panic!(
            "{} invariant(s) violated {context}:\n  {}\nlast view: {:?}",
            report.len(),
            report.join("\n  "),
            history.latest()
        );
    }

    /// Number of registered checks.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Whether no checks are registered.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}
