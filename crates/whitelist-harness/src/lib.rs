//! Deterministic simulation harness for whitelist client testing.
//!
//! In-memory implementations of the wallet and driver traits for
//! deterministic, reproducible testing of the connect and join flows under
//! injected faults.
//!
//! - [`SimChain`]: a chain hosting whitelist contracts, with fault injection
//! - [`SimWallet`]: a wallet attached to a [`SimChain`] that can switch
//!   network or account on command
//! - [`SimDriver`]: scripted user intents and recorded renders and alerts
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the common
//! view invariants.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod invariants;
pub mod scenario;
pub mod sim_chain;
pub mod sim_driver;
pub mod sim_wallet;

pub use invariants::{
    BusyOnlyWhileJoining, ConnectedOnlyOnTargetChain, IntentMatchesState, Invariant,
    InvariantKind, InvariantRegistry, InvariantResult, JoinedMonotonic, PendingTxWhileJoining,
    StateFlagsAgree, SystemSnapshot, Violation,
};
pub use scenario::Scenario;
pub use sim_chain::{CallStats, Faults, SimChain, SimPending};
pub use sim_driver::{SimDriver, SimDriverError, SimDriverHandle};
pub use sim_wallet::{SimProvider, SimSigner, SimWallet};
