//! Observable state snapshots for invariant checking.
//!
//! A snapshot is the ordered history of views the App produced. Invariants
//! operate on snapshots rather than live state so history-dependent
//! properties (monotonicity) can be checked alongside per-view ones.

use whitelist_app::{App, DappView};

/// Recorded view history of one client.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Chain a session may be established on.
    pub target_chain_id: u64,
    /// Views in the order they were produced.
    pub views: Vec<DappView>,
}

impl SystemSnapshot {
    /// Create an empty history.
    pub fn new(target_chain_id: u64) -> Self {
        Self { target_chain_id, views: Vec::new() }
    }

    /// Create a single-view snapshot from the App's current state.
    pub fn from_app(app: &App) -> Self {
        Self { target_chain_id: app.target_chain_id(), views: vec![app.view()] }
    }

    /// Append a view.
    pub fn record(&mut self, view: DappView) {
        self.views.push(view);
    }

    /// Append the App's current view.
    pub fn record_app(&mut self, app: &App) {
        self.record(app.view());
    }

    /// Most recent view.
    pub fn latest(&self) -> Option<&DappView> {
        self.views.last()
    }
}
