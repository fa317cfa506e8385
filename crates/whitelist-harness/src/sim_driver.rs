//! Scripted frontend for runtime tests.
//!
//! [`SimDriver::new`] returns two halves. The driver moves into the
//! [`whitelist_app::Runtime`]; the [`SimDriverHandle`] stays with the test to
//! queue intents, wait for a view and inspect what was rendered or alerted.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{mpsc, watch};
use whitelist_app::{DappView, Driver, UserIntent};

use crate::invariants::{InvariantRegistry, SystemSnapshot};

/// Failure reported by the simulated frontend.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "simulated frontend failed: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// Everything the runtime showed the user.
#[derive(Debug, Default)]
struct DriverLog {
    renders: Vec<DappView>,
    alerts: Vec<String>,
    stopped: bool,
}

/// Runtime-side half: intents in, views and alerts out.
#[derive(Debug)]
pub struct SimDriver {
    intents: mpsc::UnboundedReceiver<UserIntent>,
    log: Arc<Mutex<DriverLog>>,
    latest: watch::Sender<Option<DappView>>,
    invariants: Option<(InvariantRegistry, SystemSnapshot)>,
}

/// Test-side handle of a [`SimDriver`].
#[derive(Debug, Clone)]
pub struct SimDriverHandle {
    intents: mpsc::UnboundedSender<UserIntent>,
    log: Arc<Mutex<DriverLog>>,
    latest: watch::Receiver<Option<DappView>>,
}

impl SimDriver {
    /// Create a new simulation driver and its handle.
    pub fn new() -> (Self, SimDriverHandle) {
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let (latest_tx, latest_rx) = watch::channel(None);
        let log = Arc::new(Mutex::new(DriverLog::default()));

        let driver =
            Self { intents: intent_rx, log: Arc::clone(&log), latest: latest_tx, invariants: None };
        let handle = SimDriverHandle { intents: intent_tx, log, latest: latest_rx };
        (driver, handle)
    }

    /// Enable invariant checking on every render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry, target_chain_id: u64) -> Self {
        self.invariants = Some((registry, SystemSnapshot::new(target_chain_id)));
        self
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_intent(&mut self) -> Result<Option<UserIntent>, SimDriverError> {
        Ok(self.intents.recv().await)
    }

    fn render(&mut self, view: &DappView) -> Result<(), SimDriverError> {
        if let Some((registry, history)) = &mut self.invariants {
            history.record(view.clone());
            registry.assert_all(history, &format!("after render {}", history.views.len()));
        }

        lock(&self.log).renders.push(view.clone());
        self.latest.send_replace(Some(view.clone()));
        Ok(())
    }

    fn alert(&mut self, message: &str) -> Result<(), SimDriverError> {
        lock(&self.log).alerts.push(message.to_string());
        Ok(())
    }

    fn stop(&mut self) {
        lock(&self.log).stopped = true;
    }
}

impl SimDriverHandle {
    /// Deliver a user intent to the runtime.
    pub fn send(&self, intent: UserIntent) {
        if self.intents.send(intent).is_err() {
            tracing::debug!(?intent, "runtime gone, intent dropped");
        }
    }

    /// Deliver [`UserIntent::Quit`].
    pub fn quit(&self) {
        self.send(UserIntent::Quit);
    }

    /// Wait until the latest rendered view satisfies `predicate`.
    ///
    /// Returns `None` if the driver was dropped first.
    pub async fn wait_for(&mut self, mut predicate: impl FnMut(&DappView) -> bool) -> Option<DappView> {
        match self.latest.wait_for(|view| view.as_ref().is_some_and(&mut predicate)).await {
            Ok(view) => (*view).clone(),
            Err(_) => None,
        }
    }

    /// Every rendered view, oldest first.
    pub fn renders(&self) -> Vec<DappView> {
        lock(&self.log).renders.clone()
    }

    /// Most recently rendered view.
    pub fn last_view(&self) -> Option<DappView> {
        lock(&self.log).renders.last().cloned()
    }

    /// Every alert shown, oldest first.
    pub fn alerts(&self) -> Vec<String> {
        lock(&self.log).alerts.clone()
    }

    /// Whether the runtime released the driver.
    pub fn stopped(&self) -> bool {
        lock(&self.log).stopped
    }
}

fn lock(log: &Mutex<DriverLog>) -> MutexGuard<'_, DriverLog> {
    log.lock().unwrap_or_else(PoisonError::into_inner)
}
