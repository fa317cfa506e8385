//! Presentation seam of the runtime.
//!
//! A [`Driver`] shows [`DappView`]s and alerts and hands user intents back.
//! It never talks to the wallet; the [`crate::Runtime`] does that.

use std::future::Future;

use crate::{DappView, UserIntent};

/// Frontend for the [`Runtime`](crate::Runtime).
///
/// The terminal client and the simulation harness both implement it, so the
/// connect and join orchestration under test is the code users run.
pub trait Driver: Send {
    /// Frontend failure.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next user intent.
    ///
    /// Returns `None` when input is exhausted; the runtime then stops.
    fn poll_intent(
        &mut self,
    ) -> impl Future<Output = Result<Option<UserIntent>, Self::Error>> + Send;

    /// Show the view, replacing the previous one.
    fn render(&mut self, view: &DappView) -> Result<(), Self::Error>;

    /// Interrupt the user with `message`. Only wrong-network errors get here.
    fn alert(&mut self, message: &str) -> Result<(), Self::Error>;

    /// Called once when the runtime exits its loop.
    fn stop(&mut self);
}
