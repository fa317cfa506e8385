//! Application layer for the whitelist dapp
//!
//! Pure state machine and generic runtime for wallet and contract
//! orchestration, enabling deterministic simulation testing with the same code
//! that runs in production.
//!
//! # Components
//!
//! - [`App`]: dapp state machine (connect, membership, join)
//! - [`Driver`]: trait for platform-specific rendering and user input
//! - [`Runtime`]: orchestration loop executing [`App`] actions against the
//!   connection provider and contract client

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod driver;
mod event;
mod runtime;
mod state;

pub use action::AppAction;
pub use app::App;
pub use driver::Driver;
pub use event::AppEvent;
pub use runtime::Runtime;
pub use state::{DappState, DappView, SessionId, UserIntent};
