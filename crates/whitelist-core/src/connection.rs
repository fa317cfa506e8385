//! Wallet connection provider.
//!
//! Turns an injected [`Wallet`] into a validated [`WalletSession`].
//!
//! # Lifecycle
//!
//! ```text
//!            connect() ok, chain == target
//!   ┌──────┐ ─────────────────────────────> ┌─────────┐  signer()  ┌───────────┐
//!   │ None │                                │ Reader  │ ─────────> │ Escalated │
//!   └──────┘ <───────────────────────────── └─────────┘            └───────────┘
//!       ^     connect() err / invalidate()                              │
//!       └───────────────────────────────────────────────────────────────┘
//!                          connect() / invalidate()
//! ```
//!
//! The provider subscribes to wallet notifications once, on the first connect
//! attempt. Notifications are delivered through [`Notifications`]; the owner
//! decides how to react (the dapp runtime treats them as a hard reset).

use std::time::Duration;

use tokio::sync::mpsc;
use whitelist_proto::Address;

use crate::{
    DappConfig, DappError, NotificationSink, ReadProvider, SigningProvider, Wallet,
    WalletNotification, WalletSession, provider::bounded,
};

/// Receiving half of the wallet notification subscription.
#[derive(Debug)]
pub struct Notifications {
    rx: mpsc::UnboundedReceiver<WalletNotification>,
}

impl Notifications {
    /// Wait for the next notification.
    ///
    /// Returns `None` once the connection provider has been dropped.
    pub async fn next(&mut self) -> Option<WalletNotification> {
        self.rx.recv().await
    }

    /// Take a notification if one is already queued.
    pub fn try_next(&mut self) -> Option<WalletNotification> {
        self.rx.try_recv().ok()
    }
}

/// Connection provider owning the wallet session.
pub struct ConnectionProvider<W: Wallet> {
    /// Injected wallet.
    wallet: W,
    /// The only chain a session may be established on.
    target_chain_id: u64,
    /// Bound for each wallet call.
    call_timeout: Duration,
    /// Current session. `None` when disconnected.
    session: Option<WalletSession<W>>,
    /// Sink handed to the wallet on subscription.
    sink: NotificationSink,
    /// Set once the wallet accepted the subscription.
    subscribed: bool,
}

impl<W: Wallet> ConnectionProvider<W> {
    /// Create a provider for `target_chain_id`.
    ///
    /// Returns the provider together with the notification stream it feeds.
    pub fn new(wallet: W, target_chain_id: u64, call_timeout: Duration) -> (Self, Notifications) {
        let (tx, rx) = mpsc::unbounded_channel();
        let provider = Self {
            wallet,
            target_chain_id,
            call_timeout,
            session: None,
            sink: NotificationSink::new(tx),
            subscribed: false,
        };
        (provider, Notifications { rx })
    }

    /// Create a provider from the dapp configuration.
    pub fn from_config(wallet: W, config: &DappConfig) -> (Self, Notifications) {
        Self::new(wallet, config.chain_id, config.call_timeout)
    }

    /// Connect to the wallet and validate its network.
    ///
    /// Any previous session is dropped first, so a failed connect leaves the
    /// provider disconnected.
    ///
    /// # Errors
    ///
    /// - [`DappError::WrongNetwork`] if the wallet is on another chain
    /// - [`DappError::ProviderUnavailable`] if the wallet cannot be reached
    pub async fn connect(&mut self) -> Result<&WalletSession<W>, DappError> {
        self.session = None;
        self.ensure_subscribed();

        let reader =
            bounded(self.call_timeout, self.wallet.connect()).await.map_err(DappError::unavailable)?;
        let network =
            bounded(self.call_timeout, reader.network()).await.map_err(DappError::unavailable)?;

        if network.chain_id != self.target_chain_id {
            tracing::warn!(
                expected = self.target_chain_id,
                actual = network.chain_id,
                "wallet is attached to the wrong network"
            );
            return Err(DappError::WrongNetwork {
                expected: self.target_chain_id,
                actual: network.chain_id,
            });
        }

        tracing::info!(chain_id = network.chain_id, "wallet connected");
        Ok(self.session.insert(WalletSession::new(reader, network.chain_id)))
    }

    /// Read-only handle of the current session.
    pub fn reader(&self) -> Result<W::Reader, DappError> {
        self.session.as_ref().map(|s| s.reader().clone()).ok_or_else(DappError::no_session)
    }

    /// Signing handle and account address of the current session.
    ///
    /// The first call escalates the session through the wallet; later calls
    /// return the cached signer.
    pub async fn signer(&mut self) -> Result<(W::Signer, Address), DappError> {
        let Some(session) = self.session.as_mut() else {
            return Err(DappError::no_session());
        };
        if let Some(escalated) = session.escalated() {
            return Ok(escalated);
        }

        let signer = bounded(self.call_timeout, self.wallet.signer(session.reader()))
            .await
            .map_err(DappError::unavailable)?;
        let address =
            bounded(self.call_timeout, signer.address()).await.map_err(DappError::unavailable)?;

        tracing::debug!(%address, "session escalated to signer");
        session.set_signer(signer.clone(), address);
        Ok((signer, address))
    }

    /// Drop the current session.
    pub fn invalidate(&mut self) {
        if self.session.take().is_some() {
            tracing::info!("wallet session invalidated");
        }
    }

    /// Current session. `None` when disconnected.
    pub fn session(&self) -> Option<&WalletSession<W>> {
        self.session.as_ref()
    }

    /// Whether a validated session exists.
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Target chain id.
    pub fn target_chain_id(&self) -> u64 {
        self.target_chain_id
    }

    /// Injected wallet.
    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    fn ensure_subscribed(&mut self) {
        if self.subscribed {
            return;
        }
        match self.wallet.subscribe(self.sink.clone()) {
            Ok(()) => {
                self.subscribed = true;
                tracing::debug!("subscribed to wallet notifications");
            },
            Err(e) => tracing::warn!(error = %e, "wallet notification subscription failed"),
        }
    }
}
