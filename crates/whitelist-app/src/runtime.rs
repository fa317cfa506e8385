//! Executes what the [`App`] decides.
//!
//! The runtime owns the [`ConnectionProvider`] and [`WhitelistContract`],
//! runs each operation action the App emits, and feeds the outcome back as an
//! event. Renders and alerts go to the [`Driver`]. Operations run one at a
//! time, in emission order.
//!
//! Every wallet or contract operation runs against the notification stream.
//! A chain or account change cancels the operation in flight, tears down the
//! session and restarts the connect flow.

use std::{collections::VecDeque, future::Future};

use whitelist_core::{
    ConnectionProvider, DappConfig, DappError, JoinTransaction, Notifications, SigningProvider,
    Wallet, WalletNotification, WhitelistContract,
};

use crate::{App, AppAction, AppEvent, Driver};

type PendingJoin<W> = JoinTransaction<<<W as Wallet>::Signer as SigningProvider>::Pending>;

/// Event loop over a frontend `D` and a wallet `W`.
pub struct Runtime<D, W>
where
    D: Driver,
    W: Wallet,
{
    driver: D,
    app: App,
    provider: ConnectionProvider<W>,
    notifications: Notifications,
    contract: WhitelistContract,
    pending_join: Option<PendingJoin<W>>,
}

/// One input to the event loop.
enum Input {
    Notification(WalletNotification),
    Intent(Option<crate::UserIntent>),
}

impl<D, W> Runtime<D, W>
where
    D: Driver,
    W: Wallet,
{
    /// Create a new runtime with the given driver and wallet.
    pub fn new(driver: D, wallet: W, config: &DappConfig) -> Self {
        let (provider, notifications) = ConnectionProvider::from_config(wallet, config);
        Self {
            driver,
            app: App::new(config),
            provider,
            notifications,
            contract: WhitelistContract::from_config(config),
            pending_join: None,
        }
    }

    /// Connect on start, then serve intents and wallet notifications until
    /// the user quits or input ends.
    ///
    /// Notifications are polled first.
    ///
    /// # Errors
    ///
    /// Fails only when the driver does.
    pub async fn run(&mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app.view())?;
        let actions = self.app.connect();
        let mut should_quit = self.process_actions(actions).await?;

        while !should_quit {
            let input = tokio::select! {
                biased;
                Some(notification) = self.notifications.next() => Input::Notification(notification),
                intent = self.driver.poll_intent() => Input::Intent(intent?),
            };

            should_quit = match input {
                Input::Notification(notification) => {
                    let actions = self.wallet_changed(notification);
                    self.process_actions(actions).await?
                },
                Input::Intent(Some(intent)) => {
                    let actions = self.app.intent(intent);
                    self.process_actions(actions).await?
                },
                Input::Intent(None) => true,
            };
        }

        self.driver.stop();
        Ok(())
    }

    /// Tear down the session and return to the disconnected view.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub async fn reset(&mut self) -> Result<(), D::Error> {
        self.provider.invalidate();
        self.pending_join = None;
        let actions = self.app.reset();
        self.process_actions(actions).await.map(|_| ())
    }

    /// Access the app state.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Access the driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Access the connection provider.
    pub fn provider(&self) -> &ConnectionProvider<W> {
        &self.provider
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions: VecDeque<AppAction> = initial_actions.into();

        while let Some(action) = pending_actions.pop_front() {
            match action {
                AppAction::Render => self.driver.render(&self.app.view())?,
                AppAction::Alert { message } => self.driver.alert(&message)?,
                AppAction::Quit => return Ok(true),
                AppAction::Reconnect => pending_actions.extend(self.app.connect()),
                operation => {
                    if operation.session() != Some(self.app.session()) {
                        tracing::debug!(?operation, "skipping operation for a stale session");
                        continue;
                    }

                    match self.execute(operation).await {
                        Ok(Some(event)) => pending_actions.extend(self.app.handle(event)),
                        Ok(None) => {},
                        Err(notification) => {
                            pending_actions.clear();
                            pending_actions.extend(self.wallet_changed(notification));
                        },
                    }
                },
            }
        }

        Ok(false)
    }

    /// Execute a wallet or contract operation.
    ///
    /// Returns the wallet notification that interrupted the operation, if any.
    async fn execute(
        &mut self,
        operation: AppAction,
    ) -> Result<Option<AppEvent>, WalletNotification> {
        let Self { provider, notifications, contract, pending_join, .. } = self;

        let event = match operation {
            AppAction::Connect { session } => {
                let result = interruptible(notifications, async {
                    provider.connect().await.map(|session| session.chain_id())
                })
                .await?;

                match result {
                    Ok(chain_id) => AppEvent::WalletConnected { session, chain_id },
                    Err(error) => AppEvent::ConnectFailed { session, error },
                }
            },
            AppAction::FetchCount { session } => {
                let result = match provider.reader() {
                    Ok(reader) => {
                        interruptible(notifications, contract.get_whitelist_count(&reader)).await?
                    },
                    Err(error) => Err(error),
                };

                match result {
                    Ok(count) => AppEvent::CountFetched { session, count },
                    Err(error) => AppEvent::CountFailed { session, error },
                }
            },
            AppAction::FetchMembership { session } => {
                let result = interruptible(notifications, async {
                    let (signer, address) = provider.signer().await?;
                    let joined = contract.is_whitelisted(&signer, address).await?;
                    Ok::<_, DappError>((address, joined))
                })
                .await?;

                match result {
                    Ok((address, joined)) => AppEvent::MembershipFetched { session, address, joined },
                    Err(error) => AppEvent::MembershipFailed { session, error },
                }
            },
            AppAction::SubmitJoin { session } => {
                let result = interruptible(notifications, async {
                    let (signer, _) = provider.signer().await?;
                    Ok::<_, DappError>(contract.join_whitelist(&signer).await?)
                })
                .await?;

                match result {
                    Ok(transaction) => {
                        let tx_hash = transaction.hash();
                        *pending_join = Some(transaction);
                        AppEvent::JoinSubmitted { session, tx_hash }
                    },
                    Err(error) => AppEvent::JoinFailed { session, error },
                }
            },
            AppAction::AwaitJoin { session } => {
                let Some(transaction) = pending_join.take() else {
                    let error = DappError::TransactionFailed {
                        reason: "no submitted join transaction".to_string(),
                    };
                    return Ok(Some(AppEvent::JoinFailed { session, error }));
                };

                match interruptible(notifications, transaction.wait()).await? {
                    Ok(_) => AppEvent::JoinConfirmed { session },
                    Err(error) => AppEvent::JoinFailed { session, error },
                }
            },
            AppAction::Render | AppAction::Alert { .. } | AppAction::Quit | AppAction::Reconnect => {
                tracing::warn!(?operation, "unexpected UI action in operation context");
                return Ok(None);
            },
        };

        Ok(Some(event))
    }

    /// Drop the session and everything derived from it, then feed the latest
    /// notification to the App.
    fn wallet_changed(&mut self, notification: WalletNotification) -> Vec<AppAction> {
        self.provider.invalidate();
        self.pending_join = None;

        let mut latest = notification;
        while let Some(next) = self.notifications.try_next() {
            tracing::debug!(skipped = ?latest, "coalescing wallet notifications");
            latest = next;
        }

        self.app.handle(AppEvent::WalletChanged(latest))
    }
}

/// Race an operation against wallet notifications.
///
/// Notifications win ties. The operation future is dropped when one arrives.
async fn interruptible<F, T>(
    notifications: &mut Notifications,
    operation: F,
) -> Result<T, WalletNotification>
where
    F: Future<Output = T>,
{
    tokio::select! {
        biased;
        Some(notification) = notifications.next() => {
            tracing::info!(?notification, "operation interrupted by wallet change");
            Err(notification)
        },
        output = operation => Ok(output),
    }
}
