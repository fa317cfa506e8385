//! Property-based tests for App state machine.
//!
//! Tests verify that invariants hold under arbitrary event sequences,
//! including results delivered late for sessions that were already torn down.

use proptest::prelude::*;
use whitelist_app::{App, AppAction, AppEvent, DappState, SessionId, UserIntent};
use whitelist_core::{DappConfig, DappError, WalletNotification};
use whitelist_harness::{InvariantRegistry, SystemSnapshot};
use whitelist_proto::{Address, TxHash, U256};

/// One input to the App, resolved against its current session when applied.
#[derive(Debug, Clone)]
enum Step {
    Intent(UserIntent),
    Reset,
    WalletChanged,
    Connected { chain_id: u64, stale: bool },
    ConnectFailed { wrong_network: bool, stale: bool },
    Count { count: u64, stale: bool },
    CountFailed { stale: bool },
    Membership { joined: bool, stale: bool },
    MembershipFailed { stale: bool },
    JoinSubmitted { stale: bool },
    JoinConfirmed { stale: bool },
    JoinFailed { rejected: bool, stale: bool },
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => prop_oneof![Just(UserIntent::Connect), Just(UserIntent::Join)].prop_map(Step::Intent),
        1 => Just(Step::Reset),
        1 => Just(Step::WalletChanged),
        2 => (prop_oneof![Just(5u64), Just(1u64)], any::<bool>())
            .prop_map(|(chain_id, stale)| Step::Connected { chain_id, stale }),
        1 => (any::<bool>(), any::<bool>())
            .prop_map(|(wrong_network, stale)| Step::ConnectFailed { wrong_network, stale }),
        2 => (0u64..10, any::<bool>()).prop_map(|(count, stale)| Step::Count { count, stale }),
        1 => any::<bool>().prop_map(|stale| Step::CountFailed { stale }),
        2 => (any::<bool>(), any::<bool>())
            .prop_map(|(joined, stale)| Step::Membership { joined, stale }),
        1 => any::<bool>().prop_map(|stale| Step::MembershipFailed { stale }),
        2 => any::<bool>().prop_map(|stale| Step::JoinSubmitted { stale }),
        2 => any::<bool>().prop_map(|stale| Step::JoinConfirmed { stale }),
        1 => (any::<bool>(), any::<bool>())
            .prop_map(|(rejected, stale)| Step::JoinFailed { rejected, stale }),
    ]
}

/// Session epoch 0 is never current once the first connect happened.
fn session_for(app: &App, stale: bool) -> SessionId {
    if stale { SessionId::default() } else { app.session() }
}

fn is_stale(step: &Step) -> bool {
    match step {
        Step::Connected { stale, .. }
        | Step::ConnectFailed { stale, .. }
        | Step::Count { stale, .. }
        | Step::CountFailed { stale }
        | Step::Membership { stale, .. }
        | Step::MembershipFailed { stale }
        | Step::JoinSubmitted { stale }
        | Step::JoinConfirmed { stale }
        | Step::JoinFailed { stale, .. } => *stale,
        Step::Intent(_) | Step::Reset | Step::WalletChanged => false,
    }
}

fn apply(app: &mut App, step: &Step) -> Vec<AppAction> {
    let rpc = || DappError::Rpc { reason: "injected".into() };
    match *step {
        Step::Intent(intent) => app.intent(intent),
        Step::Reset => app.reset(),
        Step::WalletChanged => {
            let mut actions = app.handle(AppEvent::WalletChanged(
                WalletNotification::AccountsChanged { accounts: vec![Address::repeat_byte(2)] },
            ));
            if actions.contains(&AppAction::Reconnect) {
                actions.extend(app.connect());
            }
            actions
        },
        Step::Connected { chain_id, stale } => {
            app.handle(AppEvent::WalletConnected { session: session_for(app, stale), chain_id })
        },
        Step::ConnectFailed { wrong_network, stale } => {
            let error = if wrong_network {
                DappError::WrongNetwork { expected: 5, actual: 1 }
            } else {
                DappError::ProviderUnavailable { reason: "injected".into() }
            };
            app.handle(AppEvent::ConnectFailed { session: session_for(app, stale), error })
        },
        Step::Count { count, stale } => app.handle(AppEvent::CountFetched {
            session: session_for(app, stale),
            count: U256::from(count),
        }),
        Step::CountFailed { stale } => {
            app.handle(AppEvent::CountFailed { session: session_for(app, stale), error: rpc() })
        },
        Step::Membership { joined, stale } => app.handle(AppEvent::MembershipFetched {
            session: session_for(app, stale),
            address: Address::repeat_byte(1),
            joined,
        }),
        Step::MembershipFailed { stale } => {
            app.handle(AppEvent::MembershipFailed { session: session_for(app, stale), error: rpc() })
        },
        Step::JoinSubmitted { stale } => app.handle(AppEvent::JoinSubmitted {
            session: session_for(app, stale),
            tx_hash: TxHash::repeat_byte(9),
        }),
        Step::JoinConfirmed { stale } => {
            app.handle(AppEvent::JoinConfirmed { session: session_for(app, stale) })
        },
        Step::JoinFailed { rejected, stale } => {
            let error = if rejected {
                DappError::TransactionRejected { reason: "denied".into() }
            } else {
                DappError::TransactionFailed { reason: "reverted".into() }
            };
            app.handle(AppEvent::JoinFailed { session: session_for(app, stale), error })
        },
    }
}

proptest! {
    #[test]
    fn prop_app_invariants_hold(steps in prop::collection::vec(step_strategy(), 0..60)) {
        let config = DappConfig::default();
        let invariants = InvariantRegistry::standard();
        let mut app = App::new(&config);
        let mut history = SystemSnapshot::from_app(&app);

        for (i, step) in steps.iter().enumerate() {
            let _ = apply(&mut app, step);
            history.record_app(&app);
            invariants.assert_all(&history, &format!("after step {i}: {step:?}"));
        }
    }

    #[test]
    fn prop_stale_results_change_nothing(
        prefix in prop::collection::vec(step_strategy(), 0..30),
        late in step_strategy(),
    ) {
        prop_assume!(is_stale(&late));
        let mut app = App::new(&DappConfig::default());
        let _ = app.connect();
        for step in &prefix {
            let _ = apply(&mut app, step);
        }

        let before = app.view();
        let actions = apply(&mut app, &late);

        prop_assert!(actions.is_empty());
        prop_assert_eq!(app.view(), before);
    }

    #[test]
    fn prop_connect_is_idempotent(prefix in prop::collection::vec(step_strategy(), 0..30)) {
        let mut once = App::new(&DappConfig::default());
        for step in &prefix {
            let _ = apply(&mut once, step);
        }
        let mut twice = once.clone();

        let _ = once.connect();
        let _ = twice.connect();
        let second = twice.connect();

        prop_assert!(second.is_empty());
        prop_assert_eq!(once.view(), twice.view());
        prop_assert_eq!(once.session(), twice.session());
    }

    #[test]
    fn prop_alerts_only_for_wrong_network(steps in prop::collection::vec(step_strategy(), 0..60)) {
        let mut app = App::new(&DappConfig::default());

        for step in &steps {
            let actions = apply(&mut app, step);
            for action in actions {
                if let AppAction::Alert { message } = action {
                    prop_assert_eq!(message.as_str(), "Change the network to Goerli");
                    prop_assert_eq!(app.state(), DappState::Disconnected);
                }
            }
        }
    }

    #[test]
    fn prop_operations_carry_current_session(steps in prop::collection::vec(step_strategy(), 0..60)) {
        let mut app = App::new(&DappConfig::default());

        for step in &steps {
            let actions = apply(&mut app, step);
            for action in &actions {
                if let Some(session) = action.session() {
                    prop_assert_eq!(session, app.session());
                }
            }
        }
    }
}

#[test]
fn wallet_change_mid_join_drops_confirmation() {
    let mut app = App::new(&DappConfig::default());
    let _ = app.connect();
    let joining = app.session();
    let _ = app.handle(AppEvent::WalletConnected { session: joining, chain_id: 5 });
    let _ = app.handle(AppEvent::CountFetched { session: joining, count: U256::from(4) });
    let _ = app.handle(AppEvent::MembershipFetched {
        session: joining,
        address: Address::repeat_byte(1),
        joined: false,
    });
    let _ = app.join();
    let _ = app.handle(AppEvent::JoinSubmitted { session: joining, tx_hash: TxHash::ZERO });

    let restart =
        app.handle(AppEvent::WalletChanged(WalletNotification::ChainChanged { chain_id: 5 }));
    assert_eq!(restart, vec![AppAction::Render, AppAction::Reconnect]);
    assert_eq!(app.state(), DappState::Disconnected);

    let actions = app.handle(AppEvent::JoinConfirmed { session: joining });

    assert!(actions.is_empty());
    assert_eq!(app.state(), DappState::Disconnected);
    assert!(!app.joined());
    assert!(!app.busy());
}
