//! Whitelist contract client against the simulated chain.

use whitelist_core::{DappError, ReadProvider, Wallet, WhitelistContract};
use whitelist_harness::{Faults, Scenario, SimSigner};
use whitelist_proto::{Address, U256};

async fn signer(scenario: &Scenario) -> SimSigner {
    let reader = scenario.wallet.connect().await.unwrap();
    scenario.wallet.signer(&reader).await.unwrap()
}

#[tokio::test]
async fn count_reads_current_membership() {
    let scenario = Scenario::new(1).prefilled(4);
    let reader = scenario.wallet.connect().await.unwrap();

    let count = scenario.contract().get_whitelist_count(&reader).await.unwrap();
    assert_eq!(count, U256::from(4));
}

#[tokio::test]
async fn membership_reflects_chain_state() {
    let scenario = Scenario::new(2).prefilled(1);
    let signer = signer(&scenario).await;
    let contract = scenario.contract();

    assert!(!contract.is_whitelisted(&signer, scenario.account).await.unwrap());

    let scenario = scenario.already_joined();
    assert!(contract.is_whitelisted(&signer, scenario.account).await.unwrap());
}

#[tokio::test]
async fn join_then_wait_lists_the_signer() {
    let scenario = Scenario::new(3).prefilled(4);
    let signer = signer(&scenario).await;
    let contract = scenario.contract();

    let transaction = contract.join_whitelist(&signer).await.unwrap();
    let hash = transaction.hash();
    let receipt = transaction.wait().await.unwrap();

    assert_eq!(receipt.transaction_hash, hash);
    assert!(receipt.success);
    assert!(scenario.is_joined());
    assert_eq!(contract.get_whitelist_count(&signer).await.unwrap(), U256::from(5));
}

#[tokio::test]
async fn full_whitelist_reverts_join() {
    let scenario = Scenario::new(4).prefilled(10);
    let signer = signer(&scenario).await;

    let transaction = scenario.contract().join_whitelist(&signer).await.unwrap();
    let hash = transaction.hash();
    let result = transaction.wait().await.map(|r| r.success);

    // The wallet hands back a failed receipt; the revert is classified here.
    let expected = format!("transaction {hash} reverted");
    assert_eq!(result, Err(DappError::TransactionFailed { reason: expected }));
    assert_eq!(scenario.member_count(), 10);
}

#[tokio::test]
async fn rejected_signature_is_classified() {
    let scenario = Scenario::new(5);
    scenario.chain.set_faults(Faults { reject_signing: true, ..Faults::default() });
    let signer = signer(&scenario).await;

    let result = scenario.contract().join_whitelist(&signer).await.map(|t| t.hash());
    assert!(matches!(result, Err(DappError::TransactionRejected { .. })));
}

#[tokio::test]
async fn transport_failure_is_rpc_error() {
    let scenario = Scenario::new(6);
    scenario.chain.set_faults(Faults { fail_reads: true, ..Faults::default() });
    let reader = scenario.wallet.connect().await.unwrap();

    let result = scenario.contract().get_whitelist_count(&reader).await;
    assert!(matches!(result, Err(DappError::Rpc { .. })));
}

#[tokio::test]
async fn missing_contract_is_rpc_error() {
    let scenario = Scenario::new(7);
    let reader = scenario.wallet.connect().await.unwrap();
    let contract = WhitelistContract::new(
        Address::repeat_byte(0xee),
        scenario.config.call_timeout,
        scenario.config.confirmation_timeout,
    );

    let result = contract.get_whitelist_count(&reader).await;
    assert!(matches!(result, Err(DappError::Rpc { .. })));
    assert_eq!(reader.network().await.unwrap().chain_id, 5);
}

#[tokio::test(start_paused = true)]
async fn unconfirmed_join_times_out() {
    let scenario = Scenario::new(8);
    scenario.chain.hold_confirmations();
    let signer = signer(&scenario).await;

    let transaction = scenario.contract().join_whitelist(&signer).await.unwrap();
    let result = transaction.wait().await.map(|r| r.success);

    let Err(DappError::TransactionFailed { reason }) = result else {
        panic!("expected TransactionFailed, got {result:?}");
    };
    assert!(reason.contains("timed out"));
}
