//! In-memory chain hosting whitelist contracts.
//!
//! Transactions execute at submission time. Their receipts are released to
//! waiters only while confirmations are not held, which lets tests park a
//! join between submission and confirmation.
//!
//! All randomness (transaction hashes, contract and account addresses) comes
//! from a seeded ChaCha RNG, so a seed fully determines a run.

use std::{
    collections::{BTreeSet, HashMap},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::watch;
use whitelist_core::{PendingTransaction, WalletError};
use whitelist_proto::{
    Address, Bytes, CallRequest, TransactionReceipt, TransactionRequest, TxHash, U256,
    abi::{self, WhitelistCall},
};

/// Injected failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Faults {
    /// Every `eth_call` fails with a transport error.
    pub fail_reads: bool,
    /// Every `eth_call` never returns.
    pub hang_reads: bool,
    /// The user declines every signature request.
    pub reject_signing: bool,
    /// Join transactions are mined but revert.
    pub revert_joins: bool,
}

/// Counters for chain traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallStats {
    /// Read-only calls received.
    pub calls: usize,
    /// Transactions submitted.
    pub transactions: usize,
}

#[derive(Debug)]
struct Whitelist {
    capacity: u8,
    members: BTreeSet<Address>,
}

#[derive(Debug)]
struct ChainState {
    chain_id: u64,
    rng: ChaCha8Rng,
    block_number: u64,
    contracts: HashMap<Address, Whitelist>,
    faults: Faults,
    stats: CallStats,
}

impl ChainState {
    fn random_address(&mut self) -> Address {
        let mut bytes = [0u8; 20];
        self.rng.fill_bytes(&mut bytes);
        Address::from(bytes)
    }

    fn random_hash(&mut self) -> TxHash {
        let mut bytes = [0u8; 32];
        self.rng.fill_bytes(&mut bytes);
        TxHash::from(bytes)
    }

    /// Mine `request` into a new block and return its receipt.
    fn execute(&mut self, from: Address, request: &TransactionRequest) -> TransactionReceipt {
        self.block_number += 1;
        let transaction_hash = self.random_hash();
        let mut receipt = TransactionReceipt {
            transaction_hash,
            block_number: Some(self.block_number),
            success: true,
            contract_address: None,
        };

        match request.to {
            None => match abi::decode_deployment(&request.data) {
                Some((code, capacity)) if !code.is_empty() => {
                    let address = self.random_address();
                    self.contracts.insert(address, Whitelist { capacity, members: BTreeSet::new() });
                    tracing::debug!(%address, capacity, "contract deployed");
                    receipt.contract_address = Some(address);
                },
                _ => receipt.success = false,
            },
            Some(to) => {
                let is_join = matches!(abi::decode_call(&request.data), Ok(WhitelistCall::Join));
                if let (true, Some(whitelist)) = (is_join, self.contracts.get_mut(&to)) {
                    let full = whitelist.members.len() >= usize::from(whitelist.capacity);
                    if self.faults.revert_joins || full || !whitelist.members.insert(from) {
                        tracing::debug!(%from, full, "join reverted");
                        receipt.success = false;
                    }
                }
            },
        }

        receipt
    }
}

/// Simulated chain shared by wallets, providers and tests.
#[derive(Debug, Clone)]
pub struct SimChain {
    state: Arc<Mutex<ChainState>>,
    /// `true` while receipts are held back from waiters.
    held: Arc<watch::Sender<bool>>,
}

impl SimChain {
    /// Create an empty chain with the given id and RNG seed.
    pub fn new(chain_id: u64, seed: u64) -> Self {
        let state = ChainState {
            chain_id,
            rng: ChaCha8Rng::seed_from_u64(seed),
            block_number: 0,
            contracts: HashMap::new(),
            faults: Faults::default(),
            stats: CallStats::default(),
        };
        let (held, _) = watch::channel(false);
        Self { state: Arc::new(Mutex::new(state)), held: Arc::new(held) }
    }

    /// Chain id.
    pub fn chain_id(&self) -> u64 {
        self.lock().chain_id
    }

    /// Install a whitelist contract at a fixed address.
    pub fn install_whitelist(&self, address: Address, capacity: u8) {
        self.lock().contracts.insert(address, Whitelist { capacity, members: BTreeSet::new() });
    }

    /// Add `account` to the whitelist at `contract` directly.
    ///
    /// Returns `false` if there is no such contract, it is full, or the
    /// account is already listed.
    pub fn add_member(&self, contract: Address, account: Address) -> bool {
        let mut state = self.lock();
        match state.contracts.get_mut(&contract) {
            Some(whitelist) if whitelist.members.len() < usize::from(whitelist.capacity) => {
                whitelist.members.insert(account)
            },
            _ => false,
        }
    }

    /// Number of accounts listed at `contract`. `None` if there is no contract.
    pub fn member_count(&self, contract: Address) -> Option<usize> {
        self.lock().contracts.get(&contract).map(|w| w.members.len())
    }

    /// Whether `account` is listed at `contract`.
    pub fn is_member(&self, contract: Address, account: Address) -> bool {
        self.lock().contracts.get(&contract).is_some_and(|w| w.members.contains(&account))
    }

    /// Capacity of the whitelist at `contract`.
    pub fn capacity(&self, contract: Address) -> Option<u8> {
        self.lock().contracts.get(&contract).map(|w| w.capacity)
    }

    /// A fresh address drawn from the chain RNG.
    pub fn random_address(&self) -> Address {
        self.lock().random_address()
    }

    /// Current block height.
    pub fn block_number(&self) -> u64 {
        self.lock().block_number
    }

    /// Active fault configuration.
    pub fn faults(&self) -> Faults {
        self.lock().faults
    }

    /// Replace the fault configuration.
    pub fn set_faults(&self, faults: Faults) {
        self.lock().faults = faults;
    }

    /// Traffic counters.
    pub fn stats(&self) -> CallStats {
        self.lock().stats
    }

    /// Hold receipts back from waiters until [`Self::release_confirmations`].
    pub fn hold_confirmations(&self) {
        self.held.send_replace(true);
    }

    /// Release held receipts.
    pub fn release_confirmations(&self) {
        self.held.send_replace(false);
    }

    /// Answer a read-only call.
    ///
    /// Calls to an address without a contract return empty data, as a node
    /// does for calls to an externally owned account.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::Transport`] when read failures are injected.
    pub fn call(&self, request: &CallRequest) -> Result<Bytes, WalletError> {
        let mut state = self.lock();
        state.stats.calls += 1;
        if state.faults.fail_reads {
            return Err(WalletError::Transport("injected read failure".to_string()));
        }

        let Some(whitelist) = state.contracts.get(&request.to) else {
            return Ok(Bytes::new());
        };

        match abi::decode_call(&request.data) {
            Ok(WhitelistCall::Count) => Ok(abi::encode_count_return(U256::from(whitelist.members.len()))),
            Ok(WhitelistCall::Membership { account }) => {
                Ok(abi::encode_membership_return(whitelist.members.contains(&account)))
            },
            Ok(WhitelistCall::Join) => Ok(Bytes::new()),
            Err(e) => Err(WalletError::Rpc { code: -32000, message: e.to_string() }),
        }
    }

    /// Sign on behalf of `from`, mine the transaction and return its handle.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::UserRejected`] when signing rejections are
    /// injected.
    pub fn submit(&self, from: Address, request: &TransactionRequest) -> Result<SimPending, WalletError> {
        let mut state = self.lock();
        state.stats.transactions += 1;
        if state.faults.reject_signing {
            return Err(WalletError::UserRejected("user denied transaction signature".to_string()));
        }

        let receipt = state.execute(from, request);
        tracing::debug!(tx_hash = %receipt.transaction_hash, success = receipt.success, "transaction mined");
        Ok(SimPending { receipt, held: self.held.subscribe() })
    }

    fn lock(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Transaction mined on a [`SimChain`], waiting for its receipt release.
#[derive(Debug)]
pub struct SimPending {
    receipt: TransactionReceipt,
    held: watch::Receiver<bool>,
}

impl PendingTransaction for SimPending {
    fn hash(&self) -> TxHash {
        self.receipt.transaction_hash
    }

    async fn wait(self) -> Result<TransactionReceipt, WalletError> {
        let Self { receipt, mut held } = self;
        if held.wait_for(|held| !*held).await.is_err() {
            return Err(WalletError::Transport("chain dropped".to_string()));
        }
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTRACT: Address = Address::repeat_byte(0xc0);

    fn chain() -> SimChain {
        let chain = SimChain::new(5, 7);
        chain.install_whitelist(CONTRACT, 2);
        chain
    }

    #[test]
    fn same_seed_same_addresses() {
        let a = SimChain::new(5, 42);
        let b = SimChain::new(5, 42);
        assert_eq!(a.random_address(), b.random_address());
    }

    #[test]
    fn count_call_reports_members() {
        let chain = chain();
        let alice = chain.random_address();
        assert!(chain.add_member(CONTRACT, alice));

        let data = chain.call(&CallRequest::new(CONTRACT, abi::encode_count_call())).unwrap();
        assert_eq!(abi::decode_count_return(&data).unwrap(), U256::from(1));
        assert_eq!(chain.stats().calls, 1);
    }

    #[test]
    fn call_to_empty_address_returns_no_data() {
        let chain = chain();
        let data = chain.call(&CallRequest::new(Address::ZERO, abi::encode_count_call())).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn join_reverts_when_full_or_repeated() {
        let chain = chain();
        let alice = chain.random_address();
        let bob = chain.random_address();
        let carol = chain.random_address();
        let join = TransactionRequest::call(CONTRACT, abi::encode_join_call());

        assert!(chain.submit(alice, &join).unwrap().receipt.success);
        assert!(!chain.submit(alice, &join).unwrap().receipt.success);
        assert!(chain.submit(bob, &join).unwrap().receipt.success);
        assert!(!chain.submit(carol, &join).unwrap().receipt.success);
        assert_eq!(chain.member_count(CONTRACT), Some(2));
    }

    #[test]
    fn deployment_creates_contract() {
        let chain = SimChain::new(5, 1);
        let data = abi::encode_deployment(&[0x60, 0x80], 10);
        let pending = chain.submit(Address::ZERO, &TransactionRequest::deploy(data)).unwrap();

        let address = pending.receipt.contract_address.unwrap();
        assert_eq!(chain.capacity(address), Some(10));
        assert_eq!(chain.member_count(address), Some(0));
    }

    #[test]
    fn rejected_signature_mines_nothing() {
        let chain = chain();
        chain.set_faults(Faults { reject_signing: true, ..Faults::default() });
        let join = TransactionRequest::call(CONTRACT, abi::encode_join_call());

        let result = chain.submit(Address::ZERO, &join);
        assert!(matches!(result, Err(WalletError::UserRejected(_))));
        assert_eq!(chain.block_number(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn held_confirmation_waits_for_release() {
        let chain = chain();
        chain.hold_confirmations();
        let join = TransactionRequest::call(CONTRACT, abi::encode_join_call());
        let pending = chain.submit(Address::repeat_byte(1), &join).unwrap();

        let mut wait = Box::pin(pending.wait());
        let early = tokio::time::timeout(std::time::Duration::from_secs(1), &mut wait).await;
        assert!(early.is_err());

        chain.release_confirmations();
        let receipt = wait.await.unwrap();
        assert!(receipt.success);
    }
}
