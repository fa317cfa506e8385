//! One-shot subcommands and the interactive session.

use std::path::Path;

use thiserror::Error;
use whitelist_app::Runtime;
use whitelist_core::{
    ConnectionProvider, DappConfig, DappError, DeployError, Wallet, WhitelistContract,
    deploy_whitelist,
};
use whitelist_proto::{Address, TxHash, U256};

use crate::{ArtifactError, TerminalDriver, TerminalError, artifact};

/// Errors from CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Wallet or contract failure.
    #[error(transparent)]
    Dapp(#[from] DappError),

    /// Deployment failure.
    #[error(transparent)]
    Deploy(#[from] DeployError),

    /// Unusable contract artifact.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// Terminal I/O failure.
    #[error(transparent)]
    Terminal(#[from] TerminalError),
}

/// Snapshot of the connected account's whitelist status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    /// Validated chain.
    pub chain_id: u64,
    /// Connected account.
    pub address: Address,
    /// Number of whitelisted addresses.
    pub count: U256,
    /// Whether `address` is whitelisted.
    pub joined: bool,
}

/// Result of the `join` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The join transaction was confirmed.
    Joined {
        /// Join transaction.
        tx_hash: TxHash,
        /// Count read after confirmation.
        count: U256,
    },
    /// The account was already whitelisted; nothing was sent.
    AlreadyJoined {
        /// Current count.
        count: U256,
    },
}

/// Run the interactive terminal session until the user quits.
pub async fn run<W: Wallet>(config: &DappConfig, wallet: W) -> Result<(), CliError> {
    let mut runtime = Runtime::new(TerminalDriver::stdio(), wallet, config);
    runtime.run().await?;
    Ok(())
}

/// Read the count and the account's membership.
pub async fn status<W: Wallet>(config: &DappConfig, wallet: W) -> Result<Status, CliError> {
    let (signer, address) = open(config, wallet).await?;
    let contract = WhitelistContract::from_config(config);

    let count = contract.get_whitelist_count(&signer).await?;
    let joined = contract.is_whitelisted(&signer, address).await?;

    tracing::info!(%address, %count, joined, "whitelist status");
    Ok(Status { chain_id: config.chain_id, address, count, joined })
}

/// Join the whitelist unless the account is already on it.
pub async fn join<W: Wallet>(config: &DappConfig, wallet: W) -> Result<JoinOutcome, CliError> {
    let (signer, address) = open(config, wallet).await?;
    let contract = WhitelistContract::from_config(config);

    if contract.is_whitelisted(&signer, address).await? {
        let count = contract.get_whitelist_count(&signer).await?;
        tracing::info!(%address, %count, "already whitelisted");
        return Ok(JoinOutcome::AlreadyJoined { count });
    }

    let transaction = contract.join_whitelist(&signer).await?;
    let tx_hash = transaction.hash();
    transaction.wait().await?;
    let count = contract.get_whitelist_count(&signer).await?;

    tracing::info!(%address, %tx_hash, %count, "joined the whitelist");
    Ok(JoinOutcome::Joined { tx_hash, count })
}

/// Deploy a whitelist contract with the given capacity.
pub async fn deploy<W: Wallet>(
    config: &DappConfig,
    wallet: W,
    artifact: &Path,
    capacity: u8,
) -> Result<Address, CliError> {
    let code = artifact::load_creation_code(artifact)?;
    let (signer, deployer) = open(config, wallet).await?;
    tracing::debug!(%deployer, capacity, "deploying whitelist");

    let address = deploy_whitelist(&signer, &code, capacity, config.confirmation_timeout).await?;
    tracing::info!("Whitelist Contract Address: {address}");
    Ok(address)
}

/// Connect, validate the network and escalate to a signer.
async fn open<W: Wallet>(config: &DappConfig, wallet: W) -> Result<(W::Signer, Address), CliError> {
    let (mut provider, _notifications) = ConnectionProvider::from_config(wallet, config);
    provider.connect().await?;
    Ok(provider.signer().await?)
}
