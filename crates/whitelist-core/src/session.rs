//! Wallet session.

use std::fmt;

use whitelist_proto::Address;

use crate::Wallet;

/// Capability handles obtained from a successful connect.
///
/// Owned by the [`crate::ConnectionProvider`]. A session only exists for the
/// configured target chain; it is replaced on every connect and dropped on
/// every network or account change.
pub struct WalletSession<W: Wallet> {
    /// Read-only provider handle.
    reader: W::Reader,
    /// Signer handle, once escalated.
    signer: Option<W::Signer>,
    /// Chain the session was validated against.
    chain_id: u64,
    /// Account address, resolved on escalation.
    address: Option<Address>,
}

impl<W: Wallet> WalletSession<W> {
    pub(crate) fn new(reader: W::Reader, chain_id: u64) -> Self {
        Self { reader, signer: None, chain_id, address: None }
    }

    /// Read-only provider handle.
    pub fn reader(&self) -> &W::Reader {
        &self.reader
    }

    /// Signer handle. `None` until escalated.
    pub fn signer(&self) -> Option<&W::Signer> {
        self.signer.as_ref()
    }

    /// Chain id the session is bound to.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Connected account. `None` until escalated.
    pub fn address(&self) -> Option<Address> {
        self.address
    }

    pub(crate) fn escalated(&self) -> Option<(W::Signer, Address)> {
        self.signer.clone().zip(self.address)
    }

    pub(crate) fn set_signer(&mut self, signer: W::Signer, address: Address) {
        self.signer = Some(signer);
        self.address = Some(address);
    }
}

impl<W: Wallet> fmt::Debug for WalletSession<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSession")
            .field("chain_id", &self.chain_id)
            .field("address", &self.address)
            .field("has_signer", &self.signer.is_some())
            .finish_non_exhaustive()
    }
}
