//! Whitelist contract ABI.
//!
//! The client consumes exactly three functions of the deployed contract:
//!
//! ```text
//! numAddressesWhitelisted() view returns (uint256)
//! whitelist(address)        view returns (bool)
//! addAddressToWhitelist()
//! ```
//!
//! Encoders produce calldata for the client side; [`decode_call`] and the
//! `encode_*_return` helpers serve implementations that answer calls (the
//! simulated chain in the harness).

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolInterface};

use crate::ProtocolError;

#[allow(missing_docs, clippy::pedantic)]
mod generated {
    alloy_sol_types::sol! {
        interface IWhitelist {
            function numAddressesWhitelisted() external view returns (uint256 count);
            function whitelist(address account) external view returns (bool listed);
            function addAddressToWhitelist() external;
        }
    }
}

pub use generated::IWhitelist;

/// Whitelist call decoded from calldata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhitelistCall {
    /// `numAddressesWhitelisted()`
    Count,
    /// `whitelist(account)`
    Membership {
        /// Address being checked.
        account: Address,
    },
    /// `addAddressToWhitelist()`
    Join,
}

/// Calldata for `numAddressesWhitelisted()`.
pub fn encode_count_call() -> Bytes {
    IWhitelist::numAddressesWhitelistedCall {}.abi_encode().into()
}

/// Calldata for `whitelist(account)`.
pub fn encode_membership_call(account: Address) -> Bytes {
    IWhitelist::whitelistCall { account }.abi_encode().into()
}

/// Calldata for `addAddressToWhitelist()`.
pub fn encode_join_call() -> Bytes {
    IWhitelist::addAddressToWhitelistCall {}.abi_encode().into()
}

/// Decode the return data of `numAddressesWhitelisted()`.
pub fn decode_count_return(data: &[u8]) -> Result<U256, ProtocolError> {
    IWhitelist::numAddressesWhitelistedCall::abi_decode_returns(data, true)
        .map(|ret| ret.count)
        .map_err(|e| ProtocolError::Decode {
            call: "numAddressesWhitelisted",
            reason: e.to_string(),
        })
}

/// Decode the return data of `whitelist(address)`.
pub fn decode_membership_return(data: &[u8]) -> Result<bool, ProtocolError> {
    IWhitelist::whitelistCall::abi_decode_returns(data, true)
        .map(|ret| ret.listed)
        .map_err(|e| ProtocolError::Decode { call: "whitelist", reason: e.to_string() })
}

/// Encode a `uint256` return word.
pub fn encode_count_return(count: U256) -> Bytes {
    Bytes::copy_from_slice(&count.to_be_bytes::<32>())
}

/// Encode a `bool` return word.
pub fn encode_membership_return(listed: bool) -> Bytes {
    encode_count_return(U256::from(u8::from(listed)))
}

/// Identify a whitelist call from its calldata.
pub fn decode_call(data: &[u8]) -> Result<WhitelistCall, ProtocolError> {
    let call = IWhitelist::IWhitelistCalls::abi_decode(data, true)
        .map_err(|e| ProtocolError::UnknownCall { reason: e.to_string() })?;

    Ok(match call {
        IWhitelist::IWhitelistCalls::numAddressesWhitelisted(_) => WhitelistCall::Count,
        IWhitelist::IWhitelistCalls::whitelist(c) => WhitelistCall::Membership { account: c.account },
        IWhitelist::IWhitelistCalls::addAddressToWhitelist(_) => WhitelistCall::Join,
    })
}

/// Creation data for the whitelist contract.
///
/// The constructor takes the maximum number of whitelisted addresses as its
/// only argument, ABI-encoded as a single word after the creation code.
pub fn encode_deployment(creation_code: &[u8], max_whitelisted: u8) -> Bytes {
    let mut data = Vec::with_capacity(creation_code.len() + 32);
    data.extend_from_slice(creation_code);
    data.extend_from_slice(&U256::from(max_whitelisted).to_be_bytes::<32>());
    data.into()
}

/// Split creation data back into creation code and constructor capacity.
///
/// Returns `None` when the data is too short to carry the constructor word or
/// the word does not fit the `uint8` parameter.
pub fn decode_deployment(data: &[u8]) -> Option<(&[u8], u8)> {
    let split = data.len().checked_sub(32)?;
    let (code, word) = data.split_at(split);
    let (high, low) = word.split_at(31);
    if high.iter().any(|b| *b != 0) {
        return None;
    }
    Some((code, low[0]))
}
