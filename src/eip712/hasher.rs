//! EIP-712 Hashing
//!
//! Domain separator, struct hashes and the final signing hash for Safe
//! transactions and Safe messages.

use super::encoder::{encode_domain, encode_safe_message, encode_safe_tx};
use super::types::SafeDomain;
use crate::types::TransactionRecord;
use crate::utils::keccak256;
use ethers_core::types::H256;
use serde::{Deserialize, Serialize};

/// Magic prefix for EIP-712 encoding
const EIP712_PREFIX: &[u8] = b"\x19\x01";

/// domainSeparator = hashStruct(eip712Domain)
pub fn domain_separator(domain: &SafeDomain) -> H256 {
    H256(keccak256(&encode_domain(domain)))
}

/// hashStruct(SafeTx)
pub fn safe_tx_struct_hash(record: &TransactionRecord) -> H256 {
    H256(keccak256(&encode_safe_tx(record)))
}

/// `0x19 0x01 ‖ domainSeparator ‖ structHash`, the exact pre-image signers hash
pub fn encode_typed_data(domain_separator: &H256, struct_hash: &H256) -> Vec<u8> {
    let mut data = Vec::with_capacity(2 + 32 + 32);
    data.extend_from_slice(EIP712_PREFIX);
    data.extend_from_slice(domain_separator.as_bytes());
    data.extend_from_slice(struct_hash.as_bytes());
    data
}

/// Pre-image of a record's signing hash under the given domain
pub fn encode_transaction_data(record: &TransactionRecord, domain: &SafeDomain) -> Vec<u8> {
    encode_typed_data(&domain_separator(domain), &safe_tx_struct_hash(record))
}

/// Final signing hash of a record against an already computed domain separator
pub fn transaction_hash_with_separator(record: &TransactionRecord, domain_separator: &H256) -> H256 {
    let struct_hash = safe_tx_struct_hash(record);
    H256(keccak256(&encode_typed_data(domain_separator, &struct_hash)))
}

/// Final signing hash of a record
///
/// hash = keccak256("\x19\x01" || domainSeparator || hashStruct(SafeTx))
pub fn transaction_hash(record: &TransactionRecord, domain: &SafeDomain) -> H256 {
    let hash = transaction_hash_with_separator(record, &domain_separator(domain));
    crate::log_debug!(
        "eip712",
        "transaction hash computed",
        chain_id = domain.chain_id,
        nonce = record.nonce,
        tx_hash = format!("{:?}", hash)
    );
    hash
}

/// The pre-image components (for external signers)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeTxPreImage {
    pub domain_separator: H256,
    pub struct_hash: H256,
    pub transaction_hash: H256,
}

/// Calculate the pre-image components for a record
pub fn get_pre_image(record: &TransactionRecord, domain: &SafeDomain) -> SafeTxPreImage {
    let domain_separator = domain_separator(domain);
    let struct_hash = safe_tx_struct_hash(record);
    let transaction_hash = H256(keccak256(&encode_typed_data(&domain_separator, &struct_hash)));

    SafeTxPreImage {
        domain_separator,
        struct_hash,
        transaction_hash,
    }
}

/// Signing hash of an off-chain message owned by the wallet
pub fn safe_message_hash(domain: &SafeDomain, message: &[u8]) -> H256 {
    let struct_hash = H256(keccak256(&encode_safe_message(message)));
    H256(keccak256(&encode_typed_data(&domain_separator(domain), &struct_hash)))
}

/// Hash owners sign when the wallet answers `isValidSignature(bytes32,bytes)`.
///
/// The fallback handler wraps the 32-byte data hash as the SafeMessage body.
pub fn eip1271_message_hash(domain: &SafeDomain, data_hash: &H256) -> H256 {
    safe_message_hash(domain, data_hash.as_bytes())
}
