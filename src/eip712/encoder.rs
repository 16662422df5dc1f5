//! EIP-712 Struct Encoding
//!
//! Implements `encodeData` for the fixed set of value kinds Safe structs
//! use: every member becomes one 32-byte word, dynamic `bytes` members are
//! replaced by their keccak256 digest.

use super::types::*;
use crate::eip712::SafeDomain;
use crate::types::TransactionRecord;
use crate::utils::{address_word, keccak256, u256_word, u64_word};
use ethers_core::types::{Address, U256};

/// One struct member value, tagged by its EIP-712 encoding rule
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Address(&'a Address),
    Uint(&'a U256),
    Uint8(u8),
    Uint64(u64),
    Bytes(&'a [u8]),
}

/// Encode a single member to its 32-byte word
pub fn encode_field(value: &FieldValue<'_>) -> [u8; 32] {
    match value {
        FieldValue::Address(address) => address_word(address),
        FieldValue::Uint(v) => u256_word(v),
        FieldValue::Uint8(v) => u64_word(*v as u64),
        FieldValue::Uint64(v) => u64_word(*v),
        FieldValue::Bytes(data) => keccak256(data),
    }
}

/// typeHash ‖ encodeData(s)
pub fn encode_struct(type_hash: &[u8; 32], values: &[FieldValue<'_>]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(32 * (values.len() + 1));
    encoded.extend_from_slice(type_hash);
    for value in values {
        encoded.extend_from_slice(&encode_field(value));
    }
    encoded
}

/// Struct encoding of the domain
pub fn encode_domain(domain: &SafeDomain) -> Vec<u8> {
    encode_struct(
        &DOMAIN_SEPARATOR_TYPEHASH,
        &[
            FieldValue::Uint64(domain.chain_id),
            FieldValue::Address(&domain.verifying_contract),
        ],
    )
}

/// Struct encoding of a transaction record, members in `SAFE_TX_FIELDS` order
pub fn encode_safe_tx(record: &TransactionRecord) -> Vec<u8> {
    encode_struct(
        &SAFE_TX_TYPEHASH,
        &[
            FieldValue::Address(&record.to),
            FieldValue::Uint(&record.value),
            FieldValue::Bytes(&record.data),
            FieldValue::Uint8(record.operation.as_u8()),
            FieldValue::Uint(&record.safe_tx_gas),
            FieldValue::Uint(&record.base_gas),
            FieldValue::Uint(&record.gas_price),
            FieldValue::Address(&record.gas_token),
            FieldValue::Address(&record.refund_receiver),
            FieldValue::Uint(&record.nonce),
        ],
    )
}

/// Struct encoding of a SafeMessage
pub fn encode_safe_message(message: &[u8]) -> Vec<u8> {
    encode_struct(&SAFE_MESSAGE_TYPEHASH, &[FieldValue::Bytes(message)])
}
