//! ABI encoder for contract calls

use super::selector::AbiSelector;
use super::types::*;
use crate::utils::{address_word, u256_word, u64_word};

/// ABI encoder
pub struct AbiEncoder;

impl AbiEncoder {
    /// Encode the static head word or the dynamic tail of one value
    pub fn encode_value(value: &AbiValue) -> Vec<u8> {
        match value {
            AbiValue::Uint(u) => u256_word(u).to_vec(),
            AbiValue::Address(addr) => address_word(addr).to_vec(),
            AbiValue::Bool(b) => u64_word(*b as u64).to_vec(),
            AbiValue::FixedBytes(bytes) => {
                let mut result = [0u8; 32];
                let len = bytes.len().min(32);
                result[..len].copy_from_slice(&bytes[..len]);
                result.to_vec()
            }
            AbiValue::Bytes(bytes) => Self::encode_dynamic_bytes(bytes),
            AbiValue::Array(values) => Self::encode_dynamic_array(values),
        }
    }

    /// Encode multiple values as a parameter tuple
    pub fn encode(values: &[AbiValue]) -> Vec<u8> {
        // Every member of the types used here takes exactly one head word
        let head_size = values.len() * 32;

        let mut head = Vec::with_capacity(head_size);
        let mut tail = Vec::new();

        for value in values {
            if value.is_dynamic() {
                // For dynamic types, head contains offset to tail
                let offset = head_size + tail.len();
                head.extend_from_slice(&u64_word(offset as u64));
                tail.extend_from_slice(&Self::encode_value(value));
            } else {
                head.extend_from_slice(&Self::encode_value(value));
            }
        }

        head.extend_from_slice(&tail);
        head
    }

    /// Encode dynamic bytes: length word, then data right-padded to 32
    fn encode_dynamic_bytes(bytes: &[u8]) -> Vec<u8> {
        let len = bytes.len();
        let padded_len = len.div_ceil(32) * 32;

        let mut result = Vec::with_capacity(32 + padded_len);
        result.extend_from_slice(&u64_word(len as u64));
        result.extend_from_slice(bytes);
        result.resize(32 + padded_len, 0);
        result
    }

    /// Encode a dynamic array: length word, then elements as a tuple
    fn encode_dynamic_array(values: &[AbiValue]) -> Vec<u8> {
        let mut result = Vec::new();
        result.extend_from_slice(&u64_word(values.len() as u64));
        result.extend_from_slice(&Self::encode(values));
        result
    }

    /// Encode a function call (selector + parameters)
    pub fn encode_function_call(signature: &str, values: &[AbiValue]) -> Vec<u8> {
        Self::encode_with_selector(AbiSelector::selector_from_signature(signature), values)
    }

    /// Encode parameters behind an already known selector
    pub fn encode_with_selector(selector: [u8; 4], values: &[AbiValue]) -> Vec<u8> {
        let encoded = Self::encode(values);
        let mut result = Vec::with_capacity(4 + encoded.len());
        result.extend_from_slice(&selector);
        result.extend_from_slice(&encoded);
        result
    }
}
