//! ABI decoder for contract calls and return data

use super::types::*;
use crate::error::{SafeError, SafeResult};
use ethers_core::types::{Address, U256};

fn insufficient(what: &str) -> SafeError {
    SafeError::abi_decoding(format!("Insufficient data for {}", what))
}

/// ABI decoder
pub struct AbiDecoder;

impl AbiDecoder {
    /// Decode a single value from bytes according to its type
    pub fn decode_value(data: &[u8], abi_type: &AbiType, offset: usize) -> SafeResult<AbiValue> {
        let word = Self::word(data, offset)?;

        match abi_type {
            AbiType::Uint(_) => Ok(AbiValue::Uint(U256::from_big_endian(word))),
            AbiType::Address => {
                if word[..12].iter().any(|b| *b != 0) {
                    return Err(SafeError::abi_decoding("address word has dirty high bytes"));
                }
                Ok(AbiValue::Address(Address::from_slice(&word[12..])))
            }
            AbiType::Bool => Ok(AbiValue::Bool(word[31] != 0)),
            AbiType::FixedBytes(size) => {
                let size = (*size).min(32);
                Ok(AbiValue::FixedBytes(word[..size].to_vec()))
            }
            AbiType::Bytes => Self::decode_dynamic_bytes(data, offset),
            AbiType::Array(inner) => Self::decode_dynamic_array(data, offset, inner),
        }
    }

    /// Decode multiple values (for function parameters and return values)
    pub fn decode(data: &[u8], types: &[AbiType]) -> SafeResult<Vec<AbiValue>> {
        Self::decode_tuple(data, 0, types)
    }

    /// Decode call data, checking the selector first
    pub fn decode_function_call(
        selector: [u8; 4],
        call_data: &[u8],
        types: &[AbiType],
    ) -> SafeResult<Vec<AbiValue>> {
        if call_data.len() < 4 {
            return Err(insufficient("selector"));
        }
        if call_data[..4] != selector {
            return Err(SafeError::abi_decoding(format!(
                "unexpected selector 0x{}, expected 0x{}",
                hex::encode(&call_data[..4]),
                hex::encode(selector)
            )));
        }
        Self::decode(&call_data[4..], types)
    }

    fn decode_tuple(data: &[u8], base_offset: usize, types: &[AbiType]) -> SafeResult<Vec<AbiValue>> {
        let mut values = Vec::with_capacity(types.len());
        let mut head_offset = base_offset;

        for abi_type in types {
            if abi_type.is_dynamic() {
                // For dynamic types, read offset from head
                let relative = Self::read_usize(data, head_offset, "offset")?;
                let data_offset = base_offset
                    .checked_add(relative)
                    .ok_or_else(|| SafeError::abi_decoding("offset overflow"))?;
                values.push(Self::decode_value(data, abi_type, data_offset)?);
            } else {
                values.push(Self::decode_value(data, abi_type, head_offset)?);
            }
            head_offset += 32;
        }

        Ok(values)
    }

    fn decode_dynamic_bytes(data: &[u8], offset: usize) -> SafeResult<AbiValue> {
        let length = Self::read_usize(data, offset, "length")?;
        let start = offset + 32;
        let end = start
            .checked_add(length)
            .ok_or_else(|| SafeError::abi_decoding("length overflow"))?;
        if data.len() < end {
            return Err(insufficient("bytes"));
        }
        Ok(AbiValue::Bytes(data[start..end].to_vec()))
    }

    fn decode_dynamic_array(data: &[u8], offset: usize, inner: &AbiType) -> SafeResult<AbiValue> {
        let length = Self::read_usize(data, offset, "array length")?;
        // Each element needs at least one head word
        if length > data.len() / 32 {
            return Err(insufficient("array elements"));
        }
        let element_types: Vec<AbiType> = (0..length).map(|_| inner.clone()).collect();
        Ok(AbiValue::Array(Self::decode_tuple(data, offset + 32, &element_types)?))
    }

    fn word(data: &[u8], offset: usize) -> SafeResult<&[u8]> {
        let end = offset
            .checked_add(32)
            .ok_or_else(|| SafeError::abi_decoding("offset overflow"))?;
        data.get(offset..end).ok_or_else(|| insufficient("word"))
    }

    fn read_usize(data: &[u8], offset: usize, what: &str) -> SafeResult<usize> {
        let value = U256::from_big_endian(Self::word(data, offset)?);
        if value > U256::from(u32::MAX) {
            return Err(SafeError::abi_decoding(format!("{} out of range", what)));
        }
        Ok(value.as_usize())
    }
}

/// Helpers for the read-only Safe getters
pub struct FunctionResult;

impl FunctionResult {
    /// `getOwners()` return data
    pub fn address_array(data: &[u8]) -> SafeResult<Vec<Address>> {
        let values = AbiDecoder::decode(data, &[AbiType::Array(Box::new(AbiType::Address))])?;
        values
            .first()
            .and_then(AbiValue::as_array)
            .ok_or_else(|| SafeError::abi_decoding("expected address[]"))?
            .iter()
            .map(|v| v.as_address().ok_or_else(|| SafeError::abi_decoding("expected address")))
            .collect()
    }

    /// `getThreshold()` / `nonce()` return data
    pub fn uint(data: &[u8]) -> SafeResult<U256> {
        let values = AbiDecoder::decode(data, &[AbiType::Uint(256)])?;
        values
            .first()
            .and_then(AbiValue::as_uint)
            .ok_or_else(|| SafeError::abi_decoding("expected uint256"))
    }

    /// `domainSeparator()` / `isValidSignature` return data, left-aligned
    pub fn fixed_bytes(data: &[u8], size: usize) -> SafeResult<Vec<u8>> {
        let values = AbiDecoder::decode(data, &[AbiType::FixedBytes(size)])?;
        values
            .first()
            .and_then(AbiValue::as_bytes)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| SafeError::abi_decoding("expected fixed bytes"))
    }
}
