//! Crypto and encoding helpers
//!
//! Keccak hashing, EIP-55 checksums and the 32-byte word padding rules
//! shared by the hashers and encoders.

use crate::error::{SafeError, SafeResult};
use ethers_core::types::{Address, H256, U256};
use tiny_keccak::{Hasher, Keccak};

/// Keccak256 hash
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Keccak256 over several slices without concatenating them first
pub fn keccak256_concat(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Convert raw address bytes to checksummed Ethereum address
pub fn to_checksum_address(address: &[u8]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut result = String::from("0x");
    for (i, ch) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };

        if ch.is_ascii_digit() {
            result.push(ch);
        } else if nibble >= 8 {
            result.push(ch.to_ascii_uppercase());
        } else {
            result.push(ch);
        }
    }

    result
}

/// Checksummed string form of an [`Address`]
pub fn checksum(address: &Address) -> String {
    to_checksum_address(address.as_bytes())
}

/// Decode a hex string with or without the `0x` prefix
pub fn decode_hex(input: &str) -> SafeResult<Vec<u8>> {
    let trimmed = input.trim();
    let stripped = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    Ok(hex::decode(stripped)?)
}

/// Parse an address, requiring exactly 20 bytes
pub fn parse_address(input: &str) -> SafeResult<Address> {
    let bytes = decode_hex(input).map_err(|_| SafeError::InvalidAddress(input.to_string()))?;
    if bytes.len() != 20 {
        return Err(SafeError::InvalidAddress(format!(
            "{}: expected 20 bytes, got {}",
            input,
            bytes.len()
        )));
    }
    Ok(Address::from_slice(&bytes))
}

/// Parse a 32-byte hash
pub fn parse_h256(input: &str) -> SafeResult<H256> {
    let bytes = decode_hex(input)?;
    if bytes.len() != 32 {
        return Err(SafeError::invalid_input(format!(
            "expected 32-byte hash, got {} bytes",
            bytes.len()
        )));
    }
    Ok(H256::from_slice(&bytes))
}

/// Parse a uint256 from a decimal or `0x` hex string
pub fn parse_u256(input: &str) -> SafeResult<U256> {
    let trimmed = input.trim();
    if let Some(hex_part) = trimmed.strip_prefix("0x") {
        U256::from_str_radix(hex_part, 16)
            .map_err(|e| SafeError::invalid_input(format!("invalid hex uint256 {}: {}", input, e)))
    } else {
        U256::from_dec_str(trimmed)
            .map_err(|e| SafeError::invalid_input(format!("invalid uint256 {}: {}", input, e)))
    }
}

/// Address right-aligned in a 32-byte word
pub fn address_word(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

/// Big-endian uint256 word
pub fn u256_word(value: &U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

/// Big-endian word for a u64
pub fn u64_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}
