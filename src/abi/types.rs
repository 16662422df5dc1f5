//! ABI type definitions for the contract calls a Safe needs

use ethers_core::types::{Address, U256};
use std::fmt;

/// The Solidity types that appear in Safe, MultiSend and factory calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiType {
    /// uintN, N in bits
    Uint(usize),
    Address,
    Bool,
    /// bytesN, N in bytes
    FixedBytes(usize),
    Bytes,
    /// Dynamic array T[]
    Array(Box<AbiType>),
}

impl AbiType {
    /// Check if the type is dynamic (requires offset encoding)
    pub fn is_dynamic(&self) -> bool {
        matches!(self, AbiType::Bytes | AbiType::Array(_))
    }

    /// Canonical type name as used in function signatures
    pub fn canonical_type(&self) -> String {
        match self {
            AbiType::Uint(bits) => format!("uint{}", bits),
            AbiType::Address => "address".to_string(),
            AbiType::Bool => "bool".to_string(),
            AbiType::FixedBytes(size) => format!("bytes{}", size),
            AbiType::Bytes => "bytes".to_string(),
            AbiType::Array(inner) => format!("{}[]", inner.canonical_type()),
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_type())
    }
}

/// ABI value - runtime representation of Solidity values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Uint(U256),
    Address(Address),
    Bool(bool),
    /// Left-aligned, at most 32 bytes
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    Array(Vec<AbiValue>),
}

impl AbiValue {
    pub fn uint(value: impl Into<U256>) -> Self {
        AbiValue::Uint(value.into())
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, AbiValue::Bytes(_) | AbiValue::Array(_))
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            AbiValue::Address(address) => Some(*address),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            AbiValue::Uint(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AbiValue::Bytes(bytes) | AbiValue::FixedBytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::Array(values) => Some(values),
            _ => None,
        }
    }
}

impl From<Address> for AbiValue {
    fn from(address: Address) -> Self {
        AbiValue::Address(address)
    }
}

impl From<U256> for AbiValue {
    fn from(value: U256) -> Self {
        AbiValue::Uint(value)
    }
}

impl From<Vec<u8>> for AbiValue {
    fn from(bytes: Vec<u8>) -> Self {
        AbiValue::Bytes(bytes)
    }
}

impl From<bool> for AbiValue {
    fn from(value: bool) -> Self {
        AbiValue::Bool(value)
    }
}
