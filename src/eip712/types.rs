//! EIP-712 Type Definitions
//!
//! The three struct types a Safe signs over, their canonical type strings
//! and the signing domain.

use crate::error::SafeResult;
use crate::utils::{keccak256, parse_address};
use ethers_core::types::Address;
use serde::{Deserialize, Serialize};

/// A field in a struct type definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedDataField {
    pub name: &'static str,
    pub type_name: &'static str,
}

const fn field(type_name: &'static str, name: &'static str) -> TypedDataField {
    TypedDataField { name, type_name }
}

pub const DOMAIN_TYPE_NAME: &str = "EIP712Domain";
pub const SAFE_TX_TYPE_NAME: &str = "SafeTx";
pub const SAFE_MESSAGE_TYPE_NAME: &str = "SafeMessage";

/// Safe domains carry only chain id and verifying contract (no name/version)
pub const DOMAIN_FIELDS: &[TypedDataField] = &[
    field("uint256", "chainId"),
    field("address", "verifyingContract"),
];

/// Field order here is the order the verifier hashes them in
pub const SAFE_TX_FIELDS: &[TypedDataField] = &[
    field("address", "to"),
    field("uint256", "value"),
    field("bytes", "data"),
    field("uint8", "operation"),
    field("uint256", "safeTxGas"),
    field("uint256", "baseGas"),
    field("uint256", "gasPrice"),
    field("address", "gasToken"),
    field("address", "refundReceiver"),
    field("uint256", "nonce"),
];

pub const SAFE_MESSAGE_FIELDS: &[TypedDataField] = &[field("bytes", "message")];

/// keccak256("EIP712Domain(uint256 chainId,address verifyingContract)")
pub const DOMAIN_SEPARATOR_TYPEHASH: [u8; 32] = [
    0x47, 0xe7, 0x95, 0x34, 0xa2, 0x45, 0x95, 0x2e, 0x8b, 0x16, 0x89, 0x3a, 0x33, 0x6b, 0x85, 0xa3,
    0xd9, 0xea, 0x9f, 0xa8, 0xc5, 0x73, 0xf3, 0xd8, 0x03, 0xaf, 0xb9, 0x2a, 0x79, 0x46, 0x92, 0x18,
];

/// keccak256 of the SafeTx type string
pub const SAFE_TX_TYPEHASH: [u8; 32] = [
    0xbb, 0x83, 0x10, 0xd4, 0x86, 0x36, 0x8d, 0xb6, 0xbd, 0x6f, 0x84, 0x94, 0x02, 0xfd, 0xd7, 0x3a,
    0xd5, 0x3d, 0x31, 0x6b, 0x5a, 0x4b, 0x26, 0x44, 0xad, 0x6e, 0xfe, 0x0f, 0x94, 0x12, 0x86, 0xd8,
];

/// keccak256("SafeMessage(bytes message)")
pub const SAFE_MESSAGE_TYPEHASH: [u8; 32] = [
    0x60, 0xb3, 0xcb, 0xf8, 0xb4, 0xa2, 0x23, 0xd6, 0x8d, 0x64, 0x1b, 0x3b, 0x6d, 0xdf, 0x9a, 0x29,
    0x8e, 0x7f, 0x33, 0x71, 0x0c, 0xf3, 0xd3, 0xa9, 0xd1, 0x14, 0x6b, 0x5a, 0x61, 0x50, 0xfb, 0xca,
];

/// Format a type string
/// Format: "TypeName(type1 name1,type2 name2,...)"
pub fn encode_type(type_name: &str, fields: &[TypedDataField]) -> String {
    let field_strs: Vec<String> = fields
        .iter()
        .map(|f| format!("{} {}", f.type_name, f.name))
        .collect();

    format!("{}({})", type_name, field_strs.join(","))
}

/// typeHash = keccak256(encodeType(typeOf(s)))
pub fn type_hash(type_name: &str, fields: &[TypedDataField]) -> [u8; 32] {
    keccak256(encode_type(type_name, fields).as_bytes())
}

/// The signing domain of one wallet instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeDomain {
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl SafeDomain {
    pub fn new(chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            chain_id,
            verifying_contract,
        }
    }

    /// Build a domain from a textual address, failing with `InvalidAddress`
    /// unless it decodes to exactly 20 bytes
    pub fn parse(chain_id: u64, verifying_contract: &str) -> SafeResult<Self> {
        Ok(Self::new(chain_id, parse_address(verifying_contract)?))
    }
}
