//! Signature model, recovery and multi-signature aggregation
//!
//! Every signature shares one 65-byte header `r (32) ‖ s (32) ‖ v (1)`.
//! The marker byte `v` alone decides the variant:
//!
//! | v        | variant            | r             | s                      |
//! |----------|--------------------|---------------|------------------------|
//! | 27, 28   | `Eip712`           | ECDSA r       | ECDSA s                |
//! | 31, 32   | `EthSign`          | ECDSA r       | ECDSA s                |
//! | 1        | `ApprovedHash`     | owner address | zero                   |
//! | 0        | `ContractSignature`| owner address | byte offset of the tail|
//!
//! Contract signatures carry a dynamic tail `length (32) ‖ data` that the
//! wallet hands to the owner contract's `isValidSignature`.

mod collector;
mod packed;
mod recover;
mod signer;

#[cfg(test)]
mod tests;

pub use collector::*;
pub use packed::*;
pub use recover::*;
pub use signer::*;

use crate::error::{SafeError, SafeResult};
use crate::utils::{address_word, u256_word, u64_word};
use ethers_core::types::{Address, H256, U256};
use serde::{Deserialize, Serialize};

/// Length of the fixed signature header
pub const SIGNATURE_HEADER_LEN: usize = 65;

/// Closed set of signature kinds the wallet contract accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignatureVariant {
    Eip712,
    EthSign,
    ApprovedHash,
    ContractSignature,
}

impl SignatureVariant {
    /// Classify a header by its marker byte
    pub fn classify(v: u8) -> SafeResult<Self> {
        match v {
            0 => Ok(SignatureVariant::ContractSignature),
            1 => Ok(SignatureVariant::ApprovedHash),
            27 | 28 => Ok(SignatureVariant::Eip712),
            31 | 32 => Ok(SignatureVariant::EthSign),
            other => Err(SafeError::invalid_encoding(format!(
                "unknown signature marker byte {}",
                other
            ))),
        }
    }

    /// Whether the signer is recovered from an ECDSA signature
    pub fn is_ecdsa(self) -> bool {
        matches!(self, SignatureVariant::Eip712 | SignatureVariant::EthSign)
    }
}

/// One owner's signature over one transaction hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    signer: Address,
    variant: SignatureVariant,
    header: [u8; SIGNATURE_HEADER_LEN],
    tail: Vec<u8>,
}

impl Signature {
    /// Classify a standalone signature and resolve its signer.
    ///
    /// `bytes` is either a bare 65-byte header or, for contract signatures,
    /// a header whose `s` points at a `length ‖ data` tail in the same buffer.
    pub fn parse(hash: &H256, bytes: &[u8]) -> SafeResult<Self> {
        let entries = split_packed(bytes)?;
        match entries.as_slice() {
            [entry] => Self::from_entry(hash, entry),
            _ => Err(SafeError::invalid_encoding(format!(
                "expected one signature, found {}",
                entries.len()
            ))),
        }
    }

    /// Resolve one entry of a packed blob
    pub fn from_entry(hash: &H256, entry: &PackedEntry<'_>) -> SafeResult<Self> {
        let header = entry.header;
        let variant = SignatureVariant::classify(header[64])?;

        let signer = match variant {
            SignatureVariant::Eip712 => recover_signer(hash, &header[..64], header[64] - 27)?,
            SignatureVariant::EthSign => {
                let digest = eth_signed_message_hash(hash);
                recover_signer(&digest, &header[..64], header[64] - 31)?
            }
            SignatureVariant::ApprovedHash => {
                if header[32..64].iter().any(|b| *b != 0) {
                    return Err(SafeError::invalid_encoding(
                        "approved-hash signature must have a zero s word",
                    ));
                }
                declared_owner(header)?
            }
            SignatureVariant::ContractSignature => declared_owner(header)?,
        };

        let tail = match (variant, entry.contract_data) {
            (SignatureVariant::ContractSignature, Some(data)) => data.to_vec(),
            (SignatureVariant::ContractSignature, None) => {
                return Err(SafeError::invalid_encoding("contract signature without data"))
            }
            _ => Vec::new(),
        };

        let mut fixed = [0u8; SIGNATURE_HEADER_LEN];
        fixed.copy_from_slice(header);
        Ok(Self {
            signer,
            variant,
            header: fixed,
            tail,
        })
    }

    /// Pre-validated signature: the owner approved the hash on chain or is
    /// the account submitting the execution
    pub fn approved_hash(owner: Address) -> Self {
        let mut header = [0u8; SIGNATURE_HEADER_LEN];
        header[..32].copy_from_slice(&address_word(&owner));
        header[64] = 1;
        Self {
            signer: owner,
            variant: SignatureVariant::ApprovedHash,
            header,
            tail: Vec::new(),
        }
    }

    /// Signature of an owner that is itself a contract (EIP-1271)
    pub fn contract(owner: Address, data: Vec<u8>) -> Self {
        let mut header = [0u8; SIGNATURE_HEADER_LEN];
        header[..32].copy_from_slice(&address_word(&owner));
        header[32..64].copy_from_slice(&u64_word(SIGNATURE_HEADER_LEN as u64));
        Self {
            signer: owner,
            variant: SignatureVariant::ContractSignature,
            header,
            tail: data,
        }
    }

    pub fn signer(&self) -> Address {
        self.signer
    }

    pub fn variant(&self) -> SignatureVariant {
        self.variant
    }

    pub fn header(&self) -> &[u8; SIGNATURE_HEADER_LEN] {
        &self.header
    }

    /// Contract signature data; empty for the other variants
    pub fn tail(&self) -> &[u8] {
        &self.tail
    }

    /// Standalone encoding accepted by [`Signature::parse`]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.header.to_vec();
        if self.variant == SignatureVariant::ContractSignature {
            out.extend_from_slice(&u256_word(&U256::from(self.tail.len())));
            out.extend_from_slice(&self.tail);
        }
        out
    }
}

/// Owner address stored in the `r` word of non-ECDSA headers
fn declared_owner(header: &[u8]) -> SafeResult<Address> {
    if header[..12].iter().any(|b| *b != 0) {
        return Err(SafeError::invalid_encoding(
            "owner word has non-zero high bytes",
        ));
    }
    let owner = Address::from_slice(&header[12..32]);
    if owner.is_zero() {
        return Err(SafeError::invalid_encoding("owner word is the zero address"));
    }
    Ok(owner)
}
