//! Local signature check
//!
//! Walks a packed blob the way the wallet contract does before spending gas
//! on `execTransaction`. The result is advisory: approved hashes and
//! contract signatures depend on chain state, and only the contract's own
//! check is authoritative.

use crate::eip712::transaction_hash;
use crate::error::{SafeError, SafeResult};
use crate::signatures::{split_packed, Signature, SignatureVariant};
use crate::types::{TransactionRecord, WalletConfig};
use crate::utils::checksum;
use ethers_core::types::{Address, H256};
use serde::Serialize;

/// Calls `isValidSignature` on an owner that is a contract.
///
/// Implemented by whatever talks to a node; the core never does I/O.
pub trait ContractSignatureValidator {
    fn is_valid_signature(&self, owner: Address, hash: &H256, signature: &[u8]) -> SafeResult<bool>;
}

/// Outcome of a passing local check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureCheckReport {
    pub transaction_hash: H256,
    /// Signers in packed order
    pub signers: Vec<Address>,
    /// Entries whose validity only the chain can confirm
    pub unverified: Vec<Address>,
    pub threshold: usize,
}

impl SignatureCheckReport {
    pub fn fully_verified(&self) -> bool {
        self.unverified.is_empty()
    }
}

/// Recompute the hash of `record` and check `packed` against it
pub fn check_signatures(
    wallet: &WalletConfig,
    record: &TransactionRecord,
    packed: &[u8],
    validator: Option<&dyn ContractSignatureValidator>,
) -> SafeResult<SignatureCheckReport> {
    let hash = transaction_hash(record, &wallet.domain());
    check_signatures_for_hash(wallet, hash, packed, validator)
}

/// Check `packed` against an already computed transaction hash
pub fn check_signatures_for_hash(
    wallet: &WalletConfig,
    hash: H256,
    packed: &[u8],
    validator: Option<&dyn ContractSignatureValidator>,
) -> SafeResult<SignatureCheckReport> {
    let entries = split_packed(packed)?;
    if entries.len() < wallet.threshold() {
        return Err(SafeError::InsufficientSignatures {
            have: entries.len(),
            threshold: wallet.threshold(),
        });
    }

    let mut signers: Vec<Address> = Vec::with_capacity(entries.len());
    let mut unverified = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let signature = Signature::from_entry(&hash, entry)?;
        let signer = signature.signer();

        if let Some(previous) = signers.last() {
            if signer == *previous {
                return Err(SafeError::DuplicateSigner(checksum(&signer)));
            }
            if signer < *previous {
                crate::log_warn!(
                    "execution",
                    "signature blob out of order",
                    index = index,
                    signer = checksum(&signer)
                );
                return Err(SafeError::OutOfOrderSignatures(checksum(&signer)));
            }
        }

        if !wallet.is_owner(&signer) {
            return Err(SafeError::SignerNotOwner(checksum(&signer)));
        }

        match (signature.variant(), validator) {
            (SignatureVariant::ContractSignature, Some(validator)) => {
                if !validator.is_valid_signature(signer, &hash, signature.tail())? {
                    return Err(SafeError::invalid_encoding(format!(
                        "contract owner {} rejected its signature",
                        checksum(&signer)
                    )));
                }
            }
            (SignatureVariant::ContractSignature, None) | (SignatureVariant::ApprovedHash, _) => {
                unverified.push(signer)
            }
            _ => {}
        }

        signers.push(signer);
    }

    crate::log_debug!(
        "execution",
        "local signature check passed",
        hash = format!("{:?}", hash),
        collected = signers.len(),
        unverified = unverified.len()
    );

    Ok(SignatureCheckReport {
        transaction_hash: hash,
        signers,
        unverified,
        threshold: wallet.threshold(),
    })
}
