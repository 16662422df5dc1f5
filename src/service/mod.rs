//! Coordination-service shapes
//!
//! Owners rarely sign on the same machine. A coordination service relays a
//! proposed record and each owner's confirmation; this module defines what
//! is exchanged and how a fetched proposal is checked before any of its
//! signatures are trusted. Transport is left to implementors of
//! [`CoordinationService`].

mod memory;

pub use memory::*;

use crate::eip712::{transaction_hash, SafeDomain};
use crate::error::{SafeError, SafeResult};
use crate::signatures::{Signature, SignatureCollector, SignatureSet};
use crate::types::{TransactionRecord, WalletConfig};
use crate::utils::checksum;
use ethers_core::types::{Address, H256};
use serde::{Deserialize, Serialize};

/// A new record plus the proposer's own signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionProposal {
    pub safe: Address,
    #[serde(flatten)]
    pub record: TransactionRecord,
    pub contract_transaction_hash: H256,
    pub sender: Address,
    #[serde(with = "crate::serde_bytes::hex_vec")]
    pub signature: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl TransactionProposal {
    pub fn new(wallet: &WalletConfig, record: TransactionRecord, signature: &Signature) -> Self {
        let hash = transaction_hash(&record, &wallet.domain());
        Self {
            safe: wallet.verifying_contract(),
            record,
            contract_transaction_hash: hash,
            sender: signature.signer(),
            signature: signature.to_bytes(),
            origin: None,
        }
    }

    /// Free-form label of the proposing application
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Check the stated hash and that the signature is the sender's
    pub fn verify(&self, chain_id: u64) -> SafeResult<Signature> {
        let domain = SafeDomain::new(chain_id, self.safe);
        expect_hash(&self.record, &domain, self.contract_transaction_hash)?;

        let signature = Signature::parse(&self.contract_transaction_hash, &self.signature)?;
        if signature.signer() != self.sender {
            return Err(SafeError::invalid_encoding(format!(
                "signature is from {}, proposal sender is {}",
                checksum(&signature.signer()),
                checksum(&self.sender)
            )));
        }
        Ok(signature)
    }
}

/// One owner's signature as stored by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub owner: Address,
    #[serde(with = "crate::serde_bytes::hex_vec")]
    pub signature: Vec<u8>,
}

/// A proposed, not yet executed record and its confirmations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTransaction {
    pub safe: Address,
    pub chain_id: u64,
    #[serde(flatten)]
    pub record: TransactionRecord,
    pub safe_tx_hash: H256,
    #[serde(default)]
    pub confirmations: Vec<Confirmation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl PendingTransaction {
    /// Recompute the hash under `wallet`'s domain before trusting anything
    /// the service returned
    pub fn verify(&self, wallet: &WalletConfig) -> SafeResult<H256> {
        wallet.expect_chain(self.chain_id)?;
        if self.safe != wallet.verifying_contract() {
            return Err(SafeError::invalid_input(format!(
                "pending transaction belongs to {}, not {}",
                checksum(&self.safe),
                checksum(&wallet.verifying_contract())
            )));
        }
        expect_hash(&self.record, &wallet.domain(), self.safe_tx_hash)?;
        Ok(self.safe_tx_hash)
    }

    /// Confirmations that parse, match their stated owner and belong to a
    /// current owner, as a [`SignatureSet`]
    pub fn signature_set(&self, wallet: &WalletConfig) -> SafeResult<SignatureSet> {
        let hash = self.verify(wallet)?;
        let mut set = SignatureSet::new(hash);
        for confirmation in &self.confirmations {
            match resolve_confirmation(hash, confirmation) {
                Ok(signature) if wallet.is_owner(&signature.signer()) => {
                    set.insert(signature);
                }
                Ok(signature) => skip(hash, confirmation, &SafeError::SignerNotOwner(checksum(&signature.signer()))),
                Err(e) => skip(hash, confirmation, &e),
            }
        }
        Ok(set)
    }

    /// Verify, then submit every usable confirmation to `collector`.
    ///
    /// Returns the transaction hash and the owners that were accepted.
    /// Unusable confirmations are logged and skipped.
    pub fn into_collector_entries(
        self,
        collector: &SignatureCollector,
    ) -> SafeResult<(H256, Vec<Address>)> {
        let hash = self.verify(collector.wallet())?;
        collector.track(&self.record);

        let mut accepted = Vec::with_capacity(self.confirmations.len());
        for confirmation in &self.confirmations {
            let result = resolve_confirmation(hash, confirmation)
                .and_then(|signature| collector.submit_signature(hash, signature));
            match result {
                Ok(owner) => accepted.push(owner),
                Err(e) => skip(hash, confirmation, &e),
            }
        }
        Ok((hash, accepted))
    }
}

/// Transport for proposals and confirmations
pub trait CoordinationService {
    /// Store a new proposal; the proposer's signature counts as a confirmation
    fn publish(&self, proposal: TransactionProposal) -> SafeResult<()>;

    /// Pending records of `wallet`, ascending by nonce
    fn fetch_pending(&self, wallet: Address) -> SafeResult<Vec<PendingTransaction>>;

    /// Add or replace one owner's confirmation
    fn confirm(&self, hash: H256, signature: &[u8]) -> SafeResult<()>;
}

fn expect_hash(record: &TransactionRecord, domain: &SafeDomain, stated: H256) -> SafeResult<()> {
    let computed = transaction_hash(record, domain);
    if computed != stated {
        return Err(SafeError::TransactionHashMismatch {
            expected: format!("{:?}", stated),
            computed: format!("{:?}", computed),
        });
    }
    Ok(())
}

fn resolve_confirmation(hash: H256, confirmation: &Confirmation) -> SafeResult<Signature> {
    let signature = Signature::parse(&hash, &confirmation.signature)?;
    if signature.signer() != confirmation.owner {
        return Err(SafeError::invalid_encoding(format!(
            "confirmation for {} recovers to {}",
            checksum(&confirmation.owner),
            checksum(&signature.signer())
        )));
    }
    Ok(signature)
}

fn skip(hash: H256, confirmation: &Confirmation, error: &SafeError) {
    crate::log_warn!(
        "service",
        "confirmation skipped",
        hash = format!("{:?}", hash),
        owner = checksum(&confirmation.owner),
        reason = error.to_string()
    );
}

#[cfg(test)]
mod tests;
