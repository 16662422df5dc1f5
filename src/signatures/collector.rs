//! SignatureCollector: per-hash signature sets
//!
//! Each transaction hash owns one [`SignatureSet`] behind its own mutex, so
//! submissions for one hash are serialised while different hashes proceed
//! in parallel. The outer map lock is held only to find or create a set.

use super::{pack_signatures, Signature};
use crate::eip712::transaction_hash;
use crate::error::{SafeError, SafeResult};
use crate::types::{TransactionRecord, WalletConfig};
use crate::utils::checksum;
use ethers_core::types::{Address, H256};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

/// Signatures for one transaction hash, at most one per signer, kept in
/// ascending signer order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureSet {
    hash: H256,
    entries: BTreeMap<Address, Signature>,
}

impl SignatureSet {
    pub fn new(hash: H256) -> Self {
        Self {
            hash,
            entries: BTreeMap::new(),
        }
    }

    pub fn hash(&self) -> H256 {
        self.hash
    }

    /// Insert or replace; returns the replaced signature
    pub fn insert(&mut self, signature: Signature) -> Option<Signature> {
        self.entries.insert(signature.signer(), signature)
    }

    pub fn get(&self, signer: &Address) -> Option<&Signature> {
        self.entries.get(signer)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Signers in ascending order
    pub fn signers(&self) -> Vec<Address> {
        self.entries.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signature> {
        self.entries.values()
    }

    pub fn threshold_met(&self, threshold: usize) -> bool {
        self.entries.len() >= threshold
    }

    /// Packed blob in the layout `execTransaction` expects
    pub fn pack(&self, threshold: usize) -> SafeResult<Vec<u8>> {
        if !self.threshold_met(threshold) {
            return Err(SafeError::InsufficientSignatures {
                have: self.entries.len(),
                threshold,
            });
        }
        Ok(pack_signatures(self.entries.values()))
    }
}

/// Arena of signature sets for one wallet
#[derive(Debug)]
pub struct SignatureCollector {
    wallet: WalletConfig,
    sets: RwLock<HashMap<H256, Arc<Mutex<SignatureSet>>>>,
}

impl SignatureCollector {
    pub fn new(wallet: WalletConfig) -> Self {
        Self {
            wallet,
            sets: RwLock::new(HashMap::new()),
        }
    }

    pub fn wallet(&self) -> &WalletConfig {
        &self.wallet
    }

    /// Hash a record and open an empty set for it
    pub fn track(&self, record: &TransactionRecord) -> H256 {
        let hash = transaction_hash(record, &self.wallet.domain());
        self.entry(hash);
        hash
    }

    /// Parse raw signature bytes for `hash` and store them.
    ///
    /// Returns the resolved signer.
    pub fn submit(&self, hash: H256, signature: &[u8]) -> SafeResult<Address> {
        let parsed = Signature::parse(&hash, signature).map_err(|e| {
            crate::log_warn!(
                "collector",
                "signature rejected",
                hash = format!("{:?}", hash),
                reason = e.to_string()
            );
            e
        })?;
        self.insert(hash, parsed)
    }

    /// Store an already-built signature. ECDSA signers are recovered again
    /// against `hash` so a signature made for another hash cannot be filed
    /// under this one with a stale signer.
    pub fn submit_signature(&self, hash: H256, signature: Signature) -> SafeResult<Address> {
        let resolved = if signature.variant().is_ecdsa() {
            Signature::parse(&hash, &signature.to_bytes())?
        } else {
            signature
        };
        self.insert(hash, resolved)
    }

    fn insert(&self, hash: H256, signature: Signature) -> SafeResult<Address> {
        let signer = signature.signer();
        if !self.wallet.is_owner(&signer) {
            crate::log_warn!(
                "collector",
                "signature rejected",
                hash = format!("{:?}", hash),
                signer = checksum(&signer),
                reason = "not an owner"
            );
            return Err(SafeError::SignerNotOwner(checksum(&signer)));
        }

        let variant = signature.variant();
        let set = self.entry(hash);
        let mut set = lock_set(&set);
        let replaced = set.insert(signature).is_some();

        crate::log_debug!(
            "collector",
            if replaced { "signature replaced" } else { "signature accepted" },
            hash = format!("{:?}", hash),
            signer = checksum(&signer),
            variant = format!("{:?}", variant),
            collected = set.len(),
            threshold = self.wallet.threshold()
        );
        Ok(signer)
    }

    /// Pack the set for `hash`; fails below threshold
    pub fn pack(&self, hash: H256) -> SafeResult<Vec<u8>> {
        let threshold = self.wallet.threshold();
        let blob = match self.existing(&hash) {
            Some(set) => lock_set(&set).pack(threshold)?,
            None => SignatureSet::new(hash).pack(threshold)?,
        };

        crate::log_debug!(
            "collector",
            "signatures packed",
            hash = format!("{:?}", hash),
            bytes = blob.len()
        );
        Ok(blob)
    }

    pub fn threshold_met(&self, hash: H256) -> bool {
        self.existing(&hash)
            .map(|set| lock_set(&set).threshold_met(self.wallet.threshold()))
            .unwrap_or(false)
    }

    /// Signers collected so far, ascending
    pub fn signers(&self, hash: H256) -> Vec<Address> {
        self.existing(&hash)
            .map(|set| lock_set(&set).signers())
            .unwrap_or_default()
    }

    /// Point-in-time copy of one set
    pub fn snapshot(&self, hash: H256) -> Option<SignatureSet> {
        self.existing(&hash).map(|set| lock_set(&set).clone())
    }

    /// Drop a set, e.g. after execution or when its record is superseded
    pub fn discard(&self, hash: H256) -> Option<SignatureSet> {
        let removed = self
            .sets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&hash)?;
        let set = lock_set(&removed).clone();
        Some(set)
    }

    /// Hashes with an open set
    pub fn tracked(&self) -> Vec<H256> {
        self.sets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect()
    }

    fn existing(&self, hash: &H256) -> Option<Arc<Mutex<SignatureSet>>> {
        self.sets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(hash)
            .cloned()
    }

    fn entry(&self, hash: H256) -> Arc<Mutex<SignatureSet>> {
        if let Some(set) = self.existing(&hash) {
            return set;
        }
        self.sets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(hash)
            .or_insert_with(|| Arc::new(Mutex::new(SignatureSet::new(hash))))
            .clone()
    }
}

// A panic while a set is locked cannot leave it half-written: every mutation
// is a single map insert.
fn lock_set(set: &Mutex<SignatureSet>) -> MutexGuard<'_, SignatureSet> {
    set.lock().unwrap_or_else(PoisonError::into_inner)
}
