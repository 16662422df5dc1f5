//! In-process [`CoordinationService`]

use super::{Confirmation, CoordinationService, PendingTransaction, TransactionProposal};
use crate::error::{SafeError, SafeResult};
use crate::signatures::Signature;
use crate::utils::checksum;
use ethers_core::types::{Address, H256};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Keeps pending transactions per wallet for one chain
#[derive(Debug)]
pub struct InMemoryCoordinationService {
    chain_id: u64,
    pending: Mutex<HashMap<Address, Vec<PendingTransaction>>>,
}

impl InMemoryCoordinationService {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Drop a transaction once it has executed
    pub fn remove(&self, hash: H256) -> Option<PendingTransaction> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.values_mut().find_map(|list| {
            let index = list.iter().position(|tx| tx.safe_tx_hash == hash)?;
            Some(list.remove(index))
        })
    }
}

fn add_confirmation(tx: &mut PendingTransaction, signature: &Signature) {
    let confirmation = Confirmation {
        owner: signature.signer(),
        signature: signature.to_bytes(),
    };
    match tx.confirmations.iter_mut().find(|c| c.owner == confirmation.owner) {
        Some(existing) => *existing = confirmation,
        None => tx.confirmations.push(confirmation),
    }
}

impl CoordinationService for InMemoryCoordinationService {
    fn publish(&self, proposal: TransactionProposal) -> SafeResult<()> {
        let signature = proposal.verify(self.chain_id)?;
        let hash = proposal.contract_transaction_hash;

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let list = pending.entry(proposal.safe).or_default();

        match list.iter_mut().find(|tx| tx.safe_tx_hash == hash) {
            Some(existing) => add_confirmation(existing, &signature),
            None => {
                let mut tx = PendingTransaction {
                    safe: proposal.safe,
                    chain_id: self.chain_id,
                    record: proposal.record,
                    safe_tx_hash: hash,
                    confirmations: Vec::new(),
                    origin: proposal.origin,
                };
                add_confirmation(&mut tx, &signature);
                list.push(tx);
            }
        }

        crate::log_info!(
            "service",
            "proposal published",
            safe_address = checksum(&proposal.safe),
            hash = format!("{:?}", hash),
            sender = checksum(&proposal.sender)
        );
        Ok(())
    }

    fn fetch_pending(&self, wallet: Address) -> SafeResult<Vec<PendingTransaction>> {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let mut list = pending.get(&wallet).cloned().unwrap_or_default();
        list.sort_by_key(|tx| tx.record.nonce);
        Ok(list)
    }

    fn confirm(&self, hash: H256, signature: &[u8]) -> SafeResult<()> {
        let signature = Signature::parse(&hash, signature)?;

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = pending
            .values_mut()
            .flat_map(|list| list.iter_mut())
            .find(|tx| tx.safe_tx_hash == hash)
            .ok_or_else(|| SafeError::invalid_input(format!("unknown transaction hash {:?}", hash)))?;

        add_confirmation(tx, &signature);
        crate::log_debug!(
            "service",
            "confirmation stored",
            hash = format!("{:?}", hash),
            owner = checksum(&signature.signer()),
            confirmations = tx.confirmations.len()
        );
        Ok(())
    }
}
