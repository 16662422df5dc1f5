//! Owner, module, guard and token transactions
//!
//! Owner and module changes call the wallet itself. The contract keeps
//! owners and modules in singly linked lists, so removals and swaps must
//! name the element that precedes the target.

use super::{TransactionBuilder, SENTINEL_ADDRESS};
use crate::abi::{AbiEncoder, AbiValue, KnownSelectors};
use crate::error::{SafeError, SafeResult};
use crate::types::TransactionRecord;
use crate::utils::checksum;
use ethers_core::types::{Address, U256};

/// Element before `target` in a contract linked list, in `getOwners()` /
/// `getModulesPaginated()` order
pub fn previous_in_list(list: &[Address], target: &Address) -> Option<Address> {
    let index = list.iter().position(|item| item == target)?;
    Some(if index == 0 { SENTINEL_ADDRESS } else { list[index - 1] })
}

fn check_new_member(address: &Address, what: &str) -> SafeResult<()> {
    if address.is_zero() || *address == SENTINEL_ADDRESS {
        return Err(SafeError::InvalidOwners(format!(
            "{} cannot be a {}",
            checksum(address),
            what
        )));
    }
    Ok(())
}

fn check_threshold(threshold: usize, owners: usize) -> SafeResult<()> {
    if threshold == 0 || threshold > owners {
        return Err(SafeError::InvalidThreshold { threshold, owners });
    }
    Ok(())
}

impl TransactionBuilder {
    pub fn add_owner_with_threshold(
        &self,
        owner: Address,
        threshold: usize,
        nonce: U256,
    ) -> SafeResult<TransactionRecord> {
        check_new_member(&owner, "owner")?;
        if self.wallet.is_owner(&owner) {
            return Err(SafeError::InvalidOwners(format!(
                "{} is already an owner",
                checksum(&owner)
            )));
        }
        check_threshold(threshold, self.wallet.owners().len() + 1)?;

        let data = AbiEncoder::encode_with_selector(
            KnownSelectors::ADD_OWNER_WITH_THRESHOLD,
            &[AbiValue::Address(owner), AbiValue::uint(threshold)],
        );
        Ok(self.self_call(data, nonce))
    }

    pub fn remove_owner(
        &self,
        owner: Address,
        threshold: usize,
        nonce: U256,
    ) -> SafeResult<TransactionRecord> {
        let prev_owner = previous_in_list(self.wallet.owners(), &owner)
            .ok_or_else(|| SafeError::SignerNotOwner(checksum(&owner)))?;
        check_threshold(threshold, self.wallet.owners().len() - 1)?;

        let data = AbiEncoder::encode_with_selector(
            KnownSelectors::REMOVE_OWNER,
            &[
                AbiValue::Address(prev_owner),
                AbiValue::Address(owner),
                AbiValue::uint(threshold),
            ],
        );
        Ok(self.self_call(data, nonce))
    }

    pub fn swap_owner(
        &self,
        old_owner: Address,
        new_owner: Address,
        nonce: U256,
    ) -> SafeResult<TransactionRecord> {
        let prev_owner = previous_in_list(self.wallet.owners(), &old_owner)
            .ok_or_else(|| SafeError::SignerNotOwner(checksum(&old_owner)))?;
        check_new_member(&new_owner, "owner")?;
        if self.wallet.is_owner(&new_owner) {
            return Err(SafeError::InvalidOwners(format!(
                "{} is already an owner",
                checksum(&new_owner)
            )));
        }

        let data = AbiEncoder::encode_with_selector(
            KnownSelectors::SWAP_OWNER,
            &[
                AbiValue::Address(prev_owner),
                AbiValue::Address(old_owner),
                AbiValue::Address(new_owner),
            ],
        );
        Ok(self.self_call(data, nonce))
    }

    pub fn change_threshold(&self, threshold: usize, nonce: U256) -> SafeResult<TransactionRecord> {
        check_threshold(threshold, self.wallet.owners().len())?;
        let data = AbiEncoder::encode_with_selector(
            KnownSelectors::CHANGE_THRESHOLD,
            &[AbiValue::uint(threshold)],
        );
        Ok(self.self_call(data, nonce))
    }

    pub fn enable_module(&self, module: Address, nonce: U256) -> SafeResult<TransactionRecord> {
        check_new_member(&module, "module")?;
        let data = AbiEncoder::encode_with_selector(
            KnownSelectors::ENABLE_MODULE,
            &[AbiValue::Address(module)],
        );
        Ok(self.self_call(data, nonce))
    }

    /// `modules` is the currently enabled list, in contract order
    pub fn disable_module(
        &self,
        modules: &[Address],
        module: Address,
        nonce: U256,
    ) -> SafeResult<TransactionRecord> {
        let prev_module = previous_in_list(modules, &module).ok_or_else(|| {
            SafeError::invalid_input(format!("module {} is not enabled", checksum(&module)))
        })?;
        let data = AbiEncoder::encode_with_selector(
            KnownSelectors::DISABLE_MODULE,
            &[AbiValue::Address(prev_module), AbiValue::Address(module)],
        );
        Ok(self.self_call(data, nonce))
    }

    /// Zero address removes the guard
    pub fn set_guard(&self, guard: Address, nonce: U256) -> TransactionRecord {
        let data = AbiEncoder::encode_with_selector(KnownSelectors::SET_GUARD, &[AbiValue::Address(guard)]);
        self.self_call(data, nonce)
    }

    pub fn set_fallback_handler(&self, handler: Address, nonce: U256) -> TransactionRecord {
        let data = AbiEncoder::encode_with_selector(
            KnownSelectors::SET_FALLBACK_HANDLER,
            &[AbiValue::Address(handler)],
        );
        self.self_call(data, nonce)
    }

    pub fn native_transfer(&self, to: Address, amount: U256, nonce: U256) -> TransactionRecord {
        TransactionRecord::call(to, amount, Vec::new(), nonce)
    }

    pub fn erc20_transfer(
        &self,
        token: Address,
        to: Address,
        amount: U256,
        nonce: U256,
    ) -> TransactionRecord {
        let data = AbiEncoder::encode_with_selector(
            KnownSelectors::TRANSFER,
            &[AbiValue::Address(to), AbiValue::Uint(amount)],
        );
        TransactionRecord::call(token, U256::zero(), data, nonce)
    }

    /// `safeTransferFrom(wallet, to, tokenId)`
    pub fn erc721_transfer(
        &self,
        token: Address,
        to: Address,
        token_id: U256,
        nonce: U256,
    ) -> TransactionRecord {
        let data = AbiEncoder::encode_with_selector(
            KnownSelectors::SAFE_TRANSFER_FROM,
            &[
                AbiValue::Address(self.wallet.verifying_contract()),
                AbiValue::Address(to),
                AbiValue::Uint(token_id),
            ],
        );
        TransactionRecord::call(token, U256::zero(), data, nonce)
    }

    /// Empty self-call that consumes `nonce`, cancelling whatever else was
    /// proposed at that nonce
    pub fn rejection(&self, nonce: U256) -> TransactionRecord {
        self.self_call(Vec::new(), nonce)
    }
}
