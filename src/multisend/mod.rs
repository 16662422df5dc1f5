//! MultiSend batch encoding
//!
//! A batch packs several sub-transactions into one payload that the
//! batch-executor contract walks in order, reverting the whole batch if any
//! sub-call reverts. Items are byte-packed, never word-aligned:
//!
//! ```text
//! operation (1) ‖ to (20) ‖ value (32) ‖ data length (32) ‖ data
//! ```

mod encoder;

pub use encoder::*;

use crate::types::Operation;
use ethers_core::types::{Address, U256};
use serde::{Deserialize, Serialize};

/// One element of a multi-transaction batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    #[serde(default)]
    pub operation: Operation,
    pub to: Address,
    #[serde(default)]
    pub value: U256,
    #[serde(with = "crate::serde_bytes::hex_vec_default", default)]
    pub data: Vec<u8>,
}

impl BatchItem {
    pub fn call(to: Address, value: U256, data: Vec<u8>) -> Self {
        Self {
            operation: Operation::Call,
            to,
            value,
            data,
        }
    }

    pub fn delegate_call(to: Address, data: Vec<u8>) -> Self {
        Self {
            operation: Operation::DelegateCall,
            to,
            value: U256::zero(),
            data,
        }
    }

    /// Packed size of this item
    pub fn encoded_len(&self) -> usize {
        ITEM_HEADER_LEN + self.data.len()
    }
}

/// Fixed part of each packed item
pub const ITEM_HEADER_LEN: usize = 1 + 20 + 32 + 32;

/// Which batch-executor deployment a batch targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BatchExecutor {
    /// Accepts Call and DelegateCall items
    MultiSend,
    /// Rejects DelegateCall items on chain
    MultiSendCallOnly,
}

impl BatchExecutor {
    /// Narrowest executor able to run every item
    pub fn for_items(items: &[BatchItem]) -> Self {
        if items.iter().any(|item| item.operation == Operation::DelegateCall) {
            BatchExecutor::MultiSend
        } else {
            BatchExecutor::MultiSendCallOnly
        }
    }

    pub fn address(self, deployment: &crate::config::SafeDeployment) -> Address {
        match self {
            BatchExecutor::MultiSend => deployment.multi_send,
            BatchExecutor::MultiSendCallOnly => deployment.multi_send_call_only,
        }
    }
}
