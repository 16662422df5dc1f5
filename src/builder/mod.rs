//! Transaction builder
//!
//! Turns intents into fully-specified [`TransactionRecord`]s for one wallet:
//! protocol defaults are filled in, batches are routed through the
//! batch-executor, and management calls target the wallet itself.

mod management;

pub use management::*;

use crate::config::SafeDeployment;
use crate::eip712::{get_pre_image, transaction_hash, SafeTxPreImage};
use crate::error::SafeResult;
use crate::multisend::{multi_send_call_data, BatchEncoder, BatchExecutor, BatchItem};
use crate::types::{Operation, TransactionRecord, TransactionRequest, WalletConfig};
use ethers_core::types::{Address, H160, H256, U256};

/// Head of the owner and module linked lists in the wallet contract
pub const SENTINEL_ADDRESS: Address = H160([
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x01,
]);

/// Transaction builder bound to one wallet snapshot
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    wallet: WalletConfig,
    deployment: SafeDeployment,
    batch_encoder: BatchEncoder,
}

impl TransactionBuilder {
    pub fn new(wallet: WalletConfig) -> Self {
        Self {
            wallet,
            deployment: SafeDeployment::default(),
            batch_encoder: BatchEncoder::default(),
        }
    }

    /// Use another release's batch-executor addresses
    pub fn deployment(mut self, deployment: SafeDeployment) -> Self {
        self.deployment = deployment;
        self
    }

    pub fn batch_encoder(mut self, encoder: BatchEncoder) -> Self {
        self.batch_encoder = encoder;
        self
    }

    pub fn wallet(&self) -> &WalletConfig {
        &self.wallet
    }

    /// Fill protocol defaults; `current_nonce` is used when the request has none
    pub fn build(&self, request: TransactionRequest, current_nonce: U256) -> TransactionRecord {
        TransactionRecord {
            to: request.to,
            value: request.value.unwrap_or_default(),
            data: request.data,
            operation: request.operation.unwrap_or_default(),
            safe_tx_gas: request.safe_tx_gas.unwrap_or_default(),
            base_gas: request.base_gas.unwrap_or_default(),
            gas_price: request.gas_price.unwrap_or_default(),
            gas_token: request.gas_token.unwrap_or_default(),
            refund_receiver: request.refund_receiver.unwrap_or_default(),
            nonce: request.nonce.unwrap_or(current_nonce),
        }
    }

    /// Compile a batch to one delegate call into the narrowest executor
    pub fn batch(&self, items: &[BatchItem], nonce: U256) -> SafeResult<TransactionRecord> {
        self.batch_via(items, BatchExecutor::for_items(items), nonce)
    }

    /// Compile a batch against an explicitly chosen executor
    pub fn batch_via(
        &self,
        items: &[BatchItem],
        executor: BatchExecutor,
        nonce: U256,
    ) -> SafeResult<TransactionRecord> {
        let payload = self.batch_encoder.encode_for(items, executor)?;
        let request = TransactionRequest::new(executor.address(&self.deployment))
            .data(multi_send_call_data(&payload))
            .operation(Operation::DelegateCall);

        crate::log_debug!(
            "builder",
            "batch compiled",
            items = items.len(),
            kind = format!("{:?}", executor)
        );
        Ok(self.build(request, nonce))
    }

    /// Signing hash of a record under this wallet's domain
    pub fn hash(&self, record: &TransactionRecord) -> H256 {
        transaction_hash(record, &self.wallet.domain())
    }

    pub fn pre_image(&self, record: &TransactionRecord) -> SafeTxPreImage {
        get_pre_image(record, &self.wallet.domain())
    }

    /// A record with the wallet itself as target
    fn self_call(&self, data: Vec<u8>, nonce: U256) -> TransactionRecord {
        TransactionRecord::call(self.wallet.verifying_contract(), U256::zero(), data, nonce)
    }
}
