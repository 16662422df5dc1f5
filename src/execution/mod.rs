//! ExecutionEncoder
//!
//! Final call data for the wallet contract: `execTransaction` with a packed
//! signature blob, single-owner `approveHash`, and the read-only getters a
//! caller needs before building a record. [`check_signatures`] mirrors the
//! contract's signature walk locally.

mod check;
mod revert;

pub use check::*;
pub use revert::*;

use crate::abi::{AbiDecoder, AbiEncoder, AbiType, AbiValue, FunctionResult, KnownSelectors};
use crate::eip712::transaction_hash;
use crate::error::{SafeError, SafeResult};
use crate::signatures::SignatureCollector;
use crate::types::{Operation, TransactionRecord, WalletConfig};
use ethers_core::types::{Address, H256, U256};

/// Parameter types of `execTransaction`, in order
const EXEC_TRANSACTION_TYPES: [AbiType; 10] = [
    AbiType::Address,
    AbiType::Uint(256),
    AbiType::Bytes,
    AbiType::Uint(8),
    AbiType::Uint(256),
    AbiType::Uint(256),
    AbiType::Uint(256),
    AbiType::Address,
    AbiType::Address,
    AbiType::Bytes,
];

/// Call-data encoder for the wallet contract
pub struct ExecutionEncoder;

impl ExecutionEncoder {
    /// `execTransaction(...)` with `signatures` as the final dynamic parameter
    pub fn exec_transaction(record: &TransactionRecord, signatures: &[u8]) -> Vec<u8> {
        let mut values = record_values(record);
        values.push(AbiValue::Bytes(signatures.to_vec()));
        AbiEncoder::encode_with_selector(KnownSelectors::EXEC_TRANSACTION, &values)
    }

    /// Pack the collected signatures for `record` and encode the execution
    pub fn execute(collector: &SignatureCollector, record: &TransactionRecord) -> SafeResult<Vec<u8>> {
        let hash = transaction_hash(record, &collector.wallet().domain());
        let signatures = collector.pack(hash)?;

        crate::log_info!(
            "execution",
            "execTransaction encoded",
            hash = format!("{:?}", hash),
            collected = collector.signers(hash).len()
        );
        Ok(Self::exec_transaction(record, &signatures))
    }

    /// Decode `execTransaction` call data; the nonce is not part of it
    pub fn decode_exec_transaction(
        call_data: &[u8],
        nonce: U256,
    ) -> SafeResult<(TransactionRecord, Vec<u8>)> {
        let values = AbiDecoder::decode_function_call(
            KnownSelectors::EXEC_TRANSACTION,
            call_data,
            &EXEC_TRANSACTION_TYPES,
        )?;

        let address = |i: usize| {
            values[i]
                .as_address()
                .ok_or_else(|| SafeError::abi_decoding(format!("parameter {} is not an address", i)))
        };
        let uint = |i: usize| {
            values[i]
                .as_uint()
                .ok_or_else(|| SafeError::abi_decoding(format!("parameter {} is not a uint", i)))
        };
        let bytes = |i: usize| {
            values[i]
                .as_bytes()
                .map(<[u8]>::to_vec)
                .ok_or_else(|| SafeError::abi_decoding(format!("parameter {} is not bytes", i)))
        };

        let operation = uint(3)?;
        if operation > U256::from(u8::MAX) {
            return Err(SafeError::abi_decoding("operation out of range"));
        }
        let operation = Operation::try_from(operation.low_u32() as u8)
            .map_err(|e| SafeError::abi_decoding(e.to_string()))?;

        let record = TransactionRecord {
            to: address(0)?,
            value: uint(1)?,
            data: bytes(2)?,
            operation,
            safe_tx_gas: uint(4)?,
            base_gas: uint(5)?,
            gas_price: uint(6)?,
            gas_token: address(7)?,
            refund_receiver: address(8)?,
            nonce,
        };
        Ok((record, bytes(9)?))
    }

    /// `approveHash(bytes32)`, sent by one owner to pre-approve on chain
    pub fn approve_hash(hash: &H256) -> Vec<u8> {
        AbiEncoder::encode_with_selector(
            KnownSelectors::APPROVE_HASH,
            &[AbiValue::FixedBytes(hash.as_bytes().to_vec())],
        )
    }

    /// `getTransactionHash(...)`: lets the contract compute the hash itself
    pub fn get_transaction_hash(record: &TransactionRecord) -> Vec<u8> {
        let mut values = record_values(record);
        values.push(AbiValue::Uint(record.nonce));
        AbiEncoder::encode_with_selector(KnownSelectors::GET_TRANSACTION_HASH, &values)
    }

    /// `isValidSignature(bytes32,bytes)` on an EIP-1271 owner contract
    pub fn is_valid_signature(hash: &H256, signature: &[u8]) -> Vec<u8> {
        AbiEncoder::encode_with_selector(
            KnownSelectors::IS_VALID_SIGNATURE,
            &[
                AbiValue::FixedBytes(hash.as_bytes().to_vec()),
                AbiValue::Bytes(signature.to_vec()),
            ],
        )
    }

    pub fn get_owners() -> Vec<u8> {
        KnownSelectors::GET_OWNERS.to_vec()
    }

    pub fn get_threshold() -> Vec<u8> {
        KnownSelectors::GET_THRESHOLD.to_vec()
    }

    pub fn nonce() -> Vec<u8> {
        KnownSelectors::NONCE.to_vec()
    }

    pub fn domain_separator() -> Vec<u8> {
        KnownSelectors::DOMAIN_SEPARATOR.to_vec()
    }
}

/// Build a [`WalletConfig`] from `getOwners()` and `getThreshold()` return data
pub fn wallet_config_from_reads(
    owners_return: &[u8],
    threshold_return: &[u8],
    chain_id: u64,
    wallet: Address,
) -> SafeResult<WalletConfig> {
    let owners = FunctionResult::address_array(owners_return)?;
    let threshold = FunctionResult::uint(threshold_return)?;
    if threshold > U256::from(u32::MAX) {
        return Err(SafeError::abi_decoding("threshold out of range"));
    }
    WalletConfig::new(owners, threshold.as_usize(), chain_id, wallet)
}

/// The nine record fields shared by `execTransaction` and `getTransactionHash`
fn record_values(record: &TransactionRecord) -> Vec<AbiValue> {
    vec![
        AbiValue::Address(record.to),
        AbiValue::Uint(record.value),
        AbiValue::Bytes(record.data.clone()),
        AbiValue::uint(record.operation.as_u8()),
        AbiValue::Uint(record.safe_tx_gas),
        AbiValue::Uint(record.base_gas),
        AbiValue::Uint(record.gas_price),
        AbiValue::Address(record.gas_token),
        AbiValue::Address(record.refund_receiver),
    ]
}
