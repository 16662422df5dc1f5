//! Shared types for the Safe multisig core
//!
//! All data structures that cross module boundaries are defined here
//! for consistent serialization and FFI compatibility.

use crate::eip712::SafeDomain;
use crate::error::{ErrorBody, SafeError, SafeResult};
use crate::utils::checksum;
use ethers_core::types::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// =============================================================================
// Transaction Types
// =============================================================================

/// How the wallet invokes the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Operation {
    #[default]
    Call = 0,
    DelegateCall = 1,
}

impl Operation {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Operation {
    type Error = SafeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Operation::Call),
            1 => Ok(Operation::DelegateCall),
            other => Err(SafeError::invalid_input(format!("unknown operation {}", other))),
        }
    }
}

impl Serialize for Operation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u8::deserialize(deserializer)?;
        Operation::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// A fully-specified wallet transaction.
///
/// Every field participates in the signing hash, so a record is never
/// mutated after it has been hashed: changing anything means building a new
/// record and collecting a fresh set of signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub to: Address,
    pub value: U256,
    #[serde(with = "crate::serde_bytes::hex_vec_default", default)]
    pub data: Vec<u8>,
    pub operation: Operation,
    pub safe_tx_gas: U256,
    pub base_gas: U256,
    pub gas_price: U256,
    pub gas_token: Address,
    pub refund_receiver: Address,
    pub nonce: U256,
}

impl TransactionRecord {
    /// A plain call with every gas/refund field at its default
    pub fn call(to: Address, value: U256, data: Vec<u8>, nonce: U256) -> Self {
        Self {
            to,
            value,
            data,
            operation: Operation::Call,
            safe_tx_gas: U256::zero(),
            base_gas: U256::zero(),
            gas_price: U256::zero(),
            gas_token: Address::zero(),
            refund_receiver: Address::zero(),
            nonce,
        }
    }
}

/// A transaction intent before protocol defaults are filled in
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub to: Address,
    #[serde(default)]
    pub value: Option<U256>,
    #[serde(with = "crate::serde_bytes::hex_vec_default", default)]
    pub data: Vec<u8>,
    #[serde(default)]
    pub operation: Option<Operation>,
    #[serde(default)]
    pub safe_tx_gas: Option<U256>,
    #[serde(default)]
    pub base_gas: Option<U256>,
    #[serde(default)]
    pub gas_price: Option<U256>,
    #[serde(default)]
    pub gas_token: Option<Address>,
    #[serde(default)]
    pub refund_receiver: Option<Address>,
    #[serde(default)]
    pub nonce: Option<U256>,
}

impl TransactionRequest {
    pub fn new(to: Address) -> Self {
        Self {
            to,
            ..Default::default()
        }
    }

    pub fn value(mut self, value: impl Into<U256>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    pub fn operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    pub fn nonce(mut self, nonce: impl Into<U256>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    pub fn refund(mut self, gas_price: U256, gas_token: Address, refund_receiver: Address) -> Self {
        self.gas_price = Some(gas_price);
        self.gas_token = Some(gas_token);
        self.refund_receiver = Some(refund_receiver);
        self
    }

    pub fn gas(mut self, safe_tx_gas: U256, base_gas: U256) -> Self {
        self.safe_tx_gas = Some(safe_tx_gas);
        self.base_gas = Some(base_gas);
        self
    }
}

// =============================================================================
// Wallet Types
// =============================================================================

/// Owner set, threshold and signing domain of one wallet instance.
///
/// This is a caller-held snapshot. Owner or threshold changes only take
/// effect on chain after the transaction that makes them executes; records
/// built against a stale snapshot may fail on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "WalletConfigInput")]
pub struct WalletConfig {
    owners: Vec<Address>,
    threshold: usize,
    chain_id: u64,
    verifying_contract: Address,
}

/// Unvalidated wire form of a [`WalletConfig`]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletConfigInput {
    pub owners: Vec<Address>,
    pub threshold: usize,
    pub chain_id: u64,
    pub verifying_contract: String,
}

impl WalletConfigInput {
    /// Fails with `InvalidAddress` for a malformed verifying contract, then
    /// with the owner and threshold errors of [`WalletConfig::new`]
    pub fn into_config(self) -> SafeResult<WalletConfig> {
        let domain = SafeDomain::parse(self.chain_id, &self.verifying_contract)?;
        WalletConfig::new(self.owners, self.threshold, domain.chain_id, domain.verifying_contract)
    }
}

impl TryFrom<WalletConfigInput> for WalletConfig {
    type Error = SafeError;

    fn try_from(input: WalletConfigInput) -> SafeResult<Self> {
        input.into_config()
    }
}

impl WalletConfig {
    pub fn new(
        owners: Vec<Address>,
        threshold: usize,
        chain_id: u64,
        verifying_contract: Address,
    ) -> SafeResult<Self> {
        let config = Self {
            owners,
            threshold,
            chain_id,
            verifying_contract,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check owner-set and threshold invariants
    pub fn validate(&self) -> SafeResult<()> {
        validate_owners(&self.owners, self.threshold)
    }

    pub fn owners(&self) -> &[Address] {
        &self.owners
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn verifying_contract(&self) -> Address {
        self.verifying_contract
    }

    pub fn is_owner(&self, address: &Address) -> bool {
        self.owners.contains(address)
    }

    /// Signing domain of this wallet
    pub fn domain(&self) -> SafeDomain {
        SafeDomain::new(self.chain_id, self.verifying_contract)
    }

    /// Fail with `ChainIdMismatch` unless `chain_id` is this wallet's chain
    pub fn expect_chain(&self, chain_id: u64) -> SafeResult<()> {
        if chain_id != self.chain_id {
            return Err(SafeError::ChainIdMismatch {
                expected: self.chain_id,
                actual: chain_id,
            });
        }
        Ok(())
    }
}

/// Shared owner-set validation used by wallet configs and deployment configs
pub fn validate_owners(owners: &[Address], threshold: usize) -> SafeResult<()> {
    if owners.is_empty() {
        return Err(SafeError::InvalidOwners("at least one owner required".into()));
    }

    let mut seen = HashSet::with_capacity(owners.len());
    for owner in owners {
        if owner.is_zero() || *owner == crate::builder::SENTINEL_ADDRESS {
            return Err(SafeError::InvalidOwners(format!(
                "{} cannot be an owner",
                checksum(owner)
            )));
        }
        if !seen.insert(*owner) {
            return Err(SafeError::InvalidOwners(format!(
                "duplicate owner {}",
                checksum(owner)
            )));
        }
    }

    if threshold == 0 || threshold > owners.len() {
        return Err(SafeError::InvalidThreshold {
            threshold,
            owners: owners.len(),
        });
    }

    Ok(())
}

// =============================================================================
// Response Types
// =============================================================================

/// Generic API response wrapper used by the FFI and CLI surfaces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorBody>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: impl Into<ErrorBody>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"success":false,"error":{"code":"invalid_input","message":"Serialization failed"}}"#.to_string()
        })
    }
}
