//! Safe multisig core
//!
//! Off-chain half of an M-of-N smart-contract wallet: everything needed to
//! turn a transaction intent into call data the wallet contract accepts,
//! without touching the network.
//!
//! # Architecture
//!
//! This crate provides:
//! - **eip712**: domain separator and transaction signing hash
//! - **multisend**: packed multi-transaction batches
//! - **builder**: transaction records, including owner and module management
//! - **signatures**: signature classification, recovery, collection and packing
//! - **execution**: `execTransaction` call data and the local signature check
//! - **factory**: counterfactual wallet addresses
//! - **service**: shapes exchanged with a coordination service
//! - **ffi**: C-ABI exports
//!
//! # FFI Usage
//!
//! All public FFI functions are in the `ffi` module and follow this pattern:
//! - Input: JSON string (null-terminated C string)
//! - Output: JSON string (must be freed with `safe_free_string`)
//!
//! # Example
//!
//! ```rust,ignore
//! use safe_multisig::{SignatureCollector, TransactionBuilder, WalletConfig};
//!
//! let builder = TransactionBuilder::new(wallet.clone());
//! let record = builder.native_transfer(recipient, amount, nonce);
//!
//! let collector = SignatureCollector::new(wallet);
//! let hash = collector.track(&record);
//! collector.submit(hash, &signature_from_owner_a)?;
//! collector.submit(hash, &signature_from_owner_b)?;
//! let call_data = ExecutionEncoder::execute(&collector, &record)?;
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod utils;
pub mod serde_bytes;
pub mod abi;
pub mod eip712;
pub mod multisend;
pub mod builder;
pub mod signatures;
pub mod execution;
pub mod factory;
pub mod service;
pub mod ffi;

// Re-export key types for convenience
pub use error::{ErrorBody, ErrorCode, SafeError, SafeResult};
pub use types::*;

pub use builder::TransactionBuilder;
pub use config::{CoreConfig, SafeDeployment};
pub use eip712::{domain_separator, transaction_hash, SafeDomain};
pub use execution::{check_signatures, ExecutionEncoder, SignatureCheckReport};
pub use factory::{AddressPredictor, SafeAccountConfig};
pub use multisend::{BatchEncoder, BatchItem};
pub use signatures::{
    pack_signatures, sign_transaction_hash, LocalKeySigner, Signature, SignatureCollector,
    SignatureSet, SignatureVariant, SigningCapability, SigningMethod,
};
pub use utils::crypto::{checksum, keccak256};

// Re-export FFI functions at crate root
pub use ffi::{
    safe_check_signatures,
    safe_encode_batch,
    safe_encode_exec_transaction,
    safe_free_string,
    safe_pack_signatures,
    safe_predict_address,
    safe_transaction_hash,
};
