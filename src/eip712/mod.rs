//! EIP-712 Typed Data Hashing for Safe transactions
//!
//! DomainHasher and TransactionHasher: the domain separator binds a
//! signature to one chain and one wallet, the SafeTx struct hash binds it to
//! one transaction record. Every signer signs the combination and the
//! verifier contract recomputes it bit-for-bit.
//!
//! # Reference
//! - <https://eips.ethereum.org/EIPS/eip-712>
//!
//! # Example
//! ```rust,ignore
//! use safe_multisig::eip712::{transaction_hash, SafeDomain};
//!
//! let domain = SafeDomain::new(1, safe_address);
//! let hash = transaction_hash(&record, &domain);
//! ```

pub mod encoder;
pub mod hasher;
pub mod types;

pub use encoder::*;
pub use hasher::*;
pub use types::*;
