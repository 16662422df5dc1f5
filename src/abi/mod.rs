//! ABI (Application Binary Interface) encoding for the Safe contract suite
//!
//! Head/tail parameter encoding and decoding for the handful of Solidity
//! types the wallet, batch-executor and proxy-factory calls use, plus the
//! selector table of those contracts.

pub mod decoder;
pub mod encoder;
pub mod selector;
pub mod types;

pub use decoder::*;
pub use encoder::*;
pub use selector::*;
pub use types::*;
