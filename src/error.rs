//! Unified error types for the Safe multisig core
//!
//! Every fallible operation returns [`SafeResult`]. The enum variants are the
//! protocol-level failure taxonomy; [`ErrorBody`] is the serialisable form
//! handed across the FFI and CLI boundaries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for all core operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SafeError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Batch contains no transactions")]
    EmptyBatch,

    #[error("Payload too large: {size} bytes exceeds limit of {limit}")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Signer {0} is not an owner of this wallet")]
    SignerNotOwner(String),

    #[error("Invalid signature encoding: {0}")]
    InvalidSignatureEncoding(String),

    #[error("Insufficient signatures: have {have}, threshold is {threshold}")]
    InsufficientSignatures { have: usize, threshold: usize },

    #[error("Signatures are not sorted by ascending signer address (at {0})")]
    OutOfOrderSignatures(String),

    #[error("Duplicate signer: {0}")]
    DuplicateSigner(String),

    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainIdMismatch { expected: u64, actual: u64 },

    #[error("Signing unavailable: {0}")]
    SigningUnavailable(String),

    #[error("Invalid threshold: {threshold} for {owners} owners")]
    InvalidThreshold { threshold: usize, owners: usize },

    #[error("Invalid owner set: {0}")]
    InvalidOwners(String),

    #[error("Transaction hash mismatch: expected {expected}, computed {computed}")]
    TransactionHashMismatch { expected: String, computed: String },

    #[error("ABI decoding error: {0}")]
    AbiDecoding(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SafeError {
    /// Stable category for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            SafeError::InvalidAddress(_) => ErrorCode::InvalidAddress,
            SafeError::EmptyBatch => ErrorCode::EmptyBatch,
            SafeError::PayloadTooLarge { .. } => ErrorCode::PayloadTooLarge,
            SafeError::SignerNotOwner(_) => ErrorCode::SignerNotOwner,
            SafeError::InvalidSignatureEncoding(_) => ErrorCode::InvalidSignatureEncoding,
            SafeError::InsufficientSignatures { .. } => ErrorCode::InsufficientSignatures,
            SafeError::OutOfOrderSignatures(_) => ErrorCode::OutOfOrderSignatures,
            SafeError::DuplicateSigner(_) => ErrorCode::DuplicateSigner,
            SafeError::ChainIdMismatch { .. } => ErrorCode::ChainIdMismatch,
            SafeError::SigningUnavailable(_) => ErrorCode::SigningUnavailable,
            SafeError::InvalidThreshold { .. } => ErrorCode::InvalidThreshold,
            SafeError::InvalidOwners(_) => ErrorCode::InvalidOwners,
            SafeError::TransactionHashMismatch { .. } => ErrorCode::TransactionHashMismatch,
            SafeError::AbiDecoding(_) => ErrorCode::AbiDecoding,
            SafeError::InvalidInput(_) => ErrorCode::InvalidInput,
            SafeError::Config(_) => ErrorCode::Config,
        }
    }

    /// Whether waiting (for more signers) can turn this failure into success.
    ///
    /// Everything else is deterministic: retrying with the same input fails
    /// the same way.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SafeError::InsufficientSignatures { .. })
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        SafeError::InvalidInput(msg.into())
    }

    pub fn invalid_encoding(msg: impl Into<String>) -> Self {
        SafeError::InvalidSignatureEncoding(msg.into())
    }

    pub fn abi_decoding(msg: impl Into<String>) -> Self {
        SafeError::AbiDecoding(msg.into())
    }
}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Input errors
    InvalidAddress,
    InvalidInput,
    InvalidThreshold,
    InvalidOwners,
    Config,

    // Batch errors
    EmptyBatch,
    PayloadTooLarge,

    // Signature errors
    SignerNotOwner,
    InvalidSignatureEncoding,
    InsufficientSignatures,
    OutOfOrderSignatures,
    DuplicateSigner,
    SigningUnavailable,

    // Context errors
    ChainIdMismatch,
    TransactionHashMismatch,
    AbiDecoding,
}

/// Result type alias for core operations
pub type SafeResult<T> = Result<T, SafeError>;

/// Serialisable error shape used by the FFI and CLI responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<&SafeError> for ErrorBody {
    fn from(e: &SafeError) -> Self {
        Self {
            code: e.code(),
            message: e.to_string(),
            details: None,
        }
    }
}

impl From<SafeError> for ErrorBody {
    fn from(e: SafeError) -> Self {
        ErrorBody::from(&e)
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

// Conversions from common error types

impl From<serde_json::Error> for SafeError {
    fn from(e: serde_json::Error) -> Self {
        SafeError::InvalidInput(format!("JSON error: {}", e))
    }
}

impl From<hex::FromHexError> for SafeError {
    fn from(e: hex::FromHexError) -> Self {
        SafeError::InvalidInput(format!("Hex error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = SafeError::InsufficientSignatures { have: 1, threshold: 2 };
        let body = ErrorBody::from(&err).with_details("waiting for owner B");

        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("insufficient_signatures"));
        assert!(json.contains("have 1, threshold is 2"));
        assert!(json.contains("waiting for owner B"));
    }

    #[test]
    fn test_only_threshold_failures_are_recoverable() {
        assert!(SafeError::InsufficientSignatures { have: 0, threshold: 1 }.is_recoverable());
        assert!(!SafeError::EmptyBatch.is_recoverable());
        assert!(!SafeError::DuplicateSigner("0x01".into()).is_recoverable());
        assert!(!SafeError::OutOfOrderSignatures("0x01".into()).is_recoverable());
    }

    #[test]
    fn test_hex_error_conversion() {
        let err: SafeError = hex::decode("zz").unwrap_err().into();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
    }
}
