//! Signing capability
//!
//! The core never stores keys. Callers inject a [`SigningCapability`]; the
//! local secp256k1 implementation exists for tooling and tests.

use super::{eth_signed_message_hash, public_key_to_address, Signature};
use crate::error::{SafeError, SafeResult};
use crate::utils::{checksum, decode_hex};
use ethers_core::types::{Address, H256};
use rand::RngCore;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

/// Produces raw 65-byte `r ‖ s ‖ v` signatures over a digest
pub trait SigningCapability: Send + Sync {
    /// Address the produced signatures recover to
    fn address(&self) -> Address;

    /// Sign a 32-byte digest; fails with `SigningUnavailable`
    fn sign_digest(&self, digest: &H256) -> SafeResult<[u8; 65]>;
}

/// How an owner signs a transaction hash
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SigningMethod {
    /// Sign the typed-data hash directly
    #[default]
    Eip712,
    /// Sign the EIP-191 personal-message digest of the hash
    EthSign,
}

/// Sign `hash` with `signer` and classify the result
pub fn sign_transaction_hash(
    signer: &dyn SigningCapability,
    hash: &H256,
    method: SigningMethod,
) -> SafeResult<Signature> {
    let mut raw = match method {
        SigningMethod::Eip712 => signer.sign_digest(hash)?,
        SigningMethod::EthSign => signer.sign_digest(&eth_signed_message_hash(hash))?,
    };

    // Some signers return the bare recovery id
    raw[64] = match raw[64] {
        v @ (0 | 1) => v + 27,
        v @ (27 | 28) => v,
        v => {
            return Err(SafeError::SigningUnavailable(format!(
                "signer returned recovery id {}",
                v
            )))
        }
    };
    if method == SigningMethod::EthSign {
        raw[64] += 4;
    }

    let signature = Signature::parse(hash, &raw)?;
    if signature.signer() != signer.address() {
        return Err(SafeError::SigningUnavailable(format!(
            "signature recovers to {}, expected {}",
            checksum(&signature.signer()),
            checksum(&signer.address())
        )));
    }

    crate::log_debug!(
        "signatures",
        "hash signed",
        signer = checksum(&signer.address()),
        hash = format!("{:?}", hash),
        method = format!("{:?}", method)
    );
    Ok(signature)
}

/// In-process secp256k1 key. The secret is zeroed on drop.
pub struct LocalKeySigner {
    secret: Zeroizing<[u8; 32]>,
    address: Address,
}

impl LocalKeySigner {
    pub fn from_bytes(bytes: &[u8]) -> SafeResult<Self> {
        if bytes.len() != 32 {
            return Err(SafeError::invalid_input(format!(
                "private key must be 32 bytes, got {}",
                bytes.len()
            )));
        }

        let secp = Secp256k1::new();
        let secret_key =
            SecretKey::from_slice(bytes).map_err(|e| SafeError::invalid_input(e.to_string()))?;
        let address = public_key_to_address(&PublicKey::from_secret_key(&secp, &secret_key));

        let mut secret = Zeroizing::new([0u8; 32]);
        secret.copy_from_slice(bytes);
        Ok(Self { secret, address })
    }

    /// Parse a hex private key with or without `0x`
    pub fn from_hex(private_key: &str) -> SafeResult<Self> {
        let bytes = Zeroizing::new(decode_hex(private_key)?);
        Self::from_bytes(&bytes)
    }

    /// Fresh random key
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let mut candidate = Zeroizing::new([0u8; 32]);
            rng.fill_bytes(&mut *candidate);
            if let Ok(signer) = Self::from_bytes(&*candidate) {
                return signer;
            }
        }
    }
}

impl SigningCapability for LocalKeySigner {
    fn address(&self) -> Address {
        self.address
    }

    fn sign_digest(&self, digest: &H256) -> SafeResult<[u8; 65]> {
        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(&*self.secret)
            .map_err(|e| SafeError::SigningUnavailable(e.to_string()))?;
        let message = Message::from_digest_slice(digest.as_bytes())
            .map_err(|e| SafeError::SigningUnavailable(e.to_string()))?;

        let (recovery_id, compact) = secp
            .sign_ecdsa_recoverable(&message, &secret_key)
            .serialize_compact();

        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&compact);
        out[64] = recovery_id.to_i32() as u8 + 27;
        Ok(out)
    }
}

impl fmt::Debug for LocalKeySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalKeySigner")
            .field("address", &checksum(&self.address))
            .finish_non_exhaustive()
    }
}
