//! ECDSA public-key recovery over secp256k1

use crate::error::{SafeError, SafeResult};
use crate::utils::{keccak256, keccak256_concat};
use ethers_core::types::{Address, H256};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1};

/// EIP-191 prefix for a 32-byte message
const ETH_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Digest an `eth_sign` signer actually signs for a 32-byte hash
pub fn eth_signed_message_hash(hash: &H256) -> H256 {
    H256(keccak256_concat(&[ETH_MESSAGE_PREFIX, hash.as_bytes()]))
}

/// Recover the signing address from `r ‖ s` and a recovery id in `0..=1`
pub fn recover_signer(digest: &H256, rs: &[u8], recovery_id: u8) -> SafeResult<Address> {
    if rs.len() != 64 {
        return Err(SafeError::invalid_encoding(format!(
            "expected 64 signature bytes, got {}",
            rs.len()
        )));
    }

    let secp = Secp256k1::new();
    let recovery_id = RecoveryId::from_i32(recovery_id as i32)
        .map_err(|e| SafeError::invalid_encoding(e.to_string()))?;
    let signature = RecoverableSignature::from_compact(rs, recovery_id)
        .map_err(|e| SafeError::invalid_encoding(e.to_string()))?;
    let message = Message::from_digest_slice(digest.as_bytes())
        .map_err(|e| SafeError::invalid_encoding(e.to_string()))?;

    let public_key = secp
        .recover_ecdsa(&message, &signature)
        .map_err(|e| SafeError::invalid_encoding(e.to_string()))?;

    Ok(public_key_to_address(&public_key))
}

/// Ethereum address of a secp256k1 public key
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    Address::from_slice(&hash[12..])
}
