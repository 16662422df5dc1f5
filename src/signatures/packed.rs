//! Packed signature blobs
//!
//! The wallet contract reads `n` consecutive 65-byte headers followed by the
//! tails of contract signatures. Each contract header's `s` word is an
//! absolute offset into the whole blob.

use super::{Signature, SignatureVariant, SIGNATURE_HEADER_LEN};
use crate::error::{SafeError, SafeResult};
use crate::utils::{u256_word, u64_word};
use ethers_core::types::U256;

/// One header of a packed blob plus the tail data it points to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedEntry<'a> {
    pub header: &'a [u8],
    pub contract_data: Option<&'a [u8]>,
}

/// Concatenate headers in ascending signer order, then the contract tails
/// in the same relative order.
pub fn pack_signatures<'a, I>(signatures: I) -> Vec<u8>
where
    I: IntoIterator<Item = &'a Signature>,
{
    let mut ordered: Vec<&Signature> = signatures.into_iter().collect();
    ordered.sort_by_key(|signature| signature.signer());

    let headers_len = ordered.len() * SIGNATURE_HEADER_LEN;
    let mut headers = Vec::with_capacity(headers_len);
    let mut tails = Vec::new();

    for signature in ordered {
        let mut header = *signature.header();
        if signature.variant() == SignatureVariant::ContractSignature {
            let offset = headers_len + tails.len();
            header[32..64].copy_from_slice(&u64_word(offset as u64));
            tails.extend_from_slice(&u256_word(&U256::from(signature.tail().len())));
            tails.extend_from_slice(signature.tail());
        }
        headers.extend_from_slice(&header);
    }

    headers.extend_from_slice(&tails);
    headers
}

/// Walk the headers of a packed blob in stored order.
///
/// The header region ends at the first contract-signature tail, or at the
/// end of the blob when there is none.
pub fn split_packed(blob: &[u8]) -> SafeResult<Vec<PackedEntry<'_>>> {
    if blob.len() < SIGNATURE_HEADER_LEN {
        return Err(SafeError::invalid_encoding(format!(
            "signature blob is {} bytes, a header is {}",
            blob.len(),
            SIGNATURE_HEADER_LEN
        )));
    }

    let mut entries = Vec::new();
    let mut boundary = blob.len();
    let mut start = 0;

    while start + SIGNATURE_HEADER_LEN <= boundary {
        let header = &blob[start..start + SIGNATURE_HEADER_LEN];
        start += SIGNATURE_HEADER_LEN;

        let contract_data = if header[64] == 0 {
            let offset = word_to_offset(&header[32..64], blob.len())?;
            if offset < start {
                return Err(SafeError::invalid_encoding(format!(
                    "contract signature offset {} points into the header region",
                    offset
                )));
            }
            boundary = boundary.min(offset);
            Some(read_tail(blob, offset)?)
        } else {
            None
        };

        entries.push(PackedEntry {
            header,
            contract_data,
        });
    }

    if start != boundary {
        return Err(SafeError::invalid_encoding(format!(
            "{} stray bytes after signature headers",
            boundary - start
        )));
    }

    Ok(entries)
}

fn word_to_offset(word: &[u8], limit: usize) -> SafeResult<usize> {
    let value = U256::from_big_endian(word);
    if value > U256::from(limit) {
        return Err(SafeError::invalid_encoding(format!(
            "contract signature offset {} is past the end of the blob",
            value
        )));
    }
    Ok(value.as_usize())
}

fn read_tail(blob: &[u8], offset: usize) -> SafeResult<&[u8]> {
    let length_word = blob.get(offset..offset + 32).ok_or_else(|| {
        SafeError::invalid_encoding(format!("contract signature length missing at {}", offset))
    })?;
    let length = word_to_offset(length_word, blob.len() - offset - 32)?;
    let start = offset + 32;
    Ok(&blob[start..start + length])
}
