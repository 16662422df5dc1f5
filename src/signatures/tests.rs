use super::*;
use crate::error::SafeError;
use crate::types::{TransactionRecord, WalletConfig};
use crate::utils::parse_address;
use ethers_core::types::{Address, H256, U256};
use std::sync::Arc;

const KEY_1: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const KEY_2: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
const KEY_3: &str = "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a";

fn signers() -> Vec<LocalKeySigner> {
    [KEY_1, KEY_2, KEY_3]
        .iter()
        .map(|key| LocalKeySigner::from_hex(key).unwrap())
        .collect()
}

fn wallet(threshold: usize) -> WalletConfig {
    WalletConfig::new(
        signers().iter().map(|s| s.address()).collect(),
        threshold,
        1,
        Address::repeat_byte(0x11),
    )
    .unwrap()
}

fn record(nonce: u64) -> TransactionRecord {
    TransactionRecord::call(
        Address::repeat_byte(0x22),
        U256::exp10(18),
        vec![],
        U256::from(nonce),
    )
}

#[test]
fn test_local_signer_address() {
    let signer = LocalKeySigner::from_hex(KEY_1).unwrap();
    assert_eq!(
        signer.address(),
        parse_address("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap()
    );
    assert!(!format!("{:?}", signer).contains("ac0974"));
}

#[test]
fn test_invalid_private_key() {
    assert!(LocalKeySigner::from_bytes(&[0u8; 31]).is_err());
    assert!(LocalKeySigner::from_bytes(&[0u8; 32]).is_err());
}

#[test]
fn test_eip712_signature() {
    let signer = LocalKeySigner::from_hex(KEY_2).unwrap();
    let hash = H256::repeat_byte(0x42);

    let signature = sign_transaction_hash(&signer, &hash, SigningMethod::Eip712).unwrap();
    assert_eq!(signature.variant(), SignatureVariant::Eip712);
    assert!(matches!(signature.header()[64], 27 | 28));
    assert_eq!(signature.signer(), signer.address());
    assert!(signature.tail().is_empty());
}

#[test]
fn test_eth_sign_signature() {
    let signer = LocalKeySigner::from_hex(KEY_3).unwrap();
    let hash = H256::repeat_byte(0x42);

    let signature = sign_transaction_hash(&signer, &hash, SigningMethod::EthSign).unwrap();
    assert_eq!(signature.variant(), SignatureVariant::EthSign);
    assert!(matches!(signature.header()[64], 31 | 32));
    assert_eq!(signature.signer(), signer.address());

    // Read as a plain typed-data signature it recovers someone else
    let mut as_eip712 = signature.to_bytes();
    as_eip712[64] -= 4;
    let misread = Signature::parse(&hash, &as_eip712).unwrap();
    assert_ne!(misread.signer(), signer.address());
}

/// Wraps a local key and overwrites the recovery byte it returns
struct FixedRecoveryId {
    inner: LocalKeySigner,
    v: Option<u8>,
}

impl SigningCapability for FixedRecoveryId {
    fn address(&self) -> Address {
        self.inner.address()
    }

    fn sign_digest(&self, digest: &H256) -> SafeResult<[u8; 65]> {
        let mut raw = self.inner.sign_digest(digest)?;
        if let Some(v) = self.v {
            raw[64] = v;
        }
        Ok(raw)
    }
}

#[test]
fn test_bare_recovery_id_is_normalized() {
    let inner = LocalKeySigner::from_hex(KEY_1).unwrap();
    let hash = H256::repeat_byte(0x42);
    let v = inner.sign_digest(&eth_signed_message_hash(&hash)).unwrap()[64];
    let signer = FixedRecoveryId { inner, v: Some(v - 27) };

    let signature = sign_transaction_hash(&signer, &hash, SigningMethod::EthSign).unwrap();
    assert_eq!(signature.header()[64], v + 4);
    assert_eq!(signature.signer(), signer.address());
}

#[test]
fn test_out_of_range_recovery_id() {
    let hash = H256::repeat_byte(0x42);
    for v in [2u8, 26, 29, 31, 253, 255] {
        let signer = FixedRecoveryId {
            inner: LocalKeySigner::from_hex(KEY_1).unwrap(),
            v: Some(v),
        };
        for method in [SigningMethod::Eip712, SigningMethod::EthSign] {
            let err = sign_transaction_hash(&signer, &hash, method).unwrap_err();
            assert!(matches!(err, SafeError::SigningUnavailable(_)), "v={} {:?}", v, err);
        }
    }
}

#[test]
fn test_random_signers_differ() {
    let a = LocalKeySigner::random();
    let b = LocalKeySigner::random();
    assert_ne!(a.address(), b.address());
}

#[test]
fn test_unknown_marker_bytes() {
    for v in [2u8, 26, 29, 30, 33, 255] {
        let mut raw = [0u8; 65];
        raw[31] = 1;
        raw[64] = v;
        assert!(
            matches!(
                Signature::parse(&H256::zero(), &raw),
                Err(SafeError::InvalidSignatureEncoding(_))
            ),
            "marker {} accepted",
            v
        );
    }
}

#[test]
fn test_length_must_match_variant() {
    let signer = LocalKeySigner::from_hex(KEY_1).unwrap();
    let hash = H256::repeat_byte(1);
    let bytes = sign_transaction_hash(&signer, &hash, SigningMethod::Eip712)
        .unwrap()
        .to_bytes();

    assert!(Signature::parse(&hash, &bytes[..64]).is_err());
    let mut long = bytes.clone();
    long.push(0);
    assert!(matches!(
        Signature::parse(&hash, &long),
        Err(SafeError::InvalidSignatureEncoding(_))
    ));
}

#[test]
fn test_approved_hash_layout() {
    let owner = Address::repeat_byte(0xab);
    let signature = Signature::approved_hash(owner);
    let bytes = signature.to_bytes();

    assert_eq!(bytes.len(), 65);
    assert_eq!(&bytes[12..32], owner.as_bytes());
    assert!(bytes[32..64].iter().all(|b| *b == 0));
    assert_eq!(bytes[64], 1);

    let parsed = Signature::parse(&H256::zero(), &bytes).unwrap();
    assert_eq!(parsed, signature);
}

#[test]
fn test_approved_hash_requires_zero_s() {
    let mut bytes = Signature::approved_hash(Address::repeat_byte(0xab)).to_bytes();
    bytes[63] = 1;
    assert!(Signature::parse(&H256::zero(), &bytes).is_err());
}

#[test]
fn test_contract_signature_round_trip() {
    let owner = Address::repeat_byte(0x0c);
    let signature = Signature::contract(owner, vec![0xde, 0xad, 0xbe, 0xef]);
    let bytes = signature.to_bytes();

    assert_eq!(bytes.len(), 65 + 32 + 4);
    assert_eq!(bytes[64], 0);
    assert_eq!(bytes[63], 65);
    assert_eq!(bytes[65 + 31], 4);

    let parsed = Signature::parse(&H256::zero(), &bytes).unwrap();
    assert_eq!(parsed.variant(), SignatureVariant::ContractSignature);
    assert_eq!(parsed.signer(), owner);
    assert_eq!(parsed.tail(), &[0xde, 0xad, 0xbe, 0xef]);
}

#[test]
fn test_contract_signature_bad_tail() {
    let mut bytes = Signature::contract(Address::repeat_byte(0x0c), vec![1, 2, 3]).to_bytes();
    // declared length runs past the end
    bytes[65 + 31] = 9;
    assert!(Signature::parse(&H256::zero(), &bytes).is_err());

    // header alone, offset pointing at itself
    let mut header = [0u8; 65];
    header[31] = 0x0c;
    assert!(Signature::parse(&H256::zero(), &header).is_err());
}

#[test]
fn test_pack_orders_and_rewrites_offsets() {
    let hash = H256::repeat_byte(7);
    let eoa = LocalKeySigner::from_hex(KEY_1).unwrap();
    let low = Signature::contract(Address::repeat_byte(0x10), vec![1, 2, 3]);
    let mid = Signature::contract(Address::repeat_byte(0xf0), vec![4, 5]);
    let high = sign_transaction_hash(&eoa, &hash, SigningMethod::Eip712).unwrap();

    let blob = pack_signatures([&high, &mid, &low]);
    assert_eq!(blob.len(), 3 * 65 + (32 + 3) + (32 + 2));

    // headers ascend by signer
    assert_eq!(&blob[12..32], Address::repeat_byte(0x10).as_bytes());
    assert_eq!(&blob[65 + 12..65 + 32], Address::repeat_byte(0xf0).as_bytes());
    assert_eq!(&blob[130..195], high.header());

    // offsets are absolute within the blob
    assert_eq!(U256::from_big_endian(&blob[32..64]), U256::from(195u64));
    assert_eq!(U256::from_big_endian(&blob[65 + 32..65 + 64]), U256::from(230u64));

    let entries = split_packed(&blob).unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].contract_data, Some(&[1u8, 2, 3][..]));
    assert_eq!(entries[1].contract_data, Some(&[4u8, 5][..]));
    assert_eq!(entries[2].contract_data, None);
    assert_eq!(Signature::from_entry(&hash, &entries[2]).unwrap().signer(), eoa.address());
}

#[test]
fn test_collector_rejects_non_owner() {
    let collector = SignatureCollector::new(wallet(2));
    let hash = collector.track(&record(0));
    let outsider = LocalKeySigner::random();
    let signature = sign_transaction_hash(&outsider, &hash, SigningMethod::Eip712).unwrap();

    assert!(matches!(
        collector.submit(hash, &signature.to_bytes()),
        Err(SafeError::SignerNotOwner(_))
    ));
    assert!(collector.signers(hash).is_empty());
}

#[test]
fn test_collector_threshold_boundary() {
    let collector = SignatureCollector::new(wallet(2));
    let hash = collector.track(&record(0));
    let owners = signers();

    let first = sign_transaction_hash(&owners[0], &hash, SigningMethod::Eip712).unwrap();
    collector.submit(hash, &first.to_bytes()).unwrap();
    assert!(!collector.threshold_met(hash));
    assert_eq!(
        collector.pack(hash).unwrap_err(),
        SafeError::InsufficientSignatures { have: 1, threshold: 2 }
    );

    // a second signature from the same owner replaces the first
    let again = sign_transaction_hash(&owners[0], &hash, SigningMethod::EthSign).unwrap();
    collector.submit(hash, &again.to_bytes()).unwrap();
    assert_eq!(collector.signers(hash), vec![owners[0].address()]);
    assert_eq!(
        collector.snapshot(hash).unwrap().get(&owners[0].address()).unwrap().variant(),
        SignatureVariant::EthSign
    );
    assert!(!collector.threshold_met(hash));

    let second = sign_transaction_hash(&owners[2], &hash, SigningMethod::Eip712).unwrap();
    collector.submit(hash, &second.to_bytes()).unwrap();
    assert!(collector.threshold_met(hash));
    assert_eq!(collector.pack(hash).unwrap().len(), 130);
}

#[test]
fn test_collector_submission_order_independent() {
    let owners = signers();
    let hash = crate::eip712::transaction_hash(&record(3), &wallet(3).domain());
    let signatures: Vec<Signature> = owners
        .iter()
        .map(|s| sign_transaction_hash(s, &hash, SigningMethod::Eip712).unwrap())
        .collect();

    let mut blobs = Vec::new();
    for order in [[0, 1, 2], [2, 0, 1], [1, 2, 0]] {
        let collector = SignatureCollector::new(wallet(3));
        for index in order {
            collector.submit(hash, &signatures[index].to_bytes()).unwrap();
        }
        blobs.push(collector.pack(hash).unwrap());
    }

    assert_eq!(blobs[0], blobs[1]);
    assert_eq!(blobs[1], blobs[2]);

    let mut expected = owners.iter().map(|s| s.address()).collect::<Vec<_>>();
    expected.sort();
    let packed_signers: Vec<Address> = split_packed(&blobs[0])
        .unwrap()
        .iter()
        .map(|entry| Signature::from_entry(&hash, entry).unwrap().signer())
        .collect();
    assert_eq!(packed_signers, expected);
}

#[test]
fn test_submit_signature_for_other_hash() {
    let collector = SignatureCollector::new(wallet(1));
    let hash = collector.track(&record(0));
    let other = collector.track(&record(1));
    let owner = &signers()[1];

    let signature = sign_transaction_hash(owner, &other, SigningMethod::Eip712).unwrap();
    assert!(matches!(
        collector.submit_signature(hash, signature.clone()),
        Err(SafeError::SignerNotOwner(_))
    ));
    assert_eq!(collector.submit_signature(other, signature).unwrap(), owner.address());
}

#[test]
fn test_approved_and_contract_owners() {
    let collector = SignatureCollector::new(wallet(2));
    let hash = collector.track(&record(0));
    let owners = wallet(2).owners().to_vec();

    collector
        .submit_signature(hash, Signature::approved_hash(owners[0]))
        .unwrap();
    collector
        .submit(hash, &Signature::contract(owners[1], vec![0xaa]).to_bytes())
        .unwrap();

    let blob = collector.pack(hash).unwrap();
    assert_eq!(blob.len(), 130 + 32 + 1);
    assert_eq!(*blob.last().unwrap(), 0xaa);
}

#[test]
fn test_discard_and_snapshot() {
    let collector = SignatureCollector::new(wallet(1));
    let hash = collector.track(&record(0));
    assert_eq!(collector.tracked(), vec![hash]);
    assert!(collector.snapshot(hash).unwrap().is_empty());

    let signature = sign_transaction_hash(&signers()[0], &hash, SigningMethod::Eip712).unwrap();
    collector.submit(hash, &signature.to_bytes()).unwrap();

    let discarded = collector.discard(hash).unwrap();
    assert_eq!(discarded.len(), 1);
    assert_eq!(discarded.hash(), hash);
    assert!(collector.snapshot(hash).is_none());
    assert!(!collector.threshold_met(hash));
    assert!(collector.discard(hash).is_none());
}

#[test]
fn test_concurrent_submissions_same_hash() {
    let collector = Arc::new(SignatureCollector::new(wallet(3)));
    let hash = collector.track(&record(5));

    let handles: Vec<_> = [KEY_1, KEY_2, KEY_3]
        .into_iter()
        .map(|key| {
            let collector = Arc::clone(&collector);
            std::thread::spawn(move || {
                let signer = LocalKeySigner::from_hex(key).unwrap();
                for _ in 0..10 {
                    let signature =
                        sign_transaction_hash(&signer, &hash, SigningMethod::Eip712).unwrap();
                    collector.submit(hash, &signature.to_bytes()).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(collector.signers(hash).len(), 3);
    assert!(collector.threshold_met(hash));
}

#[test]
fn test_eth_signed_message_hash_prefix() {
    let hash = H256::repeat_byte(0x99);
    let mut preimage = b"\x19Ethereum Signed Message:\n32".to_vec();
    preimage.extend_from_slice(hash.as_bytes());
    assert_eq!(
        eth_signed_message_hash(&hash),
        H256(crate::utils::keccak256(&preimage))
    );
}
