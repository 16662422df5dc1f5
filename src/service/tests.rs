use super::*;
use crate::signatures::{sign_transaction_hash, LocalKeySigner, SigningCapability, SigningMethod};
use ethers_core::types::U256;

const KEYS: [&str; 3] = [
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
    "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
];

fn signers() -> Vec<LocalKeySigner> {
    KEYS.iter().map(|k| LocalKeySigner::from_hex(k).unwrap()).collect()
}

fn wallet() -> WalletConfig {
    WalletConfig::new(
        signers().iter().map(|s| s.address()).collect(),
        2,
        1,
        Address::repeat_byte(0x11),
    )
    .unwrap()
}

fn record(nonce: u64) -> TransactionRecord {
    TransactionRecord::call(Address::repeat_byte(0x22), U256::exp10(18), vec![], U256::from(nonce))
}

fn proposal(signer: &LocalKeySigner, nonce: u64) -> TransactionProposal {
    let wallet = wallet();
    let hash = transaction_hash(&record(nonce), &wallet.domain());
    let signature = sign_transaction_hash(signer, &hash, SigningMethod::Eip712).unwrap();
    TransactionProposal::new(&wallet, record(nonce), &signature).origin("tests")
}

#[test]
fn test_proposal_json_layout() {
    let proposal = proposal(&signers()[0], 0);
    let json = serde_json::to_value(&proposal).unwrap();

    for key in [
        "safe",
        "to",
        "value",
        "data",
        "operation",
        "safeTxGas",
        "baseGas",
        "gasPrice",
        "gasToken",
        "refundReceiver",
        "nonce",
        "contractTransactionHash",
        "sender",
        "signature",
        "origin",
    ] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(json["operation"], 0);

    let back: TransactionProposal = serde_json::from_value(json).unwrap();
    assert_eq!(back, proposal);
}

#[test]
fn test_proposal_verify() {
    let owner = &signers()[1];
    let proposal = proposal(owner, 0);
    assert_eq!(proposal.verify(1).unwrap().signer(), owner.address());

    assert!(matches!(
        proposal.verify(5),
        Err(SafeError::TransactionHashMismatch { .. })
    ));

    let mut forged = proposal.clone();
    forged.sender = signers()[0].address();
    assert!(matches!(forged.verify(1), Err(SafeError::InvalidSignatureEncoding(_))));
}

#[test]
fn test_publish_confirm_fetch() {
    let service = InMemoryCoordinationService::new(1);
    let owners = signers();

    service.publish(proposal(&owners[0], 1)).unwrap();
    service.publish(proposal(&owners[0], 0)).unwrap();

    let pending = service.fetch_pending(wallet().verifying_contract()).unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].record.nonce, U256::zero());
    assert_eq!(pending[0].confirmations.len(), 1);

    let hash = pending[0].safe_tx_hash;
    let second = sign_transaction_hash(&owners[2], &hash, SigningMethod::EthSign).unwrap();
    service.confirm(hash, &second.to_bytes()).unwrap();
    // confirming twice replaces
    service.confirm(hash, &second.to_bytes()).unwrap();

    let pending = service.fetch_pending(wallet().verifying_contract()).unwrap();
    assert_eq!(pending[0].confirmations.len(), 2);

    assert!(service.fetch_pending(Address::repeat_byte(0x99)).unwrap().is_empty());
    assert!(service.confirm(H256::repeat_byte(1), &second.to_bytes()).is_err());

    assert!(service.remove(hash).is_some());
    assert_eq!(service.fetch_pending(wallet().verifying_contract()).unwrap().len(), 1);
}

#[test]
fn test_pending_into_collector() {
    let service = InMemoryCoordinationService::new(1);
    let owners = signers();
    service.publish(proposal(&owners[0], 0)).unwrap();

    let hash = service.fetch_pending(wallet().verifying_contract()).unwrap()[0].safe_tx_hash;
    let second = sign_transaction_hash(&owners[1], &hash, SigningMethod::Eip712).unwrap();
    service.confirm(hash, &second.to_bytes()).unwrap();

    let pending = service.fetch_pending(wallet().verifying_contract()).unwrap().remove(0);
    let set = pending.signature_set(&wallet()).unwrap();
    assert_eq!(set.len(), 2);

    let collector = SignatureCollector::new(wallet());
    let (collected_hash, accepted) = pending.into_collector_entries(&collector).unwrap();
    assert_eq!(collected_hash, hash);
    assert_eq!(accepted.len(), 2);
    assert!(collector.threshold_met(hash));
    assert_eq!(collector.pack(hash).unwrap(), set.pack(2).unwrap());
}

#[test]
fn test_pending_skips_bad_confirmations() {
    let wallet = wallet();
    let hash = transaction_hash(&record(0), &wallet.domain());
    let owner = &signers()[0];
    let outsider = LocalKeySigner::random();

    let good = sign_transaction_hash(owner, &hash, SigningMethod::Eip712).unwrap();
    let foreign = sign_transaction_hash(&outsider, &hash, SigningMethod::Eip712).unwrap();

    let pending = PendingTransaction {
        safe: wallet.verifying_contract(),
        chain_id: 1,
        record: record(0),
        safe_tx_hash: hash,
        confirmations: vec![
            Confirmation {
                owner: owner.address(),
                signature: good.to_bytes(),
            },
            Confirmation {
                owner: outsider.address(),
                signature: foreign.to_bytes(),
            },
            Confirmation {
                owner: signers()[1].address(),
                signature: good.to_bytes(),
            },
        ],
        origin: None,
    };

    let set = pending.signature_set(&wallet).unwrap();
    assert_eq!(set.signers(), vec![owner.address()]);

    let collector = SignatureCollector::new(wallet);
    let (_, accepted) = pending.into_collector_entries(&collector).unwrap();
    assert_eq!(accepted, vec![owner.address()]);
}

#[test]
fn test_pending_verify_rejects_foreign_context() {
    let wallet = wallet();
    let hash = transaction_hash(&record(0), &wallet.domain());
    let mut pending = PendingTransaction {
        safe: wallet.verifying_contract(),
        chain_id: 1,
        record: record(0),
        safe_tx_hash: hash,
        confirmations: vec![],
        origin: None,
    };
    assert_eq!(pending.verify(&wallet).unwrap(), hash);

    pending.chain_id = 10;
    assert!(matches!(
        pending.verify(&wallet),
        Err(SafeError::ChainIdMismatch { expected: 1, actual: 10 })
    ));

    pending.chain_id = 1;
    pending.record.nonce = U256::one();
    assert!(matches!(
        pending.verify(&wallet),
        Err(SafeError::TransactionHashMismatch { .. })
    ));
}
