use ethers_core::types::{Address, U256};
use safe_multisig::execution::check_signatures_for_hash;
use safe_multisig::multisend::decode_multi_send_call;
use safe_multisig::service::{CoordinationService, InMemoryCoordinationService, TransactionProposal};
use safe_multisig::{
    check_signatures, sign_transaction_hash, transaction_hash, BatchItem, ExecutionEncoder,
    LocalKeySigner, SafeError, Signature, SignatureCollector, SignatureVariant, SigningCapability,
    SigningMethod, TransactionBuilder, TransactionRecord, WalletConfig,
};

const KEY_A: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const KEY_B: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
const KEY_C: &str = "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a";

struct Owners {
    a: LocalKeySigner,
    b: LocalKeySigner,
    c: LocalKeySigner,
}

fn owners() -> Owners {
    Owners {
        a: LocalKeySigner::from_hex(KEY_A).unwrap(),
        b: LocalKeySigner::from_hex(KEY_B).unwrap(),
        c: LocalKeySigner::from_hex(KEY_C).unwrap(),
    }
}

fn wallet(owners: &Owners) -> WalletConfig {
    WalletConfig::new(
        vec![owners.a.address(), owners.b.address(), owners.c.address()],
        2,
        1,
        Address::repeat_byte(0x5a),
    )
    .unwrap()
}

fn recipient() -> Address {
    Address::repeat_byte(0x77)
}

fn transfer(nonce: u64) -> TransactionRecord {
    TransactionRecord::call(recipient(), U256::exp10(18), vec![], U256::from(nonce))
}

#[test]
fn two_of_three_transfer_end_to_end() {
    let owners = owners();
    let wallet = wallet(&owners);
    let record = transfer(0);

    let collector = SignatureCollector::new(wallet.clone());
    let hash = collector.track(&record);
    assert_eq!(hash, transaction_hash(&record, &wallet.domain()));

    let sig_a = sign_transaction_hash(&owners.a, &hash, SigningMethod::Eip712).unwrap();
    let sig_c = sign_transaction_hash(&owners.c, &hash, SigningMethod::EthSign).unwrap();
    assert_eq!(sig_a.variant(), SignatureVariant::Eip712);
    assert_eq!(sig_c.variant(), SignatureVariant::EthSign);

    assert_eq!(collector.submit(hash, &sig_a.to_bytes()).unwrap(), owners.a.address());
    assert!(!collector.threshold_met(hash));
    assert_eq!(collector.submit(hash, &sig_c.to_bytes()).unwrap(), owners.c.address());
    assert!(collector.threshold_met(hash));

    let packed = collector.pack(hash).unwrap();
    assert_eq!(packed.len(), 130);

    let (first, second) = if owners.a.address() < owners.c.address() {
        (&sig_a, &sig_c)
    } else {
        (&sig_c, &sig_a)
    };
    assert_eq!(&packed[..65], first.header().as_slice());
    assert_eq!(&packed[65..], second.header().as_slice());

    let report = check_signatures(&wallet, &record, &packed, None).unwrap();
    assert!(report.fully_verified());
    assert_eq!(report.signers, collector.signers(hash));

    let call_data = ExecutionEncoder::execute(&collector, &record).unwrap();
    let (decoded, signatures) = ExecutionEncoder::decode_exec_transaction(&call_data, record.nonce).unwrap();
    assert_eq!(decoded, record);
    assert_eq!(signatures, packed);
}

#[test]
fn threshold_boundary() {
    let owners = owners();
    let wallet = wallet(&owners);
    let collector = SignatureCollector::new(wallet);
    let hash = collector.track(&transfer(0));

    let sig_b = sign_transaction_hash(&owners.b, &hash, SigningMethod::Eip712).unwrap();
    collector.submit(hash, &sig_b.to_bytes()).unwrap();

    // a second signature from the same owner does not count twice
    let sig_b_again = sign_transaction_hash(&owners.b, &hash, SigningMethod::EthSign).unwrap();
    collector.submit(hash, &sig_b_again.to_bytes()).unwrap();

    let err = collector.pack(hash).unwrap_err();
    assert_eq!(err, SafeError::InsufficientSignatures { have: 1, threshold: 2 });
    assert!(err.is_recoverable());

    let sig_a = sign_transaction_hash(&owners.a, &hash, SigningMethod::Eip712).unwrap();
    collector.submit(hash, &sig_a.to_bytes()).unwrap();
    assert_eq!(collector.pack(hash).unwrap().len(), 130);
}

#[test]
fn signature_for_another_nonce_is_rejected() {
    let owners = owners();
    let wallet = wallet(&owners);
    let collector = SignatureCollector::new(wallet.clone());
    let hash = collector.track(&transfer(0));

    let stale_hash = transaction_hash(&transfer(1), &wallet.domain());
    let stale = sign_transaction_hash(&owners.c, &stale_hash, SigningMethod::EthSign).unwrap();

    let err = collector.submit(hash, &stale.to_bytes()).unwrap_err();
    assert!(matches!(err, SafeError::SignerNotOwner(_)));
    assert!(!err.is_recoverable());
    assert!(collector.signers(hash).is_empty());
}

#[test]
fn mixed_variants_pack_with_contract_tail() {
    let owners = owners();
    let module_owner = Address::repeat_byte(0x01);
    let wallet = WalletConfig::new(
        vec![owners.a.address(), owners.b.address(), module_owner],
        3,
        1,
        Address::repeat_byte(0x5a),
    )
    .unwrap();

    let collector = SignatureCollector::new(wallet.clone());
    let hash = collector.track(&transfer(3));

    let ecdsa = sign_transaction_hash(&owners.a, &hash, SigningMethod::Eip712).unwrap();
    collector.submit(hash, &ecdsa.to_bytes()).unwrap();
    collector
        .submit_signature(hash, Signature::approved_hash(owners.b.address()))
        .unwrap();
    collector
        .submit_signature(hash, Signature::contract(module_owner, vec![0xaa; 40]))
        .unwrap();

    let packed = collector.pack(hash).unwrap();
    // three headers plus one length word and 40 bytes of contract data
    assert_eq!(packed.len(), 3 * 65 + 32 + 40);

    let report = check_signatures_for_hash(&wallet, hash, &packed, None).unwrap();
    assert_eq!(report.signers[0], module_owner);
    assert_eq!(report.unverified.len(), 2);
    assert!(!report.fully_verified());
}

#[test]
fn batch_and_management_records_collect_like_any_other() {
    let owners = owners();
    let wallet = wallet(&owners);
    let builder = TransactionBuilder::new(wallet.clone());

    let items = vec![
        BatchItem::call(recipient(), U256::from(5), vec![]),
        BatchItem::call(Address::repeat_byte(0x78), U256::zero(), vec![0x12, 0x34]),
    ];
    let batch = builder.batch(&items, U256::from(4)).unwrap();
    assert_eq!(decode_multi_send_call(&batch.data).unwrap(), items);

    let change = builder.change_threshold(3, U256::from(5)).unwrap();
    assert_eq!(change.to, wallet.verifying_contract());

    let collector = SignatureCollector::new(wallet);
    for record in [&batch, &change] {
        let hash = collector.track(record);
        for owner in [&owners.b, &owners.c] {
            let signature = sign_transaction_hash(owner, &hash, SigningMethod::Eip712).unwrap();
            collector.submit(hash, &signature.to_bytes()).unwrap();
        }
        assert!(ExecutionEncoder::execute(&collector, record).is_ok());
    }
    assert_eq!(collector.tracked().len(), 2);
}

#[test]
fn coordination_round_trip_reaches_threshold() {
    let owners = owners();
    let wallet = wallet(&owners);
    let service = InMemoryCoordinationService::new(wallet.chain_id());

    let record = transfer(0);
    let hash = transaction_hash(&record, &wallet.domain());
    let proposal_signature = sign_transaction_hash(&owners.b, &hash, SigningMethod::Eip712).unwrap();
    service
        .publish(TransactionProposal::new(&wallet, record.clone(), &proposal_signature))
        .unwrap();

    let confirmation = sign_transaction_hash(&owners.a, &hash, SigningMethod::EthSign).unwrap();
    service.confirm(hash, &confirmation.to_bytes()).unwrap();

    let pending = service
        .fetch_pending(wallet.verifying_contract())
        .unwrap()
        .remove(0);
    let collector = SignatureCollector::new(wallet.clone());
    let (pending_hash, accepted) = pending.into_collector_entries(&collector).unwrap();
    assert_eq!(pending_hash, hash);
    assert_eq!(accepted.len(), 2);

    let call_data = ExecutionEncoder::execute(&collector, &record).unwrap();
    let (_, packed) = ExecutionEncoder::decode_exec_transaction(&call_data, record.nonce).unwrap();
    assert!(check_signatures(&wallet, &record, &packed, None).is_ok());
}
