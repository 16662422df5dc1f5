use ethers_core::types::{Address, H256, U256};
use proptest::prelude::*;
use safe_multisig::multisend::{decode_batch, BatchEncoder};
use safe_multisig::{
    checksum, keccak256, sign_transaction_hash, transaction_hash, AddressPredictor, BatchItem,
    CoreConfig, LocalKeySigner, Operation, SafeDomain, SignatureCollector, SigningCapability,
    SigningMethod, TransactionRecord, WalletConfig,
};

const KEYS: [&str; 3] = [
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
    "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
];

fn any_address() -> impl Strategy<Value = Address> {
    prop::array::uniform20(any::<u8>()).prop_map(Address::from)
}

fn any_u256() -> impl Strategy<Value = U256> {
    prop::array::uniform32(any::<u8>()).prop_map(|bytes| U256::from_big_endian(&bytes))
}

fn any_item() -> impl Strategy<Value = BatchItem> {
    (
        any::<bool>(),
        any_address(),
        any_u256(),
        prop::collection::vec(any::<u8>(), 0..96),
    )
        .prop_map(|(delegate, to, value, data)| BatchItem {
            operation: if delegate { Operation::DelegateCall } else { Operation::Call },
            to,
            value,
            data,
        })
}

fn any_record() -> impl Strategy<Value = TransactionRecord> {
    (
        any_address(),
        any_u256(),
        prop::collection::vec(any::<u8>(), 0..64),
        any::<u64>(),
    )
        .prop_map(|(to, value, data, nonce)| TransactionRecord::call(to, value, data, U256::from(nonce)))
}

proptest! {
    #[test]
    fn checksum_addresses_roundtrip(address in any_address()) {
        let checksummed = checksum(&address);
        prop_assert!(checksummed.starts_with("0x"));

        let lower_expected = hex::encode(address.as_bytes());
        let tail = checksummed.trim_start_matches("0x");
        prop_assert_eq!(tail.to_ascii_lowercase(), lower_expected.clone());

        let hash = keccak256(lower_expected.as_bytes());
        let mut expected = String::from("0x");
        for (i, ch) in lower_expected.chars().enumerate() {
            let byte = hash[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if ch.is_ascii_digit() || nibble < 8 {
                expected.push(ch);
            } else {
                expected.push(ch.to_ascii_uppercase());
            }
        }
        prop_assert_eq!(checksummed, expected);
    }

    #[test]
    fn batch_payload_roundtrips(items in prop::collection::vec(any_item(), 1..8)) {
        let payload = BatchEncoder::new(CoreConfig::default()).encode(&items).unwrap();
        prop_assert_eq!(
            payload.len(),
            items.iter().map(BatchItem::encoded_len).sum::<usize>()
        );
        prop_assert_eq!(decode_batch(&payload).unwrap(), items);
    }

    #[test]
    fn transaction_hash_is_deterministic(
        record in any_record(),
        chain_id in 1u64..100_000,
        safe in any_address(),
    ) {
        let domain = SafeDomain::new(chain_id, safe);
        let first = transaction_hash(&record, &domain);
        prop_assert_eq!(first, transaction_hash(&record.clone(), &domain));

        let next = TransactionRecord { nonce: record.nonce + 1, ..record.clone() };
        prop_assert_ne!(first, transaction_hash(&next, &domain));
        prop_assert_ne!(first, transaction_hash(&record, &SafeDomain::new(chain_id + 1, safe)));
    }

    #[test]
    fn address_prediction_is_stable(
        factory in any_address(),
        init_code_hash in prop::array::uniform32(any::<u8>()),
        initializer in prop::collection::vec(any::<u8>(), 0..200),
        salt_nonce in any::<u64>(),
    ) {
        let predictor = AddressPredictor::new(factory, H256(init_code_hash));
        let nonce = U256::from(salt_nonce);

        let first = predictor.predict(&initializer, nonce);
        prop_assert_eq!(first, predictor.predict(&initializer, nonce));
        prop_assert_ne!(first, predictor.predict(&initializer, nonce + 1));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn packing_ignores_submission_order(
        order in Just(vec![0usize, 1, 2]).prop_shuffle(),
        method_bits in prop::array::uniform3(any::<bool>()),
    ) {
        let signers: Vec<LocalKeySigner> = KEYS
            .iter()
            .map(|k| LocalKeySigner::from_hex(k).unwrap())
            .collect();
        let wallet = WalletConfig::new(
            signers.iter().map(|s| s.address()).collect(),
            2,
            1,
            Address::repeat_byte(0x11),
        )
        .unwrap();
        let record = TransactionRecord::call(Address::repeat_byte(0x22), U256::one(), vec![], U256::zero());

        let reference = SignatureCollector::new(wallet.clone());
        let shuffled = SignatureCollector::new(wallet);
        let hash = reference.track(&record);
        prop_assert_eq!(shuffled.track(&record), hash);

        let method = |i: usize| if method_bits[i] { SigningMethod::EthSign } else { SigningMethod::Eip712 };
        let signatures: Vec<Vec<u8>> = (0..3)
            .map(|i| sign_transaction_hash(&signers[i], &hash, method(i)).unwrap().to_bytes())
            .collect();

        for signature in &signatures {
            reference.submit(hash, signature).unwrap();
        }
        for i in &order {
            shuffled.submit(hash, &signatures[*i]).unwrap();
        }

        let packed = shuffled.pack(hash).unwrap();
        prop_assert_eq!(&packed, &reference.pack(hash).unwrap());

        let signers_in_blob = shuffled.signers(hash);
        let mut sorted = signers_in_blob.clone();
        sorted.sort();
        prop_assert_eq!(signers_in_blob, sorted);
    }
}
