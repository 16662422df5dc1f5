//! AddressPredictor: counterfactual wallet addresses
//!
//! The proxy factory deploys with CREATE2, so the address of a wallet is
//! known before it exists:
//!
//! ```text
//! salt         = keccak256(keccak256(initializer) ‖ uint256(saltNonce) [‖ uint256(chainId)])
//! initCodeHash = keccak256(proxyCreationCode ‖ uint256(singleton))
//! address      = keccak256(0xff ‖ factory ‖ salt ‖ initCodeHash)[12..]
//! ```
//!
//! Nothing here reads chain state. The proxy creation code comes from the
//! factory's `proxyCreationCode()` getter and is supplied by the caller.

use crate::abi::{AbiEncoder, AbiValue, KnownSelectors};
use crate::config::SafeDeployment;
use crate::error::SafeResult;
use crate::types::validate_owners;
use crate::utils::{address_word, checksum, keccak256, keccak256_concat, u256_word, u64_word};
use ethers_core::types::{Address, H256, U256};
use serde::{Deserialize, Serialize};

/// Parameters of the `setup` call run once when the proxy is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeAccountConfig {
    pub owners: Vec<Address>,
    pub threshold: usize,
    /// Optional delegate call made during setup
    #[serde(default)]
    pub to: Address,
    #[serde(with = "crate::serde_bytes::hex_vec_default", default)]
    pub data: Vec<u8>,
    #[serde(default)]
    pub fallback_handler: Address,
    #[serde(default)]
    pub payment_token: Address,
    #[serde(default)]
    pub payment: U256,
    #[serde(default)]
    pub payment_receiver: Address,
}

impl SafeAccountConfig {
    pub fn new(owners: Vec<Address>, threshold: usize) -> SafeResult<Self> {
        let config = Self {
            owners,
            threshold,
            to: Address::zero(),
            data: Vec::new(),
            fallback_handler: Address::zero(),
            payment_token: Address::zero(),
            payment: U256::zero(),
            payment_receiver: Address::zero(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn fallback_handler(mut self, handler: Address) -> Self {
        self.fallback_handler = handler;
        self
    }

    /// Delegate call into `to` with `data` during setup
    pub fn setup_call(mut self, to: Address, data: Vec<u8>) -> Self {
        self.to = to;
        self.data = data;
        self
    }

    /// Pay `payment` of `token` (zero address = native) to `receiver` on creation
    pub fn payment(mut self, token: Address, payment: U256, receiver: Address) -> Self {
        self.payment_token = token;
        self.payment = payment;
        self.payment_receiver = receiver;
        self
    }

    pub fn validate(&self) -> SafeResult<()> {
        validate_owners(&self.owners, self.threshold)
    }

    /// Encoded `setup(...)` call passed to the factory as initializer
    pub fn initializer(&self) -> SafeResult<Vec<u8>> {
        self.validate()?;
        Ok(AbiEncoder::encode_with_selector(
            KnownSelectors::SETUP,
            &[
                AbiValue::Array(self.owners.iter().copied().map(AbiValue::Address).collect()),
                AbiValue::uint(self.threshold as u64),
                AbiValue::Address(self.to),
                AbiValue::Bytes(self.data.clone()),
                AbiValue::Address(self.fallback_handler),
                AbiValue::Address(self.payment_token),
                AbiValue::Uint(self.payment),
                AbiValue::Address(self.payment_receiver),
            ],
        ))
    }
}

/// Hash of the proxy init code: creation code followed by the singleton
/// constructor argument
pub fn init_code_hash(proxy_creation_code: &[u8], singleton: &Address) -> H256 {
    H256(keccak256_concat(&[proxy_creation_code, &address_word(singleton)]))
}

/// CREATE2 salt used by `createProxyWithNonce`
pub fn salt(initializer: &[u8], salt_nonce: U256) -> H256 {
    H256(keccak256_concat(&[&keccak256(initializer), &u256_word(&salt_nonce)]))
}

/// CREATE2 salt used by `createChainSpecificProxyWithNonce`
pub fn chain_specific_salt(initializer: &[u8], salt_nonce: U256, chain_id: u64) -> H256 {
    H256(keccak256_concat(&[
        &keccak256(initializer),
        &u256_word(&salt_nonce),
        &u64_word(chain_id),
    ]))
}

/// `keccak256(0xff ‖ deployer ‖ salt ‖ initCodeHash)[12..]`
pub fn create2_address(deployer: &Address, salt: &H256, init_code_hash: &H256) -> Address {
    let hash = keccak256_concat(&[
        &[0xff],
        deployer.as_bytes(),
        salt.as_bytes(),
        init_code_hash.as_bytes(),
    ]);
    Address::from_slice(&hash[12..])
}

/// Predicts proxy addresses for one factory and one proxy init code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressPredictor {
    factory: Address,
    init_code_hash: H256,
}

impl AddressPredictor {
    pub fn new(factory: Address, init_code_hash: H256) -> Self {
        Self {
            factory,
            init_code_hash,
        }
    }

    /// Predictor for the factory and singleton of a known deployment
    pub fn for_deployment(deployment: &SafeDeployment, proxy_creation_code: &[u8]) -> Self {
        Self::new(
            deployment.proxy_factory,
            init_code_hash(proxy_creation_code, &deployment.singleton),
        )
    }

    pub fn factory(&self) -> Address {
        self.factory
    }

    pub fn init_code_hash(&self) -> H256 {
        self.init_code_hash
    }

    /// Address `createProxyWithNonce(singleton, initializer, saltNonce)` deploys to
    pub fn predict(&self, initializer: &[u8], salt_nonce: U256) -> Address {
        let salt = salt(initializer, salt_nonce);
        let address = create2_address(&self.factory, &salt, &self.init_code_hash);
        crate::log_debug!(
            "factory",
            "address predicted",
            salt = format!("{:?}", salt),
            address = checksum(&address)
        );
        address
    }

    /// Address `createChainSpecificProxyWithNonce` deploys to on `chain_id`
    pub fn predict_chain_specific(&self, initializer: &[u8], salt_nonce: U256, chain_id: u64) -> Address {
        let salt = chain_specific_salt(initializer, salt_nonce, chain_id);
        create2_address(&self.factory, &salt, &self.init_code_hash)
    }

    /// Encode the initializer for `config` and predict
    pub fn predict_for(&self, config: &SafeAccountConfig, salt_nonce: U256) -> SafeResult<Address> {
        Ok(self.predict(&config.initializer()?, salt_nonce))
    }
}

/// `createProxyWithNonce(address,bytes,uint256)` call data
pub fn create_proxy_with_nonce_call_data(singleton: Address, initializer: &[u8], salt_nonce: U256) -> Vec<u8> {
    AbiEncoder::encode_with_selector(
        KnownSelectors::CREATE_PROXY_WITH_NONCE,
        &[
            AbiValue::Address(singleton),
            AbiValue::Bytes(initializer.to_vec()),
            AbiValue::Uint(salt_nonce),
        ],
    )
}

/// `createChainSpecificProxyWithNonce(address,bytes,uint256)` call data
pub fn create_chain_specific_proxy_with_nonce_call_data(
    singleton: Address,
    initializer: &[u8],
    salt_nonce: U256,
) -> Vec<u8> {
    AbiEncoder::encode_with_selector(
        KnownSelectors::CREATE_CHAIN_SPECIFIC_PROXY_WITH_NONCE,
        &[
            AbiValue::Address(singleton),
            AbiValue::Bytes(initializer.to_vec()),
            AbiValue::Uint(salt_nonce),
        ],
    )
}

/// `proxyCreationCode()` call data for the factory
pub fn proxy_creation_code_call_data() -> Vec<u8> {
    KnownSelectors::PROXY_CREATION_CODE.to_vec()
}
