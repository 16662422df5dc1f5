//! Function selector calculation and the selectors of the Safe contract suite

use crate::utils::keccak256;

/// ABI selector calculator
pub struct AbiSelector;

impl AbiSelector {
    /// Calculate function selector (first 4 bytes of keccak256(signature))
    pub fn selector_from_signature(signature: &str) -> [u8; 4] {
        let hash = keccak256(signature.as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    /// Get selector as hex string (with 0x prefix)
    pub fn selector_hex(signature: &str) -> String {
        format!("0x{}", hex::encode(Self::selector_from_signature(signature)))
    }
}

pub const EXEC_TRANSACTION_SIG: &str =
    "execTransaction(address,uint256,bytes,uint8,uint256,uint256,uint256,address,address,bytes)";
pub const GET_TRANSACTION_HASH_SIG: &str =
    "getTransactionHash(address,uint256,bytes,uint8,uint256,uint256,uint256,address,address,uint256)";
pub const SETUP_SIG: &str = "setup(address[],uint256,address,bytes,address,address,uint256,address)";

/// Well-known function selectors
pub struct KnownSelectors;

impl KnownSelectors {
    // Safe core
    pub const EXEC_TRANSACTION: [u8; 4] = [0x6a, 0x76, 0x12, 0x02];
    pub const APPROVE_HASH: [u8; 4] = [0xd4, 0xd9, 0xbd, 0xcd]; // approveHash(bytes32)
    pub const GET_OWNERS: [u8; 4] = [0xa0, 0xe6, 0x7e, 0x2b]; // getOwners()
    pub const GET_THRESHOLD: [u8; 4] = [0xe7, 0x52, 0x35, 0xb8]; // getThreshold()
    pub const NONCE: [u8; 4] = [0xaf, 0xfe, 0xd0, 0xe0]; // nonce()
    pub const DOMAIN_SEPARATOR: [u8; 4] = [0xf6, 0x98, 0xda, 0x25]; // domainSeparator()
    pub const GET_TRANSACTION_HASH: [u8; 4] = [0xd8, 0xd1, 0x1f, 0x78];
    pub const SETUP: [u8; 4] = [0xb6, 0x3e, 0x80, 0x0d];

    // Owner, module and guard management
    pub const ADD_OWNER_WITH_THRESHOLD: [u8; 4] = [0x0d, 0x58, 0x2f, 0x13]; // addOwnerWithThreshold(address,uint256)
    pub const REMOVE_OWNER: [u8; 4] = [0xf8, 0xdc, 0x5d, 0xd9]; // removeOwner(address,address,uint256)
    pub const SWAP_OWNER: [u8; 4] = [0xe3, 0x18, 0xb5, 0x2b]; // swapOwner(address,address,address)
    pub const CHANGE_THRESHOLD: [u8; 4] = [0x69, 0x4e, 0x80, 0xc3]; // changeThreshold(uint256)
    pub const ENABLE_MODULE: [u8; 4] = [0x61, 0x0b, 0x59, 0x25]; // enableModule(address)
    pub const DISABLE_MODULE: [u8; 4] = [0xe0, 0x09, 0xcf, 0xde]; // disableModule(address,address)
    pub const SET_GUARD: [u8; 4] = [0xe1, 0x9a, 0x9d, 0xd9]; // setGuard(address)
    pub const SET_FALLBACK_HANDLER: [u8; 4] = [0xf0, 0x8a, 0x03, 0x23]; // setFallbackHandler(address)

    // EIP-1271
    pub const IS_VALID_SIGNATURE: [u8; 4] = [0x16, 0x26, 0xba, 0x7e]; // isValidSignature(bytes32,bytes)

    // Batch executor
    pub const MULTI_SEND: [u8; 4] = [0x8d, 0x80, 0xff, 0x0a]; // multiSend(bytes)

    // Proxy factory
    pub const CREATE_PROXY_WITH_NONCE: [u8; 4] = [0x16, 0x88, 0xf0, 0xb9]; // createProxyWithNonce(address,bytes,uint256)
    pub const CREATE_CHAIN_SPECIFIC_PROXY_WITH_NONCE: [u8; 4] = [0xec, 0x9e, 0x80, 0xbb];
    pub const PROXY_CREATION_CODE: [u8; 4] = [0x53, 0xe5, 0xd9, 0x35]; // proxyCreationCode()

    // Tokens
    pub const TRANSFER: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb]; // transfer(address,uint256)
    pub const SAFE_TRANSFER_FROM: [u8; 4] = [0x42, 0x84, 0x2e, 0x0e]; // safeTransferFrom(address,address,uint256)

    /// Identify a function by its selector
    pub fn identify(selector: &[u8; 4]) -> Option<&'static str> {
        match *selector {
            Self::EXEC_TRANSACTION => Some(EXEC_TRANSACTION_SIG),
            Self::APPROVE_HASH => Some("approveHash(bytes32)"),
            Self::GET_OWNERS => Some("getOwners()"),
            Self::GET_THRESHOLD => Some("getThreshold()"),
            Self::NONCE => Some("nonce()"),
            Self::DOMAIN_SEPARATOR => Some("domainSeparator()"),
            Self::GET_TRANSACTION_HASH => Some(GET_TRANSACTION_HASH_SIG),
            Self::SETUP => Some(SETUP_SIG),
            Self::ADD_OWNER_WITH_THRESHOLD => Some("addOwnerWithThreshold(address,uint256)"),
            Self::REMOVE_OWNER => Some("removeOwner(address,address,uint256)"),
            Self::SWAP_OWNER => Some("swapOwner(address,address,address)"),
            Self::CHANGE_THRESHOLD => Some("changeThreshold(uint256)"),
            Self::ENABLE_MODULE => Some("enableModule(address)"),
            Self::DISABLE_MODULE => Some("disableModule(address,address)"),
            Self::SET_GUARD => Some("setGuard(address)"),
            Self::SET_FALLBACK_HANDLER => Some("setFallbackHandler(address)"),
            Self::IS_VALID_SIGNATURE => Some("isValidSignature(bytes32,bytes)"),
            Self::MULTI_SEND => Some("multiSend(bytes)"),
            Self::CREATE_PROXY_WITH_NONCE => Some("createProxyWithNonce(address,bytes,uint256)"),
            Self::CREATE_CHAIN_SPECIFIC_PROXY_WITH_NONCE => {
                Some("createChainSpecificProxyWithNonce(address,bytes,uint256)")
            }
            Self::PROXY_CREATION_CODE => Some("proxyCreationCode()"),
            Self::TRANSFER => Some("transfer(address,uint256)"),
            Self::SAFE_TRANSFER_FROM => Some("safeTransferFrom(address,address,uint256)"),
            _ => None,
        }
    }

    #[cfg(test)]
    fn all() -> [[u8; 4]; 23] {
        [
            Self::EXEC_TRANSACTION,
            Self::APPROVE_HASH,
            Self::GET_OWNERS,
            Self::GET_THRESHOLD,
            Self::NONCE,
            Self::DOMAIN_SEPARATOR,
            Self::GET_TRANSACTION_HASH,
            Self::SETUP,
            Self::ADD_OWNER_WITH_THRESHOLD,
            Self::REMOVE_OWNER,
            Self::SWAP_OWNER,
            Self::CHANGE_THRESHOLD,
            Self::ENABLE_MODULE,
            Self::DISABLE_MODULE,
            Self::SET_GUARD,
            Self::SET_FALLBACK_HANDLER,
            Self::IS_VALID_SIGNATURE,
            Self::MULTI_SEND,
            Self::CREATE_PROXY_WITH_NONCE,
            Self::CREATE_CHAIN_SPECIFIC_PROXY_WITH_NONCE,
            Self::PROXY_CREATION_CODE,
            Self::TRANSFER,
            Self::SAFE_TRANSFER_FROM,
        ]
    }
}
