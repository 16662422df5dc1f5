//! FFI Layer
//!
//! All C-ABI exports are defined here. Every export follows the same
//! pattern:
//! - Input: JSON string (null-terminated C string)
//! - Output: `ApiResponse` JSON string (must be freed with `safe_free_string`)
//!
//! The request shapes and the plain-Rust operations behind each export are
//! public so the CLI drives exactly the same code.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use ethers_core::types::{Address, H256, U256};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::SafeDeployment;
use crate::eip712::{get_pre_image, SafeDomain, SafeTxPreImage};
use crate::error::{SafeError, SafeResult};
use crate::execution::{check_signatures, ExecutionEncoder, SignatureCheckReport};
use crate::factory::{chain_specific_salt, salt, AddressPredictor, SafeAccountConfig};
use crate::multisend::{multi_send_call_data, BatchEncoder, BatchExecutor, BatchItem};
use crate::signatures::SignatureCollector;
use crate::types::{ApiResponse, Operation, TransactionRecord, WalletConfigInput};
use crate::utils::parse_address;

// =============================================================================
// Requests and responses
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionHashRequest {
    pub chain_id: u64,
    /// Checked as the verifying contract; a malformed value is `InvalidAddress`
    pub safe: String,
    pub transaction: TransactionRecord,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub transactions: Vec<BatchItem>,
    /// Defaults to the narrowest executor able to run every item
    #[serde(default)]
    pub executor: Option<BatchExecutor>,
    #[serde(default)]
    pub deployment: Option<SafeDeployment>,
}

/// A ready-to-sign delegate call into the batch executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub executor: BatchExecutor,
    pub to: Address,
    pub operation: Operation,
    #[serde(with = "crate::serde_bytes::hex_vec")]
    pub payload: Vec<u8>,
    #[serde(with = "crate::serde_bytes::hex_vec")]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackRequest {
    pub wallet: WalletConfigInput,
    pub transaction: TransactionRecord,
    #[serde(with = "crate::serde_bytes::hex_vec_list")]
    pub signatures: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackResponse {
    pub transaction_hash: H256,
    pub signers: Vec<Address>,
    #[serde(with = "crate::serde_bytes::hex_vec")]
    pub signatures: Vec<u8>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecDataRequest {
    pub safe: String,
    pub transaction: TransactionRecord,
    /// Packed signature blob
    #[serde(with = "crate::serde_bytes::hex_vec")]
    pub signatures: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecDataResponse {
    pub to: Address,
    pub value: U256,
    #[serde(with = "crate::serde_bytes::hex_vec")]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    pub wallet: WalletConfigInput,
    pub transaction: TransactionRecord,
    #[serde(with = "crate::serde_bytes::hex_vec")]
    pub signatures: Vec<u8>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    #[serde(flatten)]
    pub account: SafeAccountConfig,
    pub salt_nonce: U256,
    /// Output of the factory's `proxyCreationCode()` getter
    #[serde(with = "crate::serde_bytes::hex_vec")]
    pub proxy_creation_code: Vec<u8>,
    /// Set to predict a `createChainSpecificProxyWithNonce` deployment
    #[serde(default)]
    pub chain_id: Option<u64>,
    #[serde(default)]
    pub factory: Option<Address>,
    #[serde(default)]
    pub singleton: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    pub address: Address,
    pub factory: Address,
    pub singleton: Address,
    pub salt: H256,
    pub init_code_hash: H256,
    #[serde(with = "crate::serde_bytes::hex_vec")]
    pub initializer: Vec<u8>,
}

// =============================================================================
// Operations
// =============================================================================

/// Domain separator, struct hash and signing hash of a record
pub fn hash_transaction(request: &TransactionHashRequest) -> SafeResult<SafeTxPreImage> {
    let domain = SafeDomain::parse(request.chain_id, &request.safe)?;
    Ok(get_pre_image(&request.transaction, &domain))
}

/// Pack a batch and wrap it as `multiSend(bytes)` call data
pub fn batch_transaction(request: &BatchRequest) -> SafeResult<BatchResponse> {
    let executor = request
        .executor
        .unwrap_or_else(|| BatchExecutor::for_items(&request.transactions));
    let deployment = request.deployment.unwrap_or_default();

    let payload = BatchEncoder::default().encode_for(&request.transactions, executor)?;
    Ok(BatchResponse {
        executor,
        to: executor.address(&deployment),
        operation: Operation::DelegateCall,
        data: multi_send_call_data(&payload),
        payload,
    })
}

/// Collect the given signatures for a record and pack them
pub fn pack_transaction(request: &PackRequest) -> SafeResult<PackResponse> {
    let collector = SignatureCollector::new(request.wallet.clone().into_config()?);
    let hash = collector.track(&request.transaction);
    for signature in &request.signatures {
        collector.submit(hash, signature)?;
    }

    let signatures = collector.pack(hash)?;
    Ok(PackResponse {
        transaction_hash: hash,
        signers: collector.signers(hash),
        signatures,
    })
}

/// `execTransaction` call data for a record and its packed signatures
pub fn exec_transaction_data(request: &ExecDataRequest) -> SafeResult<ExecDataResponse> {
    Ok(ExecDataResponse {
        to: parse_address(&request.safe)?,
        value: U256::zero(),
        data: ExecutionEncoder::exec_transaction(&request.transaction, &request.signatures),
    })
}

/// Local pre-flight check of a packed blob
pub fn check_transaction(request: &CheckRequest) -> SafeResult<SignatureCheckReport> {
    let wallet = request.wallet.clone().into_config()?;
    check_signatures(&wallet, &request.transaction, &request.signatures, None)
}

/// Counterfactual address of a new wallet
pub fn predict_address(request: &PredictRequest) -> SafeResult<PredictResponse> {
    let deployment = SafeDeployment::default();
    let factory = request.factory.unwrap_or(deployment.proxy_factory);
    let singleton = request.singleton.unwrap_or(deployment.singleton);
    let predictor = AddressPredictor::new(
        factory,
        crate::factory::init_code_hash(&request.proxy_creation_code, &singleton),
    );

    let initializer = request.account.initializer()?;
    let (address, salt) = match request.chain_id {
        Some(chain_id) => (
            predictor.predict_chain_specific(&initializer, request.salt_nonce, chain_id),
            chain_specific_salt(&initializer, request.salt_nonce, chain_id),
        ),
        None => (
            predictor.predict(&initializer, request.salt_nonce),
            salt(&initializer, request.salt_nonce),
        ),
    };

    Ok(PredictResponse {
        address,
        factory,
        singleton,
        salt,
        init_code_hash: predictor.init_code_hash(),
        initializer,
    })
}

// =============================================================================
// Memory Management
// =============================================================================

/// Free a string returned by any safe_* function
///
/// # Safety
/// The pointer must have been returned by a safe_* function and not freed
/// before.
#[unsafe(no_mangle)]
pub extern "C" fn safe_free_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    unsafe {
        drop(CString::from_raw(s));
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Read and deserialize a JSON request, or produce the error response
fn parse_input<T: DeserializeOwned>(input: *const c_char) -> Result<T, *mut c_char> {
    if input.is_null() {
        return Err(error_response(SafeError::invalid_input("Null input pointer")));
    }

    let c_str = unsafe { CStr::from_ptr(input) };
    let json_str = c_str
        .to_str()
        .map_err(|_| error_response(SafeError::invalid_input("Invalid UTF-8 string")))?;

    serde_json::from_str(json_str)
        .map_err(|e| error_response(SafeError::invalid_input(format!("Invalid JSON: {}", e))))
}

fn respond<T: Serialize>(result: SafeResult<T>) -> *mut c_char {
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_response(e),
    }
}

/// Create a success response JSON string
fn success_response<T: Serialize>(data: T) -> *mut c_char {
    string_to_ptr(ApiResponse::ok(data).to_json())
}

/// Create an error response JSON string
fn error_response(error: SafeError) -> *mut c_char {
    crate::log_debug!("ffi", "request failed", reason = error.to_string());
    let response: ApiResponse<()> = ApiResponse::err(error);
    string_to_ptr(response.to_json())
}

/// Convert Rust string to C string pointer
fn string_to_ptr(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(c_str) => c_str.into_raw(),
        Err(_) => CString::from(
            c"{\"success\":false,\"error\":{\"code\":\"invalid_input\",\"message\":\"String conversion failed\"}}",
        )
        .into_raw(),
    }
}

// =============================================================================
// Exports
// =============================================================================

/// Signing hash of a transaction record
///
/// # Input
/// ```json
/// { "chainId": 1, "safe": "0x...", "transaction": { "to": "0x...", "value": "0x0", ... } }
/// ```
///
/// # Output
/// `{ "domainSeparator", "structHash", "transactionHash" }`
#[unsafe(no_mangle)]
pub extern "C" fn safe_transaction_hash(input: *const c_char) -> *mut c_char {
    let request: TransactionHashRequest = match parse_input(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };
    respond(hash_transaction(&request))
}

/// Pack a multi-transaction batch
///
/// # Input
/// ```json
/// { "transactions": [{ "operation": 0, "to": "0x...", "value": "0x0", "data": "0x" }] }
/// ```
///
/// # Output
/// `{ "executor", "to", "operation", "payload", "data" }`
#[unsafe(no_mangle)]
pub extern "C" fn safe_encode_batch(input: *const c_char) -> *mut c_char {
    let request: BatchRequest = match parse_input(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };
    respond(batch_transaction(&request))
}

/// Validate owner signatures and pack them in ascending signer order
///
/// # Input
/// ```json
/// { "wallet": { "owners": [...], "threshold": 2, "chainId": 1, "verifyingContract": "0x..." },
///   "transaction": { ... }, "signatures": ["0x...", "0x..."] }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn safe_pack_signatures(input: *const c_char) -> *mut c_char {
    let request: PackRequest = match parse_input(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };
    respond(pack_transaction(&request))
}

/// `execTransaction` call data
///
/// # Input
/// ```json
/// { "safe": "0x...", "transaction": { ... }, "signatures": "0x..." }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn safe_encode_exec_transaction(input: *const c_char) -> *mut c_char {
    let request: ExecDataRequest = match parse_input(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };
    respond(exec_transaction_data(&request))
}

/// Check a packed signature blob the way the wallet contract would
#[unsafe(no_mangle)]
pub extern "C" fn safe_check_signatures(input: *const c_char) -> *mut c_char {
    let request: CheckRequest = match parse_input(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };
    respond(check_transaction(&request))
}

/// Counterfactual wallet address
///
/// # Input
/// ```json
/// { "owners": [...], "threshold": 1, "saltNonce": "0x2a", "proxyCreationCode": "0x..." }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn safe_predict_address(input: *const c_char) -> *mut c_char {
    let request: PredictRequest = match parse_input(input) {
        Ok(r) => r,
        Err(ptr) => return ptr,
    };
    respond(predict_address(&request))
}
