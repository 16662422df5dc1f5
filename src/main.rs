use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ethers_core::types::{Address, H256};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use zeroize::Zeroizing;

use safe_multisig::config::{self, CoreConfig};
use safe_multisig::ffi::{self, TransactionHashRequest};
use safe_multisig::signatures::{sign_transaction_hash, LocalKeySigner, SigningMethod};
use safe_multisig::{ApiResponse, SafeError, SafeResult};

const ENV_PRIVATE_KEY: &str = "SAFE_MULTISIG_PRIVATE_KEY";

/// Offline Safe multisig tooling: hashes, batches, signature packing and
/// address prediction. Reads one JSON request, prints one JSON response.
#[derive(Parser, Debug)]
#[command(name = "safe-multisig", author, version, about)]
struct Cli {
    /// JSON request file. Reads stdin when omitted.
    #[arg(long, short, global = true)]
    input: Option<PathBuf>,

    /// Core configuration file (JSON). Falls back to SAFE_MULTISIG_* variables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(long, global = true)]
    debug: bool,

    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Domain separator, struct hash and signing hash of a record
    TxHash,
    /// Pack a batch into multiSend call data
    Batch,
    /// Validate owner signatures and pack them for execTransaction
    Pack,
    /// execTransaction call data for a record and packed signatures
    ExecData,
    /// Check a packed signature blob locally
    Check,
    /// Counterfactual address of a new wallet
    Predict,
    /// Sign a record's hash with a local key
    Sign {
        /// Hex private key. Falls back to SAFE_MULTISIG_PRIVATE_KEY.
        #[arg(long)]
        private_key: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignRequest {
    #[serde(flatten)]
    target: TransactionHashRequest,
    #[serde(default)]
    method: SigningMethod,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignResponse {
    signer: Address,
    transaction_hash: H256,
    #[serde(with = "safe_multisig::serde_bytes::hex_vec")]
    signature: Vec<u8>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut core = match &cli.config {
        Some(path) => CoreConfig::from_file(path)?,
        None => CoreConfig::from_env()?,
    };
    if cli.debug {
        core.debug_logging = true;
    }
    config::set_global(core)?;

    let raw = read_request(cli.input.as_deref())?;
    let response = match run(&cli.command, &raw) {
        Ok(data) => ApiResponse::ok(data),
        Err(e) => ApiResponse::err(e),
    };

    let out = if cli.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", out);

    if !response.success {
        std::process::exit(1);
    }
    Ok(())
}

fn read_request(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))
        }
        None => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("failed reading request from stdin")?;
            Ok(raw)
        }
    }
}

fn run(command: &Command, raw: &str) -> SafeResult<Value> {
    match command {
        Command::TxHash => to_value(ffi::hash_transaction(&parse(raw)?)?),
        Command::Batch => to_value(ffi::batch_transaction(&parse(raw)?)?),
        Command::Pack => to_value(ffi::pack_transaction(&parse(raw)?)?),
        Command::ExecData => to_value(ffi::exec_transaction_data(&parse(raw)?)?),
        Command::Check => to_value(ffi::check_transaction(&parse(raw)?)?),
        Command::Predict => to_value(ffi::predict_address(&parse(raw)?)?),
        Command::Sign { private_key } => sign(private_key.as_deref(), raw),
    }
}

fn sign(private_key: Option<&str>, raw: &str) -> SafeResult<Value> {
    let key = match private_key {
        Some(key) => Zeroizing::new(key.to_string()),
        None => Zeroizing::new(std::env::var(ENV_PRIVATE_KEY).map_err(|_| {
            SafeError::SigningUnavailable(format!(
                "no private key: pass --private-key or set {}",
                ENV_PRIVATE_KEY
            ))
        })?),
    };
    let signer = LocalKeySigner::from_hex(&key)?;

    let request: SignRequest = parse(raw)?;
    let hash = ffi::hash_transaction(&request.target)?.transaction_hash;
    let signature = sign_transaction_hash(&signer, &hash, request.method)?;

    to_value(SignResponse {
        signer: signature.signer(),
        transaction_hash: hash,
        signature: signature.to_bytes(),
    })
}

fn parse<T: DeserializeOwned>(raw: &str) -> SafeResult<T> {
    Ok(serde_json::from_str(raw)?)
}

fn to_value<T: Serialize>(value: T) -> SafeResult<Value> {
    Ok(serde_json::to_value(value)?)
}
