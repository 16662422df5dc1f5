//! Structured logging with redaction
//!
//! Entries go to stderr as `[timestamp] LEVEL [module] message | k=v ...`.
//! Field values are rewritten according to the field name before they are
//! rendered:
//! - secret material (`private_key`, `secret`, `seed`, ...) is replaced
//! - addresses are shortened to `0x1234ab...cdef`
//! - hashes, signatures and blobs are shortened to prefix and suffix
//!
//! A field name is matched per `_`-separated segment, so `tx_hash` is a hash
//! and `safe_address` an address, while `total` is left alone.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

pub fn enable_debug() {
    DEBUG_ENABLED.store(true, Ordering::SeqCst);
}

pub fn disable_debug() {
    DEBUG_ENABLED.store(false, Ordering::SeqCst);
}

pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::SeqCst)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        })
    }
}

/// How a field value is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Secret,
    Address,
    Digest,
    Plain,
}

const SECRET_SEGMENTS: &[&str] = &["private", "privatekey", "secret", "seed", "mnemonic"];
const ADDRESS_SEGMENTS: &[&str] = &["address", "owner", "signer", "sender", "wallet", "safe", "to"];
const DIGEST_SEGMENTS: &[&str] = &["hash", "signature", "blob", "salt", "payload"];

impl FieldKind {
    fn of(key: &str) -> Self {
        let key = key.to_ascii_lowercase();
        let has = |table: &[&str]| key.split('_').any(|segment| table.contains(&segment));

        if has(SECRET_SEGMENTS) || key.contains("signing_key") {
            FieldKind::Secret
        } else if has(ADDRESS_SEGMENTS) {
            FieldKind::Address
        } else if has(DIGEST_SEGMENTS) {
            FieldKind::Digest
        } else {
            FieldKind::Plain
        }
    }

    fn render(self, value: &str) -> String {
        let value = value.trim();
        if value.is_empty() {
            return "[EMPTY]".to_string();
        }
        match self {
            FieldKind::Secret => format!("[REDACTED:{}chars]", value.len()),
            FieldKind::Address => shorten(value, 8, 4),
            FieldKind::Digest => shorten(value, 12, 6),
            FieldKind::Plain => value.to_string(),
        }
    }
}

/// Keep `head` leading and `tail` trailing characters of a hex string
fn shorten(value: &str, head: usize, tail: usize) -> String {
    if value.len() <= head + tail + 3 || !value.is_ascii() {
        return value.to_string();
    }
    format!("{}...{}", &value[..head], &value[value.len() - tail..])
}

/// Structured log entry
#[derive(Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub module: &'static str,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn new(level: LogLevel, module: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            module,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field, redacted according to its name
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let shown = FieldKind::of(key).render(&value.to_string());
        self.fields.push((key, shown));
        self
    }

    fn render(&self) -> String {
        let mut line = format!("{} [{}] {}", self.level, self.module, self.message);
        for (i, (key, value)) in self.fields.iter().enumerate() {
            line.push_str(if i == 0 { " | " } else { " " });
            line.push_str(key);
            line.push('=');
            line.push_str(value);
        }
        line
    }

    pub fn log(self) {
        if self.level == LogLevel::Debug && !is_debug_enabled() {
            return;
        }
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");
        eprintln!("[{}] {}", timestamp, self.render());
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_at {
    ($level:ident, $module:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::$level,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

/// `log_debug!(module, message, key = value, ...)`; printed only when debug is on
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => { $crate::__log_at!(Debug, $($arg)*) };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { $crate::__log_at!(Info, $($arg)*) };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => { $crate::__log_at!(Warn, $($arg)*) };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => { $crate::__log_at!(Error, $($arg)*) };
}
