//! Serde helpers for byte payloads
//!
//! Call data, signature blobs and batch payloads travel as `0x`-prefixed
//! hex strings in every JSON shape this crate produces or accepts.

use serde::{Deserialize, Deserializer, Serializer};

fn strip(s: &str) -> &str {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s)
}

/// Serialize/deserialize `Vec<u8>` as a `0x` hex string
pub mod hex_vec {
    use super::*;

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        hex::decode(strip(&s)).map_err(serde::de::Error::custom)
    }
}

/// Like [`hex_vec`] but `null` and a missing field both read as empty
pub mod hex_vec_default {
    use super::*;

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        super::hex_vec::serialize(bytes, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<String> = Option::deserialize(deserializer)?;
        match opt {
            Some(s) => hex::decode(strip(&s)).map_err(serde::de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}

/// Serialize/deserialize `Vec<Vec<u8>>` as a list of `0x` hex strings
pub mod hex_vec_list {
    use super::*;
    use serde::ser::SerializeSeq;

    pub fn serialize<S>(items: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in items {
            seq.serialize_element(&format!("0x{}", hex::encode(item)))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Vec<String> = Vec::deserialize(deserializer)?;
        raw.iter()
            .map(|s| hex::decode(strip(s)).map_err(serde::de::Error::custom))
            .collect()
    }
}
