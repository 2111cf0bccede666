//! Serde helpers for the search API's loose JSON typing.
//!
//! Responsibilities:
//! - Accept either JSON numbers or strings for numeric counters.
//! - Emit booleans as the `"true"`/`"false"` strings the job endpoint expects.
//!
//! Invariants / assumptions:
//! - These helpers must not log or print secrets; errors are generic parse errors.

use serde::de::Error as _;
use serde::{Deserialize, Serializer};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum U64OrString {
    U64(u64),
    I64(i64),
    String(String),
}

pub fn u64_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = U64OrString::deserialize(deserializer)?;
    match value {
        U64OrString::U64(v) => Ok(v),
        U64OrString::I64(v) => u64::try_from(v).map_err(D::Error::custom),
        U64OrString::String(s) => s.trim().parse::<u64>().map_err(D::Error::custom),
    }
}

pub fn bool_as_string<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(if *value { "true" } else { "false" })
}
