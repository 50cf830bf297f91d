//! Parsers for `key=value` style arguments.

use anyhow::{Result, bail};
use serde_json::Value;

/// Splits `key=value`. The value may itself contain `=`.
pub fn split_pair(raw: &str) -> Result<(String, String)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("expected key=value, got '{raw}'");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("missing key in '{raw}'");
    }
    Ok((key.to_string(), value.to_string()))
}

/// Reads a value as JSON when it parses, as a plain string otherwise.
///
/// `--where priority=3` compares against the number 3 while
/// `--where title=Fix leak` compares against the string.
pub fn loose_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Parses `key=value` with a loosely typed value.
pub fn loose_pair(raw: &str) -> Result<(String, Value)> {
    let (key, value) = split_pair(raw)?;
    Ok((key, loose_value(&value)))
}
