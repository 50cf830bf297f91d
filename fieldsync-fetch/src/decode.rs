//! Response decoding.
//!
//! Backend responses come in two shapes: wrapped as `{"response": <payload>}`
//! or as the bare payload. Mutation endpoints may also answer 204 or an empty
//! 200. [`decode`] handles them in a fixed order:
//!
//! 1. Callers asking for [`NoContent`] succeed on any 2xx body, JSON or not.
//! 2. 204 or a blank body: fails for every other type.
//! 3. An object with a `response` key: the inner value is decoded.
//! 4. Anything else: decoded as the bare payload.
//!
//! Keys are normalized to lower snake case before decoding, so the backend's
//! `Created Date` or `createdDate` both reach models as `created_date`.

use serde::de::{self, DeserializeOwned, IgnoredAny, Visitor};
use serde::{Deserialize, Deserializer, Serialize, forward_to_deserialize_any};
use serde_json::{Map, Value};

use crate::error::DecodeError;

/// Key wrapping enveloped payloads.
pub const ENVELOPE_KEY: &str = "response";

// ============================================================================
// No Content
// ============================================================================

/// Result type for calls whose response body is irrelevant.
///
/// Decodes from any body: empty, JSON, or plain text such as `OK`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NoContent;

impl<'de> Deserialize<'de> for NoContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IgnoredAny::deserialize(deserializer).map(|_| NoContent)
    }
}

/// Deserializer standing in for a missing body.
///
/// Only types that ignore their input (such as [`NoContent`]) can be built
/// from it; everything else, `Option` and `()` included, fails.
struct EmptyBody;

impl<'de> Deserializer<'de> for EmptyBody {
    type Error = de::value::Error;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(de::Error::custom("response body is empty"))
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(
        self,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// Which shape a response body has.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// `{"response": payload}`; holds the payload.
    Wrapped(Value),
    /// The payload itself.
    Bare(Value),
}

impl Envelope {
    /// Detects the shape of `body`.
    ///
    /// A body is wrapped when it is an object carrying the envelope key. A
    /// bare payload that happens to have a `response` field is therefore
    /// read as wrapped.
    pub fn detect(body: Value) -> Self {
        match body {
            Value::Object(mut map) if map.contains_key(ENVELOPE_KEY) => {
                let inner = map.remove(ENVELOPE_KEY).unwrap_or(Value::Null);
                Self::Wrapped(inner)
            }
            other => Self::Bare(other),
        }
    }

    fn into_parts(self) -> (&'static str, Value) {
        match self {
            Self::Wrapped(value) => (ENVELOPE_KEY, value),
            Self::Bare(value) => ("<root>", value),
        }
    }
}

// ============================================================================
// Decode
// ============================================================================

/// Decodes a response body into `T`.
pub fn decode<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, DecodeError> {
    // Only body-agnostic types such as `NoContent` build from `EmptyBody`.
    if let Ok(value) = T::deserialize(EmptyBody) {
        return Ok(value);
    }
    if status == 204 || body.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::UnexpectedEmpty);
    }

    let raw: Value =
        serde_json::from_slice(body).map_err(|e| DecodeError::Corrupted(e.to_string()))?;

    let (path, value) = Envelope::detect(normalize_keys(raw)).into_parts();
    serde_json::from_value(value).map_err(|e| describe(path, &e))
}

fn describe(path: &'static str, err: &serde_json::Error) -> DecodeError {
    let message = err.to_string();
    match err.classify() {
        serde_json::error::Category::Data if message.starts_with("missing field") => {
            DecodeError::MissingKey { path, message }
        }
        serde_json::error::Category::Data => DecodeError::TypeMismatch { path, message },
        _ => DecodeError::Corrupted(message),
    }
}

// ============================================================================
// Key Normalization
// ============================================================================

/// Normalizes every object key in `value`, recursively.
///
/// When two keys normalize to the same name, the later one wins.
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (normalize_key(&k), normalize_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

/// Converts a backend key to lower snake case.
///
/// Spaces, hyphens, and underscores become single underscores, a lower-case
/// letter or digit followed by an upper-case letter starts a new word, and
/// leading underscores are kept (`_id` stays `_id`).
pub fn normalize_key(key: &str) -> String {
    let trimmed = key.trim();
    let body = trimmed.trim_start_matches('_');
    let mut out = String::with_capacity(trimmed.len() + 4);
    out.push_str(&trimmed[..trimmed.len() - body.len()]);
    let prefix_len = out.len();

    let mut pending_separator = false;
    let mut prev_lower_or_digit = false;

    for c in body.chars() {
        if c.is_whitespace() || c == '-' || c == '_' {
            pending_separator = true;
            prev_lower_or_digit = false;
            continue;
        }
        if c.is_uppercase() && prev_lower_or_digit {
            pending_separator = true;
        }
        if pending_separator && out.len() > prefix_len {
            out.push('_');
        }
        pending_separator = false;
        prev_lower_or_digit = c.is_lowercase() || c.is_ascii_digit();
        out.extend(c.to_lowercase());
    }

    out
}

// ============================================================================
// Tests
// ============================================================================
