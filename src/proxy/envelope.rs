//! Inbound request envelope.
//!
//! # Responsibilities
//! - Deserialize the inbound JSON body into a typed envelope
//! - Model the duck-typed `data` field as an explicit variant
//! - Strip proxy control fields (`apiBase`, `contentType`) out of
//!   structured payloads before they reach the upstream
//!
//! # Design Decisions
//! - `Payload` is untagged: a JSON string is `Raw`, an object is
//!   `Structured`, any other JSON value is `Other`
//! - Lenient string parsing is a first-class outcome (`ParsedOrRaw`),
//!   never an error surfaced to the caller
//! - Non-object inbound bodies degrade to an empty envelope rather than
//!   being rejected

use serde::Deserialize;
use serde_json::{Map, Value};

/// Envelope keys that steer the proxy and must never reach the upstream.
const CONTROL_FIELDS: [&str; 2] = ["apiBase", "contentType"];

/// Parsed inbound request body. Lives for one request only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundEnvelope {
    /// Opaque payload forwarded to the upstream.
    #[serde(default)]
    pub data: Option<Payload>,

    /// Content type of the outbound request. Defaults to JSON.
    #[serde(default, rename = "contentType")]
    pub content_type: Option<String>,

    /// Per-request upstream base override.
    #[serde(default, rename = "apiBase")]
    pub api_base: Option<String>,
}

impl InboundEnvelope {
    /// Parse an inbound body. An empty body yields the default envelope;
    /// a valid JSON body that is not an object carries no envelope fields
    /// and also yields the default.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_slice(bytes)?;
        if value.is_object() {
            serde_json::from_value(value)
        } else {
            Ok(Self::default())
        }
    }

    /// Effective content type, defaulting to `application/json`.
    pub fn content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or("application/json")
    }
}

/// The duck-typed `data` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    /// A JSON string, possibly containing serialized JSON itself.
    Raw(String),
    /// A structured mapping, key order preserved.
    Structured(Map<String, Value>),
    /// Any other JSON value (array, number, boolean).
    Other(Value),
}

/// Outcome of a best-effort JSON parse of a string payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedOrRaw {
    Parsed(Value),
    Raw(String),
}

/// Try to parse a string as JSON; hand the string back unchanged on failure.
pub fn parse_lenient(input: &str) -> ParsedOrRaw {
    match serde_json::from_str(input) {
        Ok(value) => ParsedOrRaw::Parsed(value),
        Err(_) => ParsedOrRaw::Raw(input.to_string()),
    }
}

/// Shallow-copy a structured payload without its control fields.
/// Idempotent: stripping twice equals stripping once.
pub fn strip_control_fields(payload: &Map<String, Value>) -> Map<String, Value> {
    let mut clean = payload.clone();
    for field in CONTROL_FIELDS {
        if clean.remove(field).is_some() {
            tracing::warn!(
                field,
                "Control field found in request payload; it is used only for proxying and will be removed"
            );
        }
    }
    clean
}
