//! Request translation.
//!
//! # Responsibilities
//! - Resolve the effective upstream base (configured or envelope override)
//! - Build the outbound URL, Content-Type header, and body
//! - Pin the outbound timeout
//!
//! # Design Decisions
//! - The `apiBase` override only ever comes from the top-level envelope,
//!   never from inside `data`
//! - Body construction never fails: unparseable string payloads are
//!   forwarded verbatim
//! - GET requests never carry a body

use std::time::Duration;

use axum::http::Method;
use serde_json::Value;

use crate::config::schema::UpstreamConfig;
use crate::proxy::envelope::{
    parse_lenient, strip_control_fields, InboundEnvelope, ParsedOrRaw, Payload,
};

/// Fully-resolved outbound request, ready for execution.
#[derive(Debug, Clone)]
pub struct UpstreamRequestSpec {
    pub method: Method,
    pub url: String,
    pub content_type: String,
    pub body: Option<OutboundBody>,
    pub timeout: Duration,
}

/// Outbound request body.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundBody {
    /// JSON value, serialized when the request is built.
    Json(Value),
    /// Raw text sent under the envelope's content type.
    Text(String),
}

/// Translate an inbound request into an outbound request spec.
///
/// `upstream_path` is the path resolved by the route table, not raw user
/// input (except for the catch-all, which forwards the original path).
pub fn translate(
    method: &Method,
    upstream_path: &str,
    envelope: &InboundEnvelope,
    config: &UpstreamConfig,
) -> UpstreamRequestSpec {
    let base = effective_base(envelope, config);
    let url = format!("{base}{upstream_path}");
    let content_type = envelope.content_type().to_string();

    let body = if *method != Method::GET {
        envelope
            .data
            .as_ref()
            .map(|payload| build_body(payload, &content_type))
    } else {
        None
    };

    tracing::debug!(
        method = %method,
        url = %url,
        content_type = %content_type,
        has_body = body.is_some(),
        "Translated inbound request"
    );
    if let Some(body) = &body {
        tracing::debug!(payload = ?body, "Outbound payload");
    }

    UpstreamRequestSpec {
        method: method.clone(),
        url,
        content_type,
        body,
        timeout: Duration::from_secs(config.timeout_secs),
    }
}

fn effective_base(envelope: &InboundEnvelope, config: &UpstreamConfig) -> String {
    match &envelope.api_base {
        Some(base) if config.allow_api_base_override => base.clone(),
        Some(base) => {
            tracing::warn!(
                api_base = %base,
                "apiBase override is disabled; using the configured upstream base"
            );
            config.base_url.clone()
        }
        None => config.base_url.clone(),
    }
}

fn build_body(payload: &Payload, content_type: &str) -> OutboundBody {
    if content_type == "application/json" {
        match payload {
            Payload::Raw(text) => match parse_lenient(text) {
                ParsedOrRaw::Parsed(value) => OutboundBody::Json(value),
                ParsedOrRaw::Raw(text) => OutboundBody::Text(text),
            },
            Payload::Structured(map) => {
                OutboundBody::Json(Value::Object(strip_control_fields(map)))
            }
            Payload::Other(value) => OutboundBody::Json(value.clone()),
        }
    } else {
        match payload {
            Payload::Raw(text) => OutboundBody::Text(text.clone()),
            Payload::Structured(map) => {
                OutboundBody::Text(Value::Object(map.clone()).to_string())
            }
            Payload::Other(value) => OutboundBody::Text(value.to_string()),
        }
    }
}
