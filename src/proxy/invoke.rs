//! Upstream invocation and outcome classification.
//!
//! # Responsibilities
//! - Execute the outbound call exactly once (no retry, no backoff)
//! - Classify the result into a closed set of outcomes
//! - Render outcomes as (status, JSON body) pairs
//!
//! # Design Decisions
//! - Non-2xx upstream statuses pass through verbatim, wrapped in the
//!   documented error shape
//! - Connection refusal is its own outcome (503); every other transport
//!   failure, timeouts and DNS errors included, collapses into `Failed` (500)
//! - A null 2xx body is normalized to `{"message": "No content"}`

use std::error::Error as _;

use axum::http::StatusCode;
use reqwest::header;
use serde_json::{json, Value};

use crate::proxy::translate::{OutboundBody, UpstreamRequestSpec};

/// Error message for an unreachable upstream.
pub const CONNECTION_REFUSED_MESSAGE: &str =
    "Connection refused. Please check if the memory API server is running.";

/// Classified result of one outbound call.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamOutcome {
    /// The upstream answered with a 2xx status.
    Success { status: StatusCode, body: Value },
    /// The call completed but the upstream returned a non-2xx status.
    UpstreamError { status: StatusCode, body: Value },
    /// The upstream host could not be reached at all.
    ConnectionRefused,
    /// Any other transport or serialization failure.
    Failed(String),
}

impl UpstreamOutcome {
    /// Render the outcome as a response status and JSON body.
    pub fn into_parts(self) -> (StatusCode, Value) {
        match self {
            UpstreamOutcome::Success { status, body } => {
                if body.is_null() {
                    (status, json!({"message": "No content"}))
                } else {
                    (status, body)
                }
            }
            UpstreamOutcome::UpstreamError { status, body } => {
                (status, json!({"error": body, "status": status.as_u16()}))
            }
            UpstreamOutcome::ConnectionRefused => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({"error": CONNECTION_REFUSED_MESSAGE, "status": 503}),
            ),
            UpstreamOutcome::Failed(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": message, "status": 500}),
            ),
        }
    }
}

/// Execute an outbound request spec and classify the result.
pub async fn invoke(client: &reqwest::Client, spec: UpstreamRequestSpec) -> UpstreamOutcome {
    let mut request = client
        .request(spec.method.clone(), spec.url.as_str())
        .header(header::CONTENT_TYPE, &spec.content_type)
        .timeout(spec.timeout);

    match &spec.body {
        Some(OutboundBody::Json(value)) => match serde_json::to_vec(value) {
            Ok(bytes) => request = request.body(bytes),
            Err(err) => return UpstreamOutcome::Failed(err.to_string()),
        },
        Some(OutboundBody::Text(text)) => request = request.body(text.clone()),
        None => {}
    }

    let response = match request.send().await {
        Ok(response) => response,
        Err(err) if is_connection_refused(&err) => {
            tracing::error!(method = %spec.method, url = %spec.url, error = %err, "Upstream connection refused");
            return UpstreamOutcome::ConnectionRefused;
        }
        Err(err) => {
            tracing::error!(method = %spec.method, url = %spec.url, error = %err, "Upstream request failed");
            return UpstreamOutcome::Failed(err.to_string());
        }
    };

    let status = response.status();
    let body = match response.text().await {
        Ok(text) => parse_upstream_body(&text),
        Err(err) if status.is_success() => {
            tracing::error!(url = %spec.url, error = %err, "Failed to read upstream body");
            return UpstreamOutcome::Failed(err.to_string());
        }
        Err(err) => Value::String(err.to_string()),
    };

    tracing::info!(status = %status, "Upstream response");

    if status.is_success() {
        UpstreamOutcome::Success { status, body }
    } else {
        // No upstream body to surface; fall back to a synthetic message.
        let body = match body {
            Value::Null => Value::String(format!("Request failed with status {status}")),
            other => other,
        };
        UpstreamOutcome::UpstreamError { status, body }
    }
}

/// True only when the connection itself was refused. Other connect-phase
/// failures (DNS resolution, unreachable network) are generic failures.
fn is_connection_refused(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<std::io::Error>() {
            if io_err.kind() == std::io::ErrorKind::ConnectionRefused {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

/// Interpret an upstream body: empty means null, JSON is forwarded as
/// parsed, anything else is kept as a string.
fn parse_upstream_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_success_body_becomes_no_content() {
        let outcome = UpstreamOutcome::Success {
            status: StatusCode::OK,
            body: Value::Null,
        };
        let (status, body) = outcome.into_parts();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "No content"}));
    }

    #[test]
    fn success_status_passes_through() {
        let outcome = UpstreamOutcome::Success {
            status: StatusCode::CREATED,
            body: json!({"id": "m1"}),
        };
        let (status, body) = outcome.into_parts();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"id": "m1"}));
    }

    #[test]
    fn upstream_error_wraps_body_and_status() {
        let outcome = UpstreamOutcome::UpstreamError {
            status: StatusCode::NOT_FOUND,
            body: json!({"detail": "no such memory"}),
        };
        let (status, body) = outcome.into_parts();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"error": {"detail": "no such memory"}, "status": 404})
        );
    }

    #[test]
    fn connection_refused_renders_documented_shape() {
        let (status, body) = UpstreamOutcome::ConnectionRefused.into_parts();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body,
            json!({"error": CONNECTION_REFUSED_MESSAGE, "status": 503})
        );
    }

    #[test]
    fn failure_renders_message_and_500() {
        let (status, body) = UpstreamOutcome::Failed("dns error".to_string()).into_parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "dns error", "status": 500}));
    }

    #[test]
    fn upstream_body_parsing() {
        assert_eq!(parse_upstream_body(""), Value::Null);
        assert_eq!(parse_upstream_body("  "), Value::Null);
        assert_eq!(parse_upstream_body("null"), Value::Null);
        assert_eq!(parse_upstream_body(r#"{"a": 1}"#), json!({"a": 1}));
        assert_eq!(
            parse_upstream_body("plain text"),
            Value::String("plain text".to_string())
        );
    }
}
