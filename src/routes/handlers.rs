//! Request handlers.
//!
//! # Responsibilities
//! - Parse the inbound envelope at the boundary (before the core runs)
//! - Invoke the core once per request and render its outcome
//! - Serve the health endpoint and the catch-all fallback
//!
//! # Design Decisions
//! - Malformed inbound JSON and malformed URLs are rejected here with the
//!   documented 400 shapes; the core only ever sees a valid envelope
//! - The catch-all forwards the original path (query included) to the
//!   same upstream base after a distinct warning

use axum::{
    body::Bytes,
    extract::{rejection::RawPathParamsRejection, RawPathParams, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{on, MethodFilter, MethodRouter},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

use crate::http::server::AppState;
use crate::proxy::{invoke, translate, InboundEnvelope};
use crate::routes::table::{fill_template, RouteEntry};

/// Build the method router for one route table entry.
pub fn proxied(entry: &'static RouteEntry) -> MethodRouter<AppState> {
    let handler = move |State(state): State<AppState>,
                        params: Result<RawPathParams, RawPathParamsRejection>,
                        body: Bytes| async move {
        let params = match params {
            Ok(params) => params,
            Err(rejection) => return malformed_url(&entry.method, entry.inbound, &rejection),
        };
        let upstream_path = fill_template(entry.upstream, &params);
        dispatch(&state, entry.method.clone(), &upstream_path, &body).await
    };

    // The table only holds GET/POST/DELETE, all valid filters.
    let filter = MethodFilter::try_from(entry.method.clone()).unwrap_or(MethodFilter::GET);
    on(filter, handler)
}

/// Catch-all for anything the route table does not know: warn, then
/// forward the original path unchanged to the same upstream base.
pub async fn catch_all(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let original = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    tracing::warn!(method = %method, path = %original, "Unsupported request; forwarding original path");

    dispatch(&state, method, &original, &body).await
}

/// Health check. Bypasses the core entirely.
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "message": "Memory gateway is running",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

/// Run the core once: parse, translate, invoke, render.
async fn dispatch(state: &AppState, method: Method, upstream_path: &str, body: &[u8]) -> Response {
    let envelope = match InboundEnvelope::from_bytes(body) {
        Ok(envelope) => envelope,
        Err(err) => {
            tracing::error!(
                method = %method,
                path = %upstream_path,
                body = %String::from_utf8_lossy(body),
                error = %err,
                "Invalid JSON received"
            );
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Invalid JSON in request body",
                    "detail": err.to_string(),
                })),
            )
                .into_response();
        }
    };

    let spec = translate(&method, upstream_path, &envelope, &state.config.upstream);
    let (status, body) = invoke(&state.client, spec).await.into_parts();
    (status, Json(body)).into_response()
}

fn malformed_url(method: &Method, pattern: &str, rejection: &RawPathParamsRejection) -> Response {
    tracing::error!(
        method = %method,
        pattern = %pattern,
        error = %rejection,
        "Malformed URL received"
    );
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "Malformed URL",
            "detail": rejection.to_string(),
        })),
    )
        .into_response()
}
