//! Request translation and upstream invocation.
//!
//! # Data Flow
//! ```text
//! Inbound JSON body
//!     → envelope.rs   parse into InboundEnvelope (data / contentType / apiBase)
//!     → translate.rs  build UpstreamRequestSpec (URL, header, body, timeout)
//!     → invoke.rs     execute once, classify outcome
//!     → UpstreamOutcome rendered as (status, JSON body)
//! ```
//!
//! # Design Decisions
//! - The duck-typed `data` field is a tagged variant, not runtime inspection
//! - Best-effort JSON parsing returns a variant instead of throwing
//! - Outcome classification is a closed set decided once at the call site
//! - No state survives a request; everything is a function of its inputs

pub mod envelope;
pub mod invoke;
pub mod translate;

pub use envelope::{InboundEnvelope, ParsedOrRaw, Payload};
pub use invoke::{invoke, UpstreamOutcome};
pub use translate::{translate, OutboundBody, UpstreamRequestSpec};
