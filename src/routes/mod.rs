//! Route dispatch.
//!
//! The dispatcher is mechanical: a static table maps inbound path+method
//! pairs to upstream path templates, and the handlers invoke the core once
//! per request with the resolved path.

pub mod handlers;
pub mod table;

pub use table::{RouteEntry, ROUTE_TABLE};
