//! HTTP server subsystem.

pub mod request;
pub mod server;

pub use server::{AppState, HttpServer};
