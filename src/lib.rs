//! Memory API Gateway Library

pub mod config;
pub mod http;
pub mod observability;
pub mod proxy;
pub mod routes;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
