//! Service plumbing shared by HRM services: configuration, health checks,
//! request ids, tracing, serde helpers and sea-orm extensions.

pub mod config;
pub mod health;
pub mod middleware;
pub mod sea_ext;
pub mod serde;
pub mod tracing;
