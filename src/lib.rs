//! cloud-query - client for an EC2-style signed query API
//!
//! Builds HMAC-SHA256 signed query strings, posts them, and turns the XML
//! replies into a normalized JSON-like tree with list wrappers collapsed.

pub mod api;
pub mod commands;
pub mod config;
pub mod format;

pub use api::{ApiError, CloudClient, Credentials, QueryClient, Region, ResponseTree};
pub use config::Config;
