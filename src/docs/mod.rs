//! Google Docs module
//!
//! Credential storage and lifecycle, the OAuth flow, and the Docs/Drive client.

pub mod auth;
pub mod client;
pub mod credentials;
pub mod store;
pub mod types;
