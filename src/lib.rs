//! Google Docs MCP Bridge Library
//!
//! An HTTP bridge that lets a tool-calling host list, read, and edit Google
//! Docs through a JSON-RPC endpoint, using OAuth credentials delegated by the
//! user.

pub mod config;
pub mod docs;
pub mod error;
pub mod mcp;

pub use config::Config;
pub use error::{BridgeError, Result};
