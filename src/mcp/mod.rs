//! JSON-RPC module
//!
//! Request framing, method dispatch, and the HTTP server hosting it.

pub mod dispatch;
pub mod server;
pub mod types;
