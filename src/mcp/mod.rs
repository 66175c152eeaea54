//! MCP protocol implementation.
//!
//! This module implements the Model Context Protocol server side:
//!
//! - [`protocol`] — JSON-RPC 2.0 message types
//! - [`transport`] — newline-delimited stdio framing
//! - [`schema`] — JSON Schema validation of tool arguments
//! - [`registry`] — the ordered tool registry and dispatcher
//! - [`server`] — lifecycle state machine and request handling

pub mod protocol;
pub mod registry;
pub mod schema;
pub mod server;
pub mod transport;
