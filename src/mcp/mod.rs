// file: src/mcp/mod.rs
// description: transports exposing the preference tools (MCP over stdio, HTTP)
// reference: https://docs.rs/rmcp

pub mod http;
pub mod server;

pub use server::{BookshelfMcp, to_mcp_error};
