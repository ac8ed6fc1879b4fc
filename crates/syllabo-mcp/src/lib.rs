//! Syllabo MCP Server
//!
//! Model Context Protocol server exposing syllabus analysis and material
//! generation to AI assistants.

pub mod protocol;
mod server;
pub mod tools;

pub use server::{start_server, McpServer};
