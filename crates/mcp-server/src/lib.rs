//! `ob-mcp` - MCP server exposing the Odoo backend as tools and resources.
//!
//! [`McpServer`] dispatches JSON-RPC 2.0 messages onto a shared
//! [`ob_backend::RecordStore`].  Two transports are provided:
//!
//! | Transport         | Entry point                  |
//! |-------------------|------------------------------|
//! | `stdio`           | [`McpServer::serve_stdio`]   |
//! | `streamable-http` | [`http::serve`] (`POST /mcp`) |

pub mod http;
pub mod protocol;
pub mod resources;
pub mod server;
pub mod tools;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallResult};
pub use server::McpServer;
pub use tools::{ToolCatalogue, ToolError, TOOL_NAMES};
