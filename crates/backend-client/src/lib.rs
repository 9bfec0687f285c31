//! `ob-backend` - HTTP + JSON-RPC client for the Odoo MCP Bridge module.
//!
//! Provides the [`RecordStore`] trait the tool layer depends on, the
//! production facade ([`BackendClient`]) over a shared [`HttpTransport`],
//! reply classification ([`interpret`]), typed DTOs, and the text
//! renderers in [`format`].
//!
//! # Operations
//!
//! Every operation posts a JSON-RPC 2.0 envelope to `{base_url}/mcp/{token}`
//! with the credentials merged into `params`:
//!
//! | Auth mode     | Injected params          |
//! |---------------|--------------------------|
//! | `api_key`     | `api_key`                |
//! | `credentials` | `user`, `password`       |
//! | `anonymous`   | nothing                  |
//!
//! # Quick start
//!
//! ```rust,no_run
//! use ob_domain::config::BackendConfig;
//! use ob_backend::{BackendClient, RecordStore, SearchRequest};
//!
//! # async fn example() -> ob_domain::error::Result<()> {
//! let cfg = BackendConfig::default();
//! let client = BackendClient::from_config(&cfg)?;
//!
//! let partners = client
//!     .search(SearchRequest::new("res.partner").limit(5))
//!     .await?;
//! println!("{}", ob_backend::format::format_records("res.partner", &partners));
//!
//! client.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod envelope;
pub mod format;
pub mod profile;
pub mod reply;
pub mod store;
pub mod transport;
pub mod types;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use auth::AuthMode;
pub use client::BackendClient;
pub use envelope::{Envelope, Operation, RequestBuilder};
pub use profile::ConnectionProfile;
pub use reply::{interpret, OperationResult};
pub use store::RecordStore;
pub use transport::{from_reqwest, HttpTransport, Transport, TransportError};
pub use types::{Domain, ExecuteRequest, FieldInfo, ModelInfo, Record, SearchRequest};
