//! The `RecordStore` trait defines the interface the tool layer uses to
//! reach the Odoo backend (the HTTP facade in production, doubles in tests).

use async_trait::async_trait;
use ob_domain::error::Result;
use serde_json::Value;

use crate::types::{Domain, ExecuteRequest, FieldInfo, ModelInfo, Record, SearchRequest};

/// Abstraction over the bridge module's endpoint surface.
///
/// Every data method returns `ob_domain::error::Result`; failures are
/// tagged with the operation name.  `health` never fails.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Server and module information (POST /mcp/info).
    async fn server_info(&self) -> Result<Value>;

    /// Models enabled for MCP access (POST /mcp/models).
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;

    /// Field definitions of a model (POST /mcp/fields).
    async fn get_fields(&self, model: &str) -> Result<Vec<FieldInfo>>;

    /// Search records; `limit` is clamped to the configured maximum (POST /mcp/search).
    async fn search(&self, req: SearchRequest) -> Result<Vec<Record>>;

    /// Read one record; an empty map means "not found" (POST /mcp/read).
    async fn read(&self, model: &str, record_id: i64, fields: Option<Vec<String>>) -> Result<Record>;

    /// Count records matching a domain (POST /mcp/count).
    async fn count(&self, model: &str, domain: Domain) -> Result<u64>;

    /// Create a record and return its id, if the backend reported one (POST /mcp/create).
    async fn create(&self, model: &str, values: Record) -> Result<Option<i64>>;

    /// Update a record (POST /mcp/write).
    async fn write(&self, model: &str, record_id: i64, values: Record) -> Result<bool>;

    /// Delete a record (POST /mcp/unlink).
    async fn unlink(&self, model: &str, record_id: i64) -> Result<bool>;

    /// Call an arbitrary model method; `null` when it returned nothing (POST /mcp/execute).
    async fn execute(&self, req: ExecuteRequest) -> Result<Value>;

    /// Health probe (GET /mcp/health).  Failures become
    /// `{"status": "error", "message": ...}`.
    async fn health(&self) -> Value;
}
