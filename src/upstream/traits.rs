use super::types::{Page, PageRequest};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Read-only access to NMDC records.
/// Implemented by the HTTP client; the query bridge only ever talks to this trait.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch a single page of a filtered collection listing
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page>;

    /// Fetch any entity by identifier, `None` when the upstream does not know it
    async fn fetch_entity(&self, id: &str) -> Result<Option<Value>>;

    /// Names of the collections the upstream serves
    async fn collection_names(&self) -> Result<Vec<String>>;

    /// Raw per-collection storage statistics
    async fn collection_stats(&self) -> Result<Vec<Value>>;
}
