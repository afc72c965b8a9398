//! The query bridge: translates tool arguments into paginated, filtered
//! upstream calls and joins the results into bounded record sets.

mod annotations;
mod biosamples;
mod data_objects;
mod entities;
pub(crate) mod paging;
pub(crate) mod pipeline;
mod studies;

pub use annotations::normalize_annotation_id;
pub use biosamples::{BoundingBox, EcosystemQuery};
pub use entities::{CollectionStats, EntityBatch, MAX_ENTITY_IDS};
pub use studies::StudyForBiosample;

use crate::config::{AppConfig, QueryConfig};
use crate::error::{NmdcError, Result};
use crate::model::RecordLimit;
use crate::upstream::{NmdcClient, RecordSource};
use std::sync::Arc;

/// Stateless between calls: each operation is a read pipeline against the
/// record source. Cloning shares the underlying connection pool.
#[derive(Clone)]
pub struct QueryBridge {
    source: Arc<dyn RecordSource>,
    settings: QueryConfig,
}

impl QueryBridge {
    pub fn new(source: Arc<dyn RecordSource>, settings: QueryConfig) -> Self {
        Self { source, settings }
    }

    /// Bridge over the live NMDC API described by `config.upstream`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = NmdcClient::new(&config.upstream)?;
        Ok(Self::new(Arc::new(client), config.query.clone()))
    }

    pub fn settings(&self) -> &QueryConfig {
        &self.settings
    }

    fn source(&self) -> &dyn RecordSource {
        self.source.as_ref()
    }

    /// Resolve the caller's `max_records` against the configured default and cap.
    fn limit(&self, requested: Option<usize>) -> Result<RecordLimit> {
        let requested = requested.unwrap_or(self.settings.default_max_records);
        if requested == 0 {
            return Err(NmdcError::invalid_argument(
                "max_records",
                "must be a positive integer",
            ));
        }
        Ok(RecordLimit::new(requested, self.settings.max_records_cap))
    }
}

/// Trimmed, non-empty string argument.
fn require_text<'a>(argument: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(NmdcError::invalid_argument(argument, "must be a non-empty string"));
    }
    Ok(value)
}
