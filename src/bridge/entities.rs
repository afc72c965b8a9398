use super::paging::fetch_by_ids;
use super::pipeline::IdSet;
use super::{QueryBridge, require_text};
use crate::error::{NmdcError, Result};
use crate::model::{number, record_id};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Most identifiers accepted by one `get_entities_by_ids` call.
pub const MAX_ENTITY_IDS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityBatch {
    pub collection: String,
    pub requested_count: usize,
    pub fetched_count: usize,
    pub entities: Vec<Value>,
    pub missing_ids: Vec<String>,
}

/// Storage figures for one collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionStats {
    pub count: u64,
    pub size_bytes: u64,
    pub avg_obj_size: u64,
    pub storage_size: u64,
    pub total_size: u64,
}

impl CollectionStats {
    fn from_storage_stats(stats: Option<&Value>) -> Self {
        let field = |name: &str| {
            stats
                .and_then(|s| s.get(name))
                .and_then(number)
                .filter(|n| *n >= 0.0)
                .map_or(0, |n| n as u64)
        };
        Self {
            count: field("count"),
            size_bytes: field("size"),
            avg_obj_size: field("avgObjSize"),
            storage_size: field("storageSize"),
            total_size: field("totalSize"),
        }
    }
}

impl QueryBridge {
    pub async fn get_entity_by_id(&self, entity_id: &str) -> Result<Value> {
        let entity_id = require_text("entity_id", entity_id)?;
        if matches!(entity_id, "." | "..") {
            return Err(NmdcError::invalid_argument("entity_id", "is not an NMDC identifier"));
        }
        self.source()
            .fetch_entity(entity_id)
            .await?
            .ok_or_else(|| NmdcError::not_found("Entity", entity_id))
    }

    /// Several entities from one collection, in request order. Ids the
    /// collection does not hold are listed in `missing_ids`.
    pub async fn get_entities_by_ids(
        &self,
        entity_ids: &[String],
        collection: &str,
        projection: Option<&[String]>,
    ) -> Result<EntityBatch> {
        if entity_ids.is_empty() || entity_ids.len() > MAX_ENTITY_IDS {
            return Err(NmdcError::invalid_argument(
                "entity_ids",
                format!("must contain between 1 and {} ids", MAX_ENTITY_IDS),
            ));
        }
        let mut ids = IdSet::new();
        for id in entity_ids {
            ids.insert(require_text("entity_ids", id)?);
        }

        let collection = require_text("collection", collection)?;
        let known = self.source().collection_names().await?;
        if !known.iter().any(|name| name == collection) {
            return Err(NmdcError::invalid_argument(
                "collection",
                format!("unknown collection '{}'", collection),
            ));
        }

        // `id` is needed to order results and report misses
        let projection: Vec<String> = match projection {
            Some(fields) if !fields.is_empty() => {
                let mut fields: Vec<String> = fields
                    .iter()
                    .map(|f| f.trim().to_string())
                    .filter(|f| !f.is_empty())
                    .collect();
                if !fields.iter().any(|f| f == "id") {
                    fields.insert(0, "id".to_string());
                }
                fields
            }
            _ => Vec::new(),
        };

        let entities = fetch_by_ids(
            self.source(),
            collection,
            ids.as_slice(),
            &projection,
            self.settings.id_batch_size,
            self.settings.page_size,
        )
        .await?;

        let fetched: HashSet<String> = entities
            .iter()
            .map(|entity| record_id(entity, collection))
            .collect::<Result<_>>()?;
        let missing_ids: Vec<String> = ids
            .as_slice()
            .iter()
            .filter(|id| !fetched.contains(*id))
            .cloned()
            .collect();
        debug!(
            "Fetched {} of {} entities from {}",
            entities.len(),
            ids.len(),
            collection
        );

        Ok(EntityBatch {
            collection: collection.to_string(),
            requested_count: ids.len(),
            fetched_count: entities.len(),
            entities,
            missing_ids,
        })
    }

    pub async fn list_collection_names(&self) -> Result<Vec<String>> {
        self.source().collection_names().await
    }

    /// Per-collection statistics keyed by collection name.
    pub async fn get_collection_stats(&self) -> Result<BTreeMap<String, CollectionStats>> {
        let raw = self.source().collection_stats().await?;
        Ok(raw
            .iter()
            .filter_map(|entry| {
                let name = entry.get("ns")?.as_str()?.strip_prefix("nmdc.")?;
                Some((
                    name.to_string(),
                    CollectionStats::from_storage_stats(entry.get("storageStats")),
                ))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::test_support::bridge;
    use crate::error::ErrorKind;
    use crate::upstream::collections::{BIOSAMPLE_SET, STUDY_SET};
    use crate::upstream::memory::MemorySource;
    use serde_json::json;

    fn source() -> MemorySource {
        MemorySource::new()
            .with_collection(
                BIOSAMPLE_SET,
                (0..8)
                    .map(|n| json!({"id": format!("nmdc:bsm-{}", n), "name": format!("sample {}", n), "elev": n}))
                    .collect(),
            )
            .with_collection(STUDY_SET, vec![json!({"id": "nmdc:sty-1", "name": "study"})])
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_entity_by_id() {
        let (bridge, _) = bridge(source());

        let entity = bridge.get_entity_by_id("nmdc:sty-1").await.unwrap();
        assert_eq!(entity["name"], "study");

        let err = bridge.get_entity_by_id("nmdc:sty-404").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_entity_by_id_rejects_dot_segments() {
        let (bridge, _) = bridge(source());

        for id in [".", ".."] {
            let err = bridge.get_entity_by_id(id).await.unwrap_err();
            assert_eq!(err.argument(), Some("entity_id"));
        }
    }

    #[tokio::test]
    async fn test_entities_by_ids_reports_missing() {
        let (bridge, _) = bridge(source());

        let batch = bridge
            .get_entities_by_ids(
                &ids(&["nmdc:bsm-5", "nmdc:bsm-x", "nmdc:bsm-1", "nmdc:bsm-5"]),
                BIOSAMPLE_SET,
                Some(&ids(&["name"])),
            )
            .await
            .unwrap();

        assert_eq!(batch.requested_count, 3);
        assert_eq!(batch.fetched_count, 2);
        assert_eq!(batch.missing_ids, vec!["nmdc:bsm-x"]);
        assert_eq!(batch.entities[0], json!({"id": "nmdc:bsm-5", "name": "sample 5"}));
        assert_eq!(batch.entities[1]["id"], "nmdc:bsm-1");
    }

    #[tokio::test]
    async fn test_entities_by_ids_batches_requests() {
        let (bridge, source) = bridge(source());
        let wanted: Vec<String> = (0..8).map(|n| format!("nmdc:bsm-{}", n)).collect();

        let batch = bridge
            .get_entities_by_ids(&wanted, BIOSAMPLE_SET, None)
            .await
            .unwrap();

        assert_eq!(batch.fetched_count, 8);
        // id_batch_size is 3 in the test settings
        assert_eq!(source.requests_for(BIOSAMPLE_SET).len(), 3);
    }

    #[tokio::test]
    async fn test_entities_by_ids_validation() {
        let (bridge, source) = bridge(source());

        let err = bridge
            .get_entities_by_ids(&[], BIOSAMPLE_SET, None)
            .await
            .unwrap_err();
        assert_eq!(err.argument(), Some("entity_ids"));

        let too_many: Vec<String> = (0..101).map(|n| format!("nmdc:bsm-{}", n)).collect();
        let err = bridge
            .get_entities_by_ids(&too_many, BIOSAMPLE_SET, None)
            .await
            .unwrap_err();
        assert_eq!(err.argument(), Some("entity_ids"));

        let err = bridge
            .get_entities_by_ids(&ids(&["nmdc:bsm-1"]), "sample_set", None)
            .await
            .unwrap_err();
        assert_eq!(err.argument(), Some("collection"));
        assert!(source.requests().is_empty());
    }

    #[tokio::test]
    async fn test_collection_stats_keyed_by_name() {
        let (bridge, _) = bridge(source());

        let stats = bridge.get_collection_stats().await.unwrap();

        assert_eq!(stats.len(), 2);
        assert_eq!(stats["biosample_set"].count, 8);
        assert_eq!(stats["study_set"].size_bytes, 0);
    }

    #[test]
    fn test_stats_from_upstream_shape() {
        let stats = CollectionStats::from_storage_stats(Some(&json!({
            "count": 12,
            "size": 4096,
            "avgObjSize": 341,
            "storageSize": 8192,
            "totalSize": 12288
        })));
        assert_eq!(
            stats,
            CollectionStats {
                count: 12,
                size_bytes: 4096,
                avg_obj_size: 341,
                storage_size: 8192,
                total_size: 12288,
            }
        );
    }
}
