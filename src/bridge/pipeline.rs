//! Cross-entity joins the upstream cannot run server-side, expressed as
//! ordered stages: each stage takes identifiers from the previous one, looks
//! up matching records in one collection, and hands on the ids they link to.

use super::paging::{Collected, collect_bounded};
use crate::config::QueryConfig;
use crate::error::Result;
use crate::model::{record_id, string_list};
use crate::upstream::collections::{DATA_GENERATION_SET, WORKFLOW_EXECUTION_SET};
use crate::upstream::{PageRequest, QueryFilter, RecordSource};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

/// One hop of a join pipeline.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Stage {
    pub name: &'static str,
    pub collection: &'static str,
    /// Field matched against the incoming identifiers with `$in`
    pub match_field: &'static str,
    pub projection: &'static [&'static str],
}

/// Data generations that consumed a biosample
pub(crate) const DATA_GENERATION_BY_INPUT: Stage = Stage {
    name: "data_generation_by_input",
    collection: DATA_GENERATION_SET,
    match_field: "has_input",
    projection: &["id", "has_output"],
};

/// Workflow executions informed by a data generation
pub(crate) const WORKFLOW_BY_INFORMANT: Stage = Stage {
    name: "workflow_by_informant",
    collection: WORKFLOW_EXECUTION_SET,
    match_field: "was_informed_by",
    projection: &["id", "has_output"],
};

pub(crate) const WORKFLOW_BY_ID: Stage = Stage {
    name: "workflow_by_id",
    collection: WORKFLOW_EXECUTION_SET,
    match_field: "id",
    projection: &["id", "was_informed_by"],
};

pub(crate) const DATA_GENERATION_BY_ID: Stage = Stage {
    name: "data_generation_by_id",
    collection: DATA_GENERATION_SET,
    match_field: "id",
    projection: &["id", "has_input"],
};

impl Stage {
    /// Records whose `match_field` references any of `ids`, read in
    /// `id_batch_size` chunks and capped at `max_stage_records` in total.
    pub(crate) async fn run(
        &self,
        source: &dyn RecordSource,
        ids: &[String],
        settings: &QueryConfig,
    ) -> Result<Collected> {
        let mut collected = Collected::default();

        for chunk in ids.chunks(settings.id_batch_size.max(1)) {
            let remaining = settings
                .max_stage_records
                .saturating_sub(collected.records.len());
            if remaining == 0 {
                collected.more_available = true;
                break;
            }

            let request = PageRequest::new(
                self.collection,
                QueryFilter::new().one_of(self.match_field, chunk.iter().cloned()),
            )
            .with_projection(self.projection.iter().copied());

            let batch = collect_bounded(source, request, remaining, settings.page_size).await?;
            collected.more_available |= batch.more_available;
            collected.records.extend(batch.records);
        }

        debug!(
            stage = self.name,
            inputs = ids.len(),
            records = collected.records.len(),
            truncated = collected.more_available,
            "Pipeline stage resolved"
        );
        if collected.more_available {
            warn!(
                stage = self.name,
                cap = settings.max_stage_records,
                "Pipeline stage truncated at its record cap"
            );
        }
        Ok(collected)
    }
}

/// Identifiers in first-seen order, without repeats.
#[derive(Debug, Clone, Default)]
pub(crate) struct IdSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl IdSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the id was already present.
    pub(crate) fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.seen.contains(&id) {
            return false;
        }
        self.seen.insert(id.clone());
        self.order.push(id);
        true
    }

    pub(crate) fn extend(&mut self, ids: impl IntoIterator<Item = String>) {
        for id in ids {
            self.insert(id);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(crate) fn as_slice(&self) -> &[String] {
        &self.order
    }

    pub(crate) fn into_vec(self) -> Vec<String> {
        self.order
    }
}

impl FromIterator<String> for IdSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = IdSet::new();
        set.extend(iter);
        set
    }
}

/// Ids stored under `field` across `records` (scalar or list valued).
pub(crate) fn linked_ids(records: &[Value], field: &str) -> IdSet {
    records
        .iter()
        .filter_map(|record| record.get(field))
        .flat_map(string_list)
        .collect()
}

/// The records' own ids; a record without one is a malformed response.
pub(crate) fn record_ids(records: &[Value], collection: &str) -> Result<IdSet> {
    records
        .iter()
        .map(|record| record_id(record, collection))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::upstream::memory::MemorySource;
    use serde_json::json;

    fn settings() -> QueryConfig {
        QueryConfig {
            page_size: 10,
            id_batch_size: 2,
            max_stage_records: 100,
            ..Default::default()
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_id_set_keeps_first_seen_order() {
        let mut set = IdSet::new();
        assert!(set.insert("b"));
        assert!(set.insert("a"));
        assert!(!set.insert("b"));
        set.extend(ids(&["c", "a"]));
        assert_eq!(set.as_slice(), &ids(&["b", "a", "c"])[..]);
    }

    #[test]
    fn test_linked_ids_flattens_lists() {
        let records = vec![
            json!({"id": "g1", "has_output": ["o1", "o2"]}),
            json!({"id": "g2", "has_output": "o3"}),
            json!({"id": "g3"}),
            json!({"id": "g4", "has_output": ["o2"]}),
        ];
        assert_eq!(linked_ids(&records, "has_output").into_vec(), ids(&["o1", "o2", "o3"]));
    }

    #[test]
    fn test_record_ids_require_id() {
        let err = record_ids(&[json!({"has_output": []})], "data_generation_set").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_stage_matches_array_field_in_batches() {
        let source = MemorySource::new().with_collection(
            DATA_GENERATION_SET,
            vec![
                json!({"id": "g1", "has_input": ["bsm-1"], "has_output": ["o1"]}),
                json!({"id": "g2", "has_input": ["bsm-2", "bsm-9"], "has_output": ["o2"]}),
                json!({"id": "g3", "has_input": ["bsm-3"], "has_output": ["o3"]}),
            ],
        );

        let collected = DATA_GENERATION_BY_INPUT
            .run(&source, &ids(&["bsm-1", "bsm-2", "bsm-3"]), &settings())
            .await
            .unwrap();

        assert_eq!(collected.records.len(), 3);
        assert!(!collected.more_available);
        assert_eq!(source.requests().len(), 2);
        assert_eq!(collected.records[0], json!({"id": "g1", "has_output": ["o1"]}));
    }

    #[tokio::test]
    async fn test_stage_reports_truncation_at_cap() {
        let records = (0..5)
            .map(|n| json!({"id": format!("w{}", n), "was_informed_by": ["g1"]}))
            .collect();
        let source = MemorySource::new().with_collection(WORKFLOW_EXECUTION_SET, records);
        let settings = QueryConfig {
            max_stage_records: 3,
            ..settings()
        };

        let collected = WORKFLOW_BY_INFORMANT
            .run(&source, &ids(&["g1"]), &settings)
            .await
            .unwrap();

        assert_eq!(collected.records.len(), 3);
        assert!(collected.more_available);
    }

    #[tokio::test]
    async fn test_stage_without_inputs_makes_no_requests() {
        let source = MemorySource::new();
        let collected = WORKFLOW_BY_ID.run(&source, &[], &settings()).await.unwrap();
        assert!(collected.records.is_empty());
        assert!(source.requests().is_empty());
    }
}
