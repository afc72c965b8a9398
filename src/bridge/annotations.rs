use super::QueryBridge;
use super::pipeline::{DATA_GENERATION_BY_ID, IdSet, WORKFLOW_BY_ID, linked_ids};
use super::require_text;
use crate::error::{NmdcError, Result};
use crate::model::{Biosample, Bounded};
use crate::upstream::collections::FUNCTIONAL_ANNOTATION_AGG;
use crate::upstream::{PageRequest, QueryFilter};
use tracing::debug;

const KEGG_ORTHOLOGY_PREFIX: &str = "KEGG.ORTHOLOGY";
const BIOSAMPLE_ID_PREFIX: &str = "nmdc:bsm-";

/// Canonical `gene_function_id` for an annotation identifier.
///
/// Bare KEGG orthology ids (`K00001`) and the `KO:` / `KEGG:` shorthands map
/// to `KEGG.ORTHOLOGY:K00001`. Other `PREFIX:value` ids (COG, PFAM, EC, ...)
/// are passed through unchanged.
pub fn normalize_annotation_id(raw: &str) -> Result<String> {
    let raw = require_text("annotation_id", raw)?;

    if is_kegg_orthology(raw) {
        return Ok(format!("{}:{}", KEGG_ORTHOLOGY_PREFIX, raw.to_ascii_uppercase()));
    }

    let Some((prefix, value)) = raw.split_once(':') else {
        return Err(NmdcError::invalid_argument(
            "annotation_id",
            format!(
                "'{}' is not a KEGG orthology id (K00001) or a PREFIX:value identifier",
                raw
            ),
        ));
    };
    let (prefix, value) = (prefix.trim(), value.trim());
    if prefix.is_empty() || value.is_empty() || value.contains(char::is_whitespace) {
        return Err(NmdcError::invalid_argument(
            "annotation_id",
            format!("'{}' is not a valid PREFIX:value identifier", raw),
        ));
    }

    match prefix.to_ascii_uppercase().as_str() {
        "KO" | "KEGG" | "KEGG.ORTHOLOGY" => {
            if is_kegg_orthology(value) {
                Ok(format!("{}:{}", KEGG_ORTHOLOGY_PREFIX, value.to_ascii_uppercase()))
            } else {
                Err(NmdcError::invalid_argument(
                    "annotation_id",
                    format!("'{}' is not a KEGG orthology id (K followed by 5 digits)", value),
                ))
            }
        }
        _ => Ok(format!("{}:{}", prefix, value)),
    }
}

fn is_kegg_orthology(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some('K' | 'k'))
        && value.len() == 6
        && chars.all(|c| c.is_ascii_digit())
}

impl QueryBridge {
    /// Biosamples whose workflow output carries `annotation_id`.
    ///
    /// Annotation rows are read a page at a time and each page is resolved
    /// through workflow executions and data generations to biosample ids.
    /// Paging stops as soon as enough distinct biosamples are known.
    pub async fn find_biosamples_by_functional_annotation(
        &self,
        annotation_id: &str,
        max_records: Option<usize>,
    ) -> Result<Bounded<Biosample>> {
        let gene_function_id = normalize_annotation_id(annotation_id)?;
        let limit = self.limit(max_records)?;
        let source = self.source();

        let mut request = PageRequest::new(
            FUNCTIONAL_ANNOTATION_AGG,
            QueryFilter::new().eq("gene_function_id", gene_function_id.clone()),
        )
        .with_projection(["was_generated_by"])
        .with_page_size(self.settings.page_size);

        let mut workflows_seen = IdSet::new();
        let mut biosample_ids = IdSet::new();
        let mut more_available = false;

        loop {
            let page = source.fetch_page(&request).await?;
            let next = page.next_token().map(str::to_string);
            let empty = page.resources.is_empty();

            let new_workflows: Vec<String> = linked_ids(&page.resources, "was_generated_by")
                .into_vec()
                .into_iter()
                .filter(|id| workflows_seen.insert(id.clone()))
                .collect();

            if !new_workflows.is_empty() {
                let workflows = WORKFLOW_BY_ID.run(source, &new_workflows, &self.settings).await?;
                let generation_ids = linked_ids(&workflows.records, "was_informed_by");
                let generations = DATA_GENERATION_BY_ID
                    .run(source, generation_ids.as_slice(), &self.settings)
                    .await?;
                more_available |= workflows.more_available || generations.more_available;

                biosample_ids.extend(
                    linked_ids(&generations.records, "has_input")
                        .into_vec()
                        .into_iter()
                        .filter(|id| id.starts_with(BIOSAMPLE_ID_PREFIX)),
                );
                debug!(
                    "{}: {} workflows, {} data generations, {} biosamples so far",
                    gene_function_id,
                    new_workflows.len(),
                    generations.records.len(),
                    biosample_ids.len()
                );
            }

            if biosample_ids.len() >= limit.effective {
                more_available |= biosample_ids.len() > limit.effective || next.is_some();
                break;
            }
            match next {
                Some(token) if !empty => request = request.with_page_token(Some(token)),
                _ => break,
            }
        }

        let wanted: Vec<String> = biosample_ids
            .into_vec()
            .into_iter()
            .take(limit.effective)
            .collect();
        let biosamples = self.biosamples_by_ids(&wanted).await?;
        Ok(Bounded::new(biosamples, limit, more_available))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::test_support::bridge;
    use crate::error::ErrorKind;
    use crate::upstream::collections::{BIOSAMPLE_SET, DATA_GENERATION_SET, WORKFLOW_EXECUTION_SET};
    use crate::upstream::memory::MemorySource;
    use serde_json::{Value, json};

    #[test]
    fn test_kegg_forms_normalise_to_one_id() {
        for raw in ["K00001", "k00001", "KO:K00001", "KEGG:K00001", "KEGG.ORTHOLOGY:K00001", " ko:K00001 "] {
            assert_eq!(
                normalize_annotation_id(raw).unwrap(),
                "KEGG.ORTHOLOGY:K00001",
                "input {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_other_prefixes_pass_through() {
        assert_eq!(normalize_annotation_id("COG:COG0001").unwrap(), "COG:COG0001");
        assert_eq!(normalize_annotation_id("PFAM:PF00001").unwrap(), "PFAM:PF00001");
        assert_eq!(normalize_annotation_id("EC:1.1.1.1").unwrap(), "EC:1.1.1.1");
    }

    #[test]
    fn test_invalid_annotation_ids() {
        for raw in ["", "kinase", "KO:00001", ":K00001", "COG:", "K0001"] {
            let err = normalize_annotation_id(raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "input {:?}", raw);
            assert_eq!(err.argument(), Some("annotation_id"));
        }
    }

    /// Three workflows each produce K00001 rows; wf-a and wf-b trace back to
    /// distinct biosamples, wf-c to a processed sample which is skipped.
    fn linked_source() -> MemorySource {
        let annotations: Vec<Value> = vec![
            json!({"was_generated_by": "nmdc:wfmgan-a", "gene_function_id": "KEGG.ORTHOLOGY:K00001", "count": 4}),
            json!({"was_generated_by": "nmdc:wfmgan-a", "gene_function_id": "KEGG.ORTHOLOGY:K00002", "count": 1}),
            json!({"was_generated_by": "nmdc:wfmgan-c", "gene_function_id": "KEGG.ORTHOLOGY:K00001", "count": 2}),
            json!({"was_generated_by": "nmdc:wfmgan-b", "gene_function_id": "KEGG.ORTHOLOGY:K00001", "count": 9}),
            json!({"was_generated_by": "nmdc:wfmgan-d", "gene_function_id": "KEGG.ORTHOLOGY:K00001", "count": 3}),
        ];
        let workflows = vec![
            json!({"id": "nmdc:wfmgan-a", "was_informed_by": ["nmdc:dgns-1"]}),
            json!({"id": "nmdc:wfmgan-b", "was_informed_by": ["nmdc:dgns-2"]}),
            json!({"id": "nmdc:wfmgan-c", "was_informed_by": ["nmdc:dgns-3"]}),
            json!({"id": "nmdc:wfmgan-d", "was_informed_by": ["nmdc:dgns-4"]}),
        ];
        let generations = vec![
            json!({"id": "nmdc:dgns-1", "has_input": ["nmdc:bsm-11-aaa"]}),
            json!({"id": "nmdc:dgns-2", "has_input": ["nmdc:bsm-11-bbb"]}),
            json!({"id": "nmdc:dgns-3", "has_input": ["nmdc:procsm-11-xyz"]}),
            json!({"id": "nmdc:dgns-4", "has_input": ["nmdc:bsm-11-aaa", "nmdc:bsm-11-ddd"]}),
        ];
        let biosamples = vec![
            json!({"id": "nmdc:bsm-11-ddd", "ecosystem_type": "Soil"}),
            json!({"id": "nmdc:bsm-11-bbb", "ecosystem_type": "Soil"}),
            json!({"id": "nmdc:bsm-11-aaa", "ecosystem_type": "Marine"}),
        ];

        MemorySource::new()
            .with_collection(FUNCTIONAL_ANNOTATION_AGG, annotations)
            .with_collection(WORKFLOW_EXECUTION_SET, workflows)
            .with_collection(DATA_GENERATION_SET, generations)
            .with_collection(BIOSAMPLE_SET, biosamples)
    }

    #[tokio::test]
    async fn test_resolves_biosamples_in_first_seen_order() {
        let (bridge, source) = bridge(linked_source());

        let result = bridge
            .find_biosamples_by_functional_annotation("KO:K00001", Some(10))
            .await
            .unwrap();

        let ids: Vec<&str> = result.records.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["nmdc:bsm-11-aaa", "nmdc:bsm-11-bbb", "nmdc:bsm-11-ddd"]);
        assert!(!result.more_available);

        let annotation_requests = source.requests_for(FUNCTIONAL_ANNOTATION_AGG);
        assert_eq!(
            annotation_requests[0].filter.to_document(),
            json!({"gene_function_id": "KEGG.ORTHOLOGY:K00001"})
        );
    }

    #[tokio::test]
    async fn test_stops_paging_once_limit_is_resolved() {
        let (bridge, source) = bridge(linked_source());

        let result = bridge
            .find_biosamples_by_functional_annotation("K00001", Some(1))
            .await
            .unwrap();

        assert_eq!(result.returned_count, 1);
        assert_eq!(result.records[0].id, "nmdc:bsm-11-aaa");
        assert!(result.more_available);
        // page_size is 5, so all four K00001 rows arrive on the first page
        assert_eq!(source.requests_for(FUNCTIONAL_ANNOTATION_AGG).len(), 1);
    }

    #[tokio::test]
    async fn test_small_pages_short_circuit() {
        let source = linked_source();
        let source = std::sync::Arc::new(source);
        let bridge = QueryBridge::new(
            source.clone(),
            crate::config::QueryConfig {
                page_size: 1,
                ..crate::bridge::test_support::settings()
            },
        );

        let result = bridge
            .find_biosamples_by_functional_annotation("K00001", Some(2))
            .await
            .unwrap();

        let ids: Vec<&str> = result.records.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["nmdc:bsm-11-aaa", "nmdc:bsm-11-bbb"]);
        // wf-a, wf-c, wf-b pages are enough; wf-d's page is never requested
        assert_eq!(source.requests_for(FUNCTIONAL_ANNOTATION_AGG).len(), 3);
        assert!(result.more_available);
    }

    #[tokio::test]
    async fn test_unknown_annotation_is_empty() {
        let (bridge, _) = bridge(linked_source());

        let result = bridge
            .find_biosamples_by_functional_annotation("COG:COG9999", Some(5))
            .await
            .unwrap();

        assert!(result.records.is_empty());
        assert!(!result.more_available);
    }

    #[tokio::test]
    async fn test_stage_failure_is_not_hidden() {
        let (bridge, _) = bridge(linked_source().failing(WORKFLOW_EXECUTION_SET, 500));

        let err = bridge
            .find_biosamples_by_functional_annotation("K00001", Some(5))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Upstream);
    }
}
