use super::paging::fetch_by_ids;
use super::pipeline::{DATA_GENERATION_BY_INPUT, WORKFLOW_BY_INFORMANT, linked_ids, record_ids};
use super::{QueryBridge, require_text};
use crate::error::Result;
use crate::model::data_object::DATA_OBJECT_PROJECTION;
use crate::model::{Bounded, DataObject};
use crate::upstream::collections::{DATA_GENERATION_SET, DATA_OBJECT_SET};
use tracing::debug;

impl QueryBridge {
    /// Data objects derived from a biosample.
    ///
    /// Follows `data_generation_set.has_input` to the biosample, then
    /// `workflow_execution_set.was_informed_by` to those data generations.
    /// Outputs of both are collected, data-generation outputs first.
    /// A biosample nothing links to yields an empty result.
    pub async fn find_data_objects_for_biosample(
        &self,
        biosample_id: &str,
        max_records: Option<usize>,
    ) -> Result<Bounded<DataObject>> {
        let biosample_id = require_text("biosample_id", biosample_id)?;
        let limit = self.limit(max_records)?;
        let source = self.source();

        let generations = DATA_GENERATION_BY_INPUT
            .run(source, &[biosample_id.to_string()], &self.settings)
            .await?;
        let generation_ids = record_ids(&generations.records, DATA_GENERATION_SET)?;
        let mut output_ids = linked_ids(&generations.records, "has_output");

        let workflows = WORKFLOW_BY_INFORMANT
            .run(source, generation_ids.as_slice(), &self.settings)
            .await?;
        output_ids.extend(linked_ids(&workflows.records, "has_output").into_vec());

        debug!(
            "{}: {} data generations, {} workflow executions, {} output ids",
            biosample_id,
            generation_ids.len(),
            workflows.records.len(),
            output_ids.len()
        );

        let more_available = generations.more_available
            || workflows.more_available
            || output_ids.len() > limit.effective;
        let wanted: Vec<String> = output_ids
            .into_vec()
            .into_iter()
            .take(limit.effective)
            .collect();

        let projection: Vec<String> = DATA_OBJECT_PROJECTION.iter().map(|f| f.to_string()).collect();
        let records = fetch_by_ids(
            source,
            DATA_OBJECT_SET,
            &wanted,
            &projection,
            self.settings.id_batch_size,
            self.settings.page_size,
        )
        .await?;
        let objects = records
            .into_iter()
            .map(DataObject::from_record)
            .collect::<Result<Vec<_>>>()?;

        Ok(Bounded::new(objects, limit, more_available))
    }
}
