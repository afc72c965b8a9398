//! The NMDC tool set.
//!
//! Each tool parses its arguments, calls one bridge operation and returns the
//! result as JSON. Argument schemas here are what clients see in `tools/list`.

mod biosamples;
mod data_objects;
mod entities;
mod studies;

use super::args::ToolArguments;
use super::types::ToolDefinition;
use crate::bridge::QueryBridge;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};

/// Names of every tool, in registration order.
pub const TOOL_NAMES: &[&str] = &[
    "find_biosamples_by_ecosystem",
    "find_studies_with_publications",
    "find_data_objects_for_biosample",
    "find_biosamples_by_functional_annotation",
    "find_biosamples_in_elevation_range",
    "find_biosamples_in_bounding_box",
    "get_entity_by_id",
    "get_entities_by_ids",
    "get_study_for_biosample",
    "list_collection_names",
    "get_collection_stats",
];

#[async_trait]
pub trait NmdcTool: Send + Sync {
    fn name(&self) -> &'static str;

    /// Tool description for the calling model
    fn description(&self) -> &'static str;

    /// JSON Schema of the arguments object
    fn input_schema(&self) -> Value;

    async fn execute(&self, bridge: &QueryBridge, args: ToolArguments) -> Result<Value>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: Some(self.description().to_string()),
            input_schema: self.input_schema(),
        }
    }
}

pub fn register_all_tools() -> Vec<Box<dyn NmdcTool>> {
    vec![
        Box::new(biosamples::FindBiosamplesByEcosystemTool),
        Box::new(studies::FindStudiesWithPublicationsTool),
        Box::new(data_objects::FindDataObjectsForBiosampleTool),
        Box::new(biosamples::FindBiosamplesByFunctionalAnnotationTool),
        Box::new(biosamples::FindBiosamplesInElevationRangeTool),
        Box::new(biosamples::FindBiosamplesInBoundingBoxTool),
        Box::new(entities::GetEntityByIdTool),
        Box::new(entities::GetEntitiesByIdsTool),
        Box::new(studies::GetStudyForBiosampleTool),
        Box::new(entities::ListCollectionNamesTool),
        Box::new(entities::GetCollectionStatsTool),
    ]
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Object schema with `properties`, the `required` names and no extras.
pub(crate) fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

pub(crate) fn max_records_property() -> Value {
    json!({
        "type": "integer",
        "minimum": 1,
        "description": "Maximum number of records to return. Defaults to the server's configured default; requests above the server cap are clamped and reported as such.",
    })
}
