use super::{NmdcTool, max_records_property, object_schema, to_json};
use crate::bridge::QueryBridge;
use crate::error::Result;
use crate::mcp::args::ToolArguments;
use async_trait::async_trait;
use serde_json::{Value, json};

pub struct FindStudiesWithPublicationsTool;

#[async_trait]
impl NmdcTool for FindStudiesWithPublicationsTool {
    fn name(&self) -> &'static str {
        "find_studies_with_publications"
    }

    fn description(&self) -> &'static str {
        "List NMDC studies that have at least one associated publication DOI."
    }

    fn input_schema(&self) -> Value {
        object_schema(json!({"max_records": max_records_property()}), &[])
    }

    async fn execute(&self, bridge: &QueryBridge, args: ToolArguments) -> Result<Value> {
        args.only(&["max_records"])?;
        let max_records = args.optional_positive("max_records")?;
        to_json(&bridge.find_studies_with_publications(max_records).await?)
    }
}

pub struct GetStudyForBiosampleTool;

#[async_trait]
impl NmdcTool for GetStudyForBiosampleTool {
    fn name(&self) -> &'static str {
        "get_study_for_biosample"
    }

    fn description(&self) -> &'static str {
        "Get the study a biosample belongs to. Additional associated study ids are listed \
         but not fetched."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            json!({"biosample_id": {"type": "string", "description": "Biosample id, e.g. nmdc:bsm-11-002vgm56"}}),
            &["biosample_id"],
        )
    }

    async fn execute(&self, bridge: &QueryBridge, args: ToolArguments) -> Result<Value> {
        args.only(&["biosample_id"])?;
        let biosample_id = args.required_str("biosample_id")?;
        to_json(&bridge.get_study_for_biosample(&biosample_id).await?)
    }
}
