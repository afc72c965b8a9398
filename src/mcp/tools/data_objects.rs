use super::{NmdcTool, max_records_property, object_schema, to_json};
use crate::bridge::QueryBridge;
use crate::error::Result;
use crate::mcp::args::ToolArguments;
use async_trait::async_trait;
use serde_json::{Value, json};

pub struct FindDataObjectsForBiosampleTool;

#[async_trait]
impl NmdcTool for FindDataObjectsForBiosampleTool {
    fn name(&self) -> &'static str {
        "find_data_objects_for_biosample"
    }

    fn description(&self) -> &'static str {
        "List downloadable data files (reads, assemblies, annotations) derived from a \
         biosample through its data generations and workflow executions. A biosample \
         with no linked files returns an empty list."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            json!({
                "biosample_id": {"type": "string", "description": "Biosample id, e.g. nmdc:bsm-11-002vgm56"},
                "max_records": max_records_property(),
            }),
            &["biosample_id"],
        )
    }

    async fn execute(&self, bridge: &QueryBridge, args: ToolArguments) -> Result<Value> {
        args.only(&["biosample_id", "max_records"])?;
        let biosample_id = args.required_str("biosample_id")?;
        let max_records = args.optional_positive("max_records")?;

        to_json(
            &bridge
                .find_data_objects_for_biosample(&biosample_id, max_records)
                .await?,
        )
    }
}
