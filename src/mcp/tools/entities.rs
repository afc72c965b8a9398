use super::{NmdcTool, object_schema, to_json};
use crate::bridge::{MAX_ENTITY_IDS, QueryBridge};
use crate::error::Result;
use crate::mcp::args::ToolArguments;
use async_trait::async_trait;
use serde_json::{Value, json};

pub struct GetEntityByIdTool;

#[async_trait]
impl NmdcTool for GetEntityByIdTool {
    fn name(&self) -> &'static str {
        "get_entity_by_id"
    }

    fn description(&self) -> &'static str {
        "Fetch any NMDC record (biosample, study, data object, workflow execution, ...) by its id."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            json!({"entity_id": {"type": "string", "description": "NMDC id, e.g. nmdc:sty-11-33fbta56"}}),
            &["entity_id"],
        )
    }

    async fn execute(&self, bridge: &QueryBridge, args: ToolArguments) -> Result<Value> {
        args.only(&["entity_id"])?;
        let entity_id = args.required_str("entity_id")?;
        bridge.get_entity_by_id(&entity_id).await
    }
}

pub struct GetEntitiesByIdsTool;

#[async_trait]
impl NmdcTool for GetEntitiesByIdsTool {
    fn name(&self) -> &'static str {
        "get_entities_by_ids"
    }

    fn description(&self) -> &'static str {
        "Fetch several records of one collection by id, optionally limited to selected \
         fields. Ids that are not found are listed in missing_ids."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            json!({
                "entity_ids": {
                    "type": "array",
                    "items": {"type": "string"},
                    "minItems": 1,
                    "maxItems": MAX_ENTITY_IDS,
                },
                "collection": {"type": "string", "description": "Collection name, e.g. biosample_set"},
                "projection": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Fields to return; all fields when omitted",
                },
            }),
            &["entity_ids", "collection"],
        )
    }

    async fn execute(&self, bridge: &QueryBridge, args: ToolArguments) -> Result<Value> {
        args.only(&["entity_ids", "collection", "projection"])?;
        let entity_ids = args.required_str_list("entity_ids")?;
        let collection = args.required_str("collection")?;
        let projection = args.optional_str_list("projection")?;

        to_json(
            &bridge
                .get_entities_by_ids(&entity_ids, &collection, projection.as_deref())
                .await?,
        )
    }
}

pub struct ListCollectionNamesTool;

#[async_trait]
impl NmdcTool for ListCollectionNamesTool {
    fn name(&self) -> &'static str {
        "list_collection_names"
    }

    fn description(&self) -> &'static str {
        "List the names of the NMDC collections."
    }

    fn input_schema(&self) -> Value {
        object_schema(json!({}), &[])
    }

    async fn execute(&self, bridge: &QueryBridge, args: ToolArguments) -> Result<Value> {
        args.only(&[])?;
        let names = bridge.list_collection_names().await?;
        Ok(json!({"count": names.len(), "collection_names": names}))
    }
}

pub struct GetCollectionStatsTool;

#[async_trait]
impl NmdcTool for GetCollectionStatsTool {
    fn name(&self) -> &'static str {
        "get_collection_stats"
    }

    fn description(&self) -> &'static str {
        "Document counts and storage sizes for every NMDC collection."
    }

    fn input_schema(&self) -> Value {
        object_schema(json!({}), &[])
    }

    async fn execute(&self, bridge: &QueryBridge, args: ToolArguments) -> Result<Value> {
        args.only(&[])?;
        to_json(&bridge.get_collection_stats().await?)
    }
}
