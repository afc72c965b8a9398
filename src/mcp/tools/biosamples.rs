use super::{NmdcTool, max_records_property, object_schema, to_json};
use crate::bridge::{BoundingBox, EcosystemQuery, QueryBridge};
use crate::error::Result;
use crate::mcp::args::ToolArguments;
use async_trait::async_trait;
use serde_json::{Value, json};

pub struct FindBiosamplesByEcosystemTool;

#[async_trait]
impl NmdcTool for FindBiosamplesByEcosystemTool {
    fn name(&self) -> &'static str {
        "find_biosamples_by_ecosystem"
    }

    fn description(&self) -> &'static str {
        "Find NMDC biosamples by ecosystem classification. ecosystem_type is required \
         (e.g. 'Soil', 'Marine', 'Freshwater'); ecosystem, ecosystem_category, \
         ecosystem_subtype and specific_ecosystem narrow the match further."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            json!({
                "ecosystem_type": {"type": "string", "description": "Ecosystem type, e.g. 'Soil'"},
                "ecosystem": {"type": "string", "description": "Ecosystem, e.g. 'Environmental'"},
                "ecosystem_category": {"type": "string", "description": "Ecosystem category, e.g. 'Terrestrial'"},
                "ecosystem_subtype": {"type": "string"},
                "specific_ecosystem": {"type": "string"},
                "max_records": max_records_property(),
            }),
            &["ecosystem_type"],
        )
    }

    async fn execute(&self, bridge: &QueryBridge, args: ToolArguments) -> Result<Value> {
        args.only(&[
            "ecosystem_type",
            "ecosystem",
            "ecosystem_category",
            "ecosystem_subtype",
            "specific_ecosystem",
            "max_records",
        ])?;
        let query = EcosystemQuery {
            ecosystem_type: args.required_str("ecosystem_type")?,
            ecosystem: args.optional_str("ecosystem")?,
            ecosystem_category: args.optional_str("ecosystem_category")?,
            ecosystem_subtype: args.optional_str("ecosystem_subtype")?,
            specific_ecosystem: args.optional_str("specific_ecosystem")?,
        };
        let max_records = args.optional_positive("max_records")?;

        to_json(&bridge.find_biosamples_by_ecosystem(&query, max_records).await?)
    }
}

pub struct FindBiosamplesByFunctionalAnnotationTool;

#[async_trait]
impl NmdcTool for FindBiosamplesByFunctionalAnnotationTool {
    fn name(&self) -> &'static str {
        "find_biosamples_by_functional_annotation"
    }

    fn description(&self) -> &'static str {
        "Find biosamples whose annotated workflow output contains a gene function. \
         Accepts KEGG orthology ids as K00001, KO:K00001 or KEGG.ORTHOLOGY:K00001, \
         and other PREFIX:value ids such as COG:COG0001, PFAM:PF00001 or EC:1.1.1.1."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            json!({
                "annotation_id": {"type": "string", "description": "Functional annotation identifier"},
                "max_records": max_records_property(),
            }),
            &["annotation_id"],
        )
    }

    async fn execute(&self, bridge: &QueryBridge, args: ToolArguments) -> Result<Value> {
        args.only(&["annotation_id", "max_records"])?;
        let annotation_id = args.required_str("annotation_id")?;
        let max_records = args.optional_positive("max_records")?;

        to_json(
            &bridge
                .find_biosamples_by_functional_annotation(&annotation_id, max_records)
                .await?,
        )
    }
}

pub struct FindBiosamplesInElevationRangeTool;

#[async_trait]
impl NmdcTool for FindBiosamplesInElevationRangeTool {
    fn name(&self) -> &'static str {
        "find_biosamples_in_elevation_range"
    }

    fn description(&self) -> &'static str {
        "Find biosamples collected at an elevation (meters) strictly between min_elevation and max_elevation."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            json!({
                "min_elevation": {"type": "number", "description": "Lower bound in meters, exclusive"},
                "max_elevation": {"type": "number", "description": "Upper bound in meters, exclusive"},
                "max_records": max_records_property(),
            }),
            &["min_elevation", "max_elevation"],
        )
    }

    async fn execute(&self, bridge: &QueryBridge, args: ToolArguments) -> Result<Value> {
        args.only(&["min_elevation", "max_elevation", "max_records"])?;
        let min_elevation = args.required_f64("min_elevation")?;
        let max_elevation = args.required_f64("max_elevation")?;
        let max_records = args.optional_positive("max_records")?;

        to_json(
            &bridge
                .find_biosamples_in_elevation_range(min_elevation, max_elevation, max_records)
                .await?,
        )
    }
}

pub struct FindBiosamplesInBoundingBoxTool;

#[async_trait]
impl NmdcTool for FindBiosamplesInBoundingBoxTool {
    fn name(&self) -> &'static str {
        "find_biosamples_in_bounding_box"
    }

    fn description(&self) -> &'static str {
        "Find biosamples whose coordinates fall strictly inside a latitude/longitude bounding box."
    }

    fn input_schema(&self) -> Value {
        let latitude = json!({"type": "number", "minimum": -90, "maximum": 90});
        let longitude = json!({"type": "number", "minimum": -180, "maximum": 180});
        object_schema(
            json!({
                "lower_lat": latitude,
                "upper_lat": latitude,
                "lower_lon": longitude,
                "upper_lon": longitude,
                "max_records": max_records_property(),
            }),
            &["lower_lat", "upper_lat", "lower_lon", "upper_lon"],
        )
    }

    async fn execute(&self, bridge: &QueryBridge, args: ToolArguments) -> Result<Value> {
        args.only(&["lower_lat", "upper_lat", "lower_lon", "upper_lon", "max_records"])?;
        let bounds = BoundingBox {
            lower_lat: args.required_f64("lower_lat")?,
            upper_lat: args.required_f64("upper_lat")?,
            lower_lon: args.required_f64("lower_lon")?,
            upper_lon: args.required_f64("upper_lon")?,
        };
        let max_records = args.optional_positive("max_records")?;

        to_json(&bridge.find_biosamples_in_bounding_box(bounds, max_records).await?)
    }
}
