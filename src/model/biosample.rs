use super::{into_object, number, string_list, take_with, term_label, text};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// Fields requested from `biosample_set` for every biosample-returning tool.
pub const BIOSAMPLE_PROJECTION: &[&str] = &[
    "id",
    "name",
    "collection_date",
    "ecosystem",
    "ecosystem_category",
    "ecosystem_type",
    "ecosystem_subtype",
    "specific_ecosystem",
    "env_broad_scale",
    "env_local_scale",
    "env_medium",
    "geo_loc_name",
    "lat_lon",
    "elev",
    "associated_studies",
];

/// An environmental sample, normalised for agents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Biosample {
    pub id: String,
    pub name: Option<String>,
    pub ecosystem: Option<String>,
    pub ecosystem_category: Option<String>,
    pub ecosystem_type: Option<String>,
    pub ecosystem_subtype: Option<String>,
    pub specific_ecosystem: Option<String>,
    pub env_broad_scale: Option<String>,
    pub env_local_scale: Option<String>,
    pub env_medium: Option<String>,
    pub geo_loc_name: Option<String>,
    pub collection_date: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
    pub associated_studies: Vec<String>,
    pub metadata: Map<String, Value>,
}

impl Biosample {
    pub fn from_record(record: Value) -> Result<Self> {
        let (id, mut object) = into_object(record, "biosample_set")?;

        let (latitude, longitude) = match object.remove("lat_lon") {
            Some(lat_lon) => (
                lat_lon.get("latitude").and_then(number),
                lat_lon.get("longitude").and_then(number),
            ),
            None => (None, None),
        };

        Ok(Self {
            id,
            name: take_with(&mut object, "name", text),
            ecosystem: take_with(&mut object, "ecosystem", text),
            ecosystem_category: take_with(&mut object, "ecosystem_category", text),
            ecosystem_type: take_with(&mut object, "ecosystem_type", text),
            ecosystem_subtype: take_with(&mut object, "ecosystem_subtype", text),
            specific_ecosystem: take_with(&mut object, "specific_ecosystem", text),
            env_broad_scale: take_with(&mut object, "env_broad_scale", term_label),
            env_local_scale: take_with(&mut object, "env_local_scale", term_label),
            env_medium: take_with(&mut object, "env_medium", term_label),
            geo_loc_name: take_with(&mut object, "geo_loc_name", text),
            collection_date: take_with(&mut object, "collection_date", text)
                .map(|raw| format_collection_date(&raw)),
            latitude,
            longitude,
            elevation: take_with(&mut object, "elev", number),
            associated_studies: object
                .remove("associated_studies")
                .map(|v| string_list(&v))
                .unwrap_or_default(),
            metadata: object,
        })
    }
}

/// RFC 3339 timestamps are rendered in UTC; anything else (plain dates,
/// partial dates, free text) is kept as the submitter wrote it.
pub fn format_collection_date(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(timestamp) => timestamp
            .with_timezone(&Utc)
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}
