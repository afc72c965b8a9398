use super::{into_object, number, take_with, text};
use crate::error::Result;
use serde::Serialize;
use serde_json::{Map, Value};

pub const DATA_OBJECT_PROJECTION: &[&str] = &[
    "id",
    "name",
    "description",
    "data_object_type",
    "url",
    "file_size_bytes",
    "md5_checksum",
];

/// A downloadable file produced from a biosample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataObject {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub file_type: Option<String>,
    pub url: Option<String>,
    pub file_size_bytes: Option<u64>,
    pub md5_checksum: Option<String>,
    pub metadata: Map<String, Value>,
}

impl DataObject {
    pub fn from_record(record: Value) -> Result<Self> {
        let (id, mut object) = into_object(record, "data_object_set")?;

        Ok(Self {
            id,
            name: take_with(&mut object, "name", text),
            description: take_with(&mut object, "description", text),
            file_type: take_with(&mut object, "data_object_type", text),
            url: take_with(&mut object, "url", text),
            file_size_bytes: take_with(&mut object, "file_size_bytes", number)
                .filter(|size| *size >= 0.0)
                .map(|size| size as u64),
            md5_checksum: take_with(&mut object, "md5_checksum", text),
            metadata: object,
        })
    }
}
