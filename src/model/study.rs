use super::{into_object, take_with, text};
use crate::error::Result;
use serde::Serialize;
use serde_json::{Map, Value};

pub const PUBLICATION_DOI_CATEGORY: &str = "publication_doi";

pub const STUDY_PROJECTION: &[&str] = &["id", "name", "title", "description", "associated_dois"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Study {
    pub id: String,
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// DOI values of the study's publication references
    pub publications: Vec<String>,
    pub metadata: Map<String, Value>,
}

impl Study {
    pub fn from_record(record: Value) -> Result<Self> {
        let (id, mut object) = into_object(record, "study_set")?;
        let publications = object
            .get("associated_dois")
            .map(publication_dois)
            .unwrap_or_default();

        Ok(Self {
            id,
            name: take_with(&mut object, "name", text),
            title: take_with(&mut object, "title", text),
            description: take_with(&mut object, "description", text),
            publications,
            metadata: object,
        })
    }

    pub fn has_publications(&self) -> bool {
        !self.publications.is_empty()
    }
}

fn publication_dois(associated: &Value) -> Vec<String> {
    associated
        .as_array()
        .into_iter()
        .flatten()
        .filter(|doi| {
            doi.get("doi_category").and_then(Value::as_str) == Some(PUBLICATION_DOI_CATEGORY)
        })
        .filter_map(|doi| doi.get("doi_value").and_then(text))
        .collect()
}
