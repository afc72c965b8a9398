// In-memory record source for bridge tests: applies filters, projections and
// token paging the way the upstream does, and records every request it serves.

use super::traits::RecordSource;
use super::types::{Page, PageRequest};
use crate::error::{NmdcError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct MemorySource {
    collections: HashMap<String, Vec<Value>>,
    failing: HashMap<String, u16>,
    requests: Mutex<Vec<PageRequest>>,
}

impl MemorySource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_collection(mut self, name: &str, records: Vec<Value>) -> Self {
        self.collections.insert(name.to_string(), records);
        self
    }

    pub(crate) fn failing(mut self, name: &str, status: u16) -> Self {
        self.failing.insert(name.to_string(), status);
        self
    }

    pub(crate) fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn requests_for(&self, collection: &str) -> Vec<PageRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.collection == collection)
            .collect()
    }
}

fn project(record: &Value, projection: &[String]) -> Value {
    if projection.is_empty() {
        return record.clone();
    }
    let Some(object) = record.as_object() else {
        return record.clone();
    };
    let projected: Map<String, Value> = object
        .iter()
        .filter(|(key, _)| {
            projection
                .iter()
                .any(|field| field == *key || field.split('.').next() == Some(key.as_str()))
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Value::Object(projected)
}

#[async_trait]
impl RecordSource for MemorySource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(status) = self.failing.get(&request.collection) {
            let status = reqwest::StatusCode::from_u16(*status).unwrap();
            return Err(NmdcError::upstream_status(
                format!("GET /{}", request.collection),
                status,
                "",
            ));
        }

        let records = self
            .collections
            .get(&request.collection)
            .cloned()
            .unwrap_or_default();
        let matching: Vec<&Value> = records
            .iter()
            .filter(|record| request.filter.matches(record))
            .collect();

        let offset: usize = request
            .page_token
            .as_deref()
            .map(|token| token.parse().unwrap())
            .unwrap_or(0);
        let end = (offset + request.page_size).min(matching.len());
        let resources = matching[offset.min(end)..end]
            .iter()
            .map(|record| project(record, &request.projection))
            .collect();
        let next_page_token = (end < matching.len()).then(|| end.to_string());

        Ok(Page {
            resources,
            next_page_token,
        })
    }

    async fn fetch_entity(&self, id: &str) -> Result<Option<Value>> {
        Ok(self
            .collections
            .values()
            .flatten()
            .find(|record| record.get("id").and_then(Value::as_str) == Some(id))
            .cloned())
    }

    async fn collection_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.collections.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn collection_stats(&self) -> Result<Vec<Value>> {
        let mut names: Vec<&String> = self.collections.keys().collect();
        names.sort();
        Ok(names
            .into_iter()
            .map(|name| {
                serde_json::json!({
                    "ns": format!("nmdc.{}", name),
                    "storageStats": {"count": self.collections[name].len()},
                })
            })
            .collect())
    }
}
