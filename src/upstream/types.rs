use super::filter::QueryFilter;
use serde::Deserialize;
use serde_json::Value;

/// Collection names used by the query bridge.
pub mod collections {
    pub const BIOSAMPLE_SET: &str = "biosample_set";
    pub const STUDY_SET: &str = "study_set";
    pub const DATA_OBJECT_SET: &str = "data_object_set";
    pub const DATA_GENERATION_SET: &str = "data_generation_set";
    pub const WORKFLOW_EXECUTION_SET: &str = "workflow_execution_set";
    pub const FUNCTIONAL_ANNOTATION_AGG: &str = "functional_annotation_agg";
}

/// One page request against `GET /{collection}`.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub collection: String,
    pub filter: QueryFilter,
    pub projection: Vec<String>,
    pub page_size: usize,
    pub page_token: Option<String>,
}

impl PageRequest {
    pub fn new(collection: impl Into<String>, filter: QueryFilter) -> Self {
        Self {
            collection: collection.into(),
            filter,
            projection: Vec::new(),
            page_size: 1,
            page_token: None,
        }
    }

    pub fn with_projection<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_page_token(mut self, page_token: Option<String>) -> Self {
        self.page_token = page_token;
        self
    }

    /// Query string pairs in the order the upstream documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("max_page_size", self.page_size.to_string())];
        if let Some(filter) = self.filter.to_query_string() {
            pairs.push(("filter", filter));
        }
        if !self.projection.is_empty() {
            pairs.push(("projection", self.projection.join(",")));
        }
        if let Some(token) = &self.page_token {
            pairs.push(("page_token", token.clone()));
        }
        pairs
    }
}

/// One page of upstream records.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub resources: Vec<Value>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl Page {
    /// Token for the following page; blank tokens mean the listing is done.
    pub fn next_token(&self) -> Option<&str> {
        self.next_page_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }

    pub fn has_more(&self) -> bool {
        self.next_token().is_some()
    }
}
