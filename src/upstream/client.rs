use super::traits::RecordSource;
use super::types::{Page, PageRequest};
use crate::config::UpstreamConfig;
use crate::error::{NmdcError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// HTTP client for the NMDC schema API.
/// Every request is bounded by the configured timeout and never retried here.
#[derive(Clone)]
pub struct NmdcClient {
    http: Client,
    base_url: String,
}

impl NmdcClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| NmdcError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `{base}/ids/{id}` with the id encoded as a single path segment.
    fn entity_url(&self, id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.url("ids"))
            .map_err(|e| NmdcError::Config(format!("Invalid base_url '{}': {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| NmdcError::Config(format!("base_url '{}' cannot carry a path", self.base_url)))?
            .push(id);
        Ok(url)
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<(StatusCode, String)> {
        let context = format!("GET {}", url);
        debug!("{} {:?}", context, query);

        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| NmdcError::upstream_transport(&context, &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NmdcError::upstream_transport(&context, &e))?;

        Ok((status, body))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let (status, body) = self.get(url, query).await?;
        if !status.is_success() {
            return Err(NmdcError::upstream_status(
                format!("GET {}", url),
                status,
                &body,
            ));
        }
        decode(url, &body)
    }
}

fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T> {
    serde_json::from_str(body)
        .map_err(|e| NmdcError::upstream_malformed(format!("GET {}", url), e.to_string()))
}

#[async_trait]
impl RecordSource for NmdcClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page> {
        let url = self.url(&request.collection);
        let page: Page = self.get_json(&url, &request.query_pairs()).await?;
        debug!(
            "Fetched {} records from {} (more: {})",
            page.resources.len(),
            request.collection,
            page.has_more()
        );
        Ok(page)
    }

    async fn fetch_entity(&self, id: &str) -> Result<Option<Value>> {
        let url = self.entity_url(id)?;
        let url = url.as_str();
        let (status, body) = self.get(url, &[]).await?;

        if status == StatusCode::NOT_FOUND {
            debug!("Entity {} not found upstream", id);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(NmdcError::upstream_status(
                format!("GET {}", url),
                status,
                &body,
            ));
        }

        decode(url, &body).map(Some)
    }

    async fn collection_names(&self) -> Result<Vec<String>> {
        self.get_json(&self.url("collection_names"), &[]).await
    }

    async fn collection_stats(&self) -> Result<Vec<Value>> {
        self.get_json(&self.url("collection_stats"), &[]).await
    }
}
