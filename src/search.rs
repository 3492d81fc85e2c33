use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::Config;
use crate::data_models::SearchHit;

/// Transport errors carry no request URL: the query string holds the API key.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("search service returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("malformed search response: {0}")]
    Decode(String),
}

/// The external web search the relay forwards queries to.
pub trait SearchProvider: Send + Sync + 'static {
    fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<SearchHit>, SearchError>> + Send;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchHit>,
}

/// Client for the Google Programmable Search JSON API.
#[derive(Debug, Clone)]
pub struct GoogleSearchClient {
    client: Client,
    endpoint: String,
    api_key: String,
    cse_id: String,
}

impl GoogleSearchClient {
    pub fn new(
        endpoint: &str,
        api_key: &str,
        cse_id: &str,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::Request(e.without_url()))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            cse_id: cse_id.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, SearchError> {
        Self::new(
            &config.search_endpoint,
            &config.google_api_key,
            &config.google_cse_id,
            config.search_timeout,
        )
    }
}

impl SearchProvider for GoogleSearchClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        let num = limit.to_string();
        let res = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.cse_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Request(e.without_url()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(SearchError::Status { status, body });
        }

        let body = res
            .bytes()
            .await
            .map_err(|e| SearchError::Request(e.without_url()))?;
        let parsed: SearchResponse =
            serde_json::from_slice(&body).map_err(|e| SearchError::Decode(e.to_string()))?;

        tracing::debug!(query, count = parsed.items.len(), "search collaborator responded");
        Ok(parsed.items)
    }
}
