//! Remote data gateway
//!
//! Normalizes the chain's REST query endpoints into typed domain results.
//! Two rules hold for every accessor:
//!
//! - by-id queries map HTTP 404 (and only 404) to `Ok(None)`; every other
//!   failure propagates unchanged,
//! - list queries default a missing collection field to an empty `Vec`,
//!   never null and never an error.
//!
//! Each resource arrives wrapped in a JSON envelope under its singular
//! field name (`{"gig": {...}}`, `{"gig": [...]}` for lists).

mod bank;
mod envelope;
mod marketplace;

use crate::config::ChainConfig;
use crate::error::{ClientError, ClientResult};
use serde_json::Value;
use tracing::debug;

/// Typed read access to the chain's REST API.
pub struct RestGateway {
    http: reqwest::Client,
    base_url: String,
}

impl RestGateway {
    /// Build a gateway bound to the configured REST endpoint, with the
    /// configured connect and whole-request deadlines applied to every
    /// call it makes.
    pub fn new(config: &ChainConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.timeouts.connect_timeout())
            .timeout(config.timeouts.request_timeout())
            .build()
            .map_err(|e| ClientError::network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.rest_endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// GET an endpoint where any non-success status is an error.
    pub(crate) async fn get(&self, path: &str) -> ClientResult<Value> {
        let response = self.send(path, &[]).await?;
        Self::into_json(response).await
    }

    /// GET with query parameters; any non-success status is an error.
    pub(crate) async fn get_with_query(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ClientResult<Value> {
        let response = self.send(path, query).await?;
        Self::into_json(response).await
    }

    /// GET a by-id endpoint. A 404 status is the sole recognized
    /// "not found" signal and maps to `Ok(None)`.
    pub(crate) async fn get_by_id(&self, path: &str) -> ClientResult<Option<Value>> {
        let response = self.send(path, &[]).await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(Self::into_json(response).await?))
    }

    async fn send(&self, path: &str, query: &[(&str, &str)]) -> ClientResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "gateway request");
        let mut request = self.http.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }
        Ok(request.send().await?)
    }

    async fn into_json(response: reqwest::Response) -> ClientResult<Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::network_with_context(
                format!("REST endpoint returned {status}"),
                body,
            ));
        }
        Ok(response.json::<Value>().await?)
    }
}
