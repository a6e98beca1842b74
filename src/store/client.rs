//! HTTP client wrapper for interacting with Elasticsearch.

use crate::config::get_config;
use crate::store::{
    RecordStore,
    query::search_body,
    types::{CountResponse, GetResponse, Predicate, SearchResponse, StoreError, StoredDocument},
};
use crate::transport::{build_client, failure_body, format_endpoint, normalize_base_url};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Lightweight HTTP client for the document store.
pub struct ElasticStore {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
}

impl ElasticStore {
    /// Construct a new client using configuration derived from the environment.
    pub fn new() -> Result<Self, StoreError> {
        let config = get_config();
        let client = build_client(Duration::from_secs(config.adapter_timeout_secs))?;

        let base_url =
            normalize_base_url(&config.elasticsearch_url).map_err(StoreError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            has_api_key = config.elasticsearch_api_key.is_some(),
            timeout_secs = config.adapter_timeout_secs,
            "Initialized record store HTTP client"
        );

        Ok(Self {
            client,
            base_url,
            api_key: config.elasticsearch_api_key.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        let mut req = self.client.request(method, url);
        if let Some(api_key) = &self.api_key
            && !api_key.is_empty()
        {
            req = req.header("Authorization", format!("ApiKey {api_key}"));
        }
        req
    }

    async fn ensure_success<F>(
        &self,
        response: reqwest::Response,
        on_success: F,
    ) -> Result<(), StoreError>
    where
        F: FnOnce(),
    {
        if response.status().is_success() {
            on_success();
            Ok(())
        } else {
            let (status, body) = failure_body(response).await;
            let error = StoreError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Record store request failed");
            Err(error)
        }
    }
}

#[async_trait]
impl RecordStore for ElasticStore {
    async fn exists(&self, collection: &str) -> Result<bool, StoreError> {
        let response = self.request(Method::HEAD, collection).send().await?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => {
                let (status, body) = failure_body(response).await;
                let error = StoreError::UnexpectedStatus { status, body };
                tracing::error!(collection, error = %error, "Collection existence check failed");
                Err(error)
            }
        }
    }

    async fn create_collection(&self, collection: &str, schema: &Value) -> Result<(), StoreError> {
        let response = self
            .request(Method::PUT, collection)
            .json(schema)
            .send()
            .await?;

        self.ensure_success(response, || {
            tracing::info!(collection, "Collection created");
        })
        .await
    }

    async fn put(&self, collection: &str, id: &str, document: &Value) -> Result<(), StoreError> {
        let response = self
            .request(Method::PUT, &format!("{collection}/_doc/{id}"))
            .query(&[("refresh", "true")])
            .json(document)
            .send()
            .await?;

        self.ensure_success(response, || {
            tracing::debug!(collection, id, "Document stored");
        })
        .await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        let response = self
            .request(Method::GET, &format!("{collection}/_doc/{id}"))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let (status, body) = failure_body(response).await;
            let error = StoreError::UnexpectedStatus { status, body };
            tracing::error!(collection, id, error = %error, "Document lookup failed");
            return Err(error);
        }

        let payload: GetResponse = response.json().await?;
        Ok(match (payload.found, payload.source) {
            (true, Some(source)) => Some(StoredDocument {
                id: payload.id,
                source,
            }),
            _ => None,
        })
    }

    async fn search(
        &self,
        collection: &str,
        predicate: &Predicate,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let response = self
            .request(Method::POST, &format!("{collection}/_search"))
            .json(&search_body(predicate))
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, body) = failure_body(response).await;
            let error = StoreError::UnexpectedStatus { status, body };
            tracing::error!(collection, error = %error, "Record store search failed");
            return Err(error);
        }

        let payload: SearchResponse = response.json().await?;
        let documents: Vec<StoredDocument> = payload
            .hits
            .hits
            .into_iter()
            .map(|hit| {
                // Source-less hits stay in the result so callers can count them as dropped.
                let source = hit.source.unwrap_or_else(|| {
                    tracing::warn!(collection, id = %hit.id, "Search hit has no _source");
                    Value::Null
                });
                StoredDocument { id: hit.id, source }
            })
            .collect();
        tracing::debug!(collection, hits = documents.len(), "Search completed");
        Ok(documents)
    }

    async fn count_matches(
        &self,
        collection: &str,
        predicate: &Predicate,
    ) -> Result<u64, StoreError> {
        let response = self
            .request(Method::POST, &format!("{collection}/_count"))
            .json(&search_body(predicate))
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, body) = failure_body(response).await;
            let error = StoreError::UnexpectedStatus { status, body };
            tracing::error!(collection, error = %error, "Record store count failed");
            return Err(error);
        }

        let CountResponse { count } = response.json().await?;
        Ok(count)
    }
}
