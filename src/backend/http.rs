//! HTTP backend for a remote `{count, results}` list endpoint

use crate::core::query::{ListQuery, ListResponse};
use crate::core::record::{ListClient, Record, RecordFetcher};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use uuid::Uuid;

/// List client backed by an HTTP endpoint.
///
/// Requests go to `{base_url}/{resource}/` with the flat parameter map as
/// the query string; by-id lookups batch through `id__in`.
#[derive(Debug, Clone)]
pub struct HttpBackend<T> {
    client: reqwest::Client,
    base_url: String,
    resource: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> HttpBackend<T> {
    pub fn new(base_url: impl Into<String>, resource: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, resource)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            resource: resource.into(),
            _marker: PhantomData,
        }
    }

    fn url(&self) -> String {
        format!("{}/{}/", self.base_url, self.resource)
    }
}

#[async_trait]
impl<T: Record + DeserializeOwned> ListClient<T> for HttpBackend<T> {
    async fn list(&self, query: &ListQuery) -> Result<ListResponse<T>> {
        let params: Vec<(String, String)> = query.to_params().into_iter().collect();
        let response = self
            .client
            .get(self.url())
            .query(&params)
            .send()
            .await
            .with_context(|| format!("list request to {} failed", self.resource))?
            .error_for_status()?;
        let page = response
            .json()
            .await
            .with_context(|| format!("malformed list response from {}", self.resource))?;
        Ok(page)
    }
}

#[async_trait]
impl<T: Record + DeserializeOwned> RecordFetcher<T> for HttpBackend<T> {
    async fn fetch_by_ids(&self, ids: &[Uuid]) -> Result<Vec<T>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let response = self
            .client
            .get(self.url())
            .query(&[
                ("id__in", joined.as_str()),
                ("limit", &ids.len().to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("batch lookup on {} failed", self.resource))?
            .error_for_status()?;
        let page: ListResponse<T> = response
            .json()
            .await
            .with_context(|| format!("malformed batch response from {}", self.resource))?;
        Ok(page.results)
    }
}
