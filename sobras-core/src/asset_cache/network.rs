//! Network access for the asset cache.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::{AssetRequest, AssetResponse, FetchError};

/// Trait for fetching assets, enabling mockability in tests.
#[async_trait]
pub trait Network: Send + Sync {
    /// Fetch a request from the network. Non-2xx statuses are responses,
    /// not errors.
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError>;
}

/// Production network backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestNetwork {
    inner: reqwest::Client,
}

impl ReqwestNetwork {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let inner = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { inner })
    }
}

#[async_trait]
impl Network for ReqwestNetwork {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError> {
        let url =
            reqwest::Url::parse(&request.url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", request.method, e)))?;

        tracing::debug!(url = %request.url, "network: fetching");
        let response = self.inner.request(method, url).send().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.bytes().await?.to_vec();

        tracing::debug!(url = %request.url, status, "network: fetched");
        Ok(AssetResponse {
            status,
            body,
            content_type,
        })
    }
}

/// Mock response for testing.
#[derive(Debug, Clone)]
pub enum MockNetworkResponse {
    Response(AssetResponse),
    Offline,
}

/// Mock network for testing. Unknown URLs behave as if offline.
#[derive(Debug, Default)]
pub struct MockNetwork {
    responses: Mutex<HashMap<String, MockNetworkResponse>>,
    fetches: Mutex<Vec<String>>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, url: &str, response: AssetResponse) -> Self {
        self.set(url, MockNetworkResponse::Response(response));
        self
    }

    /// Replace the scripted answer for a URL.
    pub fn set(&self, url: &str, response: MockNetworkResponse) {
        lock(&self.responses).insert(url.to_string(), response);
    }

    /// Make every URL fail as if the network were down.
    pub fn go_offline(&self) {
        lock(&self.responses).clear();
    }

    /// Number of fetches issued for a URL.
    pub fn fetch_count(&self, url: &str) -> usize {
        lock(&self.fetches).iter().filter(|u| *u == url).count()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError> {
        lock(&self.fetches).push(request.url.clone());
        match lock(&self.responses).get(&request.url) {
            Some(MockNetworkResponse::Response(response)) => Ok(response.clone()),
            Some(MockNetworkResponse::Offline) | None => {
                Err(FetchError::Offline(request.url.clone()))
            }
        }
    }
}
