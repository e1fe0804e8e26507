//! The asset cache worker: lifecycle and fetch interception.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use url::Url;

use crate::ai::AiConfig;

use super::{
    bucket_name, AssetRequest, AssetResponse, CacheBucket, CacheError, CacheStorage, FetchError,
    Network, CACHE_VERSION,
};

/// Host of the AI gateway. Its requests are never intercepted.
pub const GATEWAY_HOST: &str = "generativelanguage.googleapis.com";

/// Result of intercepting a request.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Not handled by the worker; the caller performs a normal fetch.
    Passthrough,
    /// Served from the cache while a network refresh runs in the background.
    Cached {
        response: AssetResponse,
        revalidation: Revalidation,
    },
    /// Nothing usable was cached; this is the network's answer.
    Network(AssetResponse),
}

impl FetchOutcome {
    /// The response served to the page, if the worker handled the request.
    pub fn response(&self) -> Option<&AssetResponse> {
        match self {
            FetchOutcome::Passthrough => None,
            FetchOutcome::Cached { response, .. } => Some(response),
            FetchOutcome::Network(response) => Some(response),
        }
    }
}

/// A background refresh of one cache entry.
#[derive(Debug)]
pub struct Revalidation {
    handle: JoinHandle<Result<AssetResponse, FetchError>>,
}

impl Revalidation {
    /// Wait for the refresh to finish. The cache has been updated (for 2xx
    /// responses) by the time this returns.
    pub async fn wait(self) -> Result<AssetResponse, FetchError> {
        self.handle.await?
    }
}

pub struct AssetCacheWorker {
    origin: Url,
    excluded_prefixes: Vec<String>,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    active: AtomicBool,
}

impl AssetCacheWorker {
    /// Create a worker for pages served from `origin`.
    pub fn new(origin: Url, storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>) -> Self {
        Self {
            origin,
            excluded_prefixes: Vec::new(),
            storage,
            network,
            active: AtomicBool::new(false),
        }
    }

    /// Leave traffic to the configured AI service alone, including a base
    /// URL overridden to a path on the app's own origin.
    pub fn exclude_ai_gateway(mut self, config: &AiConfig) -> Self {
        self.excluded_prefixes
            .push(format!("{}/", config.base_url.trim_end_matches('/')));
        self
    }

    pub fn cache_name(&self) -> String {
        bucket_name(CACHE_VERSION)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Install the new version. Nothing is precached, so install cannot fail
    /// on an unreachable asset; the first load is served from the network.
    pub async fn install(&self) -> Result<(), CacheError> {
        tracing::info!(cache = %self.cache_name(), "Asset cache installed");
        Ok(())
    }

    /// Delete every bucket except the current one and start intercepting
    /// requests from already-open pages.
    ///
    /// Returns the names of the deleted buckets.
    pub async fn activate(&self) -> Result<Vec<String>, CacheError> {
        let current = self.cache_name();
        let mut deleted = Vec::new();

        for name in self.storage.keys().await? {
            if name != current {
                tracing::info!(cache = %name, "Deleting old asset cache");
                self.storage.delete(&name).await?;
                deleted.push(name);
            }
        }

        self.active.store(true, Ordering::SeqCst);
        tracing::info!(cache = %current, "Asset cache active, clients claimed");
        Ok(deleted)
    }

    fn intercepts(&self, request: &AssetRequest) -> bool {
        if !self.is_active() || !request.is_get() {
            return false;
        }

        let url = match Url::parse(&request.url) {
            Ok(url) => url,
            Err(_) => return false,
        };
        if url.host_str() == Some(GATEWAY_HOST) {
            return false;
        }
        if self
            .excluded_prefixes
            .iter()
            .any(|prefix| url.as_str().starts_with(prefix.as_str()))
        {
            return false;
        }
        url.origin() == self.origin.origin()
    }

    /// Answer an intercepted request, stale-while-revalidate.
    ///
    /// A cached response is returned immediately while the network refresh
    /// runs in the background. With nothing cached, the caller waits for the
    /// network. Only 2xx responses are stored.
    pub async fn handle_fetch(&self, request: &AssetRequest) -> Result<FetchOutcome, FetchError> {
        if !self.intercepts(request) {
            return Ok(FetchOutcome::Passthrough);
        }

        let bucket = match self.storage.open(&self.cache_name()).await {
            Ok(bucket) => bucket,
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "Cache unavailable, using network");
                let response = self.network.fetch(request).await?;
                return Ok(FetchOutcome::Network(response));
            }
        };

        let cached = match bucket.match_request(request).await {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "Cache lookup failed");
                None
            }
        };

        let revalidation = self.revalidate(bucket, request.clone());

        match cached {
            Some(response) => {
                tracing::debug!(url = %request.url, "cache hit");
                Ok(FetchOutcome::Cached {
                    response,
                    revalidation,
                })
            }
            None => {
                tracing::debug!(url = %request.url, "cache miss");
                Ok(FetchOutcome::Network(revalidation.wait().await?))
            }
        }
    }

    fn revalidate(&self, bucket: Arc<dyn CacheBucket>, request: AssetRequest) -> Revalidation {
        let network = self.network.clone();
        let handle = tokio::spawn(async move {
            let response = match network.fetch(&request).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(url = %request.url, error = %e, "Revalidation failed");
                    return Err(e);
                }
            };

            if response.is_ok() {
                if let Err(e) = bucket.put(&request, &response).await {
                    tracing::warn!(url = %request.url, error = %e, "Failed to store asset");
                }
            } else {
                tracing::debug!(url = %request.url, status = response.status, "Not caching");
            }
            Ok(response)
        });
        Revalidation { handle }
    }
}
