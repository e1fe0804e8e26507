//! Offline asset cache with stale-while-revalidate.
//!
//! A background worker sits between the app and the network for static
//! assets. Same-origin GETs are answered from a single versioned cache
//! bucket when possible while a network refresh runs in the background.
//! Everything else, including calls to the AI gateway, passes through.

mod network;
mod storage;
mod worker;

use thiserror::Error;

pub use network::{MockNetwork, MockNetworkResponse, Network, ReqwestNetwork};
pub use storage::{
    CacheBucket, CacheMetadata, CacheStorage, DiskCacheStorage, MemoryCacheStorage,
};
pub use worker::{AssetCacheWorker, FetchOutcome, Revalidation, GATEWAY_HOST};

/// Prefix shared by every bucket this app has ever created.
pub const CACHE_PREFIX: &str = "sobras-magicas-cache";

/// Current cache version. Bumping it invalidates every older bucket.
pub const CACHE_VERSION: u32 = 7;

/// Bucket name for a cache version, e.g. `sobras-magicas-cache-v7`.
pub fn bucket_name(version: u32) -> String {
    format!("{}-v{}", CACHE_PREFIX, version)
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt cache entry: {0}")]
    Corrupt(String),

    #[error("Cache storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Network unavailable: {0}")]
    Offline(String),

    #[error("Revalidation task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// An intercepted request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetRequest {
    pub method: String,
    pub url: String,
}

impl AssetRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
        }
    }

    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
        }
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

impl AssetResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// 2xx status.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Convert a URL to a filesystem-safe slug.
/// e.g., "https://sobras.app/assets/index.js?v=3" -> "sobras-app_assets-index-js_v_3"
pub fn slugify_url(url: &str) -> String {
    let parsed = match url::Url::parse(url) {
        Ok(p) => p,
        Err(_) => return sanitize_for_filesystem(url),
    };

    let host = parsed.host_str().unwrap_or("unknown");
    let path = parsed.path().trim_matches('/');

    let mut combined = if path.is_empty() {
        host.to_string()
    } else {
        format!("{}_{}", host, path)
    };
    if let Some(query) = parsed.query() {
        combined.push('_');
        combined.push_str(query);
    }

    sanitize_for_filesystem(&combined)
}

fn sanitize_for_filesystem(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else if c == '.' || c == '/' {
                '-'
            } else {
                '_'
            }
        })
        .take(200)
        .collect()
}
