//! Named cache buckets, in memory or on disk.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::fs;

use super::{slugify_url, AssetRequest, AssetResponse, CacheError};

/// The set of named buckets available to the worker.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open a bucket, creating it if needed.
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheBucket>, CacheError>;

    /// Names of every existing bucket.
    async fn keys(&self) -> Result<Vec<String>, CacheError>;

    /// Delete a bucket. Returns false if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool, CacheError>;
}

/// Request → response pairs keyed by request URL.
#[async_trait]
pub trait CacheBucket: Send + Sync {
    async fn match_request(
        &self,
        request: &AssetRequest,
    ) -> Result<Option<AssetResponse>, CacheError>;

    /// Store a response, replacing any previous entry for the request.
    async fn put(&self, request: &AssetRequest, response: &AssetResponse)
        -> Result<(), CacheError>;
}

// In memory

#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    buckets: Mutex<BTreeMap<String, Arc<MemoryBucket>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn buckets(&self) -> MutexGuard<'_, BTreeMap<String, Arc<MemoryBucket>>> {
        self.buckets.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheBucket>, CacheError> {
        let bucket: Arc<dyn CacheBucket> = self
            .buckets()
            .entry(name.to_string())
            .or_default()
            .clone();
        Ok(bucket)
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.buckets().keys().cloned().collect())
    }

    async fn delete(&self, name: &str) -> Result<bool, CacheError> {
        Ok(self.buckets().remove(name).is_some())
    }
}

#[derive(Debug, Default)]
struct MemoryBucket {
    entries: Mutex<HashMap<String, AssetResponse>>,
}

impl MemoryBucket {
    fn entries(&self) -> MutexGuard<'_, HashMap<String, AssetResponse>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl CacheBucket for MemoryBucket {
    async fn match_request(
        &self,
        request: &AssetRequest,
    ) -> Result<Option<AssetResponse>, CacheError> {
        Ok(self.entries().get(&request.url).cloned())
    }

    async fn put(
        &self,
        request: &AssetRequest,
        response: &AssetResponse,
    ) -> Result<(), CacheError> {
        self.entries()
            .insert(request.url.clone(), response.clone());
        Ok(())
    }
}

// On disk

/// Metadata stored alongside cached responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

/// Disk-backed buckets: one directory per bucket, one directory per cached
/// URL holding `entry.bin`.
///
/// An entry is a single line of JSON metadata followed by the body. It is
/// written to a temporary file and renamed into place, so a lookup racing a
/// refresh sees either the old entry or the new one, never a mix.
#[derive(Debug, Clone)]
pub struct DiskCacheStorage {
    root: PathBuf,
}

impl DiskCacheStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Get the default cache directory: ~/.sobras-magicas/asset-cache
    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".sobras-magicas").join("asset-cache"))
            .unwrap_or_else(|| PathBuf::from("data/asset-cache"))
    }

    fn bucket_dir(&self, name: &str) -> PathBuf {
        self.root.join(slugify_url(name))
    }
}

#[async_trait]
impl CacheStorage for DiskCacheStorage {
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheBucket>, CacheError> {
        let dir = self.bucket_dir(name);
        fs::create_dir_all(&dir).await?;
        Ok(Arc::new(DiskBucket { dir }))
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> Result<bool, CacheError> {
        match fs::remove_dir_all(self.bucket_dir(name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug)]
struct DiskBucket {
    dir: PathBuf,
}

impl DiskBucket {
    fn entry_dir(&self, url: &str) -> PathBuf {
        self.dir.join(slugify_url(url))
    }
}

const ENTRY_FILE: &str = "entry.bin";

#[async_trait]
impl CacheBucket for DiskBucket {
    async fn match_request(
        &self,
        request: &AssetRequest,
    ) -> Result<Option<AssetResponse>, CacheError> {
        let path = self.entry_dir(&request.url).join(ENTRY_FILE);

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let split = bytes
            .iter()
            .position(|&b| b == b'\n')
            .ok_or_else(|| CacheError::Corrupt(format!("{}: missing metadata", request.url)))?;
        let metadata: CacheMetadata = serde_json::from_slice(&bytes[..split])
            .map_err(|e| CacheError::Corrupt(format!("{}: {}", request.url, e)))?;

        // Two URLs can share a slug; only the one that wrote the entry matches.
        if metadata.url != request.url {
            return Ok(None);
        }

        Ok(Some(AssetResponse {
            status: metadata.status,
            body: bytes[split + 1..].to_vec(),
            content_type: metadata.content_type,
        }))
    }

    async fn put(
        &self,
        request: &AssetRequest,
        response: &AssetResponse,
    ) -> Result<(), CacheError> {
        let dir = self.entry_dir(&request.url);
        fs::create_dir_all(&dir).await?;

        let metadata = CacheMetadata {
            url: request.url.clone(),
            status: response.status,
            content_type: response.content_type.clone(),
            fetched_at: Utc::now(),
        };
        let mut bytes =
            serde_json::to_vec(&metadata).map_err(|e| CacheError::Corrupt(e.to_string()))?;
        bytes.push(b'\n');
        bytes.extend_from_slice(&response.body);

        let tmp = dir.join(format!(".{:016x}.tmp", rand::random::<u64>()));
        fs::write(&tmp, &bytes).await?;
        if let Err(e) = fs::rename(&tmp, dir.join(ENTRY_FILE)).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}
