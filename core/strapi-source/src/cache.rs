//! Key/value cache used to skip redundant downloads and node creation.
//!
//! Two entry kinds are stored:
//! - `strapi-media-<id>` → [`MediaCacheEntry`], valid while `updatedAt` matches
//! - `strapi-richtext-<digest>` → [`RichTextCacheEntry`], content-addressed by key

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::SourceResult;

/// Async string-keyed cache.
///
/// No compare-and-swap is offered: concurrent writers to the same key are
/// last-writer-wins.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> SourceResult<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> SourceResult<()>;
}

/// Cached result of a media download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaCacheEntry {
    #[serde(rename = "fileNodeID")]
    pub file_node_id: String,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Value>,
}

impl MediaCacheEntry {
    pub fn key(media_id: &str) -> String {
        format!("strapi-media-{media_id}")
    }
}

/// Cached rich-text node id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichTextCacheEntry {
    #[serde(rename = "nodeId")]
    pub node_id: String,
}

impl RichTextCacheEntry {
    pub fn key(content_digest: &str) -> String {
        format!("strapi-richtext-{content_digest}")
    }
}

/// Reads a typed entry. Entries that no longer decode are treated as misses.
pub(crate) async fn read_entry<T>(cache: &dyn Cache, key: &str) -> SourceResult<Option<T>>
where
    T: DeserializeOwned + Send,
{
    let Some(value) = cache.get(key).await? else {
        return Ok(None);
    };
    match serde_json::from_value(value) {
        Ok(entry) => Ok(Some(entry)),
        Err(e) => {
            debug!(key, error = %e, "Ignoring unreadable cache entry");
            Ok(None)
        }
    }
}

pub(crate) async fn write_entry<T>(cache: &dyn Cache, key: &str, entry: &T) -> SourceResult<()>
where
    T: Serialize + Sync,
{
    cache.set(key, serde_json::to_value(entry)?).await
}

/// In-memory cache; lives for one process.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// All keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> SourceResult<Option<Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> SourceResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

/// Cache persisted as a JSON object on disk, so entries survive between
/// builds. Writes stay in memory until [`JsonFileCache::flush`].
#[derive(Debug)]
pub struct JsonFileCache {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, Value>>,
}

impl JsonFileCache {
    /// Loads `path`, or starts empty if it does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> SourceResult<Self> {
        let path = path.into();
        let entries: BTreeMap<String, Value> = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), entries = entries.len(), "Opened cache file");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Writes all entries to disk, replacing the previous file.
    pub async fn flush(&self) -> SourceResult<()> {
        let bytes = serde_json::to_vec_pretty(&*self.entries.read().await)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl Cache for JsonFileCache {
    async fn get(&self, key: &str) -> SourceResult<Option<Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> SourceResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}
