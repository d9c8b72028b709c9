//! Cache manager for persisting API responses to disk
//!
//! Provides a `CacheManager` that stores serializable data to JSON files with
//! the time they were written, and enforces the time-to-live when reading.

use super::clock::{Clock, SystemClock};
use super::key::cache_key;
use crate::config::CacheConfig;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, warn};

/// Sequence for temp file names, so concurrent writers never share one
static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// When the data was cached, in epoch milliseconds
    timestamp: i64,
    /// The cached data
    data: T,
}

/// Reads and writes cached data on disk
///
/// Each entry lives in `<cache_dir>/<key>.json`. Expired entries are only
/// removed when a read finds them; there is no background sweep.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
    /// How long an entry is served after it was written
    ttl: Duration,
    /// Time source for stamping and aging entries
    clock: Arc<dyn Clock>,
}

impl CacheManager {
    /// Creates a CacheManager from configuration
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_dir(config.dir.clone(), config.ttl)
    }

    /// Creates a CacheManager with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf, ttl: Duration) -> Self {
        Self {
            cache_dir,
            ttl,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Directory where cache files are stored
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the path to a cache file for the given key
    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    /// Reads a fresh entry for `resource` and `params`
    ///
    /// Returns `None` when the entry is missing, unreadable, of the wrong
    /// shape, or expired. An expired entry is deleted before returning.
    pub async fn get<T, I, K, V>(&self, resource: &str, params: I) -> Option<T>
    where
        T: DeserializeOwned,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let key = cache_key(resource, params);
        let path = self.cache_path(&key);

        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(key = %key, "cache miss");
                return None;
            }
            Err(e) => {
                warn!(key = %key, error = %e, "failed to read cache entry");
                return None;
            }
        };

        let entry: CacheEntry<serde_json::Value> = match serde_json::from_slice(&content) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = %key, error = %e, "ignoring corrupt cache entry");
                return None;
            }
        };

        if self.is_expired(entry.timestamp) {
            debug!(key = %key, "cache expired");
            self.remove(&path).await;
            return None;
        }

        match serde_json::from_value(entry.data) {
            Ok(data) => {
                debug!(key = %key, "cache hit");
                Some(data)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "cache entry has unexpected shape");
                None
            }
        }
    }

    /// Writes `data` for `resource` and `params`, replacing any previous entry
    ///
    /// Failures are logged and otherwise ignored.
    pub async fn set<T, I, K, V>(&self, resource: &str, params: I, data: &T)
    where
        T: Serialize + ?Sized,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let key = cache_key(resource, params);
        match self.write_entry(&key, data).await {
            Ok(()) => debug!(key = %key, "cache set"),
            Err(e) => warn!(key = %key, error = %e, "failed to write cache"),
        }
    }

    /// Deletes every cache entry and returns how many were removed
    pub async fn clear_all(&self) -> usize {
        let mut dir = match fs::read_dir(&self.cache_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return 0,
            Err(e) => {
                warn!(dir = %self.cache_dir.display(), error = %e, "failed to list cache");
                return 0;
            }
        };

        let mut removed = 0;
        loop {
            let entry = match dir.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "failed to list cache");
                    break;
                }
            };

            let path = entry.path();
            match path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => {}
                Some("tmp") => {
                    self.remove_orphaned_temp(&path).await;
                    continue;
                }
                _ => continue,
            }

            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                // Already reaped by a concurrent read
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "failed to remove cache file"),
            }
        }

        debug!(count = removed, "cleared cache");
        removed
    }

    /// Whether an entry stamped at `timestamp` is past its TTL
    fn is_expired(&self, timestamp: i64) -> bool {
        let age_ms = self.clock.now().timestamp_millis().saturating_sub(timestamp);
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        age_ms >= ttl_ms
    }

    /// Serializes and stores an entry via a temp file and rename
    async fn write_entry<T: Serialize + ?Sized>(
        &self,
        key: &str,
        data: &T,
    ) -> std::io::Result<()> {
        let entry = CacheEntry {
            timestamp: self.clock.now().timestamp_millis(),
            data,
        };
        let json = serde_json::to_vec_pretty(&entry)
            .map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e))?;

        fs::create_dir_all(&self.cache_dir).await?;

        let tmp = self.cache_dir.join(format!(
            ".{}.{}.{}.tmp",
            key,
            std::process::id(),
            WRITE_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&tmp, json).await?;
        if let Err(e) = fs::rename(&tmp, self.cache_path(key)).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e);
        }
        Ok(())
    }

    /// Removes a temp file left behind by a process that died mid-write
    ///
    /// Temp files written by this process belong to an in-flight `set` and
    /// are left alone. Removals are not counted as cleared entries.
    async fn remove_orphaned_temp(&self, path: &Path) {
        let name = path.file_name().and_then(|name| name.to_str()).unwrap_or_default();
        if temp_file_pid(name) == Some(std::process::id()) {
            return;
        }
        if let Err(e) = fs::remove_file(path).await {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "failed to remove stale temp file");
            }
        }
    }

    /// Removes a file, tolerating it already being gone
    async fn remove(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path).await {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "failed to remove expired cache file");
            }
        }
    }
}

/// Writer pid encoded in a `.<key>.<pid>.<seq>.tmp` name
fn temp_file_pid(name: &str) -> Option<u32> {
    let stem = name.strip_prefix('.')?.strip_suffix(".tmp")?;
    let mut parts = stem.rsplitn(3, '.');
    let _seq = parts.next()?;
    parts.next()?.parse().ok()
}
