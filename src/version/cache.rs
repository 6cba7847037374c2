//! JSON file cache for upstream lookups
//!
//! The file holds two maps, `images` and `charts`, keyed by
//! `"<registry-or-upstream>/<name>"`. Entries older than the TTL are ignored
//! on read but stay in the file until overwritten.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::version::checker::LookupStore;
use crate::version::error::CacheError;

/// The two independent key spaces of the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Images,
    Charts,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Images => "images",
            Namespace::Charts => "charts",
        }
    }
}

/// A cached lookup result returned by [`LookupStore::get`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachedLookup {
    pub latest: String,
    pub all_tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    latest: String,
    checked_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    all_tags: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheData {
    #[serde(default)]
    images: BTreeMap<String, CacheEntry>,
    #[serde(default)]
    charts: BTreeMap<String, CacheEntry>,
}

impl CacheData {
    fn namespace(&self, namespace: Namespace) -> &BTreeMap<String, CacheEntry> {
        match namespace {
            Namespace::Images => &self.images,
            Namespace::Charts => &self.charts,
        }
    }

    fn namespace_mut(&mut self, namespace: Namespace) -> &mut BTreeMap<String, CacheEntry> {
        match namespace {
            Namespace::Images => &mut self.images,
            Namespace::Charts => &mut self.charts,
        }
    }
}

pub struct Cache {
    /// `None` when the cache is fully disabled
    path: Option<PathBuf>,
    ttl: TimeDelta,
    skip_reads: bool,
    data: Mutex<CacheData>,
}

impl Cache {
    /// Creates an empty cache backed by `path`
    ///
    /// With `skip_reads`, every lookup misses but fresh results are still
    /// written, so a forced refresh repopulates the file.
    pub fn new(path: impl Into<PathBuf>, ttl_secs: i64, skip_reads: bool) -> Self {
        Self {
            path: Some(path.into()),
            ttl: TimeDelta::seconds(ttl_secs),
            skip_reads,
            data: Mutex::new(CacheData::default()),
        }
    }

    /// Creates a cache that never touches the filesystem
    pub fn disabled() -> Self {
        Self {
            path: None,
            ttl: TimeDelta::zero(),
            skip_reads: true,
            data: Mutex::new(CacheData::default()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Acquire data lock with proper error handling
    fn lock_data(&self) -> Result<MutexGuard<'_, CacheData>, CacheError> {
        self.data.lock().map_err(|_| CacheError::LockPoisoned)
    }

    /// Reads the cache file; a missing file leaves the cache empty
    pub fn load(&self) -> Result<(), CacheError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No cache file at {:?}", path);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let data: CacheData = serde_json::from_str(&content)?;
        info!(
            "Loaded cache from {:?} ({} images, {} charts)",
            path,
            data.images.len(),
            data.charts.len()
        );
        *self.lock_data()? = data;
        Ok(())
    }

    /// Writes the full in-memory state to the cache file
    pub fn save(&self) -> Result<(), CacheError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let content = {
            let data = self.lock_data()?;
            serde_json::to_string_pretty(&*data)?
        };
        fs::write(path, content)?;
        debug!("Saved cache to {:?}", path);
        Ok(())
    }
}

impl LookupStore for Cache {
    fn get(&self, namespace: Namespace, key: &str) -> Result<Option<CachedLookup>, CacheError> {
        if self.skip_reads {
            return Ok(None);
        }

        let data = self.lock_data()?;
        let Some(entry) = data.namespace(namespace).get(key) else {
            return Ok(None);
        };

        if Utc::now() - entry.checked_at > self.ttl {
            debug!("Cache entry {}/{} expired", namespace.as_str(), key);
            return Ok(None);
        }

        Ok(Some(CachedLookup {
            latest: entry.latest.clone(),
            all_tags: entry.all_tags.clone(),
        }))
    }

    fn set(
        &self,
        namespace: Namespace,
        key: &str,
        latest: &str,
        all_tags: Vec<String>,
    ) -> Result<(), CacheError> {
        let mut data = self.lock_data()?;
        data.namespace_mut(namespace).insert(
            key.to_string(),
            CacheEntry {
                latest: latest.to_string(),
                checked_at: Utc::now(),
                all_tags,
            },
        );
        Ok(())
    }
}
