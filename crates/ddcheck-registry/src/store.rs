//! # Registry Store - Main Facade
//!
//! Coordinates the persisted file, the in-memory snapshot and the mirror
//! list.
//!
//! ## Refresh Policy
//!
//! 1. Try each mirror in order, each bounded by the mirror timeout.
//! 2. The first mirror that yields at least one entry wins; the rest are not
//!    contacted.
//! 3. The winning entries replace the snapshot and the persisted file.
//! 4. If every mirror fails, nothing changes. A good registry is never
//!    replaced by an empty one.
//!
//! ## Reads
//!
//! [`RegistryStore::snapshot`] hands out an `Arc` to the current list. A
//! refresh only holds the write lock for the pointer swap, so lookups never
//! wait on mirror I/O and may observe a slightly stale registry.
//!
//! ## Concurrency
//!
//! Refreshes are serialized by a separate mutex. Callers of
//! [`RegistryStore::get_or_refresh`] that find an empty snapshot queue on
//! it and re-check the snapshot once inside, so a burst of lookups on an
//! empty store contacts the mirrors once.

use crate::mirror::{MirrorSource, DEFAULT_MIRROR_TIMEOUT};
use crate::models::{normalize_payload, RegistryEntry, RegistryError, Result};
use crate::storage::Storage;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

/// The known-account registry.
pub struct RegistryStore {
    storage: Storage,
    source: Arc<dyn MirrorSource>,
    mirrors: Vec<String>,
    mirror_timeout: Duration,
    snapshot: RwLock<Arc<Vec<RegistryEntry>>>,
    refresh_lock: Mutex<()>,
}

impl RegistryStore {
    /// Creates a store with an empty snapshot.
    ///
    /// Call [`load`](Self::load) to populate it from disk.
    pub fn new(storage: Storage, source: Arc<dyn MirrorSource>, mirrors: Vec<String>) -> Self {
        Self {
            storage,
            source,
            mirrors,
            mirror_timeout: DEFAULT_MIRROR_TIMEOUT,
            snapshot: RwLock::new(Arc::new(Vec::new())),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Overrides the per-mirror timeout.
    pub fn with_mirror_timeout(mut self, timeout: Duration) -> Self {
        self.mirror_timeout = timeout;
        self
    }

    /// The configured mirrors, in try order.
    pub fn mirrors(&self) -> &[String] {
        &self.mirrors
    }

    /// The backing storage.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// The current in-memory registry.
    pub async fn snapshot(&self) -> Arc<Vec<RegistryEntry>> {
        self.snapshot.read().await.clone()
    }

    /// Reads the persisted registry and makes it the current snapshot.
    ///
    /// Never fails. A missing or corrupted file yields an empty registry.
    /// Any other read failure is logged and the current snapshot is kept
    /// and returned.
    pub async fn load(&self) -> Arc<Vec<RegistryEntry>> {
        let storage = self.storage.clone();
        let loaded = match tokio::task::spawn_blocking(move || storage.load()).await {
            Ok(Ok(entries)) => Arc::new(entries),
            Ok(Err(e)) => {
                warn!("Failed to read registry file, keeping current registry: {}", e);
                return self.snapshot().await;
            }
            Err(e) => {
                error!("Registry load task failed: {}", e);
                return self.snapshot().await;
            }
        };

        *self.snapshot.write().await = loaded.clone();
        loaded
    }

    /// Refreshes the registry from the first working mirror.
    ///
    /// Returns the number of entries now in the registry.
    ///
    /// # Errors
    ///
    /// - `RegistryError::Unavailable` if every mirror failed. The previous
    ///   snapshot and file are untouched.
    /// - `RegistryError::Io` / `Serialization` if the new registry was
    ///   fetched and swapped in but could not be persisted.
    pub async fn refresh(&self) -> Result<usize> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Returns the registry, fetching it once if nothing is cached.
    ///
    /// Order of preference: current snapshot, persisted file, mirrors. A
    /// failed refresh yields whatever was available (possibly empty).
    pub async fn get_or_refresh(&self) -> Arc<Vec<RegistryEntry>> {
        let current = self.snapshot().await;
        if !current.is_empty() {
            return current;
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have filled the snapshot while we waited.
        let current = self.snapshot().await;
        if !current.is_empty() {
            return current;
        }

        let loaded = self.load().await;
        if !loaded.is_empty() {
            return loaded;
        }

        if let Err(e) = self.refresh_locked().await {
            debug!("Initial registry refresh failed: {}", e);
        }
        self.snapshot().await
    }

    async fn refresh_locked(&self) -> Result<usize> {
        for url in &self.mirrors {
            let entries = match self.try_mirror(url).await {
                Ok(entries) => entries,
                Err(RegistryError::Timeout(url)) => {
                    warn!("Get {} timeout", url);
                    continue;
                }
                Err(e) => {
                    error!("Error when getting {}, ignore: {}", url, e);
                    continue;
                }
            };

            let count = entries.len();
            let entries = Arc::new(entries);
            *self.snapshot.write().await = entries.clone();
            info!("Registry refreshed from {} with {} entries", url, count);

            self.persist(entries).await?;
            return Ok(count);
        }

        let err = RegistryError::Unavailable(self.mirrors.len());
        warn!("{}, keeping previous registry", err);
        Err(err)
    }

    async fn try_mirror(&self, url: &str) -> Result<Vec<RegistryEntry>> {
        let payload = tokio::time::timeout(
            self.mirror_timeout,
            self.source.fetch_mirror(url, self.mirror_timeout),
        )
        .await
        .map_err(|_| RegistryError::Timeout(url.to_string()))??;

        let entries = normalize_payload(&payload)?;
        if entries.is_empty() {
            return Err(RegistryError::UnexpectedShape(
                "mirror returned no usable entries".to_string(),
            ));
        }
        Ok(entries)
    }

    async fn persist(&self, entries: Arc<Vec<RegistryEntry>>) -> Result<()> {
        let storage = self.storage.clone();
        let result = tokio::task::spawn_blocking(move || storage.store(&entries))
            .await
            .map_err(|e| RegistryError::Io(std::io::Error::other(e.to_string())))?;

        if let Err(e) = &result {
            error!("Failed to persist registry: {}", e);
        }
        result
    }
}

impl std::fmt::Debug for RegistryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryStore")
            .field("path", &self.storage.path())
            .field("mirrors", &self.mirrors.len())
            .finish()
    }
}
