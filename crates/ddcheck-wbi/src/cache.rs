//! # Signing-Key Cache
//!
//! Holds the current [`SigningKeyPair`] and refreshes it from a
//! [`KeySource`] when it is older than the TTL.
//!
//! ## Concurrency
//!
//! | Path | Lock | Network |
//! |------|------|---------|
//! | Fresh pair | read lock on the pair | none |
//! | Stale pair | refresh mutex, then write lock for the swap | one call |
//!
//! Callers that find the pair stale queue on the refresh mutex and re-check
//! freshness after acquiring it, so a burst of callers at expiry produces a
//! single fetch. The pair is swapped in whole; readers never observe a
//! half-updated pair. A failed refresh leaves the previous pair in place.

use crate::error::{Result, WbiError};
use crate::keys::SigningKeyPair;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info};

/// How long a fetched key pair stays valid.
pub const DEFAULT_KEY_TTL: Duration = Duration::from_secs(1800);

/// The two image URLs advertised by the navigation endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WbiUrls {
    /// `data.wbi_img.img_url`
    pub img_url: String,
    /// `data.wbi_img.sub_url`
    pub sub_url: String,
}

/// Where fresh key URLs come from.
///
/// The production implementation calls the navigation endpoint; tests use
/// in-memory fakes.
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Fetches the current `wbi_img` URLs.
    ///
    /// # Errors
    ///
    /// Implementations return [`WbiError::KeyRefresh`] on any network or
    /// payload failure.
    async fn fetch_wbi_urls(&self) -> Result<WbiUrls>;
}

/// TTL cache for the WBI signing keys.
///
/// Owned by the composition root and shared by reference (or `Arc`) with
/// every component that signs requests.
pub struct SignatureKeyCache {
    source: Arc<dyn KeySource>,
    ttl: Duration,
    current: RwLock<Option<SigningKeyPair>>,
    refresh: Mutex<()>,
}

impl SignatureKeyCache {
    /// Creates an empty cache with [`DEFAULT_KEY_TTL`].
    pub fn new(source: Arc<dyn KeySource>) -> Self {
        Self::with_ttl(source, DEFAULT_KEY_TTL)
    }

    /// Creates an empty cache with a custom TTL.
    pub fn with_ttl(source: Arc<dyn KeySource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            current: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// The configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a key pair younger than the TTL, fetching one if needed.
    ///
    /// # Errors
    ///
    /// Returns [`WbiError::KeyRefresh`] when the source fails or returns
    /// URLs without usable keys. The previously cached pair is kept.
    pub async fn ensure_fresh(&self) -> Result<SigningKeyPair> {
        if let Some(pair) = self.fresh_pair().await {
            return Ok(pair);
        }

        let _guard = self.refresh.lock().await;

        // Another caller may have refreshed while we waited.
        if let Some(pair) = self.fresh_pair().await {
            debug!("WBI keys refreshed by a concurrent caller");
            return Ok(pair);
        }

        let pair = match self.fetch_pair().await {
            Ok(pair) => pair,
            Err(e) => {
                error!("Failed to refresh WBI keys: {}", e);
                return Err(e);
            }
        };

        *self.current.write().await = Some(pair.clone());
        info!("WBI signing keys refreshed");

        Ok(pair)
    }

    /// Drops the cached pair so the next [`ensure_fresh`](Self::ensure_fresh)
    /// fetches a new one.
    pub async fn invalidate(&self) {
        *self.current.write().await = None;
        debug!("WBI signing keys invalidated");
    }

    /// The cached pair, stale or not.
    pub async fn cached(&self) -> Option<SigningKeyPair> {
        self.current.read().await.clone()
    }

    async fn fresh_pair(&self) -> Option<SigningKeyPair> {
        self.current
            .read()
            .await
            .as_ref()
            .filter(|pair| !pair.is_stale(self.ttl))
            .cloned()
    }

    async fn fetch_pair(&self) -> Result<SigningKeyPair> {
        let urls = self.source.fetch_wbi_urls().await?;
        SigningKeyPair::from_urls(&urls.img_url, &urls.sub_url)
            .map_err(|e| WbiError::KeyRefresh(e.to_string()))
    }
}

impl std::fmt::Debug for SignatureKeyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureKeyCache")
            .field("ttl", &self.ttl)
            .finish()
    }
}
