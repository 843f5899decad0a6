//! Mirror endpoints for the known-account list.

use crate::models::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Default mirrors, tried in order.
pub const DEFAULT_MIRRORS: [&str; 4] = [
    "https://api.vtbs.moe/v1/short",
    "https://cfapi.vtbs.moe/v1/short",
    "https://hkapi.vtbs.moe/v1/short",
    "https://kr.vtbs.moe/v1/short",
];

/// Per-mirror timeout.
pub const DEFAULT_MIRROR_TIMEOUT: Duration = Duration::from_secs(20);

/// Fetches the raw JSON body of a mirror.
///
/// Implementations report failures as `RegistryError::Mirror` or
/// `RegistryError::Timeout`. The store applies its own timeout around each
/// call as well.
#[async_trait]
pub trait MirrorSource: Send + Sync {
    /// GETs `url` and parses the body as JSON.
    async fn fetch_mirror(&self, url: &str, timeout: Duration) -> Result<Value>;
}

/// Owned copy of [`DEFAULT_MIRRORS`].
pub fn default_mirrors() -> Vec<String> {
    DEFAULT_MIRRORS.iter().map(|s| s.to_string()).collect()
}
