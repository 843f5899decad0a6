//! # Signing Keys
//!
//! The navigation endpoint advertises two image URLs, e.g.
//! `https://i0.hdslb.com/bfs/wbi/7cd084941338484aae1ad9425b84077c.png`.
//! The file stems of those URLs are the `img_key` and `sub_key` used for
//! signing. The two keys are concatenated and permuted through
//! [`MIXIN_KEY_ENC_TAB`] to produce the mixed secret that salts every digest.
//!
//! ## Invariants
//!
//! - Both keys are non-empty once a [`SigningKeyPair`] exists.
//! - The pair is immutable; a refresh builds a new pair.
//! - The permutation table is a protocol constant.

use crate::error::{Result, WbiError};
use std::time::Duration;
use tokio::time::Instant;

/// Position table used to derive the mixed secret.
///
/// Each entry selects one character of `img_key + sub_key`. The secret is
/// therefore always 64 characters long.
pub const MIXIN_KEY_ENC_TAB: [usize; 64] = [
    46, 47, 18, 2, 53, 8, 23, 32, 15, 50, 10, 31, 58, 3, 45, 35, 27, 43, 5, 49, 33, 9, 42, 19, 29,
    28, 14, 36, 17, 20, 34, 44, 57, 16, 26, 56, 1, 40, 52, 37, 55, 11, 41, 4, 22, 24, 21, 25, 54,
    59, 7, 60, 6, 61, 51, 62, 2, 53, 8, 23, 32, 15, 50, 10,
];

/// Smallest `img_key + sub_key` length the table can index into.
const MIN_COMBINED_LEN: usize = 63;

/// A pair of WBI signing keys and the moment they were fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningKeyPair {
    image_key: String,
    sub_key: String,
    fetched_at: Instant,
}

impl SigningKeyPair {
    /// Builds a pair stamped with the current instant.
    ///
    /// # Errors
    ///
    /// Returns [`WbiError::InvalidKeys`] if either key is empty.
    pub fn new(image_key: impl Into<String>, sub_key: impl Into<String>) -> Result<Self> {
        Self::fetched_at(image_key, sub_key, Instant::now())
    }

    /// Builds a pair with an explicit fetch instant.
    ///
    /// # Errors
    ///
    /// Returns [`WbiError::InvalidKeys`] if either key is empty.
    pub fn fetched_at(
        image_key: impl Into<String>,
        sub_key: impl Into<String>,
        fetched_at: Instant,
    ) -> Result<Self> {
        let image_key = image_key.into();
        let sub_key = sub_key.into();

        if image_key.is_empty() {
            return Err(WbiError::InvalidKeys("img_key is empty".to_string()));
        }
        if sub_key.is_empty() {
            return Err(WbiError::InvalidKeys("sub_key is empty".to_string()));
        }

        Ok(Self {
            image_key,
            sub_key,
            fetched_at,
        })
    }

    /// Derives a pair from the two `wbi_img` URLs of the navigation payload.
    ///
    /// # Errors
    ///
    /// Returns [`WbiError::InvalidKeys`] if a URL has no usable file stem.
    pub fn from_urls(img_url: &str, sub_url: &str) -> Result<Self> {
        Self::new(key_from_url(img_url)?, key_from_url(sub_url)?)
    }

    /// The key taken from `img_url`.
    pub fn image_key(&self) -> &str {
        &self.image_key
    }

    /// The key taken from `sub_url`.
    pub fn sub_key(&self) -> &str {
        &self.sub_key
    }

    /// When the pair was fetched.
    pub fn fetch_instant(&self) -> Instant {
        self.fetched_at
    }

    /// Time elapsed since the pair was fetched.
    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.fetched_at)
    }

    /// Returns true once the pair is at least `ttl` old.
    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.age() >= ttl
    }

    /// The mixed secret for this pair.
    ///
    /// # Errors
    ///
    /// Returns [`WbiError::InvalidKeys`] if the keys are too short.
    pub fn mixin_key(&self) -> Result<String> {
        mixin_key(&self.image_key, &self.sub_key)
    }
}

/// Extracts a key from a `wbi_img` URL: last path segment, up to the first `.`.
///
/// # Errors
///
/// Returns [`WbiError::InvalidKeys`] if the resulting stem is empty.
///
/// # Example
///
/// ```rust
/// use ddcheck_wbi::key_from_url;
///
/// let key = key_from_url("https://i0.hdslb.com/bfs/wbi/7cd084941338484aae1ad9425b84077c.png").unwrap();
/// assert_eq!(key, "7cd084941338484aae1ad9425b84077c");
/// ```
pub fn key_from_url(url: &str) -> Result<String> {
    let file_name = url.rsplit('/').next().unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or_default();

    if stem.is_empty() {
        return Err(WbiError::InvalidKeys(format!(
            "no key stem in url '{}'",
            url
        )));
    }

    Ok(stem.to_string())
}

/// Permutes `img_key + sub_key` through [`MIXIN_KEY_ENC_TAB`].
///
/// # Errors
///
/// Returns [`WbiError::InvalidKeys`] when the concatenation has fewer than
/// 63 characters.
///
/// # Example
///
/// ```rust
/// use ddcheck_wbi::mixin_key;
///
/// let secret = mixin_key(
///     "7cd084941338484aae1ad9425b84077c",
///     "4932caff0ff746eab6f01bf08b70ac45",
/// ).unwrap();
/// assert_eq!(secret.len(), 64);
/// assert!(secret.starts_with("ea1db124af3c7062474693fa704"));
/// ```
pub fn mixin_key(image_key: &str, sub_key: &str) -> Result<String> {
    let combined: Vec<char> = image_key.chars().chain(sub_key.chars()).collect();

    if combined.len() < MIN_COMBINED_LEN {
        return Err(WbiError::InvalidKeys(format!(
            "combined key length {} is below {}",
            combined.len(),
            MIN_COMBINED_LEN
        )));
    }

    Ok(MIXIN_KEY_ENC_TAB.iter().map(|&pos| combined[pos]).collect())
}
