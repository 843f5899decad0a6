//! The Bilibili API client.
//!
//! [`BiliClient`] owns no global state: the transport, the key cache and the
//! timeouts are all injected by the caller.

use crate::api::{BadgeEntry, CardData, Envelope, MedalWallData, NavData, SearchData, UserCard};
use crate::endpoints::{
    CARD_URL, DEFAULT_FOLLOW_TIMEOUT, DEFAULT_INFO_TIMEOUT, DEFAULT_PAGE_SIZE, MEDAL_WALL_URL,
    NAV_URL, SEARCH_URL,
};
use crate::error::{ClientError, Result};
use crate::transport::{ApiRequest, Transport};
use async_trait::async_trait;
use ddcheck_registry::{MirrorSource, RegistryError};
use ddcheck_wbi::{sign, KeySource, Params, SignatureKeyCache, WbiError, WbiUrls};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Timeouts and paging for [`BiliClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Timeout for search, card and medal requests.
    pub info_timeout: Duration,
    /// Timeout for each follow-list page.
    pub follow_timeout: Duration,
    /// Follow-list page size. A shorter page ends pagination.
    pub page_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            info_timeout: DEFAULT_INFO_TIMEOUT,
            follow_timeout: DEFAULT_FOLLOW_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Client for the endpoints a lookup needs.
pub struct BiliClient {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) keys: Arc<SignatureKeyCache>,
    pub(crate) config: ClientConfig,
}

impl BiliClient {
    /// Creates a client.
    pub fn new(
        transport: Arc<dyn Transport>,
        keys: Arc<SignatureKeyCache>,
        config: ClientConfig,
    ) -> Self {
        Self {
            transport,
            keys,
            config,
        }
    }

    /// The signing-key cache shared with this client.
    pub fn keys(&self) -> &Arc<SignatureKeyCache> {
        &self.keys
    }

    /// The client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolves a display name to an account id via signed user search.
    ///
    /// Only an exact `uname` match counts.
    ///
    /// # Errors
    ///
    /// - [`ClientError::IdentityNotFound`] when no hit matches exactly
    /// - [`ClientError::Wbi`] when keys cannot be obtained
    /// - [`ClientError::UpstreamRejected`] for a non-zero upstream code
    /// - transport errors
    pub async fn uid_by_name(&self, name: &str) -> Result<u64> {
        let keys = self.keys.ensure_fresh().await?;

        let mut params = Params::new();
        params.insert("search_type".to_string(), "bili_user".to_string());
        params.insert("keyword".to_string(), name.to_string());
        let signed = sign(params, &keys)?;

        let request = ApiRequest::get(SEARCH_URL, self.config.info_timeout)
            .signed(&signed)
            .with_credentials();

        let data: SearchData = self.fetch_data(&request, "search").await?;
        let hit = data
            .result
            .unwrap_or_default()
            .into_iter()
            .find(|user| user.uname == name);

        match hit {
            Some(user) => {
                debug!("Resolved '{}' to uid {}", name, user.mid);
                Ok(user.mid)
            }
            None => {
                warn!("Search for user '{}' succeeded but found no exact match", name);
                Err(ClientError::IdentityNotFound(name.to_string()))
            }
        }
    }

    /// Fetches the profile card of `uid`. Sent without cookies.
    ///
    /// # Errors
    ///
    /// Transport errors, [`ClientError::UpstreamRejected`] or
    /// [`ClientError::UnexpectedShape`].
    pub async fn user_card(&self, uid: u64) -> Result<UserCard> {
        let request = ApiRequest::get(CARD_URL, self.config.info_timeout)
            .params(&[("mid", uid.to_string())]);

        let data: CardData = self.fetch_data(&request, "card").await?;
        Ok(data.card)
    }

    /// Fetches the fan medals held by `uid`.
    ///
    /// An empty or missing wall is an empty list.
    ///
    /// # Errors
    ///
    /// Transport errors, [`ClientError::UpstreamRejected`] or
    /// [`ClientError::UnexpectedShape`].
    pub async fn medal_wall(&self, uid: u64) -> Result<Vec<BadgeEntry>> {
        let request = ApiRequest::get(MEDAL_WALL_URL, self.config.info_timeout)
            .params(&[("target_id", uid.to_string())])
            .with_credentials();

        let body = self.transport.get_json(&request).await?;
        let envelope = Envelope::<MedalWallData>::parse("medal wall", body)?;
        if envelope.code != 0 {
            return Err(ClientError::UpstreamRejected {
                code: envelope.code,
                message: envelope.message,
            });
        }

        Ok(envelope
            .data
            .and_then(|data| data.list)
            .unwrap_or_default()
            .into_iter()
            .map(BadgeEntry::from)
            .collect())
    }

    /// GETs `request` and unwraps the envelope's `data`.
    pub(crate) async fn fetch_data<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        endpoint: &str,
    ) -> Result<T> {
        let body = self.transport.get_json(request).await?;
        Envelope::<T>::parse(endpoint, body)?.into_data(endpoint)
    }
}

impl std::fmt::Debug for BiliClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiliClient")
            .field("config", &self.config)
            .finish()
    }
}

/// [`KeySource`] backed by the navigation endpoint.
pub struct NavKeySource {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl NavKeySource {
    /// Creates a key source with the default 10s timeout.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_timeout(transport, DEFAULT_INFO_TIMEOUT)
    }

    /// Creates a key source with a custom timeout.
    pub fn with_timeout(transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }
}

#[async_trait]
impl KeySource for NavKeySource {
    async fn fetch_wbi_urls(&self) -> ddcheck_wbi::Result<WbiUrls> {
        let request = ApiRequest::get(NAV_URL, self.timeout).with_credentials();

        let body = self
            .transport
            .get_json(&request)
            .await
            .map_err(|e| WbiError::KeyRefresh(e.to_string()))?;

        // Logged-out sessions get code -101 but still receive wbi_img.
        let envelope = Envelope::<NavData>::parse("nav", body)
            .map_err(|e| WbiError::KeyRefresh(e.to_string()))?;
        let data = envelope.data.ok_or_else(|| {
            WbiError::KeyRefresh(format!(
                "nav returned no data (code {}: {})",
                envelope.code, envelope.message
            ))
        })?;

        Ok(WbiUrls {
            img_url: data.wbi_img.img_url,
            sub_url: data.wbi_img.sub_url,
        })
    }
}

/// [`MirrorSource`] backed by a [`Transport`]. Sent without cookies.
pub struct TransportMirrorSource {
    transport: Arc<dyn Transport>,
}

impl TransportMirrorSource {
    /// Wraps a transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl MirrorSource for TransportMirrorSource {
    async fn fetch_mirror(&self, url: &str, timeout: Duration) -> ddcheck_registry::Result<Value> {
        let request = ApiRequest::get(url, timeout);
        self.transport.get_json(&request).await.map_err(|e| match e {
            ClientError::Timeout(_) => RegistryError::Timeout(url.to_string()),
            other => {
                error!("Mirror request to {} failed: {}", url, other);
                RegistryError::Mirror {
                    url: url.to_string(),
                    reason: other.to_string(),
                }
            }
        })
    }
}
