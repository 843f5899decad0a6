//! The lookup facade.
//!
//! [`DdCheck`] wires the transport, the signing-key cache, the API client and
//! the registry store together and runs a complete check for one account.

use crate::{
    config::DdCheckConfig,
    error::DdCheckError,
    report::{build_report, ReportPayload},
    Result,
};

use ddcheck_client::{
    BiliClient, Credentials, NavKeySource, ReqwestTransport, Transport, TransportMirrorSource,
};
use ddcheck_registry::{RegistryError, RegistryStore, Storage};
use ddcheck_wbi::{SignatureKeyCache, SigningKeyPair};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

/// Follow-list checker.
///
/// One instance owns one key cache and one registry store and can serve any
/// number of concurrent lookups.
///
/// # Pipeline
///
/// 1. Resolve the target: a numeric string is taken as the account id,
///    anything else goes through signed user search (exact name match).
/// 2. Fetch the profile card. Failure ends the lookup.
/// 3. Fetch the full follow-list. Failure degrades to an empty list.
/// 4. Read the registry, fetching it once if nothing is cached.
/// 5. Fetch the medal wall. Failure degrades to no medals.
/// 6. Aggregate into a [`ReportPayload`].
///
/// # Example
///
/// ```rust,ignore
/// let ddcheck = DdCheck::new(DdCheckConfig::load("ddcheck.toml")?)?;
/// let report = ddcheck.check("嘉然今天吃什么").await?;
/// println!("{}", report.summary());
/// ```
pub struct DdCheck {
    /// Configuration.
    config: DdCheckConfig,

    /// API client; owns the key cache.
    client: BiliClient,

    /// Known-account registry.
    registry: Arc<RegistryStore>,
}

impl DdCheck {
    /// Create a checker that talks to the live API.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration is invalid
    /// - The HTTP client cannot be built from the configured headers
    pub fn new(config: DdCheckConfig) -> Result<Self> {
        config.validate()?;

        let credentials = Credentials::from_cookie_string(&config.api.cookie);
        if credentials.is_empty() {
            warn!("No session cookie configured; signed endpoints may reject requests");
        }
        let transport =
            ReqwestTransport::with_headers(credentials, &config.api.user_agent, &config.api.referer)?;

        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a checker over an arbitrary transport.
    pub fn with_transport(config: DdCheckConfig, transport: Arc<dyn Transport>) -> Self {
        let client_config = config.api.client_config();

        let key_source = NavKeySource::with_timeout(transport.clone(), client_config.info_timeout);
        let keys = Arc::new(SignatureKeyCache::new(Arc::new(key_source)));
        let client = BiliClient::new(transport.clone(), keys, client_config);

        let registry = RegistryStore::new(
            Storage::in_dir(&config.registry.cache_dir),
            Arc::new(TransportMirrorSource::new(transport)),
            config.registry.mirrors.clone(),
        )
        .with_mirror_timeout(config.registry.mirror_timeout());

        info!(
            "ddcheck initialized with {} mirrors, cache at {}",
            config.registry.mirrors.len(),
            config.registry.cache_dir.display()
        );

        Self {
            config,
            client,
            registry: Arc::new(registry),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &DdCheckConfig {
        &self.config
    }

    /// The API client.
    pub fn client(&self) -> &BiliClient {
        &self.client
    }

    /// The registry store, shareable with a background refresh task.
    pub fn registry(&self) -> &Arc<RegistryStore> {
        &self.registry
    }

    /// Runs a check for `target`, an account id or an exact display name.
    ///
    /// # Errors
    ///
    /// - [`DdCheckError::IdentityNotFound`] if the name has no exact match
    /// - [`DdCheckError::KeyRefresh`] if signing keys cannot be obtained
    /// - [`DdCheckError::UpstreamRejected`] / [`DdCheckError::Client`] if the
    ///   profile card cannot be fetched
    /// - [`DdCheckError::Unavailable`] if no registry could be obtained
    pub async fn check(&self, target: &str) -> Result<ReportPayload> {
        let uid = self.resolve_uid(target).await?;
        debug!("Checking uid {}", uid);

        let card = self.client.user_card(uid).await?;
        let follow_list = self.client.fetch_all(uid).await;

        let registry = self.registry.get_or_refresh().await;
        if registry.is_empty() {
            return Err(DdCheckError::Unavailable(
                "registry is empty and no mirror answered".to_string(),
            ));
        }

        let badges = match self.client.medal_wall(uid).await {
            Ok(badges) => badges,
            Err(e) => {
                warn!("Failed to get medal wall of {}: {}", uid, e);
                Vec::new()
            }
        };

        let report = build_report(&card, &follow_list, &registry, &badges);
        info!(
            "Checked {} ({}): {}",
            report.name, report.uid, report.percent_label
        );
        Ok(report)
    }

    /// Turns a target into an account id.
    ///
    /// # Errors
    ///
    /// Same as [`BiliClient::uid_by_name`], mapped into [`DdCheckError`].
    pub async fn resolve_uid(&self, target: &str) -> Result<u64> {
        let target = target.trim();
        if target.is_empty() {
            return Err(DdCheckError::IdentityNotFound(String::new()));
        }
        if target.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(uid) = target.parse::<u64>() {
                return Ok(uid);
            }
        }
        Ok(self.client.uid_by_name(target).await?)
    }

    /// Refreshes the registry from the mirrors.
    ///
    /// # Errors
    ///
    /// - [`DdCheckError::Unavailable`] if every mirror failed
    /// - [`DdCheckError::Registry`] if the result could not be persisted
    pub async fn refresh_registry(&self) -> Result<usize> {
        self.registry.refresh().await.map_err(|e| match e {
            err @ RegistryError::Unavailable(_) => DdCheckError::Unavailable(err.to_string()),
            other => DdCheckError::Registry(other),
        })
    }

    /// Current signing keys, refreshed if stale.
    ///
    /// # Errors
    ///
    /// Returns [`DdCheckError::KeyRefresh`] if the keys cannot be fetched.
    pub async fn signing_keys(&self) -> Result<SigningKeyPair> {
        self.client
            .keys()
            .ensure_fresh()
            .await
            .map_err(|e| DdCheckError::KeyRefresh(e.to_string()))
    }

    /// Registry refresh interval from the configuration.
    pub fn refresh_interval(&self) -> Duration {
        self.config.registry.refresh_interval()
    }
}

impl std::fmt::Debug for DdCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DdCheck")
            .field("client", &self.client)
            .field("registry", &self.registry)
            .finish()
    }
}
