//! Configuration types for ddcheck.

use crate::error::DdCheckError;
use crate::Result;
use ddcheck_client::endpoints::{REFERER, USER_AGENT};
use ddcheck_client::ClientConfig;
use ddcheck_registry::default_mirrors;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for the ddcheck facade.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DdCheckConfig {
    /// Upstream API configuration.
    pub api: ApiConfig,

    /// Registry configuration.
    pub registry: RegistryConfig,
}

/// Upstream API configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Session cookie string as copied from a browser (`k=v; k2=v2`).
    pub cookie: String,

    /// User-Agent sent with every request.
    pub user_agent: String,

    /// Referer sent with every request.
    pub referer: String,

    /// Timeout for nav, search, card and medal calls.
    pub info_timeout_secs: u64,

    /// Timeout for each follow-list page.
    pub follow_timeout_secs: u64,

    /// Follow-list page size.
    pub page_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cookie: String::new(),
            user_agent: USER_AGENT.to_string(),
            referer: REFERER.to_string(),
            info_timeout_secs: 10,
            follow_timeout_secs: 30,
            page_size: 50,
        }
    }
}

impl ApiConfig {
    /// Timeouts and paging as a [`ClientConfig`].
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            info_timeout: Duration::from_secs(self.info_timeout_secs),
            follow_timeout: Duration::from_secs(self.follow_timeout_secs),
            page_size: self.page_size,
        }
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("cookie", &(!self.cookie.is_empty()))
            .field("user_agent", &self.user_agent)
            .field("referer", &self.referer)
            .field("info_timeout_secs", &self.info_timeout_secs)
            .field("follow_timeout_secs", &self.follow_timeout_secs)
            .field("page_size", &self.page_size)
            .finish()
    }
}

/// Registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Directory holding `vtb_list.json`.
    pub cache_dir: PathBuf,

    /// Mirror URLs, tried in order.
    pub mirrors: Vec<String>,

    /// Timeout for each mirror.
    pub mirror_timeout_secs: u64,

    /// Interval between background refreshes.
    pub refresh_interval_secs: u64,

    /// Refresh once at startup when serving.
    pub refresh_on_start: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./cache/ddcheck"),
            mirrors: default_mirrors(),
            mirror_timeout_secs: 20,
            refresh_interval_secs: 86_400, // daily
            refresh_on_start: true,
        }
    }
}

impl RegistryConfig {
    /// Per-mirror timeout.
    pub fn mirror_timeout(&self) -> Duration {
        Duration::from_secs(self.mirror_timeout_secs)
    }

    /// Background refresh interval.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl DdCheckConfig {
    /// Reads a TOML config file. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DdCheckError::Config`] if the file cannot be read or parsed,
    /// or fails [`validate`](Self::validate).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|e| DdCheckError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml(&raw)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`DdCheckError::Config`] on a parse or validation failure.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| DdCheckError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that would make lookups impossible.
    ///
    /// # Errors
    ///
    /// Returns [`DdCheckError::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        let invalid = |field: &str| -> Result<()> {
            Err(DdCheckError::Config(format!("{} must be positive", field)))
        };

        if self.api.info_timeout_secs == 0 {
            return invalid("api.info_timeout_secs");
        }
        if self.api.follow_timeout_secs == 0 {
            return invalid("api.follow_timeout_secs");
        }
        if self.api.page_size == 0 {
            return invalid("api.page_size");
        }
        if self.registry.mirror_timeout_secs == 0 {
            return invalid("registry.mirror_timeout_secs");
        }
        if self.registry.refresh_interval_secs == 0 {
            return invalid("registry.refresh_interval_secs");
        }
        if self.registry.mirrors.is_empty() {
            return Err(DdCheckError::Config(
                "registry.mirrors must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = DdCheckConfig::default();
        assert_eq!(config.api.page_size, 50);
        assert_eq!(config.api.info_timeout_secs, 10);
        assert_eq!(config.api.follow_timeout_secs, 30);
        assert_eq!(config.registry.mirror_timeout_secs, 20);
        assert_eq!(config.registry.mirrors.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DdCheckConfig::from_toml(
            r#"
            [api]
            cookie = "SESSDATA=abc; bili_jct=def"

            [registry]
            cache_dir = "/tmp/ddcheck"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.cookie, "SESSDATA=abc; bili_jct=def");
        assert_eq!(config.api.page_size, 50);
        assert_eq!(config.registry.cache_dir, PathBuf::from("/tmp/ddcheck"));
        assert_eq!(config.registry.mirrors, default_mirrors());
    }

    #[test]
    fn test_validation_rejects_zero_values() {
        let err = DdCheckConfig::from_toml("[api]\npage_size = 0").unwrap_err();
        assert!(err.to_string().contains("api.page_size"));

        let err = DdCheckConfig::from_toml("[registry]\nmirrors = []").unwrap_err();
        assert!(err.to_string().contains("registry.mirrors"));
    }

    #[test]
    fn test_malformed_toml() {
        let err = DdCheckConfig::from_toml("[api\ncookie = ").unwrap_err();
        assert!(matches!(err, DdCheckError::Config(_)));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = DdCheckConfig::load(dir.path().join("ddcheck.toml")).unwrap();
        assert_eq!(config.api.page_size, 50);
    }

    #[test]
    fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ddcheck.toml");
        std::fs::write(&path, "[api]\nfollow_timeout_secs = 5\n").unwrap();

        let config = DdCheckConfig::load(&path).unwrap();
        assert_eq!(config.api.client_config().follow_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_debug_hides_cookie() {
        let mut config = ApiConfig::default();
        config.cookie = "SESSDATA=secret".to_string();
        assert!(!format!("{:?}", config).contains("secret"));
    }

    #[test]
    fn test_config_serialization() {
        let config = DdCheckConfig::default();
        let raw = toml::to_string(&config).unwrap();
        let parsed = DdCheckConfig::from_toml(&raw).unwrap();
        assert_eq!(parsed.registry.mirrors, config.registry.mirrors);
    }
}
