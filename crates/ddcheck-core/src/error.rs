//! Error types for ddcheck core.

use ddcheck_client::ClientError;
use ddcheck_registry::RegistryError;
use ddcheck_wbi::WbiError;
use thiserror::Error;

/// Core error type for lookups.
#[derive(Debug, Error)]
pub enum DdCheckError {
    /// No account has exactly this display name.
    #[error("User not found: {0}")]
    IdentityNotFound(String),

    /// Signing keys could not be obtained.
    #[error("Key refresh failed: {0}")]
    KeyRefresh(String),

    /// The upstream API answered with a non-zero code.
    #[error("Upstream rejected request ({code}): {message}")]
    UpstreamRejected {
        /// Upstream status code.
        code: i64,
        /// Upstream message.
        message: String,
    },

    /// The registry could not be obtained from any source.
    #[error("Registry unavailable: {0}")]
    Unavailable(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Client error passthrough.
    #[error("Client error: {0}")]
    Client(ClientError),

    /// Registry error passthrough.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl From<ClientError> for DdCheckError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::IdentityNotFound(name) => Self::IdentityNotFound(name),
            ClientError::UpstreamRejected { code, message } => {
                Self::UpstreamRejected { code, message }
            }
            ClientError::Wbi(WbiError::KeyRefresh(reason)) => Self::KeyRefresh(reason),
            other => Self::Client(other),
        }
    }
}

impl DdCheckError {
    /// Short message suitable for showing to the person who asked.
    pub fn user_message(&self) -> String {
        match self {
            Self::IdentityNotFound(name) => format!("User '{}' not found", name),
            Self::UpstreamRejected { message, .. } => {
                format!("Failed to get user info: {}", message)
            }
            Self::Config(reason) => format!("Invalid configuration: {}", reason),
            Self::KeyRefresh(_) | Self::Unavailable(_) | Self::Registry(_) => {
                "Service temporarily unavailable, please try again later".to_string()
            }
            Self::Client(e) if e.is_transient() => {
                "Service temporarily unavailable, please try again later".to_string()
            }
            Self::Client(_) => "Failed to get user info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_classified() {
        let err: DdCheckError = ClientError::IdentityNotFound("x".to_string()).into();
        assert!(matches!(err, DdCheckError::IdentityNotFound(_)));

        let err: DdCheckError = ClientError::Wbi(WbiError::KeyRefresh("down".to_string())).into();
        assert!(matches!(err, DdCheckError::KeyRefresh(_)));

        let err: DdCheckError = ClientError::UpstreamRejected {
            code: -404,
            message: "啥都木有".to_string(),
        }
        .into();
        assert!(matches!(err, DdCheckError::UpstreamRejected { code: -404, .. }));

        let err: DdCheckError = ClientError::Timeout("card".to_string()).into();
        assert!(matches!(err, DdCheckError::Client(_)));
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            DdCheckError::IdentityNotFound("嘉然".to_string()).user_message(),
            "User '嘉然' not found"
        );
        assert!(DdCheckError::KeyRefresh("nav".to_string())
            .user_message()
            .contains("temporarily unavailable"));
        assert!(DdCheckError::Client(ClientError::Timeout("card".to_string()))
            .user_message()
            .contains("temporarily unavailable"));
        assert!(DdCheckError::UpstreamRejected {
            code: -404,
            message: "啥都木有".to_string()
        }
        .user_message()
        .contains("啥都木有"));
    }
}
