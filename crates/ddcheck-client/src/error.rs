//! Error types for the API client.

use ddcheck_wbi::WbiError;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while talking to the upstream API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be sent or the body could not be read.
    #[error("transport error on {endpoint}: {reason}")]
    Transport {
        /// Endpoint being called.
        endpoint: String,
        /// Underlying failure.
        reason: String,
    },

    /// The request did not complete within its timeout.
    #[error("request to {0} timed out")]
    Timeout(String),

    /// The server answered with a non-success HTTP status.
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        /// Endpoint being called.
        endpoint: String,
        /// HTTP status code.
        status: u16,
    },

    /// The server answered but reported a non-zero `code`.
    #[error("upstream rejected request ({code}): {message}")]
    UpstreamRejected {
        /// Upstream status code.
        code: i64,
        /// Upstream message.
        message: String,
    },

    /// The body did not match the expected payload shape.
    #[error("unexpected {endpoint} payload: {reason}")]
    UnexpectedShape {
        /// Endpoint whose payload failed to parse.
        endpoint: String,
        /// Parse failure.
        reason: String,
    },

    /// Search succeeded but no user has exactly this name.
    #[error("no user named '{0}'")]
    IdentityNotFound(String),

    /// Pagination aborted; partial results were discarded.
    #[error("follow-list fetch aborted at page {page}: {reason}")]
    FetchIncomplete {
        /// Page that failed (1-indexed).
        page: u32,
        /// Cause of the abort.
        reason: String,
    },

    /// Key refresh or signing failed.
    #[error(transparent)]
    Wbi(#[from] WbiError),
}

impl ClientError {
    /// Returns true for failures that may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Timeout(_) | Self::Status { .. } | Self::Wbi(WbiError::KeyRefresh(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_rejected_display() {
        let err = ClientError::UpstreamRejected {
            code: -352,
            message: "风控校验失败".to_string(),
        };
        assert!(err.to_string().contains("-352"));
        assert!(err.to_string().contains("风控校验失败"));
    }

    #[test]
    fn test_fetch_incomplete_display() {
        let err = ClientError::FetchIncomplete {
            page: 3,
            reason: "timeout".to_string(),
        };
        assert!(err.to_string().contains("page 3"));
    }

    #[test]
    fn test_wbi_error_is_transparent() {
        let err: ClientError = WbiError::KeyRefresh("nav down".to_string()).into();
        assert_eq!(err.to_string(), "failed to refresh WBI keys: nav down");
        assert!(err.is_transient());
    }

    #[test]
    fn test_identity_not_found_is_not_transient() {
        assert!(!ClientError::IdentityNotFound("x".to_string()).is_transient());
    }
}
