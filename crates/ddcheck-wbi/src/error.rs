//! Error types for WBI signing.

use thiserror::Error;

/// Result type alias for signing operations.
pub type Result<T> = std::result::Result<T, WbiError>;

/// Errors raised while obtaining keys or signing a request.
#[derive(Debug, Error)]
pub enum WbiError {
    /// The navigation endpoint was unreachable or its payload unusable.
    ///
    /// Fatal for every signed call until a later refresh succeeds.
    #[error("failed to refresh WBI keys: {0}")]
    KeyRefresh(String),

    /// A key pair is empty or too short for the permutation table.
    #[error("invalid WBI key pair: {0}")]
    InvalidKeys(String),

    /// The system clock reads before the Unix epoch, so `wts` is undefined.
    #[error("system clock is before the Unix epoch: {0}")]
    Clock(String),
}
