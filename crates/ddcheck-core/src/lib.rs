//! # ddcheck Core
//!
//! Follow-list check facade. Answers "what fraction of the accounts this
//! user follows are known virtual streamers?"
//!
//! ## Components
//!
//! | Stage | Crate | Failure handling |
//! |-------|-------|------------------|
//! | Key cache + signing | `ddcheck-wbi` | fatal for signed calls |
//! | Identity + profile | `ddcheck-client` | fatal |
//! | Follow-list pagination | `ddcheck-client` | degrades to empty |
//! | Registry | `ddcheck-registry` | previous snapshot kept |
//! | Medal wall | `ddcheck-client` | degrades to no medals |
//! | Aggregation | this crate | pure |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         DDCHECK CORE                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │                    ┌─────────────────┐                          │
//! │                    │     DdCheck     │  ← Facade                │
//! │                    └────────┬────────┘                          │
//! │                             │                                   │
//! │         ┌───────────────────┼───────────────────┐               │
//! │         ▼                   ▼                   ▼               │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐          │
//! │  │ BiliClient  │    │  Registry   │    │   build_    │          │
//! │  │ + key cache │    │   Store     │    │   report    │          │
//! │  └─────────────┘    └──────▲──────┘    └─────────────┘          │
//! │                            │                                    │
//! │                 spawn_registry_refresh (interval)               │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ddcheck_core::{DdCheck, DdCheckConfig};
//!
//! let ddcheck = DdCheck::new(DdCheckConfig::load("ddcheck.toml")?)?;
//! match ddcheck.check("672328094").await {
//!     Ok(report) => println!("{}", report.summary()),
//!     Err(e) => println!("{}", e.user_message()),
//! }
//! ```
//!
//! ## Notes
//!
//! - Registry entries are matched by account id; medals by display name.
//! - A failed follow-list fetch yields a 0% report, never a partial one.

mod config;
mod ddcheck;
mod error;
mod report;
mod scheduler;

pub use config::{ApiConfig, DdCheckConfig, RegistryConfig};
pub use ddcheck::DdCheck;
pub use error::DdCheckError;
pub use report::{
    build_report, column_count, format_color, match_percent, MedalBadge, ReportEntry,
    ReportPayload, ROWS_PER_COLUMN,
};
pub use scheduler::spawn_registry_refresh;

// Re-export component types for convenience
pub use ddcheck_client::{BadgeEntry, BiliClient, Credentials, FollowListEntry, UserCard};
pub use ddcheck_registry::{RegistryEntry, RegistryStore};
pub use ddcheck_wbi::{SignatureKeyCache, SigningKeyPair};

/// Core result type for ddcheck operations.
pub type Result<T> = std::result::Result<T, DdCheckError>;
