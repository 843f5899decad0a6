//! # ddcheck Registry - Known-Account Replica
//!
//! Keeps a local copy of the vtbs.moe list of known virtual-streamer
//! accounts, used to classify the entries of a follow-list.
//!
//! ## Purpose
//!
//! 1. **Normalization** - mirror payloads arrive as `{uid, uname}` or
//!    `{mid, uname}` objects and are reduced to [`RegistryEntry`].
//!
//! 2. **Mirror Fallback** - several redundant mirrors are tried in order;
//!    the first one with usable data wins.
//!
//! 3. **Persistence** - the registry is kept as a JSON file so restarts do not
//!    depend on the mirrors being reachable.
//!
//! 4. **Snapshot Reads** - lookups read an immutable snapshot and never block
//!    on a refresh in progress.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       REGISTRY STORE                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  ┌───────────────┐  json   ┌──────────────┐   swap           │
//! │  │ MirrorSource  │───────▶ │  normalize   │ ───────▶ snapshot│
//! │  │ mirror 1..n   │         │  uid / mid   │          Arc<Vec>│
//! │  └───────────────┘         └──────────────┘             │    │
//! │                                                         ▼    │
//! │                                             ┌──────────────┐ │
//! │                                             │   Storage    │ │
//! │                                             │ vtb_list.json│ │
//! │                                             └──────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Duplicates
//!
//! The registry keeps entries exactly as the winning mirror listed them,
//! duplicates included. Consumers that index by `mid` decide how to collapse
//! them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ddcheck_registry::{default_mirrors, RegistryStore, Storage};
//!
//! let store = RegistryStore::new(Storage::in_dir("./cache"), source, default_mirrors());
//! store.load().await;
//! if store.snapshot().await.is_empty() {
//!     store.refresh().await?;
//! }
//! ```

pub mod mirror;
pub mod models;
pub mod storage;
pub mod store;

pub use mirror::{default_mirrors, MirrorSource, DEFAULT_MIRRORS, DEFAULT_MIRROR_TIMEOUT};
pub use models::{normalize_item, normalize_payload, RegistryEntry, RegistryError, Result};
pub use storage::{Storage, REGISTRY_FILE};
pub use store::RegistryStore;
