//! # ddcheck Client - Bilibili Web API
//!
//! Typed access to the endpoints a follow-list check needs, plus the
//! adapters that let the signing-key cache and the registry store run over
//! the same HTTP transport.
//!
//! ## Endpoints
//!
//! | Call | Signed | Cookie | Timeout |
//! |------|--------|--------|---------|
//! | nav (key discovery) | no | yes | 10s |
//! | user search | yes | yes | 10s |
//! | user card | no | no | 10s |
//! | followings (paged) | yes | yes | 30s per page |
//! | medal wall | no | yes | 10s |
//! | registry mirror | no | no | 20s |
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        BILI CLIENT                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  uid_by_name ─┐                                              │
//! │  user_card ───┤      ┌──────────────┐      ┌─────────────┐   │
//! │  medal_wall ──┼────▶ │  ApiRequest  │────▶ │  Transport  │   │
//! │  fetch_all ───┘      │ query+cookie │      │  (reqwest)  │   │
//! │       │              └──────────────┘      └──────┬──────┘   │
//! │       ▼                                           │          │
//! │  SignatureKeyCache ◀── NavKeySource ──────────────┤          │
//! │                                                   │          │
//! │  RegistryStore ◀────── TransportMirrorSource ─────┘          │
//! │                                                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ddcheck_client::{BiliClient, ClientConfig, Credentials, NavKeySource, ReqwestTransport};
//!
//! let transport = Arc::new(ReqwestTransport::new(Credentials::from_cookie_string(&cookie))?);
//! let keys = Arc::new(SignatureKeyCache::new(Arc::new(NavKeySource::new(transport.clone()))));
//! let client = BiliClient::new(transport, keys, ClientConfig::default());
//!
//! let uid = client.uid_by_name("嘉然今天吃什么").await?;
//! let followings = client.fetch_all(uid).await;
//! ```

pub mod api;
pub mod client;
pub mod credentials;
pub mod endpoints;
pub mod error;
pub mod followings;
pub mod transport;

pub use api::{BadgeEntry, FollowListEntry, UserCard};
pub use client::{BiliClient, ClientConfig, NavKeySource, TransportMirrorSource};
pub use credentials::Credentials;
pub use error::{ClientError, Result};
pub use transport::{ApiRequest, ReqwestTransport, Transport};
