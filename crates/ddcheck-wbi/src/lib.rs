//! # WBI Request Signing
//!
//! Bilibili guards a number of otherwise public web endpoints (user search,
//! follow relations) behind the "WBI" request signature. A signed request
//! carries two extra query fields: `wts`, the current Unix time in seconds,
//! and `w_rid`, an MD5 digest over the sorted query string salted with a
//! secret mixed from two rotating keys.
//!
//! This crate implements both halves of that scheme:
//!
//! 1. **Signing-key cache** - [`SignatureKeyCache`] keeps the current
//!    [`SigningKeyPair`] and refreshes it from the navigation endpoint once it
//!    is older than [`DEFAULT_KEY_TTL`]. Concurrent callers that hit an expired
//!    pair coalesce into a single network call.
//!
//! 2. **Request signer** - [`sign`] / [`sign_at`] turn an ordered parameter
//!    map into a [`SignedParams`] value ready to be appended to a URL.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        WBI SIGNING                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  ┌──────────────┐  urls   ┌──────────────────┐               │
//! │  │  KeySource   │───────▶ │ SignatureKeyCache│               │
//! │  │ (nav fetch)  │         │  TTL 1800s       │               │
//! │  └──────────────┘         └────────┬─────────┘               │
//! │                                    │ SigningKeyPair          │
//! │                                    ▼                         │
//! │                           ┌──────────────────┐               │
//! │   params ───────────────▶ │   sign / sign_at │ ──▶ params    │
//! │                           │  mixin + md5     │    + wts      │
//! │                           └──────────────────┘    + w_rid    │
//! │                                                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ddcheck_wbi::{sign, SignatureKeyCache};
//! use std::collections::BTreeMap;
//!
//! let cache = SignatureKeyCache::new(Arc::new(nav_source));
//! let keys = cache.ensure_fresh().await?;
//!
//! let mut params = BTreeMap::new();
//! params.insert("keyword".to_string(), "example".to_string());
//! let signed = sign(params, &keys)?;
//! let url = format!("{}?{}", endpoint, signed.to_query_string());
//! ```
//!
//! ## Compatibility Notes
//!
//! - The signature is bit-exact: the sort order, the percent-encoding
//!   alphabet and the permutation table must not change, otherwise the
//!   upstream service rejects every signed call.
//! - Values are encoded in `application/x-www-form-urlencoded` style with
//!   space as `+`, keeping only `A-Z a-z 0-9 _ . - ~` literal.

mod cache;
mod error;
mod keys;
mod sign;

pub use cache::{KeySource, SignatureKeyCache, WbiUrls, DEFAULT_KEY_TTL};
pub use error::{Result, WbiError};
pub use keys::{key_from_url, mixin_key, SigningKeyPair, MIXIN_KEY_ENC_TAB};
pub use sign::{
    canonical_query, encode_component, sign, sign_at, Params, SignedParams, SIGNATURE_FIELD,
    TIMESTAMP_FIELD,
};
