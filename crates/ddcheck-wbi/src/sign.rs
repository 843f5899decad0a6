//! # WBI Request Signer
//!
//! Pure, deterministic signing of a query parameter set.
//!
//! ## Algorithm
//!
//! 1. Mix `img_key + sub_key` through the permutation table (64 chars).
//! 2. Insert `wts` = Unix seconds.
//! 3. Sort all fields by key (byte order).
//! 4. Build `k1=v1&k2=v2...` with each value form-encoded.
//! 5. `w_rid = md5_hex(query + mixed_secret)`.
//! 6. Append `w_rid` after the sorted fields. It is not part of the digest.
//!
//! ## References
//!
//! - WHATWG URL Standard, `application/x-www-form-urlencoded` serializer
//!   <https://url.spec.whatwg.org/#urlencoded-serializing>
//! - RFC 1321 - The MD5 Message-Digest Algorithm

use crate::error::{Result, WbiError};
use crate::keys::SigningKeyPair;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};
use url::form_urlencoded::byte_serialize;

/// Query parameters before signing, kept sorted by key.
pub type Params = BTreeMap<String, String>;

/// Name of the timestamp field that participates in the digest.
pub const TIMESTAMP_FIELD: &str = "wts";

/// Name of the digest field appended after signing.
pub const SIGNATURE_FIELD: &str = "w_rid";

/// A parameter set that has been signed.
///
/// Fields are stored in the order they must be sent: sorted by key, with
/// `w_rid` last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedParams {
    fields: Vec<(String, String)>,
}

impl SignedParams {
    /// Looks up a field value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The `w_rid` digest.
    pub fn signature(&self) -> &str {
        self.get(SIGNATURE_FIELD).unwrap_or_default()
    }

    /// The `wts` timestamp the digest was computed with.
    pub fn timestamp(&self) -> Option<u64> {
        self.get(TIMESTAMP_FIELD).and_then(|v| v.parse().ok())
    }

    /// Iterates over fields in send order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields, `w_rid` included.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Encodes the fields as a query string using the signing encoding.
    ///
    /// Sending exactly this string keeps the transmitted values identical to
    /// the ones that were hashed.
    pub fn to_query_string(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, encode_component(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Signs `params` with the current wall-clock time as `wts`.
///
/// # Errors
///
/// - [`WbiError::InvalidKeys`] if the key pair is too short
/// - [`WbiError::Clock`] if the system clock reads before the Unix epoch
pub fn sign(params: Params, keys: &SigningKeyPair) -> Result<SignedParams> {
    let wts = unix_seconds(SystemTime::now())?;
    sign_at(params, keys, wts)
}

fn unix_seconds(now: SystemTime) -> Result<u64> {
    now.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| WbiError::Clock(e.to_string()))
}

/// Signs `params` with an explicit `wts`.
///
/// Same inputs always produce the same output.
///
/// # Errors
///
/// Returns [`crate::WbiError::InvalidKeys`] if the key pair is too short.
///
/// # Example
///
/// ```rust
/// use ddcheck_wbi::{sign_at, Params, SigningKeyPair};
///
/// let keys = SigningKeyPair::new(
///     "7cd084941338484aae1ad9425b84077c",
///     "4932caff0ff746eab6f01bf08b70ac45",
/// ).unwrap();
///
/// let mut params = Params::new();
/// params.insert("foo".to_string(), "114".to_string());
/// params.insert("bar".to_string(), "514".to_string());
/// params.insert("zab".to_string(), "1919810".to_string());
///
/// let signed = sign_at(params, &keys, 1702204169).unwrap();
/// assert_eq!(signed.signature(), "9766f99e9eb6b07bb560f1c19c7ebae8");
/// ```
pub fn sign_at(mut params: Params, keys: &SigningKeyPair, wts: u64) -> Result<SignedParams> {
    let mixin = keys.mixin_key()?;

    params.insert(TIMESTAMP_FIELD.to_string(), wts.to_string());

    let query = canonical_query(&params);
    let digest = format!("{:x}", md5::compute(format!("{}{}", query, mixin)));

    let mut fields: Vec<(String, String)> = params.into_iter().collect();
    fields.push((SIGNATURE_FIELD.to_string(), digest));

    Ok(SignedParams { fields })
}

/// Builds the sorted `key=value&...` string that is hashed.
pub fn canonical_query(params: &Params) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, encode_component(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Form-encodes a value the way the upstream service hashes it.
///
/// Keeps `A-Z a-z 0-9 _ . - ~`, turns space into `+`, and percent-encodes
/// every other UTF-8 byte with uppercase hex. The form serializer leaves `*`
/// bare and escapes `~`, so both are corrected here.
///
/// # Example
///
/// ```rust
/// use ddcheck_wbi::encode_component;
///
/// assert_eq!(encode_component("a b*c~"), "a+b%2Ac~");
/// assert_eq!(encode_component("é"), "%C3%A9");
/// ```
pub fn encode_component(value: &str) -> String {
    byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('*', "%2A")
        .replace("%7E", "~")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> SigningKeyPair {
        SigningKeyPair::new(
            "7cd084941338484aae1ad9425b84077c",
            "4932caff0ff746eab6f01bf08b70ac45",
        )
        .unwrap()
    }

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_encode_component_reserved_characters() {
        assert_eq!(encode_component("abcXYZ019"), "abcXYZ019");
        assert_eq!(encode_component("_.-~"), "_.-~");
        assert_eq!(encode_component("hello world"), "hello+world");
        assert_eq!(encode_component("a&b=c"), "a%26b%3Dc");
        assert_eq!(encode_component("*"), "%2A");
        assert_eq!(encode_component("100%"), "100%25");
        assert_eq!(encode_component("/?#"), "%2F%3F%23");
    }

    #[test]
    fn test_encode_component_multibyte() {
        assert_eq!(encode_component("虚拟"), "%E8%99%9A%E6%8B%9F");
    }

    #[test]
    fn test_canonical_query_sorted() {
        let query = canonical_query(&params(&[("zab", "1"), ("bar", "2"), ("foo", "3")]));
        assert_eq!(query, "bar=2&foo=3&zab=1");
    }

    #[test]
    fn test_sign_at_golden_digest() {
        let signed = sign_at(
            params(&[("foo", "114"), ("bar", "514"), ("zab", "1919810")]),
            &keys(),
            1702204169,
        )
        .unwrap();

        assert_eq!(signed.signature(), "9766f99e9eb6b07bb560f1c19c7ebae8");
        assert_eq!(signed.timestamp(), Some(1702204169));
    }

    #[test]
    fn test_sign_at_golden_digest_with_encoding() {
        let signed = sign_at(
            params(&[("keyword", "hello world~*é"), ("search_type", "bili_user")]),
            &keys(),
            1700000000,
        )
        .unwrap();

        assert_eq!(signed.signature(), "8ffa1b4e38906647c0065d58b1cf4434");
    }

    #[test]
    fn test_signature_field_is_last() {
        let signed = sign_at(params(&[("zzz", "1"), ("aaa", "2")]), &keys(), 1).unwrap();
        let order: Vec<&str> = signed.iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec!["aaa", "wts", "zzz", "w_rid"]);
    }

    #[test]
    fn test_query_string_matches_hashed_encoding() {
        let signed = sign_at(params(&[("keyword", "a b")]), &keys(), 7).unwrap();
        let query = signed.to_query_string();
        assert!(query.starts_with("keyword=a+b&wts=7&w_rid="));
        assert!(query.ends_with(signed.signature()));
    }

    #[test]
    fn test_caller_supplied_wts_is_overwritten() {
        let signed = sign_at(params(&[("wts", "999")]), &keys(), 5).unwrap();
        assert_eq!(signed.timestamp(), Some(5));
        assert_eq!(signed.len(), 2);
        assert!(!signed.is_empty());
    }

    #[test]
    fn test_sign_uses_current_time() {
        let signed = sign(params(&[("mid", "1")]), &keys()).unwrap();
        let wts = signed.timestamp().unwrap();
        assert!(wts > 1_600_000_000);
        assert_eq!(signed.signature().len(), 32);
    }

    #[test]
    fn test_clock_before_epoch_is_an_error() {
        let before = UNIX_EPOCH - std::time::Duration::from_secs(1);
        let err = unix_seconds(before).unwrap_err();
        assert!(matches!(err, WbiError::Clock(_)));

        assert_eq!(unix_seconds(UNIX_EPOCH).unwrap(), 0);
    }
}
