//! # ddcheck Integration Tests
//!
//! Cross-crate checks of the properties a lookup relies on.
//!
//! ## Property Coverage
//!
//! | Property | Crate | Test |
//! |----------|-------|------|
//! | Mixed secret golden value | wbi | `test_mixed_secret_golden_value` |
//! | Signature determinism | wbi | `test_signature_is_deterministic` |
//! | Signature golden value | wbi | `test_signature_golden_value` |
//! | Persist / load round trip | registry | `test_registry_round_trip` |
//! | Corrupted registry file | registry | `test_corrupted_registry_loads_empty` |
//! | Zero follows | core | `test_zero_follows` |
//! | Column formula | core | `test_column_formula` |
//! | Id join + name join | core | `test_report_from_registry_file` |

use ddcheck_core::{build_report, column_count, FollowListEntry, RegistryEntry, UserCard};
use ddcheck_registry::Storage;
use ddcheck_wbi::{mixin_key, sign_at, Params, SigningKeyPair};
use tempfile::TempDir;

const IMG_KEY: &str = "7cd084941338484aae1ad9425b84077c";
const SUB_KEY: &str = "4932caff0ff746eab6f01bf08b70ac45";

fn keys() -> SigningKeyPair {
    SigningKeyPair::new(IMG_KEY, SUB_KEY).unwrap()
}

fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn card(attention: u64) -> UserCard {
    UserCard {
        mid: 672328094,
        name: "嘉然今天吃什么".to_string(),
        face: String::new(),
        fans: 0,
        attention,
    }
}

// =============================================================================
// SIGNING
// =============================================================================

#[test]
fn test_mixed_secret_golden_value() {
    assert_eq!(
        mixin_key(IMG_KEY, SUB_KEY).unwrap(),
        "ea1db124af3c7062474693fa704ced34ba88c01a08f8459bf04a9c04db124af3"
    );
}

#[test]
fn test_signature_is_deterministic() {
    let input = params(&[("vmid", "672328094"), ("pn", "3"), ("ps", "50")]);

    let first = sign_at(input.clone(), &keys(), 1_700_000_000).unwrap();
    let second = sign_at(input, &keys(), 1_700_000_000).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.timestamp(), Some(1_700_000_000));
}

#[test]
fn test_signature_golden_value() {
    let signed = sign_at(
        params(&[("foo", "114"), ("bar", "514"), ("zab", "1919810")]),
        &keys(),
        1702204169,
    )
    .unwrap();

    assert_eq!(signed.signature(), "9766f99e9eb6b07bb560f1c19c7ebae8");
    assert_eq!(
        signed.to_query_string(),
        "bar=514&foo=114&wts=1702204169&zab=1919810&w_rid=9766f99e9eb6b07bb560f1c19c7ebae8"
    );
}

// =============================================================================
// REGISTRY
// =============================================================================

#[test]
fn test_registry_round_trip() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::in_dir(dir.path());
    let entries: Vec<RegistryEntry> = (1..=25)
        .map(|i| RegistryEntry::new(i * 7, format!("vtb{}", i)))
        .collect();

    storage.store(&entries).unwrap();

    assert_eq!(storage.load().unwrap(), entries);
}

#[test]
fn test_corrupted_registry_loads_empty() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::in_dir(dir.path());
    std::fs::write(storage.path(), "[{\"mid\": 1, \"uname\": ").unwrap();

    assert!(storage.load().unwrap().is_empty());
    assert!(!storage.exists());
}

// =============================================================================
// AGGREGATION
// =============================================================================

#[test]
fn test_zero_follows() {
    let registry = vec![RegistryEntry::new(1, "a"), RegistryEntry::new(2, "b")];
    let follows = vec![
        FollowListEntry { mid: 1, uname: "a".to_string() },
        FollowListEntry { mid: 2, uname: "b".to_string() },
    ];

    let report = build_report(&card(0), &follows, &registry, &[]);

    assert_eq!(report.matched_count, 2);
    assert_eq!(report.match_percent, 0.0);
}

#[test]
fn test_column_formula() {
    assert_eq!(column_count(250), 84);
    assert_eq!(column_count(0), 1);
}

#[test]
fn test_report_from_registry_file() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::in_dir(dir.path());
    let registry: Vec<RegistryEntry> = (1..=250).map(|i| RegistryEntry::new(i, format!("v{}", i))).collect();
    storage.store(&registry).unwrap();

    let follows: Vec<FollowListEntry> = (1..=500)
        .map(|i| FollowListEntry { mid: i, uname: format!("renamed{}", i) })
        .collect();

    let report = build_report(&card(500), &follows, &storage.load().unwrap(), &[]);

    assert_eq!(report.matched_count, 250);
    assert_eq!(report.percent_label, "50.00% (250/500)");
    assert_eq!(report.num_per_col, 84);
    // Names come from the registry, not the follow-list.
    assert_eq!(report.entries[0].name, "v1");
}
