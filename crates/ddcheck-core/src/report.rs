//! Report aggregation.
//!
//! Joins a follow-list against the registry (by account id) and the medal
//! wall (by display name) and computes the headline percentage. Rendering
//! the payload is left to the caller.

use ddcheck_client::{BadgeEntry, FollowListEntry, UserCard};
use ddcheck_registry::RegistryEntry;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

/// Maximum rows per column in the rendered list.
pub const ROWS_PER_COLUMN: usize = 100;

/// Result of a follow-list check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    /// Account id of the subject.
    pub uid: u64,
    /// Display name of the subject.
    pub name: String,
    /// Avatar URL of the subject.
    pub face: String,
    /// Follower count of the subject.
    pub fans: u64,
    /// Following count reported by the profile.
    pub follows: u64,
    /// Followed accounts found in the registry.
    pub matched_count: usize,
    /// `matched_count / follows * 100`, rounded to 2 decimals.
    pub match_percent: f64,
    /// `"12.34% (n/total)"`.
    pub percent_label: String,
    /// Matched accounts, in registry order.
    pub entries: Vec<ReportEntry>,
    /// Rows per column when laying out `entries`.
    pub num_per_col: usize,
}

/// A followed account that is in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Display name from the registry.
    pub name: String,
    /// Account id.
    pub uid: u64,
    /// The subject's medal for this account, if any.
    pub medal: Option<MedalBadge>,
}

/// A medal formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedalBadge {
    /// Medal label.
    pub name: String,
    /// Medal level.
    pub level: u32,
    /// `#RRGGBB`.
    pub color_border: String,
    /// `#RRGGBB`.
    pub color_start: String,
    /// `#RRGGBB`.
    pub color_end: String,
}

impl From<&BadgeEntry> for MedalBadge {
    fn from(badge: &BadgeEntry) -> Self {
        Self {
            name: badge.medal_name.clone(),
            level: badge.level,
            color_border: format_color(badge.border_color),
            color_start: format_color(badge.start_color),
            color_end: format_color(badge.end_color),
        }
    }
}

/// Builds the report for `subject`.
///
/// - Registry entries are indexed by `mid`; for a repeated `mid` the last
///   entry wins but keeps the position of the first.
/// - An entry matches when its `mid` is in `follow_list`.
/// - Medals are looked up by the entry's registry display name; for a
///   repeated `target_name` the last medal wins.
pub fn build_report(
    subject: &UserCard,
    follow_list: &[FollowListEntry],
    registry: &[RegistryEntry],
    badges: &[BadgeEntry],
) -> ReportPayload {
    let followed: HashSet<u64> = follow_list.iter().map(|entry| entry.mid).collect();
    let medals: HashMap<&str, &BadgeEntry> = badges
        .iter()
        .map(|badge| (badge.owner_display_name.as_str(), badge))
        .collect();

    let entries: Vec<ReportEntry> = index_registry(registry)
        .into_iter()
        .filter(|entry| followed.contains(&entry.mid))
        .map(|entry| ReportEntry {
            name: entry.uname.clone(),
            uid: entry.mid,
            medal: medals.get(entry.uname.as_str()).map(|badge| MedalBadge::from(*badge)),
        })
        .collect();

    let follows = subject.attention;
    let matched_count = entries.len();
    let percent = match_percent(matched_count, follows);

    ReportPayload {
        uid: subject.mid,
        name: subject.name.clone(),
        face: subject.face.clone(),
        fans: subject.fans,
        follows,
        matched_count,
        match_percent: (percent * 100.0).round() / 100.0,
        percent_label: format!("{:.2}% ({}/{})", percent, matched_count, follows),
        entries,
        num_per_col: column_count(matched_count),
    }
}

/// Registry entries unique by `mid`, last write wins, first-seen order.
fn index_registry(registry: &[RegistryEntry]) -> Vec<&RegistryEntry> {
    let mut positions: HashMap<u64, usize> = HashMap::with_capacity(registry.len());
    let mut unique: Vec<&RegistryEntry> = Vec::with_capacity(registry.len());

    for entry in registry {
        match positions.get(&entry.mid) {
            Some(&pos) => unique[pos] = entry,
            None => {
                positions.insert(entry.mid, unique.len());
                unique.push(entry);
            }
        }
    }
    unique
}

/// `matched / total * 100`, or `0` when `total` is zero.
pub fn match_percent(matched: usize, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    matched as f64 / total as f64 * 100.0
}

/// `ceil(m / ceil(m / 100))`, or `1` when `m` is zero.
pub fn column_count(matched: usize) -> usize {
    if matched == 0 {
        return 1;
    }
    let columns = matched.div_ceil(ROWS_PER_COLUMN);
    matched.div_ceil(columns)
}

/// `#RRGGBB` with uppercase hex.
pub fn format_color(color: u32) -> String {
    format!("#{:06X}", color)
}

impl ReportPayload {
    /// Plain-text rendering for terminals and logs.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} (UID: {})", self.name, self.uid);
        let _ = writeln!(out, "Fans: {}  Following: {}", self.fans, self.follows);
        let _ = writeln!(out, "VTB ratio: {}", self.percent_label);

        for entry in &self.entries {
            match &entry.medal {
                Some(medal) => {
                    let _ = writeln!(
                        out,
                        "  {} ({}) [{} {}]",
                        entry.name, entry.uid, medal.name, medal.level
                    );
                }
                None => {
                    let _ = writeln!(out, "  {} ({})", entry.name, entry.uid);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(attention: u64) -> UserCard {
        UserCard {
            mid: 1,
            name: "tester".to_string(),
            face: "https://i0.hdslb.com/face.jpg".to_string(),
            fans: 12,
            attention,
        }
    }

    fn follow(mid: u64) -> FollowListEntry {
        FollowListEntry {
            mid,
            uname: format!("u{}", mid),
        }
    }

    fn badge(owner: &str, level: u32) -> BadgeEntry {
        BadgeEntry {
            owner_display_name: owner.to_string(),
            medal_name: "嘉心糖".to_string(),
            level,
            border_color: 0x1a544b,
            start_color: 0x1a544b,
            end_color: 0x529d92,
        }
    }

    #[test]
    fn test_column_formula() {
        assert_eq!(column_count(0), 1);
        assert_eq!(column_count(1), 1);
        assert_eq!(column_count(100), 100);
        assert_eq!(column_count(101), 51);
        assert_eq!(column_count(250), 84);
    }

    #[test]
    fn test_zero_follows_is_zero_percent() {
        assert_eq!(match_percent(0, 0), 0.0);
        assert_eq!(match_percent(7, 0), 0.0);

        let registry = vec![RegistryEntry::new(2, "a")];
        let report = build_report(&subject(0), &[follow(2)], &registry, &[]);
        assert_eq!(report.matched_count, 1);
        assert_eq!(report.match_percent, 0.0);
        assert_eq!(report.percent_label, "0.00% (1/0)");
    }

    #[test]
    fn test_percent_is_rounded() {
        let registry = vec![RegistryEntry::new(2, "a")];
        let report = build_report(&subject(3), &[follow(2)], &registry, &[]);
        assert_eq!(report.match_percent, 33.33);
        assert_eq!(report.percent_label, "33.33% (1/3)");
    }

    #[test]
    fn test_matches_by_id_in_registry_order() {
        let registry = vec![
            RegistryEntry::new(30, "c"),
            RegistryEntry::new(10, "a"),
            RegistryEntry::new(20, "b"),
        ];
        let follows = vec![follow(10), follow(99), follow(30)];

        let report = build_report(&subject(3), &follows, &registry, &[]);

        let uids: Vec<u64> = report.entries.iter().map(|e| e.uid).collect();
        assert_eq!(uids, vec![30, 10]);
        assert_eq!(report.entries[0].name, "c");
        assert_eq!(report.num_per_col, 2);
    }

    #[test]
    fn test_duplicate_registry_ids_last_write_wins() {
        let registry = vec![
            RegistryEntry::new(10, "old"),
            RegistryEntry::new(20, "b"),
            RegistryEntry::new(10, "new"),
        ];

        let report = build_report(&subject(2), &[follow(10), follow(20)], &registry, &[]);

        assert_eq!(report.matched_count, 2);
        assert_eq!(report.entries[0].name, "new");
        assert_eq!(report.entries[1].name, "b");
    }

    #[test]
    fn test_badges_join_by_display_name() {
        let registry = vec![RegistryEntry::new(10, "嘉然今天吃什么"), RegistryEntry::new(20, "b")];
        let badges = vec![badge("嘉然今天吃什么", 20), badge("嘉然今天吃什么", 21), badge("nobody", 1)];

        let report = build_report(&subject(2), &[follow(10), follow(20)], &registry, &badges);

        let medal = report.entries[0].medal.as_ref().unwrap();
        assert_eq!(medal.level, 21);
        assert_eq!(medal.color_border, "#1A544B");
        assert_eq!(medal.color_end, "#529D92");
        assert!(report.entries[1].medal.is_none());
    }

    #[test]
    fn test_format_color() {
        assert_eq!(format_color(0), "#000000");
        assert_eq!(format_color(0xff), "#0000FF");
        assert_eq!(format_color(0xabcdef), "#ABCDEF");
    }

    #[test]
    fn test_summary() {
        let registry = vec![RegistryEntry::new(10, "a"), RegistryEntry::new(20, "b")];
        let report = build_report(
            &subject(4),
            &[follow(10), follow(20)],
            &registry,
            &[badge("a", 5)],
        );

        let summary = report.summary();
        assert!(summary.contains("tester (UID: 1)"));
        assert!(summary.contains("VTB ratio: 50.00% (2/4)"));
        assert!(summary.contains("  a (10) [嘉心糖 5]"));
        assert!(summary.contains("  b (20)\n"));
    }

    #[test]
    fn test_payload_serializes_for_renderer() {
        let registry = vec![RegistryEntry::new(10, "a")];
        let report = build_report(&subject(1), &[follow(10)], &registry, &[]);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["percent_label"], "100.00% (1/1)");
        assert_eq!(value["entries"][0]["uid"], 10);
        assert!(value["entries"][0]["medal"].is_null());
    }
}
