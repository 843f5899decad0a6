//! # Response Types
//!
//! Typed payloads for each endpoint. Every Bilibili response shares an
//! envelope of `{code, message, data}`; a non-zero `code` is an upstream
//! rejection even when the HTTP status is 200.
//!
//! Ids are sometimes numbers and sometimes numeric strings (the user card
//! returns `"mid": "2"`), so id fields accept both.

use crate::error::{ClientError, Result};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `{code, message, data}` wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Zero on success.
    pub code: i64,

    /// Human-readable status.
    #[serde(default)]
    pub message: String,

    /// Payload; may be absent or null on failure.
    pub data: Option<T>,
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Parses an envelope from a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnexpectedShape`] if the body does not match.
    pub fn parse(endpoint: &str, body: Value) -> Result<Self> {
        serde_json::from_value(body).map_err(|e| ClientError::UnexpectedShape {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }
}

impl<T> Envelope<T> {
    /// Returns `data` when `code` is zero.
    ///
    /// # Errors
    ///
    /// - [`ClientError::UpstreamRejected`] for a non-zero code
    /// - [`ClientError::UnexpectedShape`] for a zero code without data
    pub fn into_data(self, endpoint: &str) -> Result<T> {
        if self.code != 0 {
            return Err(ClientError::UpstreamRejected {
                code: self.code,
                message: self.message,
            });
        }
        self.data.ok_or_else(|| ClientError::UnexpectedShape {
            endpoint: endpoint.to_string(),
            reason: "missing data".to_string(),
        })
    }
}

/// `data` of the navigation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct NavData {
    /// Key image URLs.
    pub wbi_img: WbiImg,
}

/// `data.wbi_img` of the navigation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct WbiImg {
    /// Source of `img_key`.
    pub img_url: String,
    /// Source of `sub_key`.
    pub sub_url: String,
}

/// `data` of the user search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchData {
    /// Matching users; absent when there are no results.
    #[serde(default)]
    pub result: Option<Vec<SearchUser>>,
}

/// One user search hit.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchUser {
    /// Account id.
    #[serde(deserialize_with = "flexible_u64")]
    pub mid: u64,
    /// Display name.
    pub uname: String,
}

/// `data` of the user card endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CardData {
    /// The card itself.
    pub card: UserCard,
}

/// Profile of the account being checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCard {
    /// Account id.
    #[serde(deserialize_with = "flexible_u64")]
    pub mid: u64,
    /// Display name.
    pub name: String,
    /// Avatar URL.
    #[serde(default)]
    pub face: String,
    /// Follower count.
    #[serde(default)]
    pub fans: u64,
    /// Following count as reported by the profile.
    #[serde(default)]
    pub attention: u64,
}

/// `data` of one follow-list page.
#[derive(Debug, Clone, Deserialize)]
pub struct FollowingsData {
    /// Entries on this page; null or absent past the end.
    #[serde(default)]
    pub list: Option<Vec<FollowListEntry>>,
}

/// An account the subject follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowListEntry {
    /// Account id.
    #[serde(deserialize_with = "flexible_u64")]
    pub mid: u64,
    /// Display name.
    pub uname: String,
}

/// `data` of the medal wall endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct MedalWallData {
    /// Medals held by the subject.
    #[serde(default)]
    pub list: Option<Vec<MedalWallItem>>,
}

/// One medal on the wall, as sent on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct MedalWallItem {
    /// Display name of the account that issued the medal.
    pub target_name: String,
    /// Medal details.
    pub medal_info: MedalInfo,
}

/// Medal details, as sent on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct MedalInfo {
    /// Medal label.
    #[serde(default)]
    pub medal_name: String,
    /// Medal level.
    #[serde(default)]
    pub level: u32,
    /// Border colour, 24-bit RGB.
    #[serde(default)]
    pub medal_color_border: u32,
    /// Gradient start colour, 24-bit RGB.
    #[serde(default)]
    pub medal_color_start: u32,
    /// Gradient end colour, 24-bit RGB.
    #[serde(default)]
    pub medal_color_end: u32,
}

/// A fan medal, keyed by the display name of the account that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeEntry {
    /// Display name of the issuing account; the join key.
    pub owner_display_name: String,
    /// Medal label.
    pub medal_name: String,
    /// Medal level.
    pub level: u32,
    /// Border colour, 24-bit RGB.
    pub border_color: u32,
    /// Gradient start colour, 24-bit RGB.
    pub start_color: u32,
    /// Gradient end colour, 24-bit RGB.
    pub end_color: u32,
}

impl From<MedalWallItem> for BadgeEntry {
    fn from(item: MedalWallItem) -> Self {
        Self {
            owner_display_name: item.target_name,
            medal_name: item.medal_info.medal_name,
            level: item.medal_info.level,
            border_color: item.medal_info.medal_color_border,
            start_color: item.medal_info.medal_color_start,
            end_color: item.medal_info.medal_color_end,
        }
    }
}

/// Accepts `123` or `"123"`.
fn flexible_u64<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid numeric id '{}'", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nav_parses_when_logged_out() {
        let body = json!({
            "code": -101,
            "message": "账号未登录",
            "data": {
                "isLogin": false,
                "wbi_img": {
                    "img_url": "https://i0.hdslb.com/bfs/wbi/7cd084941338484aae1ad9425b84077c.png",
                    "sub_url": "https://i0.hdslb.com/bfs/wbi/4932caff0ff746eab6f01bf08b70ac45.png"
                }
            }
        });

        let envelope = Envelope::<NavData>::parse("nav", body).unwrap();
        assert_eq!(envelope.code, -101);
        assert!(envelope.data.unwrap().wbi_img.img_url.ends_with(".png"));
    }

    #[test]
    fn test_into_data_rejects_non_zero_code() {
        let body = json!({"code": -400, "message": "请求错误", "data": null});
        let err = Envelope::<CardData>::parse("card", body)
            .unwrap()
            .into_data("card")
            .unwrap_err();
        assert!(matches!(err, ClientError::UpstreamRejected { code: -400, .. }));
    }

    #[test]
    fn test_into_data_requires_data() {
        let err = Envelope::<CardData>::parse("card", json!({"code": 0}))
            .unwrap()
            .into_data("card")
            .unwrap_err();
        assert!(matches!(err, ClientError::UnexpectedShape { .. }));
    }

    #[test]
    fn test_card_accepts_string_mid() {
        let body = json!({
            "code": 0,
            "message": "0",
            "data": {"card": {"mid": "2", "name": "碧诗", "face": "f.jpg", "fans": 10, "attention": 3}}
        });
        let card = Envelope::<CardData>::parse("card", body)
            .unwrap()
            .into_data("card")
            .unwrap()
            .card;
        assert_eq!(card.mid, 2);
        assert_eq!(card.attention, 3);
    }

    #[test]
    fn test_invalid_id_is_unexpected_shape() {
        let body = json!({"code": 0, "data": {"card": {"mid": "two", "name": "x"}}});
        let err = Envelope::<CardData>::parse("card", body).unwrap_err();
        assert!(matches!(err, ClientError::UnexpectedShape { .. }));
    }

    #[test]
    fn test_followings_null_list() {
        let body = json!({"code": 0, "data": {"list": null, "total": 0}});
        let data = Envelope::<FollowingsData>::parse("followings", body)
            .unwrap()
            .into_data("followings")
            .unwrap();
        assert!(data.list.is_none());
    }

    #[test]
    fn test_search_without_result() {
        let body = json!({"code": 0, "data": {"numResults": 0}});
        let data = Envelope::<SearchData>::parse("search", body)
            .unwrap()
            .into_data("search")
            .unwrap();
        assert!(data.result.is_none());
    }

    #[test]
    fn test_medal_item_into_badge() {
        let item: MedalWallItem = serde_json::from_value(json!({
            "target_name": "嘉然今天吃什么",
            "medal_info": {
                "medal_name": "嘉心糖",
                "level": 21,
                "medal_color_border": 0x1a544b,
                "medal_color_start": 0x1a544b,
                "medal_color_end": 0x529d92
            }
        }))
        .unwrap();

        let badge = BadgeEntry::from(item);
        assert_eq!(badge.owner_display_name, "嘉然今天吃什么");
        assert_eq!(badge.level, 21);
        assert_eq!(badge.end_color, 0x529d92);
    }
}
