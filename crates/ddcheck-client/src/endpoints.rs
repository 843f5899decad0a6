//! Upstream endpoints and fixed request headers.

use std::time::Duration;

/// Navigation endpoint; advertises the current WBI key URLs.
pub const NAV_URL: &str = "https://api.bilibili.com/x/web-interface/nav";

/// User search (signed).
pub const SEARCH_URL: &str = "https://api.bilibili.com/x/web-interface/wbi/search/type";

/// User card with follower and following counts (unsigned).
pub const CARD_URL: &str = "https://api.bilibili.com/x/web-interface/card";

/// Paged follow relations (signed).
pub const FOLLOWINGS_URL: &str = "https://api.bilibili.com/x/relation/followings";

/// Fan-medal wall (unsigned).
pub const MEDAL_WALL_URL: &str = "https://api.live.bilibili.com/xlive/web-ucenter/user/MedalWall";

/// Desktop browser User-Agent sent with every request.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 \
     Safari/537.36 Edg/126.0.0.0";

/// Referer sent with every request.
pub const REFERER: &str = "https://www.bilibili.com/";

/// Timeout for nav, search, card and medal calls.
pub const DEFAULT_INFO_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for each follow-list page.
pub const DEFAULT_FOLLOW_TIMEOUT: Duration = Duration::from_secs(30);

/// Follow-list page size.
pub const DEFAULT_PAGE_SIZE: usize = 50;
