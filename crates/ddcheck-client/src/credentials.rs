//! Session credentials sent with credentialed requests.

use std::fmt;

/// Cookie attributes that are not cookies themselves.
const COOKIE_ATTRIBUTES: [&str; 9] = [
    "path", "domain", "expires", "max-age", "secure", "httponly", "samesite", "comment",
    "version",
];

/// Operator-supplied session cookies.
///
/// Parsed from a `name=value; name2=value2` string as copied from a browser.
/// Values are never printed by the `Debug` impl.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    cookies: Vec<(String, String)>,
}

impl Credentials {
    /// No cookies.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Parses a raw cookie string. Malformed pairs and attributes are dropped.
    pub fn from_cookie_string(raw: &str) -> Self {
        let cookies = raw
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.split_once('=')?;
                let name = name.trim();
                let value = value.trim().trim_matches('"');
                if name.is_empty() || COOKIE_ATTRIBUTES.contains(&name.to_ascii_lowercase().as_str()) {
                    return None;
                }
                Some((name.to_string(), value.to_string()))
            })
            .collect();

        Self { cookies }
    }

    /// Returns true if no cookies are configured.
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Looks up a cookie by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value for a `Cookie` request header, if any cookies are set.
    pub fn header_value(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(n, v)| format!("{}={}", n, v))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.cookies.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("Credentials").field("cookies", &names).finish()
    }
}
