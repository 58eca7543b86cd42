//! Cookie records
//!
//! A [`Cookie`] is an owned name/value pair plus the standard attributes a
//! `Set-Cookie` entry may carry. Only the pair is ever sent back; attributes
//! are kept so callers can inspect and persist what the server issued.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// SameSite attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

/// A cookie as issued by a server or supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    /// Max-Age in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<i64>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<SameSite>,
}

impl Cookie {
    /// Create a cookie with no attributes
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            expires: None,
            max_age: None,
            secure: false,
            http_only: false,
            same_site: None,
        }
    }

    /// Set domain
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Render as a `name=value` pair for a `Cookie` request header.
    ///
    /// CR and LF in the name become `-`. Value bytes outside the cookie-octet
    /// range are dropped, and a value containing a space or comma is quoted.
    pub fn header_pair(&self) -> String {
        let name: String = self
            .name
            .chars()
            .map(|c| if c == '\r' || c == '\n' { '-' } else { c })
            .collect();

        let value: String = self
            .value
            .chars()
            .filter(|&c| is_cookie_value_char(c))
            .collect();

        if value.contains([' ', ',']) {
            format!("{}=\"{}\"", name, value)
        } else {
            format!("{}={}", name, value)
        }
    }
}

fn is_cookie_value_char(c: char) -> bool {
    (' '..'\u{7f}').contains(&c) && c != '"' && c != ';' && c != '\\'
}

/// Join cookies into a single `Cookie` header value, preserving order
pub fn header_value<'a>(cookies: impl IntoIterator<Item = &'a Cookie>) -> Option<String> {
    let pairs: Vec<String> = cookies.into_iter().map(Cookie::header_pair).collect();
    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

impl From<reqwest::cookie::Cookie<'_>> for Cookie {
    fn from(cookie: reqwest::cookie::Cookie<'_>) -> Self {
        let same_site = if cookie.same_site_strict() {
            Some(SameSite::Strict)
        } else if cookie.same_site_lax() {
            Some(SameSite::Lax)
        } else {
            None
        };

        Self {
            name: cookie.name().to_string(),
            value: cookie.value().to_string(),
            domain: cookie.domain().map(str::to_string),
            path: cookie.path().map(str::to_string),
            expires: cookie.expires().map(DateTime::<Utc>::from),
            max_age: cookie
                .max_age()
                .and_then(|age| i64::try_from(age.as_secs()).ok()),
            secure: cookie.secure(),
            http_only: cookie.http_only(),
            same_site,
        }
    }
}

/// Parses `name=value`; attributes are not accepted here.
impl FromStr for Cookie {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = s.split_once('=').ok_or_else(|| {
            crate::Error::config("cookie", format!("Expected NAME=VALUE, got '{}'", s))
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(crate::Error::config("cookie", "Cookie name cannot be empty"));
        }
        Ok(Cookie::new(name, value.trim()))
    }
}
