//! WBI request signing
//!
//! Endpoints under `/x/.../wbi/` require two extra query parameters: `wts`,
//! the signing time in unix seconds, and `w_rid`, an MD5 over the sorted,
//! encoded query followed by a "mixin key". The mixin key is a fixed
//! permutation of the `img_key` and `sub_key` published by the nav endpoint;
//! those keys rotate daily and fetching them is left to the caller.

use chrono::Utc;
use md5::{Digest, Md5};
use url::Url;

use super::UrlSigner;
use crate::{Error, Result};

const MIXIN_KEY_ENC_TAB: [usize; 64] = [
    46, 47, 18, 2, 53, 8, 23, 32, 15, 50, 10, 31, 58, 3, 45, 35, 27, 43, 5, 49, 33, 9, 42, 19, 29,
    28, 14, 39, 12, 38, 41, 13, 37, 48, 7, 16, 24, 55, 40, 61, 26, 17, 0, 1, 60, 51, 30, 4, 22, 25,
    54, 21, 56, 59, 6, 63, 57, 62, 11, 36, 20, 34, 44, 52,
];

const MIXIN_KEY_LEN: usize = 32;

/// Characters removed from parameter values before hashing
const FILTERED_CHARS: [char; 5] = ['!', '\'', '(', ')', '*'];

/// Signs URLs with the WBI scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WbiSigner {
    mixin_key: String,
}

impl WbiSigner {
    /// Derive the mixin key from `img_key` and `sub_key`
    pub fn new(img_key: &str, sub_key: &str) -> Result<Self> {
        let raw: Vec<char> = format!("{img_key}{sub_key}").chars().collect();
        if raw.len() < MIXIN_KEY_ENC_TAB.len() {
            return Err(Error::signing(format!(
                "WBI keys too short: expected {} characters, got {}",
                MIXIN_KEY_ENC_TAB.len(),
                raw.len()
            )));
        }

        let mixin_key = MIXIN_KEY_ENC_TAB
            .iter()
            .take(MIXIN_KEY_LEN)
            .map(|&i| raw[i])
            .collect();

        Ok(Self { mixin_key })
    }

    /// Derive keys from the nav endpoint's `wbi_img.img_url` and `wbi_img.sub_url`.
    ///
    /// Each key is the file stem of its image URL.
    pub fn from_key_urls(img_url: &str, sub_url: &str) -> Result<Self> {
        Self::new(&key_from_url(img_url)?, &key_from_url(sub_url)?)
    }

    pub fn mixin_key(&self) -> &str {
        &self.mixin_key
    }

    /// Sign `url` as of `wts` (unix seconds).
    ///
    /// Any `w_rid`/`wts` already present are replaced.
    pub fn sign_at(&self, url: &str, wts: i64) -> Result<String> {
        let mut parsed =
            Url::parse(url).map_err(|e| Error::signing(format!("invalid URL '{}': {}", url, e)))?;

        let mut params: Vec<(String, String)> = parsed
            .query_pairs()
            .filter(|(k, _)| k != "w_rid" && k != "wts")
            .map(|(k, v)| (k.into_owned(), v.replace(FILTERED_CHARS, "")))
            .collect();
        params.push(("wts".to_string(), wts.to_string()));
        params.sort_by(|a, b| a.0.cmp(&b.0));

        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
            .collect::<Vec<_>>()
            .join("&");

        let digest = Md5::digest(format!("{}{}", query, self.mixin_key).as_bytes());
        let w_rid = hex::encode(digest);

        parsed.set_query(Some(&format!("{}&w_rid={}", query, w_rid)));
        Ok(parsed.into())
    }
}

impl UrlSigner for WbiSigner {
    fn sign(&self, url: &str) -> Result<String> {
        self.sign_at(url, Utc::now().timestamp())
    }
}

fn key_from_url(url: &str) -> Result<String> {
    let parsed =
        Url::parse(url).map_err(|e| Error::signing(format!("invalid key URL '{}': {}", url, e)))?;
    let file = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();
    let stem = file.split('.').next().unwrap_or_default();
    if stem.is_empty() {
        return Err(Error::signing(format!("no key in URL '{}'", url)));
    }
    Ok(stem.to_string())
}

/// Percent-encode like `encodeURIComponent` minus the characters already filtered out
fn encode_component(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
        .replace("%7E", "~")
}
