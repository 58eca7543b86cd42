//! Configuration settings
//!
//! Provides configuration loading from environment variables and
//! configuration files, with documented defaults for every field.

use serde::{Deserialize, Serialize};

use crate::session::Cookie;

/// Landing page queried once per session to obtain the session cookie
pub const DEFAULT_LANDING_URL: &str = "https://www.bilibili.com/";

/// Referer sent with every assembled request
pub const DEFAULT_REFERER: &str = "https://www.bilibili.com";

/// Identifying User-Agent sent with the bootstrap and every assembled request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Name of the cookie issued by the landing page
pub const DEFAULT_SESSION_COOKIE: &str = "buvid3";

// Helper functions for serde defaults
fn default_landing_url() -> String {
    DEFAULT_LANDING_URL.to_string()
}

fn default_referer() -> String {
    DEFAULT_REFERER.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_session_cookie_name() -> String {
    DEFAULT_SESSION_COOKIE.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

/// Main configuration settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Vendor site identity and endpoints
    #[serde(default)]
    pub site: SiteSettings,
    /// Network configuration for the default transport
    #[serde(default)]
    pub network: NetworkSettings,
    /// WBI signing keys
    #[serde(default)]
    pub signing: SigningSettings,
    /// Initial session cookies
    #[serde(default)]
    pub session: SessionSettings,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Vendor site identity: where to bootstrap and how requests identify themselves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSettings {
    /// Landing page fetched by the session bootstrap
    #[serde(default = "default_landing_url")]
    pub landing_url: String,
    /// Referer header value
    #[serde(default = "default_referer")]
    pub referer: String,
    /// User-Agent header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Set-Cookie entry extracted from the landing page
    #[serde(default = "default_session_cookie_name")]
    pub session_cookie_name: String,
}

/// Network and proxy configuration
///
/// Only consulted when building the default transport. Timeouts belong to
/// the transport; the session layer imposes none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// HTTPS proxy URL
    #[serde(default)]
    pub https_proxy: Option<String>,
    /// HTTP proxy URL
    #[serde(default)]
    pub http_proxy: Option<String>,
    /// All protocols proxy URL
    #[serde(default)]
    pub all_proxy: Option<String>,
    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

/// WBI key material. Both keys or neither.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningSettings {
    /// `img_key` from the nav endpoint's `wbi_img.img_url`
    #[serde(default)]
    pub img_key: Option<String>,
    /// `sub_key` from the nav endpoint's `wbi_img.sub_url`
    #[serde(default)]
    pub sub_key: Option<String>,
}

/// Cookies the session starts with
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default)]
    pub cookies: Vec<Cookie>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable verbose logging
    #[serde(default)]
    pub verbose: bool,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            landing_url: default_landing_url(),
            referer: default_referer(),
            user_agent: default_user_agent(),
            session_cookie_name: default_session_cookie_name(),
        }
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            https_proxy: None,
            http_proxy: None,
            all_proxy: None,
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            verbose: false,
        }
    }
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut settings = Self::default();

        if let Ok(url) = std::env::var("BILI_LANDING_URL") {
            settings.site.landing_url = url;
        }

        if let Ok(user_agent) = std::env::var("BILI_USER_AGENT") {
            settings.site.user_agent = user_agent;
        }

        settings.signing.img_key = std::env::var("BILI_WBI_IMG_KEY").ok();
        settings.signing.sub_key = std::env::var("BILI_WBI_SUB_KEY").ok();

        if let Ok(sessdata) = std::env::var("BILI_SESSDATA") {
            settings.session.cookies.push(Cookie::new("SESSDATA", sessdata));
        }

        settings.network.https_proxy = std::env::var("HTTPS_PROXY").ok();
        settings.network.http_proxy = std::env::var("HTTP_PROXY").ok();
        settings.network.all_proxy = std::env::var("ALL_PROXY").ok();

        if let Ok(timeout) = std::env::var("BILI_REQUEST_TIMEOUT") {
            settings.network.request_timeout = timeout.parse().map_err(|e| {
                crate::Error::config("BILI_REQUEST_TIMEOUT", &format!("Invalid timeout: {}", e))
            })?;
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            settings.logging.level = level;
        }

        if let Ok(verbose) = std::env::var("VERBOSE") {
            settings.logging.verbose = verbose.parse().unwrap_or(false);
        }

        Ok(settings)
    }

    /// Load settings from configuration file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config("file", &format!("Failed to read config file: {}", e))
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| {
            crate::Error::config("file", &format!("Failed to parse config file: {}", e))
        })?;

        Ok(settings)
    }

    /// Merge settings with environment variable overrides
    pub fn merge_with_env(mut self) -> crate::Result<Self> {
        let env_settings = Self::from_env()?;
        let defaults = Self::default();

        // Merge only non-default values from environment
        if env_settings.site.landing_url != defaults.site.landing_url {
            self.site.landing_url = env_settings.site.landing_url;
        }

        if env_settings.site.user_agent != defaults.site.user_agent {
            self.site.user_agent = env_settings.site.user_agent;
        }

        if env_settings.network.request_timeout != defaults.network.request_timeout {
            self.network.request_timeout = env_settings.network.request_timeout;
        }

        if env_settings.logging.level != defaults.logging.level {
            self.logging.level = env_settings.logging.level;
        }

        if std::env::var("VERBOSE").is_ok() {
            self.logging.verbose = env_settings.logging.verbose;
        }

        // Keys and proxies always override if present
        if env_settings.signing.img_key.is_some() {
            self.signing.img_key = env_settings.signing.img_key;
        }
        if env_settings.signing.sub_key.is_some() {
            self.signing.sub_key = env_settings.signing.sub_key;
        }
        if env_settings.network.https_proxy.is_some() {
            self.network.https_proxy = env_settings.network.https_proxy;
        }
        if env_settings.network.http_proxy.is_some() {
            self.network.http_proxy = env_settings.network.http_proxy;
        }
        if env_settings.network.all_proxy.is_some() {
            self.network.all_proxy = env_settings.network.all_proxy;
        }

        // Env cookies are appended after the file's cookies
        self.session.cookies.extend(env_settings.session.cookies);

        Ok(self)
    }

    /// Get effective proxy URL based on priority
    pub fn get_proxy_url(&self) -> Option<String> {
        self.network
            .https_proxy
            .as_ref()
            .or(self.network.http_proxy.as_ref())
            .or(self.network.all_proxy.as_ref())
            .cloned()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> crate::Result<()> {
        for (name, value) in [
            ("landing_url", &self.site.landing_url),
            ("referer", &self.site.referer),
        ] {
            if let Err(e) = url::Url::parse(value) {
                return Err(crate::Error::config(
                    name,
                    &format!("Invalid URL '{}': {}", value, e),
                ));
            }
        }

        if self.site.session_cookie_name.is_empty() {
            return Err(crate::Error::config(
                "session_cookie_name",
                "Session cookie name cannot be empty",
            ));
        }

        if self.network.connect_timeout == 0 || self.network.request_timeout == 0 {
            return Err(crate::Error::config(
                "timeout",
                "Network timeouts cannot be 0",
            ));
        }

        match (&self.signing.img_key, &self.signing.sub_key) {
            (Some(_), None) | (None, Some(_)) => {
                return Err(crate::Error::config(
                    "signing",
                    "img_key and sub_key must be configured together",
                ));
            }
            _ => {}
        }

        // Validate log level
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(crate::Error::config(
                    "log_level",
                    &format!("Invalid log level: {}", self.logging.level),
                ));
            }
        }

        // Validate proxy URLs if present
        for (name, proxy_url) in [
            ("https_proxy", &self.network.https_proxy),
            ("http_proxy", &self.network.http_proxy),
            ("all_proxy", &self.network.all_proxy),
        ]
        .iter()
        {
            if let Some(url_str) = proxy_url
                && let Err(e) = url::Url::parse(url_str)
            {
                return Err(crate::Error::config(
                    *name,
                    &format!("Invalid proxy URL '{}': {}", url_str, e),
                ));
            }
        }

        Ok(())
    }
}
