//! # Session State
//!
//! [`BiliClient`] owns the caller's cookie list and the session cookie
//! derived from the vendor landing page.
//!
//! ## Bootstrap
//!
//! The landing page is fetched at most once per instance. The outcome, success
//! or failure, is cached in a [`OnceCell`]: concurrent callers wait on the
//! single attempt and all receive a clone of its result. A failed bootstrap is
//! terminal; construct a new client to try again.
//!
//! ```text
//! Unbootstrapped -> Bootstrapping -> Bootstrapped
//!                                 \-> Failed
//! ```
//!
//! ## Cancellation
//!
//! The client's [`CancellationToken`] governs the bootstrap request and every
//! request it assembles once that request is dispatched.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use bilibili_session::session::{BiliClient, ClientOptions, Cookie, RequestOptions};
//!
//! # tokio_test::block_on(async {
//! let client = BiliClient::new(vec![Cookie::new("SESSDATA", "...")], ClientOptions::default());
//! client.bootstrap().await?;
//!
//! let request = client.build_request(
//!     "GET",
//!     "https://api.bilibili.com/x/web-interface/nav",
//!     None,
//!     RequestOptions::unsigned(),
//! )?;
//! let response = client.execute(request).await?;
//! println!("{}", response.status());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # });
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::{Method, Request, Response};
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use super::{AssembledRequest, Cookie, ReqwestTransport, Transport};
use crate::{
    Error, Result,
    config::{Settings, SiteSettings},
    signing::{UrlSigner, WbiSigner},
};

/// Construction-time configuration for a [`BiliClient`]
///
/// | field          | default                                   |
/// |----------------|-------------------------------------------|
/// | `transport`    | [`ReqwestTransport::default()`]           |
/// | `cancellation` | a token nobody cancels                    |
/// | `signer`       | none; signed requests fail until set      |
/// | `site`         | [`SiteSettings::default()`]               |
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub transport: Arc<dyn Transport>,
    pub cancellation: CancellationToken,
    pub signer: Option<Arc<dyn UrlSigner>>,
    pub site: SiteSettings,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            transport: Arc::new(ReqwestTransport::default()),
            cancellation: CancellationToken::new(),
            signer: None,
            site: SiteSettings::default(),
        }
    }
}

impl ClientOptions {
    /// Build options from loaded settings: a proxied, timed-out reqwest
    /// transport and a WBI signer when keys are configured.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let proxy_url = settings.get_proxy_url();
        let transport = ReqwestTransport::from_settings(&settings.network, proxy_url.as_deref())?;

        let signer: Option<Arc<dyn UrlSigner>> =
            match (&settings.signing.img_key, &settings.signing.sub_key) {
                (Some(img_key), Some(sub_key)) => Some(Arc::new(WbiSigner::new(img_key, sub_key)?)),
                _ => None,
            };

        Ok(Self {
            transport: Arc::new(transport),
            cancellation: CancellationToken::new(),
            signer,
            site: settings.site.clone(),
        })
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn with_signer(mut self, signer: Arc<dyn UrlSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_site(mut self, site: SiteSettings) -> Self {
        self.site = site;
        self
    }
}

/// Observable bootstrap progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    Unbootstrapped,
    Bootstrapping,
    Bootstrapped,
    Failed,
}

/// Session state for one logical account
#[derive(Debug)]
pub struct BiliClient {
    pub(super) transport: Arc<dyn Transport>,
    pub(super) signer: Option<Arc<dyn UrlSigner>>,
    pub(super) cancellation: CancellationToken,
    pub(super) site: SiteSettings,
    pub(super) cookies: RwLock<Vec<Cookie>>,
    session_cookie: OnceCell<Result<Cookie>>,
    bootstrap_started: AtomicBool,
}

impl BiliClient {
    /// Create a client. No network I/O happens here.
    pub fn new(cookies: Vec<Cookie>, options: ClientOptions) -> Self {
        Self {
            transport: options.transport,
            signer: options.signer,
            cancellation: options.cancellation,
            site: options.site,
            cookies: RwLock::new(cookies),
            session_cookie: OnceCell::new(),
            bootstrap_started: AtomicBool::new(false),
        }
    }

    /// Fetch the landing page once and keep its session cookie.
    ///
    /// Every call, concurrent or later, observes the outcome of that single
    /// attempt. If the task driving the attempt is dropped mid-flight the
    /// attempt is recorded as [`Error::Cancelled`] instead of being re-issued.
    /// Callers waiting on that attempt then also get `Cancelled`, even though
    /// the client's cancellation token itself never fired.
    pub async fn bootstrap(&self) -> Result<Cookie> {
        self.session_cookie
            .get_or_init(|| async {
                if self.bootstrap_started.swap(true, Ordering::AcqRel) {
                    return Err(Error::Cancelled);
                }
                self.fetch_session_cookie().await
            })
            .await
            .clone()
    }

    async fn fetch_session_cookie(&self) -> Result<Cookie> {
        let url = Url::parse(&self.site.landing_url).map_err(|e| {
            Error::request_construction(format!(
                "invalid landing URL '{}': {}",
                self.site.landing_url, e
            ))
        })?;

        let mut request = Request::new(Method::GET, url);
        request
            .headers_mut()
            .insert(USER_AGENT, header_value(&self.site.user_agent)?);

        debug!(url = %self.site.landing_url, "requesting session cookie");

        let response = tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => return Err(Error::Cancelled),
            result = self.transport.execute(request) => result.map_err(|e| match e {
                Error::Cancelled => Error::Cancelled,
                other => Error::bootstrap_transport(other.to_string()),
            })?,
        };

        let name = &self.site.session_cookie_name;
        let cookie = response
            .cookies()
            .find(|c| c.name() == name.as_str())
            .map(Cookie::from)
            .ok_or_else(|| Error::session_cookie_missing(name.as_str()))?;

        debug!(cookie = %cookie.name, "session cookie acquired");
        Ok(cookie)
    }

    pub fn state(&self) -> BootstrapState {
        match self.session_cookie.get() {
            Some(Ok(_)) => BootstrapState::Bootstrapped,
            Some(Err(_)) => BootstrapState::Failed,
            None if self.bootstrap_started.load(Ordering::Acquire) => BootstrapState::Bootstrapping,
            None => BootstrapState::Unbootstrapped,
        }
    }

    /// The derived session cookie, if bootstrap succeeded
    pub fn session_cookie(&self) -> Option<Cookie> {
        self.session_cookie
            .get()
            .and_then(|result| result.as_ref().ok())
            .cloned()
    }

    /// Snapshot of the caller-supplied cookies, in order
    pub fn cookies(&self) -> Vec<Cookie> {
        self.cookies
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replace the caller-supplied cookies wholesale. The session cookie is untouched.
    pub fn set_cookies(&self, cookies: Vec<Cookie>) {
        *self
            .cookies
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = cookies;
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Dispatch an assembled request through this client's transport
    pub async fn execute(&self, request: AssembledRequest) -> Result<Response> {
        request.send(self.transport.as_ref()).await
    }
}

pub(super) fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::request_construction(format!("invalid header value '{}': {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client_is_unbootstrapped() {
        let client = BiliClient::new(vec![Cookie::new("a", "1")], ClientOptions::default());
        assert_eq!(client.state(), BootstrapState::Unbootstrapped);
        assert!(client.session_cookie().is_none());
        assert_eq!(client.cookies(), vec![Cookie::new("a", "1")]);
    }

    #[test]
    fn test_set_cookies_replaces_wholesale() {
        let client = BiliClient::new(vec![Cookie::new("a", "1")], ClientOptions::default());
        client.set_cookies(vec![Cookie::new("b", "2"), Cookie::new("c", "3")]);
        assert_eq!(
            client.cookies(),
            vec![Cookie::new("b", "2"), Cookie::new("c", "3")]
        );
    }

    #[test]
    fn test_options_from_settings_without_keys() {
        let options = ClientOptions::from_settings(&Settings::default()).unwrap();
        assert!(options.signer.is_none());
        assert!(!options.cancellation.is_cancelled());
        assert_eq!(options.site, SiteSettings::default());
    }

    #[test]
    fn test_options_from_settings_with_keys() {
        let mut settings = Settings::default();
        settings.signing.img_key = Some("7cd084941338484aae1ad9425b84077c".to_string());
        settings.signing.sub_key = Some("4932caff0ff746eab6f01bf08b70ac45".to_string());

        let options = ClientOptions::from_settings(&settings).unwrap();
        assert!(options.signer.is_some());
    }

    #[tokio::test]
    async fn test_bootstrap_after_cancel_never_touches_transport() {
        let token = CancellationToken::new();
        token.cancel();
        let mut site = SiteSettings::default();
        site.landing_url = "http://127.0.0.1:1/".to_string();

        let client = BiliClient::new(
            Vec::new(),
            ClientOptions::default()
                .with_cancellation(token)
                .with_site(site),
        );

        assert_eq!(client.bootstrap().await, Err(Error::Cancelled));
        assert_eq!(client.state(), BootstrapState::Failed);
        assert!(client.session_cookie().is_none());
    }

    #[tokio::test]
    async fn test_invalid_landing_url() {
        let mut site = SiteSettings::default();
        site.landing_url = "::not-a-url".to_string();
        let client = BiliClient::new(Vec::new(), ClientOptions::default().with_site(site));

        let err = client.bootstrap().await.unwrap_err();
        assert_eq!(err.category(), "request_construction");
    }
}
