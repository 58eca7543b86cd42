//! Request assembly
//!
//! Turns a method, URL and body into a ready-to-send request carrying the
//! session cookie, the caller's cookies and the identifying headers. Assembly
//! performs no I/O; dispatch goes through a [`Transport`].

use reqwest::header::{COOKIE, HeaderMap, REFERER, USER_AGENT};
use reqwest::{Body, Method, Request, Response};
use tokio_util::sync::CancellationToken;
use tracing::trace;
use url::Url;

use super::client::header_value;
use super::{BiliClient, Transport, cookie};
use crate::{Error, Result};

/// Per-call request configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    /// Pass the URL through the client's signer first. Defaults to `true`.
    pub sign: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self { sign: true }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with signing turned off
    pub fn unsigned() -> Self {
        Self { sign: false }
    }

    pub fn with_sign(mut self, sign: bool) -> Self {
        self.sign = sign;
        self
    }
}

/// A built request bound to its session's cancellation scope
#[derive(Debug)]
pub struct AssembledRequest {
    request: Request,
    cancellation: CancellationToken,
}

impl AssembledRequest {
    pub fn method(&self) -> &Method {
        self.request.method()
    }

    pub fn url(&self) -> &Url {
        self.request.url()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    pub fn body(&self) -> Option<&Body> {
        self.request.body()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Unwrap the request, detaching it from the cancellation scope
    pub fn into_inner(self) -> Request {
        self.request
    }

    /// Send through `transport`, failing with [`Error::Cancelled`] if the
    /// scope is cancelled before or while the request is in flight.
    pub async fn send(self, transport: &dyn Transport) -> Result<Response> {
        let Self {
            request,
            cancellation,
        } = self;

        tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(Error::Cancelled),
            result = transport.execute(request) => result,
        }
    }
}

impl BiliClient {
    /// Assemble a request.
    ///
    /// Order: sign the URL (if enabled), build the request, attach the session
    /// cookie, attach the caller's cookies in stored order, then set
    /// User-Agent and Referer. Signer errors are returned unchanged.
    ///
    /// The URL is parsed with [`Url`], so it comes out normalized: a lowercased
    /// host, and `/` as the path when none was given. An already-normalized
    /// URL is kept byte for byte.
    pub fn build_request(
        &self,
        method: &str,
        url: &str,
        body: Option<Body>,
        options: RequestOptions,
    ) -> Result<AssembledRequest> {
        let url = if options.sign {
            self.sign_url(url)?
        } else {
            url.to_string()
        };

        let method = Method::from_bytes(method.as_bytes()).map_err(|e| {
            Error::request_construction(format!("invalid method '{}': {}", method, e))
        })?;
        let parsed = Url::parse(&url)
            .map_err(|e| Error::request_construction(format!("invalid URL '{}': {}", url, e)))?;

        let mut request = Request::new(method, parsed);
        *request.body_mut() = body;

        let session_cookie = self.session_cookie();
        let cookies = self.cookies();
        let headers = request.headers_mut();
        if let Some(value) = cookie::header_value(session_cookie.iter().chain(cookies.iter())) {
            headers.insert(COOKIE, header_value(&value)?);
        }
        headers.insert(USER_AGENT, header_value(&self.site.user_agent)?);
        headers.insert(REFERER, header_value(&self.site.referer)?);

        trace!(method = %request.method(), url = %request.url(), "assembled request");

        Ok(AssembledRequest {
            request,
            cancellation: self.cancellation.clone(),
        })
    }

    fn sign_url(&self, url: &str) -> Result<String> {
        match &self.signer {
            Some(signer) => signer.sign(url),
            None => Err(Error::signing("no URL signer configured")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ClientOptions, Cookie};
    use crate::signing::FnSigner;
    use std::sync::Arc;

    #[test]
    fn test_request_options_default_signs() {
        assert!(RequestOptions::default().sign);
        assert!(RequestOptions::new().sign);
        assert!(!RequestOptions::unsigned().sign);
        assert!(!RequestOptions::new().with_sign(false).sign);
    }

    #[test]
    fn test_headers_are_set() {
        let client = BiliClient::new(Vec::new(), ClientOptions::default());
        let request = client
            .build_request("GET", "https://api.bilibili.com/x", None, RequestOptions::unsigned())
            .unwrap();

        assert_eq!(request.headers()[REFERER], "https://www.bilibili.com");
        assert_eq!(
            request.headers()[USER_AGENT],
            crate::config::settings::DEFAULT_USER_AGENT
        );
        assert!(request.headers().get(COOKIE).is_none());
    }

    #[test]
    fn test_unsigned_url_is_normalized_by_parsing() {
        let client = BiliClient::new(Vec::new(), ClientOptions::default());

        let request = client
            .build_request("GET", "https://API.bilibili.com", None, RequestOptions::unsigned())
            .unwrap();
        assert_eq!(request.url().as_str(), "https://api.bilibili.com/");

        let input = "https://api.bilibili.com/x/web-interface/nav?a=1&b=%20";
        let request = client
            .build_request("GET", input, None, RequestOptions::unsigned())
            .unwrap();
        assert_eq!(request.url().as_str(), input);
    }

    #[test]
    fn test_missing_signer_is_signing_error() {
        let client = BiliClient::new(Vec::new(), ClientOptions::default());
        let err = client
            .build_request("GET", "https://api.bilibili.com/x", None, RequestOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Signing { .. }));
    }

    #[test]
    fn test_invalid_method() {
        let client = BiliClient::new(Vec::new(), ClientOptions::default());
        let err = client
            .build_request("GE T", "https://api.bilibili.com/x", None, RequestOptions::unsigned())
            .unwrap_err();
        assert!(matches!(err, Error::RequestConstruction { .. }));
    }

    #[test]
    fn test_malformed_signed_url() {
        let signer = Arc::new(FnSigner::new(|_: &str| Ok("no scheme here".to_string())));
        let client = BiliClient::new(Vec::new(), ClientOptions::default().with_signer(signer));
        let err = client
            .build_request("GET", "https://api.bilibili.com/x", None, RequestOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::RequestConstruction { .. }));
    }

    #[test]
    fn test_body_is_attached() {
        let client = BiliClient::new(vec![Cookie::new("bili_jct", "csrf")], ClientOptions::default());
        let request = client
            .build_request(
                "POST",
                "https://api.bilibili.com/x/v2/reply/add",
                Some(Body::from("oid=1&type=1")),
                RequestOptions::unsigned(),
            )
            .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(
            request.body().and_then(Body::as_bytes),
            Some(&b"oid=1&type=1"[..])
        );
        assert_eq!(request.headers()[COOKIE], "bili_jct=csrf");
    }
}
