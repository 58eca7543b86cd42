//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bilibili_session::{
    ClientOptions, ReqwestTransport, Result, Transport, config::SiteSettings,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const BUVID3: &str = "6C1F2E4A-1B2C-3D4E-5F60-718293A4B5C6infoc";

/// Transport double that counts calls before delegating to reqwest
#[derive(Debug, Default)]
pub struct CountingTransport {
    inner: ReqwestTransport,
    calls: AtomicUsize,
}

impl CountingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Transport for CountingTransport {
    async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.execute(request).await
    }
}

/// Test configuration factory
pub struct TestConfig;

impl TestConfig {
    /// Site settings pointing the landing page at a mock server
    pub fn site(server: &MockServer) -> SiteSettings {
        SiteSettings {
            landing_url: format!("{}/", server.uri()),
            ..SiteSettings::default()
        }
    }

    /// Client options against a mock server with the given transport
    pub fn options(server: &MockServer, transport: Arc<dyn Transport>) -> ClientOptions {
        ClientOptions::default()
            .with_site(Self::site(server))
            .with_transport(transport)
    }
}

/// Mock server factory
pub struct MockServerFactory;

impl MockServerFactory {
    /// Create new mock server
    pub async fn new() -> MockServer {
        MockServer::start().await
    }

    /// Landing page that issues a `buvid3` cookie alongside others
    pub async fn setup_landing_page(server: &MockServer, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(Self::landing_response())
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    /// Landing page that answers slowly
    pub async fn setup_slow_landing_page(server: &MockServer, delay: Duration) {
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(Self::landing_response().set_delay(delay))
            .mount(server)
            .await;
    }

    /// Landing page without the session cookie
    pub async fn setup_landing_page_without_cookie(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .append_header("Set-Cookie", "b_nut=1700000000; path=/; domain=.bilibili.com")
                    .set_body_string("<html></html>"),
            )
            .expect(1)
            .mount(server)
            .await;
    }

    fn landing_response() -> ResponseTemplate {
        ResponseTemplate::new(200)
            .append_header("Set-Cookie", "b_nut=1700000000; path=/; domain=.bilibili.com")
            .append_header(
                "Set-Cookie",
                format!(
                    "buvid3={}; path=/; expires=Wed, 01 Jan 2031 00:00:00 GMT; domain=.bilibili.com",
                    BUVID3
                ),
            )
            .set_body_string("<html></html>")
    }
}

/// Test utilities
pub struct TestUtils;

impl TestUtils {
    /// Initialize test logging
    pub fn init_logger() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("debug")
            .try_init();
    }
}
