//! HTTP transport abstraction
//!
//! The session never talks to the network directly: bootstrap and dispatch go
//! through a [`Transport`], so tests can substitute a double and callers can
//! bring their own configured client.

use crate::{Result, config::NetworkSettings};
use reqwest::{Client, Proxy, Request, Response};
use std::time::Duration;

/// Executes one HTTP request
#[async_trait::async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Send the request and return the response, or a transport error
    async fn execute(&self, request: Request) -> Result<Response>;
}

/// Default transport backed by a [`reqwest::Client`]
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Wrap an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from network settings (proxy, timeouts)
    pub fn from_settings(network: &NetworkSettings, proxy_url: Option<&str>) -> Result<Self> {
        let mut client_builder = Client::builder()
            .connect_timeout(Duration::from_secs(network.connect_timeout))
            .timeout(Duration::from_secs(network.request_timeout));

        if let Some(proxy_url) = proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                crate::Error::config("proxy", format!("Invalid proxy URL '{}': {}", proxy_url, e))
            })?;
            client_builder = client_builder.proxy(proxy);
        }

        let client = client_builder.build().map_err(|e| {
            crate::Error::config("network", format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self { client })
    }

    /// Get the configured HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: Request) -> Result<Response> {
        tracing::trace!(method = %request.method(), url = %request.url(), "executing request");
        Ok(self.client.execute(request).await?)
    }
}
