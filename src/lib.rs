//! bilibili session client
//!
//! An authenticated HTTP client layer for the bilibili web API. The API wants
//! a landing-page session cookie (`buvid3`) on every call and a WBI signature
//! on many endpoints; this crate bootstraps the former exactly once per
//! session and assembles requests that carry both.
//!
//! # Architecture
//!
//! - [`session::BiliClient`] holds the cookie state and performs the one-shot
//!   bootstrap, governed by a cancellation token.
//! - [`session::BiliClient::build_request`] signs the URL, attaches cookies and
//!   identifying headers, and returns a request bound to that token.
//! - [`session::Transport`] is the only path to the network, so tests and
//!   callers can inject their own.
//! - [`signing::UrlSigner`] is the signing seam; [`signing::WbiSigner`]
//!   implements the vendor's WBI scheme.
//!
//! # Usage
//!
//! ```bash
//! bili-session bootstrap
//! bili-session request "https://api.bilibili.com/x/web-interface/nav" --no-sign --bootstrap
//! ```
//!
//! # Examples
//!
//! ```rust
//! use bilibili_session::{BiliClient, ClientOptions, Cookie, RequestOptions};
//!
//! let client = BiliClient::new(vec![Cookie::new("SESSDATA", "secret")], ClientOptions::default());
//! let request = client
//!     .build_request("GET", "https://api.bilibili.com/x/web-interface/nav", None, RequestOptions::unsigned())
//!     .unwrap();
//! assert_eq!(request.headers()["cookie"], "SESSDATA=secret");
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod session;
pub mod signing;

pub use config::{ConfigLoader, Settings};
pub use error::{Error, Result};
pub use session::{
    AssembledRequest, BiliClient, BootstrapState, ClientOptions, Cookie, RequestOptions,
    ReqwestTransport, Transport,
};
pub use signing::{FnSigner, UrlSigner, WbiSigner};
