//! Session management for authenticated bilibili requests
//!
//! This module holds the session state (caller cookies plus the session
//! cookie derived from the landing page), the request assembler that signs
//! URLs and attaches cookies, and the transport seam used for all network I/O.

pub mod client;
pub mod cookie;
pub mod request;
pub mod transport;

pub use client::{BiliClient, BootstrapState, ClientOptions};
pub use cookie::{Cookie, SameSite};
pub use request::{AssembledRequest, RequestOptions};
pub use transport::{ReqwestTransport, Transport};
