//! URL signing
//!
//! Signing turns a URL into one carrying extra signature query parameters.
//! The session treats a signer as an opaque, deterministic function and
//! returns its errors untouched.

pub mod wbi;

pub use wbi::WbiSigner;

use crate::Result;
use std::fmt;

/// Transforms a URL into its signed form
pub trait UrlSigner: Send + Sync + fmt::Debug {
    /// Return the signed URL, or the reason the URL could not be signed
    fn sign(&self, url: &str) -> Result<String>;
}

/// Adapts a closure into a [`UrlSigner`]
pub struct FnSigner<F>(F);

impl<F> FnSigner<F>
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> UrlSigner for FnSigner<F>
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    fn sign(&self, url: &str) -> Result<String> {
        (self.0)(url)
    }
}

impl<F> fmt::Debug for FnSigner<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSigner").finish_non_exhaustive()
    }
}
