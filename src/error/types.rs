//! Error types for the session client
//!
//! Every failure is returned to the immediate caller. Variants carry owned
//! messages so the type is `Clone`: the single bootstrap outcome is cached and
//! handed to every caller that waited on it.

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The landing-page request failed at the transport level
    #[error("Session bootstrap request failed: {message}")]
    BootstrapTransport {
        /// Transport failure description
        message: String,
    },

    /// The landing-page response carried no session cookie
    #[error("Session cookie '{name}' missing from landing page response")]
    SessionCookieMissing {
        /// Name of the cookie that was expected
        name: String,
    },

    /// The URL signer rejected the URL or failed internally
    #[error("URL signing failed: {message}")]
    Signing {
        /// Error message from the signer
        message: String,
    },

    /// The outgoing request could not be built from method, URL and body
    #[error("Request construction failed: {message}")]
    RequestConstruction {
        /// Error message describing the invalid input
        message: String,
    },

    /// Dispatching an assembled request failed
    #[error("Transport error: {message}")]
    Transport {
        /// Transport failure description
        message: String,
    },

    /// The session's cancellation scope fired
    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration errors
    #[error("Configuration error in {field}: {message}")]
    Config {
        /// The configuration field that has an error
        field: String,
        /// Error message describing the issue
        message: String,
    },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a bootstrap transport error
    pub fn bootstrap_transport<S: Into<String>>(message: S) -> Self {
        Self::BootstrapTransport {
            message: message.into(),
        }
    }

    /// Create a missing session cookie error
    pub fn session_cookie_missing<S: Into<String>>(name: S) -> Self {
        Self::SessionCookieMissing { name: name.into() }
    }

    /// Create a signing error
    pub fn signing<S: Into<String>>(message: S) -> Self {
        Self::Signing {
            message: message.into(),
        }
    }

    /// Create a request construction error
    pub fn request_construction<S: Into<String>>(message: S) -> Self {
        Self::RequestConstruction {
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from the cancellation scope
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Get error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            Error::BootstrapTransport { .. } => "bootstrap_transport",
            Error::SessionCookieMissing { .. } => "session_cookie_missing",
            Error::Signing { .. } => "signing",
            Error::RequestConstruction { .. } => "request_construction",
            Error::Transport { .. } => "transport",
            Error::Cancelled => "cancelled",
            Error::Config { .. } => "config",
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::config("field", "test config error");
        assert!(matches!(err, Error::Config { .. }));
        assert_eq!(
            err.to_string(),
            "Configuration error in field: test config error"
        );
    }

    #[test]
    fn test_session_cookie_missing_error() {
        let err = Error::session_cookie_missing("buvid3");
        assert_eq!(
            err.to_string(),
            "Session cookie 'buvid3' missing from landing page response"
        );
        assert_eq!(err.category(), "session_cookie_missing");
    }

    #[test]
    fn test_signing_error() {
        let err = Error::signing("bad query");
        assert!(matches!(err, Error::Signing { .. }));
        assert!(err.to_string().contains("URL signing failed"));
    }

    #[test]
    fn test_cancelled_error() {
        let err = Error::Cancelled;
        assert!(err.is_cancelled());
        assert!(!Error::transport("reset").is_cancelled());
        assert_eq!(err.category(), "cancelled");
    }

    #[test]
    fn test_clone_preserves_equality() {
        let err = Error::bootstrap_transport("connection refused");
        assert_eq!(err.clone(), err);
    }
}
