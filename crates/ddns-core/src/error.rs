//! Error types for the DDNS updater
//!
//! Every failure is fatal for the run: nothing in the core catches or
//! retries these, they propagate to the binary which reports them and exits.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure reaching an endpoint
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success response, or a malformed/empty response where a result was required
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message, including the raw payload where one was returned
        message: String,
    },

    /// An operation was invoked out of order
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Invalid input (hostname, resolved address)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a precondition error
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Map a non-success HTTP status from a provider API to an error
    ///
    /// `context` names the operation that failed ("Zone lookup", "Create record", ...).
    /// The raw response body is always carried so operators can diagnose
    /// auth or configuration problems.
    pub fn from_status(provider: &str, context: &str, status: u16, body: &str) -> Self {
        let message = match status {
            401 | 403 => format!(
                "{} failed: authentication rejected (invalid credentials or insufficient permissions). Status: {} - {}",
                context, status, body
            ),
            429 => format!(
                "{} failed: rate limit exceeded. Status: {} - {}",
                context, status, body
            ),
            500..=599 => format!(
                "{} failed: server error. Status: {} - {}",
                context, status, body
            ),
            _ => format!("{} failed: {} - {}", context, status, body),
        };
        Self::provider(provider, message)
    }
}
