//! Configuration types for the DDNS updater
//!
//! A [`RunConfig`] describes one invocation: which provider, which hostname,
//! where to look up the current IP, and how long any single request may take.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default "what is my IP" service, returns the address as plain text
pub const DEFAULT_IP_URL: &str = "http://ifconfig.me/ip";

/// Default per-request HTTP timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for a single run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Fully-qualified hostname whose A record is managed
    pub hostname: String,

    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// URL returning the caller's public IP as plain text
    #[serde(default = "default_ip_url")]
    pub ip_url: String,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Look up records but skip create/update calls
    #[serde(default)]
    pub dry_run: bool,
}

impl RunConfig {
    /// Create a configuration with default IP URL and timeout
    pub fn new(hostname: impl Into<String>, provider: ProviderConfig) -> Self {
        Self {
            hostname: hostname.into(),
            provider,
            ip_url: default_ip_url(),
            timeout_secs: default_timeout_secs(),
            dry_run: false,
        }
    }

    /// Set the IP lookup URL
    pub fn with_ip_url(mut self, ip_url: impl Into<String>) -> Self {
        self.ip_url = ip_url.into();
        self
    }

    /// Set the per-request timeout in seconds
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// The per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        crate::DnsTarget::parse(&self.hostname)
            .map_err(|e| crate::Error::config(format!("Invalid hostname: {}", e)))?;

        if self.ip_url.is_empty() {
            return Err(crate::Error::config("IP lookup URL cannot be empty"));
        }
        if !self.ip_url.starts_with("http://") && !self.ip_url.starts_with("https://") {
            return Err(crate::Error::config(format!(
                "IP lookup URL must use HTTP or HTTPS scheme. Got: {}",
                self.ip_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Timeout must be > 0 seconds"));
        }

        self.provider.validate()
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare provider (global API key authentication)
    Cloudflare {
        /// Account email
        email: String,
        /// Global API key
        api_key: String,
    },

    /// Gandi LiveDNS provider
    Gandi {
        /// LiveDNS API key
        api_key: String,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudflare { email, api_key } => {
                if email.is_empty() {
                    return Err(crate::Error::config("Cloudflare account email cannot be empty"));
                }
                if api_key.is_empty() {
                    return Err(crate::Error::config("Cloudflare API key cannot be empty"));
                }
                Ok(())
            }
            ProviderConfig::Gandi { api_key } => {
                if api_key.is_empty() {
                    return Err(crate::Error::config("Gandi API key cannot be empty"));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &'static str {
        match self {
            ProviderConfig::Cloudflare { .. } => "cloudflare",
            ProviderConfig::Gandi { .. } => "gandi",
        }
    }
}

// Credentials never reach Debug output
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConfig::Cloudflare { email, .. } => f
                .debug_struct("Cloudflare")
                .field("email", email)
                .field("api_key", &"<REDACTED>")
                .finish(),
            ProviderConfig::Gandi { .. } => f
                .debug_struct("Gandi")
                .field("api_key", &"<REDACTED>")
                .finish(),
        }
    }
}

fn default_ip_url() -> String {
    DEFAULT_IP_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
