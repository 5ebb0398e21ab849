// # HTTP IP Source
//
// This crate resolves the caller's public IPv4 address by asking an
// external "what is my IP" service (e.g., ifconfig.me, icanhazip.com).
//
// ## Behaviour
//
// - One GET per lookup, no caching, no polling
// - The response body is trimmed and must be a dotted-decimal IPv4 address
// - Transport failures and non-2xx statuses are network errors

use ddns_core::traits::IpSource;
use ddns_core::{Error, Result};

use std::net::Ipv4Addr;
use std::time::Duration;

/// HTTP-based IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL returning the IP as plain text (e.g., "http://ifconfig.me/ip")
    /// - `timeout`: Per-request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Fetch current IP from HTTP service
    async fn fetch_ip(&self) -> Result<Ipv4Addr> {
        tracing::debug!("Resolving current IP from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::network(format!("IP lookup request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(Error::network(format!(
                "IP lookup at {} returned HTTP {}",
                self.url,
                response.status()
            )));
        }

        let ip_text = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read IP lookup response: {}", e)))?;

        parse_ip(&ip_text)
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        self.fetch_ip().await
    }
}

/// Resolve the current public IP from `url` in a single request
pub async fn resolve(url: &str, timeout: Duration) -> Result<Ipv4Addr> {
    HttpIpSource::new(url, timeout)?.current().await
}

fn parse_ip(body: &str) -> Result<Ipv4Addr> {
    let ip_text = body.trim();
    ip_text
        .parse()
        .map_err(|_| Error::invalid_input(format!("Not an IPv4 address: '{}'", ip_text)))
}
