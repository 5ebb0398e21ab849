// # Gandi LiveDNS Provider
//
// This crate provides the Gandi variant of `ddns_core::DnsProvider`.
//
// ## Behaviour
//
// - Zone and record name come from splitting the hostname; there is no
//   network round-trip at construction. The zone apex is addressed as `@`.
// - Lookup: 200 means found, 404 means no record, anything else is fatal.
// - Create and update both send the single-address value set with ttl=300.
// - Records are addressed by name, not by a provider-assigned id.
//
// ## Security Requirements
//
// - The API key is sent as `Authorization: Apikey <key>`
// - The API key NEVER appears in logs or Debug output
//
// ## API Reference
//
// - LiveDNS v5: https://api.gandi.net/docs/livedns/
// - Record by name and type: `/domains/:fqdn/records/:rrset_name/:rrset_type`

use async_trait::async_trait;
use ddns_core::traits::{DnsProvider, DnsRecord, ProviderResponse};
use ddns_core::{DnsTarget, Error, Result};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Gandi LiveDNS API base URL
pub const GANDI_API_BASE: &str = "https://api.gandi.net/v5/livedns";

/// TTL sent on create and update
const RECORD_TTL: u32 = 300;

/// LiveDNS name for the zone apex
const APEX_NAME: &str = "@";

const PROVIDER: &str = "gandi";

#[derive(Debug, Deserialize)]
struct Rrset {
    rrset_name: String,
    #[serde(default)]
    rrset_values: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RrsetPayload {
    rrset_values: Vec<String>,
    rrset_ttl: u32,
}

/// Gandi LiveDNS provider bound to one hostname
pub struct GandiProvider {
    target: DnsTarget,
    /// ⚠️ NEVER log this value
    api_key: String,
    client: reqwest::Client,
    base_url: String,
    /// Record name captured by the last successful `current_record` lookup
    record_name: Option<String>,
}

// Custom Debug implementation that hides the API key
impl fmt::Debug for GandiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GandiProvider")
            .field("api_key", &"<REDACTED>")
            .field("zone", &self.target.zone())
            .field("record", &self.rrset_name())
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GandiProvider {
    /// Create a provider for the production LiveDNS API
    pub fn new(target: DnsTarget, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::with_base_url(target, api_key, timeout, GANDI_API_BASE)
    }

    /// Create a provider for a LiveDNS-compatible API at `base_url`
    pub fn with_base_url(
        target: DnsTarget,
        api_key: impl Into<String>,
        timeout: Duration,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::config("Gandi API key cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            target,
            api_key,
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            record_name: None,
        })
    }

    /// The record name derived from the hostname
    pub fn rrset_name(&self) -> &str {
        if self.target.is_apex() {
            APEX_NAME
        } else {
            self.target.record()
        }
    }

    fn record_url(&self, name: &str) -> String {
        format!(
            "{}/domains/{}/records/{}/A",
            self.base_url,
            self.target.zone(),
            name
        )
    }

    fn authorization(&self) -> String {
        format!("Apikey {}", self.api_key)
    }

    /// Send a create/update request and return its body
    async fn write(&self, request: reqwest::RequestBuilder, context: &str) -> Result<ProviderResponse> {
        let response = request
            .header("Authorization", self.authorization())
            .send()
            .await
            .map_err(|e| Error::network(format!("{} request failed: {}", context, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("{} response unreadable: {}", context, e)))?;

        if !status.is_success() {
            return Err(Error::from_status(PROVIDER, context, status.as_u16(), &body));
        }

        Ok(parse_body(&body))
    }

    fn payload(ip: Ipv4Addr) -> RrsetPayload {
        RrsetPayload {
            rrset_values: vec![ip.to_string()],
            rrset_ttl: RECORD_TTL,
        }
    }
}

/// Keep whatever the API returned: JSON as-is, anything else as a string
fn parse_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

#[async_trait]
impl DnsProvider for GandiProvider {
    /// # API Call
    ///
    /// ```http
    /// GET /domains/example.com/records/home/A
    /// Authorization: Apikey <key>
    /// ```
    async fn current_record(&mut self) -> Result<Option<DnsRecord>> {
        let url = self.record_url(self.rrset_name());
        tracing::debug!(
            "Looking up A record {} in zone {}",
            self.rrset_name(),
            self.target.zone()
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.authorization())
            .send()
            .await
            .map_err(|e| Error::network(format!("Record lookup request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!("No A record for {}", self.target);
            self.record_name = None;
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Record lookup response unreadable: {}", e)))?;

        // Only 200 carries an rrset
        if status != StatusCode::OK {
            return Err(Error::from_status(PROVIDER, "Record lookup", status.as_u16(), &body));
        }

        let rrset: Rrset = serde_json::from_str(&body).map_err(|e| {
            Error::provider(
                PROVIDER,
                format!("Record lookup: unexpected response format ({}): {}", e, body),
            )
        })?;

        let address = rrset.rrset_values.into_iter().next().ok_or_else(|| {
            Error::provider(
                PROVIDER,
                format!("Record lookup returned no values for {}", self.target),
            )
        })?;

        tracing::debug!("Found record: {}", rrset.rrset_name);
        self.record_name = Some(rrset.rrset_name.clone());
        Ok(Some(DnsRecord::new(rrset.rrset_name, address)))
    }

    /// # API Call
    ///
    /// ```http
    /// POST /domains/example.com/records/home/A
    /// {"rrset_values": ["1.2.3.4"], "rrset_ttl": 300}
    /// ```
    async fn create(&self, ip: Ipv4Addr) -> Result<ProviderResponse> {
        let request = self
            .client
            .post(self.record_url(self.rrset_name()))
            .json(&Self::payload(ip));
        let response = self.write(request, "Create record").await?;

        tracing::info!("DNS record created: {} -> {}", self.target, ip);
        Ok(response)
    }

    /// # API Call
    ///
    /// ```http
    /// PUT /domains/example.com/records/home/A
    /// {"rrset_values": ["1.2.3.4"], "rrset_ttl": 300}
    /// ```
    async fn update(&self, ip: Ipv4Addr) -> Result<ProviderResponse> {
        let name = self.record_name.as_deref().ok_or_else(|| {
            Error::precondition(format!(
                "update of {} requires a prior lookup that found the record",
                self.target
            ))
        })?;

        let request = self
            .client
            .put(self.record_url(name))
            .json(&Self::payload(ip));
        let response = self.write(request, "Update record").await?;

        tracing::info!("DNS record updated: {} -> {}", self.target, ip);
        Ok(response)
    }

    fn target(&self) -> &DnsTarget {
        &self.target
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
