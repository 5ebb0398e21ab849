// # DNS Provider Trait
//
// Defines the interface for reading and writing one A record via a
// provider API.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
// - Gandi LiveDNS: `ddns-provider-gandi` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::DnsProvider;
//
// async fn sync(provider: &mut dyn DnsProvider, ip: std::net::Ipv4Addr) -> ddns_core::Result<()> {
//     match provider.current_record().await? {
//         None => { provider.create(ip).await?; }
//         Some(record) if record.address == ip.to_string() => {}
//         Some(_) => { provider.update(ip).await?; }
//     }
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Raw JSON payload returned by a provider's create/update call
///
/// Kept untyped: it is only displayed to the operator.
pub type ProviderResponse = serde_json::Value;

/// The provider's current view of the A record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// Identity used to address the record on update
    ///
    /// Provider-assigned for Cloudflare; the record name for Gandi.
    pub id: String,
    /// The address the record currently points at
    pub address: String,
}

impl DnsRecord {
    /// Create a new record view
    pub fn new(id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
        }
    }
}

/// Trait for DNS provider implementations
///
/// A provider instance is bound to a single hostname at construction. It owns
/// its credentials, URL construction and zone derivation; nothing is shared
/// between providers.
///
/// # Contract
///
/// - "Not found" is a normal outcome of [`current_record`](Self::current_record),
///   never an error.
/// - [`update`](Self::update) addresses the record found by the most recent
///   successful `current_record` call on the same instance. Calling it without
///   one is a [`Precondition`](crate::Error::Precondition) error.
/// - Every non-success response is returned as an error carrying the
///   provider's raw payload. Providers never retry.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Fetch the current A record for the target hostname
    ///
    /// # Returns
    ///
    /// - `Ok(None)`: No matching A record exists
    /// - `Ok(Some(record))`: The record, whose identity is remembered for `update`
    /// - `Err(Error)`: If the lookup failed
    async fn current_record(&mut self) -> Result<Option<DnsRecord>, crate::Error>;

    /// Create a new A record pointing at `ip`
    async fn create(&self, ip: Ipv4Addr) -> Result<ProviderResponse, crate::Error>;

    /// Point the previously looked-up A record at `ip`
    async fn update(&self, ip: Ipv4Addr) -> Result<ProviderResponse, crate::Error>;

    /// The hostname this provider manages
    fn target(&self) -> &crate::DnsTarget;

    /// Get the provider name (for logging/debugging)
    ///
    /// # Returns
    ///
    /// A static string identifying the provider (e.g., "cloudflare", "gandi")
    fn provider_name(&self) -> &'static str;
}
