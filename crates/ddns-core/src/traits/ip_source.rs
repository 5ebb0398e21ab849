// # IP Source Trait
//
// Defines the interface for resolving the caller's current public address.
//
// ## Implementations
//
// - HTTP "what is my IP" services: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> ddns_core::Result<()> {
//     let source = /* IpSource implementation */;
//     let current_ip = source.current().await?;
//     println!("Current IP: {}", current_ip);
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for IP source implementations
///
/// Only IPv4 is resolved: the updater manages A records.
///
/// Implementations perform a single lookup per call. They do not retry,
/// poll or cache; a failed lookup fails the run.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current IP address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The current IP address
    /// - `Err(Error)`: If unable to determine the current IP
    async fn current(&self) -> Result<Ipv4Addr, crate::Error>;
}
