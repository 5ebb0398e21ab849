//! Core traits for the DDNS updater
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Resolve the current public IP address
//! - [`DnsProvider`]: Look up, create and update one A record

pub mod dns_provider;
pub mod ip_source;

pub use dns_provider::{DnsProvider, DnsRecord, ProviderResponse};
pub use ip_source::IpSource;
