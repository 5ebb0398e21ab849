//! Hostname to zone/record split
//!
//! The registrable zone is always the last two dot-separated labels of the
//! hostname. The remaining leading labels form the record name.

use crate::error::{Error, Result};
use std::fmt;

/// A fully-qualified hostname split into zone and record name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DnsTarget {
    hostname: String,
    zone: String,
    record: String,
}

impl DnsTarget {
    /// Split a hostname into its zone and record components
    ///
    /// A single trailing dot is accepted and stripped. Hostnames with fewer
    /// than two labels or with empty labels are rejected.
    ///
    /// ```
    /// use ddns_core::DnsTarget;
    ///
    /// let target = DnsTarget::parse("home.example.com").unwrap();
    /// assert_eq!(target.zone(), "example.com");
    /// assert_eq!(target.record(), "home");
    /// ```
    pub fn parse(hostname: &str) -> Result<Self> {
        let hostname = hostname.trim();
        let hostname = hostname.strip_suffix('.').unwrap_or(hostname);

        if hostname.is_empty() {
            return Err(Error::invalid_input("Hostname cannot be empty"));
        }

        let labels: Vec<&str> = hostname.split('.').collect();
        if labels.iter().any(|label| label.is_empty()) {
            return Err(Error::invalid_input(format!(
                "Hostname has an empty label: '{}'",
                hostname
            )));
        }
        if labels.len() < 2 {
            return Err(Error::invalid_input(format!(
                "Hostname must have at least two labels: '{}'",
                hostname
            )));
        }

        let split = labels.len() - 2;
        Ok(Self {
            hostname: hostname.to_string(),
            zone: labels[split..].join("."),
            record: labels[..split].join("."),
        })
    }

    /// The full hostname, without a trailing dot
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// The registrable zone (last two labels)
    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// The record name relative to the zone; empty for the zone apex
    pub fn record(&self) -> &str {
        &self.record
    }

    /// Whether the hostname is the zone apex itself
    pub fn is_apex(&self) -> bool {
        self.record.is_empty()
    }
}

impl fmt::Display for DnsTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hostname)
    }
}
