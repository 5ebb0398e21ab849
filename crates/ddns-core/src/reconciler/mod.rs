//! Record reconciler
//!
//! The Reconciler is responsible for:
//! - Resolving the current IP via IpSource
//! - Fetching the provider's current record
//! - Choosing exactly one of create, update or no-op
//!
//! ## Decision
//!
//! ```text
//!                 current_record()
//!                        │
//!         ┌──────────────┼───────────────────┐
//!         ▼              ▼                   ▼
//!       None      address == ip       address != ip
//!         │              │                   │
//!     create(ip)     (nothing)          update(ip)
//!         │              │                   │
//!      Created       Unchanged            Updated
//! ```
//!
//! The comparison is exact string equality against the canonical
//! dotted-decimal form of the resolved address. There is no retry and no
//! rollback: any error aborts the run.

use crate::error::Result;
use crate::traits::{DnsProvider, IpSource, ProviderResponse};
use std::fmt;
use std::net::Ipv4Addr;
use tracing::{debug, info};

/// Result of a reconciliation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Record did not exist and was created
    Created {
        /// The managed hostname
        hostname: String,
        /// The address the record now points at
        address: Ipv4Addr,
        /// Raw provider response, `None` in dry-run mode
        response: Option<ProviderResponse>,
    },
    /// Record already pointed at the current address
    Unchanged {
        /// The managed hostname
        hostname: String,
        /// The matching address
        address: Ipv4Addr,
    },
    /// Record existed with a different address and was updated
    Updated {
        /// The managed hostname
        hostname: String,
        /// The address the record pointed at before
        previous: String,
        /// The address the record now points at
        address: Ipv4Addr,
        /// Raw provider response, `None` in dry-run mode
        response: Option<ProviderResponse>,
    },
}

impl Outcome {
    /// The provider's raw response for create/update, if a call was made
    pub fn response(&self) -> Option<&ProviderResponse> {
        match self {
            Outcome::Created { response, .. } | Outcome::Updated { response, .. } => {
                response.as_ref()
            }
            Outcome::Unchanged { .. } => None,
        }
    }

    /// Whether this outcome required a create or update
    pub fn is_change(&self) -> bool {
        !matches!(self, Outcome::Unchanged { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Created {
                hostname,
                address,
                response,
            } => {
                writeln!(f, "DNS record does not exist. Creating record:")?;
                write!(f, "{} - {}", hostname, address)?;
                if response.is_none() {
                    write!(f, "\n[DRY-RUN] No changes made")?;
                }
                Ok(())
            }
            Outcome::Unchanged { address, .. } => {
                write!(f, "IPs match: {} == {}, doing nothing", address, address)
            }
            Outcome::Updated {
                hostname,
                previous,
                address,
                response,
            } => {
                writeln!(f, "DNS record does not match current IP. Updating record:")?;
                writeln!(f, "Old value: {} - {}", hostname, previous)?;
                write!(f, "New value: {} - {}", hostname, address)?;
                if response.is_none() {
                    write!(f, "\n[DRY-RUN] No changes made")?;
                }
                Ok(())
            }
        }
    }
}

/// Drives one create / update / no-op decision for a single hostname
///
/// ## Lifecycle
///
/// 1. Build the provider and IP source
/// 2. Create with [`Reconciler::new()`]
/// 3. Call [`Reconciler::run()`] once
///
/// ## Dry-Run Mode
///
/// With [`dry_run`](Self::dry_run) enabled the IP lookup and record lookup
/// still happen, but `create` and `update` are never called. The outcome
/// reports what would have been done, with no provider response.
pub struct Reconciler {
    /// IP source for the current address
    ip_source: Box<dyn IpSource>,

    /// DNS provider for the managed hostname
    provider: Box<dyn DnsProvider>,

    /// Skip mutating calls
    dry_run: bool,
}

impl Reconciler {
    /// Create a new reconciler in live mode
    pub fn new(ip_source: Box<dyn IpSource>, provider: Box<dyn DnsProvider>) -> Self {
        Self {
            ip_source,
            provider,
            dry_run: false,
        }
    }

    /// Enable or disable dry-run mode
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Resolve the current IP and reconcile the record against it
    pub async fn run(&mut self) -> Result<Outcome> {
        let ip = self.ip_source.current().await?;
        info!("Current IP: {}", ip);
        self.reconcile(ip).await
    }

    /// Reconcile the record against an already-resolved IP
    ///
    /// # Returns
    ///
    /// - `Ok(Outcome)`: Which branch was taken and the provider's response
    /// - `Err(Error)`: The first failure; nothing is retried or rolled back
    pub async fn reconcile(&mut self, ip: Ipv4Addr) -> Result<Outcome> {
        let hostname = self.provider.target().hostname().to_string();
        let provider_name = self.provider.provider_name();
        let mode = if self.dry_run { "DRY-RUN" } else { "LIVE" };

        debug!("Looking up {} record for {}", provider_name, hostname);

        match self.provider.current_record().await? {
            None => {
                info!("Creating record: {} -> {} [mode: {}]", hostname, ip, mode);
                let response = if self.dry_run {
                    None
                } else {
                    Some(self.provider.create(ip).await?)
                };
                Ok(Outcome::Created {
                    hostname,
                    address: ip,
                    response,
                })
            }
            Some(record) if record.address == ip.to_string() => {
                info!("Record already has correct IP: {} -> {}", hostname, ip);
                Ok(Outcome::Unchanged {
                    hostname,
                    address: ip,
                })
            }
            Some(record) => {
                info!(
                    "Updating record {}: {} -> {} (was: {}) [mode: {}]",
                    record.id, hostname, ip, record.address, mode
                );
                let response = if self.dry_run {
                    None
                } else {
                    Some(self.provider.update(ip).await?)
                };
                Ok(Outcome::Updated {
                    hostname,
                    previous: record.address,
                    address: ip,
                    response,
                })
            }
        }
    }
}
