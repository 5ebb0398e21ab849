// # ddns-core
//
// Core library for the one-shot dynamic DNS updater.
//
// ## Architecture Overview
//
// This library provides the provider-independent parts of a run:
// - **IpSource**: Trait for resolving the caller's current public IPv4 address
// - **DnsProvider**: Trait for looking up, creating and updating one A record
// - **DnsTarget**: Hostname split into registrable zone and record name
// - **Reconciler**: Decides create / update / no-op and reports the outcome
//
// ## Run Model
//
// 1. A provider is built for one hostname (Cloudflare resolves its zone here)
// 2. The IP source resolves the current address
// 3. The provider's current record is fetched
// 4. Exactly one of create, update or nothing happens
//
// Nothing is persisted between runs. An external scheduler drives repetition.

pub mod config;
pub mod error;
pub mod reconciler;
pub mod target;
pub mod traits;

// Re-export core types for convenience
pub use config::{ProviderConfig, RunConfig};
pub use error::{Error, Result};
pub use reconciler::{Outcome, Reconciler};
pub use target::DnsTarget;
pub use traits::{DnsProvider, DnsRecord, IpSource, ProviderResponse};
