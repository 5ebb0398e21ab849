//! Test doubles and common utilities for reconciler contract tests
//!
//! The mocks record every provider call so tests can assert exactly which
//! mutations a run performed.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{DnsProvider, DnsRecord, IpSource, ProviderResponse};
use ddns_core::DnsTarget;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An IpSource that always returns the same address
pub struct FixedIpSource {
    ip: Ipv4Addr,
    call_count: Arc<AtomicUsize>,
}

impl FixedIpSource {
    pub fn new(ip: Ipv4Addr) -> Self {
        Self {
            ip,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared handle on the number of times current() was called
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.call_count)
    }
}

#[async_trait::async_trait]
impl IpSource for FixedIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.ip)
    }
}

/// An IpSource whose lookup always fails
pub struct UnreachableIpSource;

#[async_trait::async_trait]
impl IpSource for UnreachableIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        Err(Error::network("connection refused"))
    }
}

/// A provider call observed by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Lookup,
    Create { ip: Ipv4Addr },
    Update { id: String, ip: Ipv4Addr },
}

/// Shared view of the calls a MockDnsProvider received
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn creates(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Create { .. }))
            .count()
    }

    pub fn updates(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Update { .. }))
            .count()
    }

    pub fn mutations(&self) -> usize {
        self.creates() + self.updates()
    }
}

/// A DnsProvider that serves a fixed record and tracks calls
pub struct MockDnsProvider {
    target: DnsTarget,
    existing: Option<DnsRecord>,
    captured_id: Option<String>,
    fail_mutations: bool,
    log: CallLog,
}

impl MockDnsProvider {
    /// Create a provider whose lookup returns `existing`
    pub fn new(hostname: &str, existing: Option<DnsRecord>) -> (Self, CallLog) {
        let log = CallLog::default();
        let provider = Self {
            target: DnsTarget::parse(hostname).expect("valid test hostname"),
            existing,
            captured_id: None,
            fail_mutations: false,
            log: log.clone(),
        };
        (provider, log)
    }

    /// Make create/update return a provider error
    pub fn failing_mutations(mut self) -> Self {
        self.fail_mutations = true;
        self
    }

    fn respond(&self, action: &str) -> Result<ProviderResponse> {
        if self.fail_mutations {
            return Err(Error::from_status(
                "mock",
                action,
                400,
                r#"{"success":false,"errors":[{"message":"invalid content"}]}"#,
            ));
        }
        Ok(serde_json::json!({ "success": true, "action": action }))
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn current_record(&mut self) -> Result<Option<DnsRecord>> {
        self.log.push(Call::Lookup);
        self.captured_id = self.existing.as_ref().map(|r| r.id.clone());
        Ok(self.existing.clone())
    }

    async fn create(&self, ip: Ipv4Addr) -> Result<ProviderResponse> {
        self.log.push(Call::Create { ip });
        self.respond("create")
    }

    async fn update(&self, ip: Ipv4Addr) -> Result<ProviderResponse> {
        let id = self
            .captured_id
            .clone()
            .ok_or_else(|| Error::precondition("update called before a record was found"))?;
        self.log.push(Call::Update { id, ip });
        self.respond("update")
    }

    fn target(&self) -> &DnsTarget {
        &self.target
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// The address every scenario resolves
pub fn resolved_ip() -> Ipv4Addr {
    Ipv4Addr::new(203, 0, 113, 9)
}
