// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare variant of `ddns_core::DnsProvider`.
//
// ## Behaviour
//
// - Zone ID is resolved once, when the provider is connected, from the last
//   two labels of the hostname. No matching zone is a fatal error.
// - The current A record is looked up by exact hostname. A zero result count
//   means "no record", which is not an error.
// - Create sends ttl=120 and proxied=false; update addresses the record id
//   found by the last lookup.
// - No retry, no backoff, no caching across runs.
//
// ## Security Requirements
//
// - Account email and API key are sent as `X-Auth-Email` / `X-Auth-Key`
// - The API key NEVER appears in logs or Debug output
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...&type=A`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::traits::{DnsProvider, DnsRecord, ProviderResponse};
use ddns_core::{DnsTarget, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// TTL sent when creating a record
const CREATE_TTL: u32 = 120;

const PROVIDER: &str = "cloudflare";

/// Cloudflare global API key authentication
#[derive(Clone)]
pub struct CloudflareCredentials {
    email: String,
    /// ⚠️ NEVER log this value
    api_key: String,
}

impl CloudflareCredentials {
    /// Create credentials from account email and global API key
    pub fn new(email: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            api_key: api_key.into(),
        }
    }
}

impl fmt::Debug for CloudflareCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudflareCredentials")
            .field("email", &self.email)
            .field("api_key", &"<REDACTED>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    result: Vec<T>,
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    total_count: u64,
}

#[derive(Debug, Deserialize)]
struct Zone {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Record {
    id: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct RecordPayload<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    name: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    proxied: Option<bool>,
}

/// Authenticated access to the Cloudflare REST API
struct Api {
    client: reqwest::Client,
    base_url: String,
    credentials: CloudflareCredentials,
}

impl Api {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and return the JSON body of a successful response
    ///
    /// Non-2xx statuses and `"success": false` bodies both become provider
    /// errors carrying the raw payload.
    async fn send(&self, request: reqwest::RequestBuilder, context: &str) -> Result<Value> {
        let response = request
            .header("X-Auth-Email", &self.credentials.email)
            .header("X-Auth-Key", &self.credentials.api_key)
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

        let json: Value = serde_json::from_str(&body).map_err(|e| {
            Error::provider(
                PROVIDER,
                format!("{} returned invalid JSON ({}): {}", context, e, body),
            )
        })?;

        if json["success"] == Value::Bool(false) {
            return Err(Error::provider(
                PROVIDER,
                format!("{} rejected: {}", context, body),
            ));
        }

        Ok(json)
    }

    fn decode<T: for<'de> Deserialize<'de>>(json: Value, context: &str) -> Result<T> {
        serde_json::from_value(json).map_err(|e| {
            Error::provider(
                PROVIDER,
                format!("{}: unexpected response format: {}", context, e),
            )
        })
    }
}

/// Cloudflare DNS provider bound to one hostname
pub struct CloudflareProvider {
    target: DnsTarget,
    api: Api,
    /// Resolved at connect time, kept for the provider's lifetime
    zone_id: String,
    /// Captured by the last successful `current_record` lookup
    record_id: Option<String>,
}

// Custom Debug implementation that hides the API key
impl fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("target", &self.target.hostname())
            .field("credentials", &self.api.credentials)
            .field("zone_id", &self.zone_id)
            .field("record_id", &self.record_id)
            .finish()
    }
}

impl CloudflareProvider {
    /// Connect to the production Cloudflare API and resolve the zone ID
    ///
    /// # Errors
    ///
    /// - `Network` if the API is unreachable
    /// - `Provider` if the request is rejected or no zone matches the hostname
    pub async fn connect(
        target: DnsTarget,
        credentials: CloudflareCredentials,
        timeout: Duration,
    ) -> Result<Self> {
        Self::connect_with_base_url(target, credentials, timeout, CLOUDFLARE_API_BASE).await
    }

    /// Connect to a Cloudflare-compatible API at `base_url`
    pub async fn connect_with_base_url(
        target: DnsTarget,
        credentials: CloudflareCredentials,
        timeout: Duration,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let api = Api {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        };

        let zone_id = Self::lookup_zone_id(&api, target.zone()).await?;

        Ok(Self {
            target,
            api,
            zone_id,
            record_id: None,
        })
    }

    /// The resolved zone ID
    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    /// Get the zone ID for the registrable domain
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones?name=example.com
    /// X-Auth-Email: <email>
    /// X-Auth-Key: <key>
    /// ```
    async fn lookup_zone_id(api: &Api, zone_name: &str) -> Result<String> {
        tracing::debug!("Looking up zone ID for domain: {}", zone_name);

        let request = api.client.get(api.url("/zones")).query(&[("name", zone_name)]);
        let json = api.send(request, "Zone lookup").await?;
        let zones: ListResponse<Zone> = Api::decode(json, "Zone lookup")?;

        let zone = zones.result.into_iter().next().ok_or_else(|| {
            Error::provider(PROVIDER, format!("Zone not found: {}", zone_name))
        })?;

        tracing::debug!("Found zone ID: {}", zone.id);
        Ok(zone.id)
    }

    fn records_url(&self) -> String {
        self.api.url(&format!("/zones/{}/dns_records", self.zone_id))
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?name=home.example.com&type=A
    /// ```
    async fn current_record(&mut self) -> Result<Option<DnsRecord>> {
        let hostname = self.target.hostname();
        tracing::debug!("Looking up A record: {}", hostname);

        let request = self
            .api
            .client
            .get(self.records_url())
            .query(&[("name", hostname), ("type", "A")]);
        let json = self.api.send(request, "Record lookup").await?;
        let records: ListResponse<Record> = Api::decode(json, "Record lookup")?;

        let total = records
            .result_info
            .as_ref()
            .map(|info| info.total_count)
            .unwrap_or(records.result.len() as u64);

        if total == 0 {
            tracing::debug!("No A record for {}", hostname);
            self.record_id = None;
            return Ok(None);
        }

        let record = records.result.into_iter().next().ok_or_else(|| {
            Error::provider(
                PROVIDER,
                format!(
                    "Record lookup reported {} record(s) for {} but returned none",
                    total, hostname
                ),
            )
        })?;

        tracing::debug!("Found record ID: {}", record.id);
        self.record_id = Some(record.id.clone());
        Ok(Some(DnsRecord::new(record.id, record.content)))
    }

    /// # API Call
    ///
    /// ```http
    /// POST /zones/:zone_id/dns_records
    /// {"type": "A", "name": "...", "content": "1.2.3.4", "ttl": 120, "proxied": false}
    /// ```
    async fn create(&self, ip: Ipv4Addr) -> Result<ProviderResponse> {
        let payload = RecordPayload {
            record_type: "A",
            name: self.target.hostname(),
            content: ip.to_string(),
            ttl: Some(CREATE_TTL),
            proxied: Some(false),
        };

        let request = self.api.client.post(self.records_url()).json(&payload);
        let response = self.api.send(request, "Create record").await?;

        tracing::info!("DNS record created: {} -> {}", self.target, ip);
        Ok(response)
    }

    /// # API Call
    ///
    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// {"type": "A", "name": "...", "content": "1.2.3.4"}
    /// ```
    async fn update(&self, ip: Ipv4Addr) -> Result<ProviderResponse> {
        let record_id = self.record_id.as_deref().ok_or_else(|| {
            Error::precondition(format!(
                "update of {} requires a prior lookup that found the record",
                self.target
            ))
        })?;

        let payload = RecordPayload {
            record_type: "A",
            name: self.target.hostname(),
            content: ip.to_string(),
            ttl: None,
            proxied: None,
        };

        let url = format!("{}/{}", self.records_url(), record_id);
        let request = self.api.client.put(url).json(&payload);
        let response = self.api.send(request, "Update record").await?;

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

#[cfg(test)]
mod tests {
    use super::*;
    use ddns_core::traits::IpSource;
    use ddns_core::{Outcome, Reconciler};
    use mockito::{Matcher, Mock, ServerGuard};
    use serde_json::json;

    const EMAIL: &str = "ops@example.com";
    const KEY: &str = "secret_key_12345";
    const TIMEOUT: Duration = Duration::from_secs(5);

    struct StaticIp(Ipv4Addr);

    #[async_trait]
    impl IpSource for StaticIp {
        async fn current(&self) -> Result<Ipv4Addr> {
            Ok(self.0)
        }
    }

    fn resolved_ip() -> Ipv4Addr {
        Ipv4Addr::new(203, 0, 113, 9)
    }

    async fn zone_mock(server: &mut ServerGuard, zones: Value) -> Mock {
        server
            .mock("GET", "/zones")
            .match_query(Matcher::UrlEncoded("name".into(), "example.com".into()))
            .match_header("x-auth-email", EMAIL)
            .match_header("x-auth-key", KEY)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "success": true, "result": zones }).to_string())
            .create_async()
            .await
    }

    async fn lookup_mock(server: &mut ServerGuard, records: Value) -> Mock {
        let count = records.as_array().map(|r| r.len()).unwrap_or(0);
        server
            .mock("GET", "/zones/zone-1/dns_records")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("name".into(), "home.example.com".into()),
                Matcher::UrlEncoded("type".into(), "A".into()),
            ]))
            .match_header("x-auth-key", KEY)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "success": true,
                    "result": records,
                    "result_info": { "total_count": count }
                })
                .to_string(),
            )
            .create_async()
            .await
    }

    async fn connect(server: &ServerGuard) -> Result<CloudflareProvider> {
        CloudflareProvider::connect_with_base_url(
            DnsTarget::parse("home.example.com").unwrap(),
            CloudflareCredentials::new(EMAIL, KEY),
            TIMEOUT,
            server.url(),
        )
        .await
    }

    #[tokio::test]
    async fn test_connect_resolves_zone_id() {
        let mut server = mockito::Server::new_async().await;
        let zones = zone_mock(&mut server, json!([{ "id": "zone-1" }, { "id": "zone-2" }])).await;

        let provider = connect(&server).await.unwrap();

        assert_eq!(provider.zone_id(), "zone-1");
        zones.assert_async().await;
    }

    #[tokio::test]
    async fn test_zero_zones_is_fatal() {
        let mut server = mockito::Server::new_async().await;
        let _zones = zone_mock(&mut server, json!([])).await;

        let err = connect(&server).await.unwrap_err();

        assert!(matches!(err, Error::Provider { .. }));
        assert!(err.to_string().contains("Zone not found: example.com"));
    }

    #[tokio::test]
    async fn test_zone_auth_failure_carries_payload() {
        let mut server = mockito::Server::new_async().await;
        let _zones = server
            .mock("GET", "/zones")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"success":false,"errors":[{"code":9103,"message":"Unknown X-Auth-Key or X-Auth-Email"}]}"#)
            .create_async()
            .await;

        let err = connect(&server).await.unwrap_err();

        assert!(matches!(err, Error::Provider { .. }));
        assert!(err.to_string().contains("Unknown X-Auth-Key"));
    }

    #[tokio::test]
    async fn test_lookup_without_records_is_none() {
        let mut server = mockito::Server::new_async().await;
        let _zones = zone_mock(&mut server, json!([{ "id": "zone-1" }])).await;
        let _lookup = lookup_mock(&mut server, json!([])).await;

        let mut provider = connect(&server).await.unwrap();

        assert_eq!(provider.current_record().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_lookup_returns_first_record() {
        let mut server = mockito::Server::new_async().await;
        let _zones = zone_mock(&mut server, json!([{ "id": "zone-1" }])).await;
        let _lookup = lookup_mock(
            &mut server,
            json!([
                { "id": "rec123", "content": "198.51.100.1" },
                { "id": "rec456", "content": "198.51.100.2" }
            ]),
        )
        .await;

        let mut provider = connect(&server).await.unwrap();
        let record = provider.current_record().await.unwrap();

        assert_eq!(record, Some(DnsRecord::new("rec123", "198.51.100.1")));
    }

    #[tokio::test]
    async fn test_count_without_results_is_provider_error() {
        let mut server = mockito::Server::new_async().await;
        let _zones = zone_mock(&mut server, json!([{ "id": "zone-1" }])).await;
        let _lookup = server
            .mock("GET", "/zones/zone-1/dns_records")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({ "success": true, "result": [], "result_info": { "total_count": 1 } }).to_string())
            .create_async()
            .await;

        let mut provider = connect(&server).await.unwrap();

        assert!(matches!(
            provider.current_record().await,
            Err(Error::Provider { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_before_lookup_is_precondition_error() {
        let mut server = mockito::Server::new_async().await;
        let _zones = zone_mock(&mut server, json!([{ "id": "zone-1" }])).await;
        let put = server
            .mock("PUT", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let provider = connect(&server).await.unwrap();
        let err = provider.update(resolved_ip()).await.unwrap_err();

        assert!(matches!(err, Error::Precondition(_)));
        put.assert_async().await;
    }

    #[tokio::test]
    async fn test_unsuccessful_body_is_provider_error() {
        let mut server = mockito::Server::new_async().await;
        let _zones = zone_mock(&mut server, json!([{ "id": "zone-1" }])).await;
        let _lookup = lookup_mock(&mut server, json!([])).await;
        let _create = server
            .mock("POST", "/zones/zone-1/dns_records")
            .with_status(200)
            .with_body(r#"{"success":false,"errors":[{"code":81057,"message":"Record already exists."}]}"#)
            .create_async()
            .await;

        let mut provider = connect(&server).await.unwrap();
        provider.current_record().await.unwrap();
        let err = provider.create(resolved_ip()).await.unwrap_err();

        assert!(err.to_string().contains("Record already exists."));
    }

    #[tokio::test]
    async fn test_update_rejected_status_carries_payload() {
        let mut server = mockito::Server::new_async().await;
        let _zones = zone_mock(&mut server, json!([{ "id": "zone-1" }])).await;
        let _lookup =
            lookup_mock(&mut server, json!([{ "id": "rec123", "content": "198.51.100.1" }])).await;
        let update = server
            .mock("PUT", "/zones/zone-1/dns_records/rec123")
            .with_status(400)
            .with_body(r#"{"success":false,"errors":[{"code":9005,"message":"Content for A record is invalid."}]}"#)
            .expect(1)
            .create_async()
            .await;

        let mut provider = connect(&server).await.unwrap();
        provider.current_record().await.unwrap();
        let err = provider.update(resolved_ip()).await.unwrap_err();

        assert!(matches!(err, Error::Provider { .. }));
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("Content for A record is invalid."));
        update.assert_async().await;
    }

    #[tokio::test]
    async fn test_scenario_missing_record_is_created() {
        let mut server = mockito::Server::new_async().await;
        let _zones = zone_mock(&mut server, json!([{ "id": "zone-1" }])).await;
        let _lookup = lookup_mock(&mut server, json!([])).await;
        let create = server
            .mock("POST", "/zones/zone-1/dns_records")
            .match_header("x-auth-email", EMAIL)
            .match_body(Matcher::Json(json!({
                "type": "A",
                "name": "home.example.com",
                "content": "203.0.113.9",
                "ttl": 120,
                "proxied": false
            })))
            .with_status(200)
            .with_body(json!({ "success": true, "result": { "id": "new-rec" } }).to_string())
            .expect(1)
            .create_async()
            .await;
        let put = server.mock("PUT", Matcher::Any).expect(0).create_async().await;

        let provider = connect(&server).await.unwrap();
        let mut reconciler =
            Reconciler::new(Box::new(StaticIp(resolved_ip())), Box::new(provider));
        let outcome = reconciler.run().await.unwrap();

        assert!(matches!(outcome, Outcome::Created { .. }));
        assert_eq!(outcome.response().unwrap()["result"]["id"], "new-rec");
        create.assert_async().await;
        put.assert_async().await;
    }

    #[tokio::test]
    async fn test_scenario_matching_record_is_left_alone() {
        let mut server = mockito::Server::new_async().await;
        let _zones = zone_mock(&mut server, json!([{ "id": "zone-1" }])).await;
        let _lookup =
            lookup_mock(&mut server, json!([{ "id": "rec123", "content": "203.0.113.9" }])).await;
        let post = server.mock("POST", Matcher::Any).expect(0).create_async().await;
        let put = server.mock("PUT", Matcher::Any).expect(0).create_async().await;

        let provider = connect(&server).await.unwrap();
        let mut reconciler =
            Reconciler::new(Box::new(StaticIp(resolved_ip())), Box::new(provider));
        let outcome = reconciler.run().await.unwrap();

        assert!(matches!(outcome, Outcome::Unchanged { .. }));
        post.assert_async().await;
        put.assert_async().await;
    }

    #[tokio::test]
    async fn test_scenario_stale_record_is_updated_by_id() {
        let mut server = mockito::Server::new_async().await;
        let _zones = zone_mock(&mut server, json!([{ "id": "zone-1" }])).await;
        let _lookup =
            lookup_mock(&mut server, json!([{ "id": "rec123", "content": "198.51.100.1" }])).await;
        let update = server
            .mock("PUT", "/zones/zone-1/dns_records/rec123")
            .match_header("x-auth-key", KEY)
            .match_body(Matcher::Json(json!({
                "type": "A",
                "name": "home.example.com",
                "content": "203.0.113.9"
            })))
            .with_status(200)
            .with_body(json!({ "success": true, "result": { "id": "rec123" } }).to_string())
            .expect(1)
            .create_async()
            .await;
        let post = server.mock("POST", Matcher::Any).expect(0).create_async().await;

        let provider = connect(&server).await.unwrap();
        let mut reconciler =
            Reconciler::new(Box::new(StaticIp(resolved_ip())), Box::new(provider));
        let outcome = reconciler.run().await.unwrap();

        match outcome {
            Outcome::Updated { previous, .. } => assert_eq!(previous, "198.51.100.1"),
            other => panic!("expected Updated, got {:?}", other),
        }
        update.assert_async().await;
        post.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_key_not_exposed_in_debug() {
        let mut server = mockito::Server::new_async().await;
        let _zones = zone_mock(&mut server, json!([{ "id": "zone-1" }])).await;

        let provider = connect(&server).await.unwrap();
        let debug_str = format!("{:?}", provider);

        assert!(!debug_str.contains(KEY));
        assert!(debug_str.contains("CloudflareProvider"));
        assert!(debug_str.contains("<REDACTED>"));
    }

    #[tokio::test]
    async fn test_provider_name() {
        let mut server = mockito::Server::new_async().await;
        let _zones = zone_mock(&mut server, json!([{ "id": "zone-1" }])).await;

        let provider = connect(&server).await.unwrap();
        assert_eq!(provider.provider_name(), "cloudflare");
        assert_eq!(provider.target().zone(), "example.com");
    }
}
