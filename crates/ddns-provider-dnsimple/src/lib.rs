// # DNSimple DNS Provider
//
// This crate provides a DNSimple implementation of the record lookup and
// record mutator capabilities consumed by `ddns_core::Reconciler`.
//
// ## Behavior
//
// - One logical API operation per trait call, no retries, no caching
// - HTTP timeout configured (30 seconds)
// - Specific error mapping for HTTP status codes (401/403, 404, 429, 5xx)
// - Dry-run mode: lookups run, writes are only logged
// - Both A and AAAA records
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Provider MUST fail fast if the token or account is empty
//
// ## API Reference
//
// - DNSimple API v2: https://developer.dnsimple.com/v2/
// - List records:  GET   `/v2/:account/zones/:zone/records?name=...&type=...`
// - Create record: POST  `/v2/:account/zones/:zone/records`
// - Update record: PATCH `/v2/:account/zones/:zone/records/:record`

use async_trait::async_trait;
use ddns_core::config::ProviderConfig;
use ddns_core::traits::{DnsProvider, DnsProviderFactory, RecordLookup, RecordMutator};
use ddns_core::{ChangeDescriptor, Error, ExistingRecord, ProviderError, RecordType, Result};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// DNSimple production API base URL
pub const DNSIMPLE_API_BASE: &str = "https://api.dnsimple.com";

/// DNSimple sandbox API base URL
pub const DNSIMPLE_SANDBOX_API_BASE: &str = "https://api.sandbox.dnsimple.com";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Identifier reported for records a dry run would have created
const DRY_RUN_RECORD_ID: &str = "dry-run";

const PROVIDER_NAME: &str = "dnsimple";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ZoneRecord {
    id: u64,
    name: String,
    content: String,
    ttl: u32,
    #[serde(rename = "type")]
    record_type: String,
}

impl ZoneRecord {
    fn into_existing(self) -> std::result::Result<ExistingRecord, ProviderError> {
        let record_type = self.record_type.parse::<RecordType>().map_err(|_| {
            ProviderError::invalid_response(format!(
                "record {} has unexpected type {}",
                self.id, self.record_type
            ))
        })?;

        Ok(ExistingRecord {
            id: self.id.to_string(),
            name: self.name,
            address: self.content,
            record_type,
            ttl: self.ttl,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

/// DNSimple DNS provider
///
/// Stateless and single-shot: every call goes to the API.
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (record lookup)
/// - Log the intended POST/PATCH payload
/// - **NOT** actually modify DNS records
pub struct DnsimpleProvider {
    /// API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// Account identifier owning the zones
    account_id: String,

    /// API base URL, without the `/v2` suffix
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip writes
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for DnsimpleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsimpleProvider")
            .field("api_token", &"<REDACTED>")
            .field("account_id", &self.account_id)
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl DnsimpleProvider {
    /// Create a new DNSimple provider against the production API
    ///
    /// # Parameters
    ///
    /// - `api_token`: API token with write access to the zones
    /// - `account_id`: Account the zones belong to
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the token or account is empty, or the HTTP client
    /// cannot be built.
    pub fn new(api_token: impl Into<String>, account_id: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        let account_id = account_id.into();

        if api_token.is_empty() {
            return Err(Error::config("DNSimple API token cannot be empty"));
        }
        if account_id.is_empty() {
            return Err(Error::config("DNSimple account ID cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            account_id,
            base_url: DNSIMPLE_API_BASE.to_string(),
            client,
            dry_run: false,
        })
    }

    /// Point the provider at another API host (sandbox, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Whether writes are skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn records_url(&self, zone: &str) -> String {
        format!("{}/v2/{}/zones/{}/records", self.base_url, self.account_id, zone)
    }

    /// List records named `name` of type `record_type` in `zone`
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /v2/:account/zones/:zone/records?name=www&type=AAAA
    /// Authorization: Bearer <token>
    /// ```
    async fn find_records(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
    ) -> std::result::Result<Vec<ExistingRecord>, ProviderError> {
        // DNSimple stores record names in lowercase.
        let name = name.to_ascii_lowercase();
        tracing::debug!("Listing {} records named '{}' in {}", record_type, name, zone);

        let response = self
            .client
            .get(self.records_url(zone))
            .bearer_auth(&self.api_token)
            .header("Accept", "application/json")
            .query(&[("name", name.as_str()), ("type", record_type.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::http(format!("HTTP request failed: {}", e)))?;

        let response = check_status(response, &format!("zone {}", zone)).await?;
        let body: Envelope<Vec<ZoneRecord>> = response
            .json()
            .await
            .map_err(|e| ProviderError::invalid_response(format!("Failed to parse response: {}", e)))?;

        body.data
            .into_iter()
            .filter(|record| {
                record.name.eq_ignore_ascii_case(&name)
                    && record.record_type.eq_ignore_ascii_case(record_type.as_str())
            })
            .map(ZoneRecord::into_existing)
            .collect()
    }

    /// Change content and TTL of an existing record
    ///
    /// # API Call
    ///
    /// ```http
    /// PATCH /v2/:account/zones/:zone/records/:id
    /// { "content": "::2", "ttl": 600 }
    /// ```
    async fn update_record(
        &self,
        zone: &str,
        id: &str,
        change: &ChangeDescriptor,
    ) -> std::result::Result<String, ProviderError> {
        let url = format!("{}/{}", self.records_url(zone), id);
        let payload = serde_json::json!({
            "content": change.value,
            "ttl": change.ttl,
        });

        if self.dry_run {
            tracing::warn!("[DRY-RUN] Would send PATCH {} with payload: {}", url, payload);
            return Ok(id.to_string());
        }

        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProviderError::http(format!("HTTP request failed: {}", e)))?;

        let response = check_status(response, &format!("record {} in {}", id, zone)).await?;
        let body: Envelope<ZoneRecord> = response
            .json()
            .await
            .map_err(|e| ProviderError::invalid_response(format!("Failed to parse response: {}", e)))?;

        Ok(body.data.id.to_string())
    }

    /// Create a new record
    ///
    /// # API Call
    ///
    /// ```http
    /// POST /v2/:account/zones/:zone/records
    /// { "name": "www", "type": "AAAA", "content": "::2", "ttl": 600 }
    /// ```
    async fn create_record(
        &self,
        zone: &str,
        change: &ChangeDescriptor,
    ) -> std::result::Result<String, ProviderError> {
        let url = self.records_url(zone);
        let payload = serde_json::json!({
            "name": change.name,
            "type": change.record_type.as_str(),
            "content": change.value,
            "ttl": change.ttl,
        });

        if self.dry_run {
            tracing::warn!("[DRY-RUN] Would send POST {} with payload: {}", url, payload);
            return Ok(DRY_RUN_RECORD_ID.to_string());
        }

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProviderError::http(format!("HTTP request failed: {}", e)))?;

        let response = check_status(response, &format!("zone {}", zone)).await?;
        let body: Envelope<ZoneRecord> = response
            .json()
            .await
            .map_err(|e| ProviderError::invalid_response(format!("Failed to parse response: {}", e)))?;

        Ok(body.data.id.to_string())
    }
}

/// Map non-success HTTP statuses to provider errors
async fn check_status(
    response: reqwest::Response,
    context: &str,
) -> std::result::Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());
    let message = serde_json::from_str::<ApiMessage>(&error_text)
        .map(|m| m.message)
        .unwrap_or(error_text);

    Err(match status.as_u16() {
        401 | 403 => ProviderError::auth(format!(
            "Invalid API token or insufficient permissions. Status: {} - {}",
            status, message
        )),
        404 => ProviderError::not_found(format!("{}: {}", context, message)),
        429 => ProviderError::rate_limited(format!(
            "Rate limit exceeded. Please retry later. Status: {}",
            status
        )),
        500..=599 => ProviderError::provider(
            PROVIDER_NAME,
            format!("DNSimple server error (transient): {} - {}", status, message),
        ),
        _ => ProviderError::provider(
            PROVIDER_NAME,
            format!("Request for {} failed: {} - {}", context, status, message),
        ),
    })
}

#[async_trait]
impl RecordLookup for DnsimpleProvider {
    async fn lookup(
        &self,
        domain: &str,
        subdomain: &str,
        record_type: RecordType,
    ) -> std::result::Result<ExistingRecord, ProviderError> {
        self.find_records(domain, subdomain, record_type)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ProviderError::not_found(format!(
                    "DNS record not found: {}.{} (type: {})",
                    subdomain, domain, record_type
                ))
            })
    }
}

#[async_trait]
impl RecordMutator for DnsimpleProvider {
    /// Update the record matching name and type, or create it
    ///
    /// The record is located again by name and type rather than by a
    /// previously seen id, so the call stays idempotent even when the zone
    /// changed since the lookup.
    async fn mutate(
        &self,
        domain: &str,
        change: &ChangeDescriptor,
    ) -> std::result::Result<String, ProviderError> {
        tracing::info!(
            "Writing DNSimple record: {} {} in {} -> {} [mode: {}]",
            change.name,
            change.record_type,
            domain,
            change.value,
            if self.dry_run { "DRY-RUN" } else { "LIVE" }
        );

        let existing = self
            .find_records(domain, &change.name, change.record_type)
            .await?
            .into_iter()
            .next();

        match existing {
            Some(record) => self.update_record(domain, &record.id, change).await,
            None => self.create_record(domain, change).await,
        }
    }
}

impl DnsProvider for DnsimpleProvider {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating DNSimple providers
pub struct DnsimpleFactory;

impl DnsProviderFactory for DnsimpleFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Arc<dyn DnsProvider>> {
        match config {
            ProviderConfig::Dnsimple {
                api_token,
                account_id,
                base_url,
                dry_run,
            } => {
                if *dry_run {
                    tracing::warn!("DNSimple provider running in DRY-RUN mode - no changes will be made");
                }

                let mut provider =
                    DnsimpleProvider::new(api_token.clone(), account_id.clone())?.with_dry_run(*dry_run);
                if let Some(url) = base_url {
                    provider = provider.with_base_url(url.clone());
                }
                Ok(Arc::new(provider))
            }
            _ => Err(Error::config("Invalid config for DNSimple provider")),
        }
    }
}

/// Register the DNSimple provider with a registry
///
/// # Example
///
/// ```rust
/// use ddns_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::with_builtin();
/// ddns_provider_dnsimple::register(&registry);
/// assert!(registry.has_provider("dnsimple"));
/// ```
pub fn register(registry: &ddns_core::ProviderRegistry) {
    registry.register_provider(PROVIDER_NAME, Box::new(DnsimpleFactory));
}
