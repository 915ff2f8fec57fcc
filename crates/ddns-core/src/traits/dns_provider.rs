// # DNS Provider Traits
//
// Defines the two capabilities the reconciler consumes from a DNS provider.
//
// ## Implementations
//
// - DNSimple: `ddns-provider-dnsimple` crate
// - In-process zone: `ddns_core::provider::MemoryZoneProvider`
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::traits::{RecordLookup, RecordMutator};
// use ddns_core::RecordType;
//
// let existing = provider.lookup("example.com", "www", RecordType::A).await?;
// let change = existing.with_address(&"192.0.2.10".parse()?);
// let id = provider.mutate("example.com", &change).await?;
// ```

use crate::error::ProviderError;
use crate::record::{ChangeDescriptor, ExistingRecord, RecordType};
use async_trait::async_trait;

/// Discovers the existing address record for a subdomain
///
/// # Contract
///
/// - Return the first record whose name matches `subdomain` within the zone
///   `domain` and whose type equals `record_type`.
/// - Return [`ProviderError::NotFound`] when no such record exists.
/// - Perform exactly one logical lookup. No retries, no caching: both are
///   the caller's business.
#[async_trait]
pub trait RecordLookup: Send + Sync {
    /// Look up the record for `subdomain` in zone `domain`
    async fn lookup(
        &self,
        domain: &str,
        subdomain: &str,
        record_type: RecordType,
    ) -> Result<ExistingRecord, ProviderError>;
}

/// Writes a record to the provider
///
/// # Contract
///
/// - Idempotently create or update the record matching `change.name` and
///   `change.record_type` in zone `domain`.
/// - Return the provider-assigned identifier of the written record.
/// - Never retry. A failure is returned as-is.
#[async_trait]
pub trait RecordMutator: Send + Sync {
    /// Apply `change` to zone `domain`
    async fn mutate(&self, domain: &str, change: &ChangeDescriptor) -> Result<String, ProviderError>;
}

#[async_trait]
impl<T: RecordLookup + ?Sized> RecordLookup for std::sync::Arc<T> {
    async fn lookup(
        &self,
        domain: &str,
        subdomain: &str,
        record_type: RecordType,
    ) -> Result<ExistingRecord, ProviderError> {
        (**self).lookup(domain, subdomain, record_type).await
    }
}

#[async_trait]
impl<T: RecordMutator + ?Sized> RecordMutator for std::sync::Arc<T> {
    async fn mutate(&self, domain: &str, change: &ChangeDescriptor) -> Result<String, ProviderError> {
        (**self).mutate(domain, change).await
    }
}

/// A named provider that can both look up and mutate records
pub trait DnsProvider: RecordLookup + RecordMutator {
    /// Get the provider name (for logging/debugging)
    ///
    /// # Returns
    ///
    /// A static string identifying the provider (e.g., "dnsimple", "memory")
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this provider
    ///
    /// # Returns
    ///
    /// A shared DnsProvider trait object, or [`crate::Error::Config`] when
    /// the configuration does not fit this factory.
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<std::sync::Arc<dyn DnsProvider>, crate::Error>;
}
