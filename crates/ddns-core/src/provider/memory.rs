// # Memory Zone Provider
//
// In-process implementation of RecordLookup and RecordMutator.
//
// ## Purpose
//
// Provides a provider with real create-or-update semantics that never
// leaves the process. Useful for embedding, for local trial runs driven by
// a config file, and for tests that need provider state to converge between
// two reconciliations.
//
// ## Behavior
//
// - Records are keyed by (zone, name, type)
// - `mutate` updates the matching record in place or creates a new one
// - Identifiers are sequential, starting at 1
// - All state is lost when the provider is dropped

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tracing::debug;

use crate::config::{MemoryRecordConfig, ProviderConfig};
use crate::error::ProviderError;
use crate::record::{ChangeDescriptor, ExistingRecord, RecordType};
use crate::traits::{DnsProvider, DnsProviderFactory, RecordLookup, RecordMutator};
use crate::Error;

type RecordKey = (String, String, RecordType);

#[derive(Debug, Clone)]
struct StoredRecord {
    id: u64,
    address: String,
    ttl: u32,
}

#[derive(Debug, Default)]
struct Zone {
    records: BTreeMap<RecordKey, StoredRecord>,
    next_id: u64,
}

impl Zone {
    fn upsert(
        &mut self,
        domain: &str,
        name: &str,
        record_type: RecordType,
        address: &str,
        ttl: u32,
    ) -> u64 {
        let key = (domain.to_string(), name.to_string(), record_type);
        if let Some(stored) = self.records.get_mut(&key) {
            stored.address = address.to_string();
            stored.ttl = ttl;
            return stored.id;
        }

        self.next_id += 1;
        let id = self.next_id;
        self.records.insert(
            key,
            StoredRecord {
                id,
                address: address.to_string(),
                ttl,
            },
        );
        id
    }
}

/// In-memory DNS zone provider
///
/// Cloning is cheap and clones share the same zone and call counters, so a
/// test can keep one handle while the reconciler owns another.
///
/// # Example
///
/// ```rust
/// use ddns_core::provider::MemoryZoneProvider;
/// use ddns_core::{Reconciler, RecordType};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let zone = MemoryZoneProvider::new();
///     zone.insert("example.com", "www", RecordType::A, "192.0.2.1", 600);
///
///     let reconciler = Reconciler::from_provider(Arc::new(zone.clone()));
///     reconciler
///         .reconcile("example.com", "www", 600, Some("192.0.2.2".parse()?))
///         .await?;
///
///     assert_eq!(
///         zone.address_of("example.com", "www", RecordType::A).as_deref(),
///         Some("192.0.2.2")
///     );
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryZoneProvider {
    zone: Arc<RwLock<Zone>>,
    lookup_calls: Arc<AtomicUsize>,
    mutate_calls: Arc<AtomicUsize>,
}

impl MemoryZoneProvider {
    /// Create an empty zone
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a zone pre-populated from configuration
    pub fn with_records(records: &[MemoryRecordConfig]) -> Self {
        let provider = Self::new();
        for record in records {
            provider.insert(
                &record.domain,
                &record.name,
                record.record_type,
                &record.address,
                record.ttl,
            );
        }
        provider
    }

    /// Seed or overwrite a record, returning its identifier
    pub fn insert(
        &self,
        domain: &str,
        name: &str,
        record_type: RecordType,
        address: &str,
        ttl: u32,
    ) -> String {
        let mut zone = self.zone.write().unwrap_or_else(PoisonError::into_inner);
        zone.upsert(domain, name, record_type, address, ttl).to_string()
    }

    /// Current address of a record, if present
    pub fn address_of(&self, domain: &str, name: &str, record_type: RecordType) -> Option<String> {
        self.get(domain, name, record_type).map(|record| record.address)
    }

    /// Current state of a record, if present
    pub fn get(&self, domain: &str, name: &str, record_type: RecordType) -> Option<ExistingRecord> {
        let zone = self.zone.read().unwrap_or_else(PoisonError::into_inner);
        let key = (domain.to_string(), name.to_string(), record_type);
        zone.records.get(&key).map(|stored| ExistingRecord {
            id: stored.id.to_string(),
            name: name.to_string(),
            address: stored.address.clone(),
            record_type,
            ttl: stored.ttl,
        })
    }

    /// Number of records across all zones
    pub fn len(&self) -> usize {
        self.zone.read().unwrap_or_else(PoisonError::into_inner).records.len()
    }

    /// Check if the provider holds no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the number of times lookup() was called
    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    /// Get the number of times mutate() was called
    pub fn mutate_calls(&self) -> usize {
        self.mutate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordLookup for MemoryZoneProvider {
    async fn lookup(
        &self,
        domain: &str,
        subdomain: &str,
        record_type: RecordType,
    ) -> Result<ExistingRecord, ProviderError> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        self.get(domain, subdomain, record_type).ok_or_else(|| {
            ProviderError::not_found(format!("{subdomain}.{domain} ({record_type})"))
        })
    }
}

#[async_trait]
impl RecordMutator for MemoryZoneProvider {
    async fn mutate(&self, domain: &str, change: &ChangeDescriptor) -> Result<String, ProviderError> {
        self.mutate_calls.fetch_add(1, Ordering::SeqCst);
        let id = self.insert(domain, &change.name, change.record_type, &change.value, change.ttl);
        debug!(
            "Memory zone {}: {} {} = {} (id {})",
            domain, change.name, change.record_type, change.value, id
        );
        Ok(id)
    }
}

impl DnsProvider for MemoryZoneProvider {
    fn provider_name(&self) -> &'static str {
        "memory"
    }
}

/// Factory for creating memory zone providers
pub struct MemoryZoneFactory;

impl DnsProviderFactory for MemoryZoneFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Arc<dyn DnsProvider>, Error> {
        match config {
            ProviderConfig::Memory { records } => {
                Ok(Arc::new(MemoryZoneProvider::with_records(records)))
            }
            _ => Err(Error::config("Invalid config for memory provider")),
        }
    }
}
