//! Subdomain record reconciler
//!
//! The Reconciler is responsible for:
//! - Validating the request before any provider call
//! - Looking up the existing address record
//! - Deciding whether the record needs to change
//! - Applying an address-only update through the mutator
//!
//! ## Flow
//!
//! ```text
//! ┌────────────┐  invalid   ┌─────────────────────┐
//! │ Validating │───────────▶│ Failed (Validation) │
//! └────────────┘            └─────────────────────┘
//!       │
//!       ▼            error / not found   ┌─────────────────┐
//! ┌────────────┐────────────────────────▶│ Failed (Lookup) │
//! │ LookingUp  │                         └─────────────────┘
//! └────────────┘  same address  ┌──────────────────────────┐
//!       │ ─────────────────────▶│ Aborted (NoChangeNeeded) │
//!       ▼                       └──────────────────────────┘
//! ┌────────────┐   error   ┌─────────────────┐
//! │  Updating  │──────────▶│ Failed (Update) │
//! └────────────┘           └─────────────────┘
//!       │
//!       ▼
//!   Succeeded
//! ```
//!
//! Every state is terminal once reached. There is no retry and no loop.
//!
//! ## Lookup failure policy
//!
//! A failed lookup is a hard error even when the provider says the record
//! does not exist. The reconciler never creates a record on its own: it
//! cannot reliably tell "genuinely absent" from "provider trouble", so both
//! are surfaced as [`Error::Lookup`] for a human to look at. This is a
//! deliberate and debatable choice; see DESIGN.md.

use crate::config::ReconcilerConfig;
use crate::error::{Error, ProviderError, Result};
use crate::record::{ChangeDescriptor, UpdateRequest};
use crate::traits::{DnsProvider, RecordLookup, RecordMutator};
use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Result of a reconciliation that changed the record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// Identifier the mutator returned for the written record
    pub record_id: String,
    /// Address the record held before the update
    pub previous_address: String,
    /// The change that was applied
    pub change: ChangeDescriptor,
}

/// Reconciles one subdomain record against the desired address
///
/// Holds no mutable state, so one instance can serve any number of
/// independent reconciliations, concurrently if wrapped in an `Arc`.
pub struct Reconciler {
    /// Existing-record discovery
    lookup: Arc<dyn RecordLookup>,

    /// Record writes
    mutator: Arc<dyn RecordMutator>,

    /// Upper bound for each provider call
    timeout: Option<Duration>,
}

impl Reconciler {
    /// Create a reconciler from separate lookup and mutator capabilities
    pub fn new(lookup: Arc<dyn RecordLookup>, mutator: Arc<dyn RecordMutator>) -> Self {
        Self {
            lookup,
            mutator,
            timeout: None,
        }
    }

    /// Create a reconciler backed by a single provider
    pub fn from_provider<P>(provider: Arc<P>) -> Self
    where
        P: DnsProvider + ?Sized + 'static,
    {
        debug!("Reconciler using provider {}", provider.provider_name());
        Self::new(Arc::new(Arc::clone(&provider)), Arc::new(provider))
    }

    /// Create a reconciler from configuration
    pub fn from_config<P>(provider: Arc<P>, config: &ReconcilerConfig) -> Self
    where
        P: DnsProvider + ?Sized + 'static,
    {
        let reconciler = Self::from_provider(provider);
        match config.timeout() {
            Some(limit) => reconciler.with_timeout(limit),
            None => reconciler,
        }
    }

    /// Bound each provider call by `limit`
    ///
    /// An elapsed lookup surfaces as [`Error::Lookup`], an elapsed mutation
    /// as [`Error::Update`], both with [`ProviderError::Timeout`] as source.
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Reconcile `subdomain.domain` so it points to `address`
    ///
    /// # Parameters
    ///
    /// - `domain`: Zone name (e.g., "example.com")
    /// - `subdomain`: Record label within the zone (e.g., "www")
    /// - `ttl`: Requested TTL. Checked like the other inputs, but an existing
    ///   record keeps its own TTL.
    /// - `address`: Desired address. `None` is a validation failure.
    ///
    /// # Returns
    ///
    /// - `Ok(Reconciled)`: The record was updated
    /// - `Err(Error::Validation)`: Bad input, no provider call made
    /// - `Err(Error::Lookup)`: Record discovery failed or record absent
    /// - `Err(Error::NoChangeNeeded)`: Record already points to `address`
    /// - `Err(Error::Update)`: The provider refused the update
    pub async fn reconcile(
        &self,
        domain: &str,
        subdomain: &str,
        ttl: u32,
        address: Option<IpAddr>,
    ) -> Result<Reconciled> {
        let request = UpdateRequest::new(domain, subdomain, ttl, address)?;
        self.apply(&request).await
    }

    /// Reconcile an already validated request
    pub async fn apply(&self, request: &UpdateRequest) -> Result<Reconciled> {
        let record_type = request.record_type();
        let fqdn = request.fqdn();
        let address = request.address();

        debug!("Looking up {} record for {}", record_type, fqdn);
        let existing = self
            .bounded(self.lookup.lookup(request.domain(), request.subdomain(), record_type))
            .await
            .map_err(|source| Error::Lookup {
                record: fqdn.clone(),
                record_type,
                source,
            })?;

        if existing.points_to(&address) {
            info!("{} already resolves to {}, nothing to do", fqdn, address);
            return Err(Error::NoChangeNeeded {
                record: fqdn,
                address: existing.address,
            });
        }

        if existing.ttl != request.ttl() {
            debug!(
                "Keeping TTL {} of {} (requested {} is only used for new records)",
                existing.ttl,
                fqdn,
                request.ttl()
            );
        }

        let change = existing.with_address(&address);
        info!(
            "Updating {} ({}): {} -> {}",
            fqdn, record_type, existing.address, change.value
        );

        let record_id = self
            .bounded(self.mutator.mutate(request.domain(), &change))
            .await
            .map_err(|source| Error::Update {
                domain: request.domain().to_string(),
                name: change.name.clone(),
                source,
            })?;

        info!("Updated {} (record {})", fqdn, record_id);
        Ok(Reconciled {
            record_id,
            previous_address: existing.address,
            change,
        })
    }

    /// Run a provider call under the configured timeout
    async fn bounded<T, F>(&self, call: F) -> std::result::Result<T, ProviderError>
    where
        F: Future<Output = std::result::Result<T, ProviderError>>,
    {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Err(ProviderError::Timeout(limit))),
            None => call.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemoryZoneProvider;
    use crate::record::RecordType;

    #[test]
    fn test_from_config_applies_timeout() {
        let provider = Arc::new(MemoryZoneProvider::new());
        let config = ReconcilerConfig {
            timeout_secs: Some(5),
        };

        let reconciler = Reconciler::from_config(provider, &config);
        assert_eq!(reconciler.timeout, Some(Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_dyn_provider_can_back_a_reconciler() {
        let zone = MemoryZoneProvider::new();
        zone.insert("example.com", "www", RecordType::A, "192.0.2.1", 300);
        let provider: Arc<dyn DnsProvider> = Arc::new(zone.clone());

        let reconciler = Reconciler::from_provider(provider);
        let done = reconciler
            .reconcile("example.com", "www", 300, Some(IpAddr::from([192, 0, 2, 2])))
            .await
            .unwrap();

        assert_eq!(done.previous_address, "192.0.2.1");
        assert_eq!(
            zone.address_of("example.com", "www", RecordType::A).as_deref(),
            Some("192.0.2.2")
        );
    }
}
