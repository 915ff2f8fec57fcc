// # ddns-core
//
// Core library for the subdomain dynamic-DNS updater.
//
// ## Architecture Overview
//
// This library provides the reconciliation logic that keeps one subdomain
// record pointed at the host's current address:
// - **RecordLookup / RecordMutator**: Injected provider capabilities
// - **Reconciler**: Validate → look up → compare → update, once per call
// - **ProviderRegistry**: Plugin-based registry for DNS providers
// - **MemoryZoneProvider**: In-process provider for embedding and tests
// - **IpSource**: Trait for discovering the current public address
//
// ## Design Principles
//
// 1. **Single pass**: One lookup, at most one mutation, no retries
// 2. **Stateless**: Nothing is cached or persisted between invocations
// 3. **Injected providers**: The core never builds network clients itself
// 4. **Distinct outcomes**: Validation, lookup, no-change and update
//    failures are separate error kinds

pub mod config;
pub mod error;
pub mod provider;
pub mod reconciler;
pub mod record;
pub mod registry;
pub mod traits;

// Re-export core types for convenience
pub use config::{DdnsConfig, IpSourceConfig, ProviderConfig, ReconcilerConfig};
pub use error::{Error, ErrorKind, ProviderError, Result};
pub use reconciler::{Reconciled, Reconciler};
pub use record::{ChangeDescriptor, ExistingRecord, RecordType, UpdateRequest};
pub use registry::ProviderRegistry;
pub use traits::{DnsProvider, IpSource, RecordLookup, RecordMutator};
