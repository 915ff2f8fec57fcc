//! Core traits for the DDNS updater
//!
//! This module defines the abstract interfaces the reconciler depends on.
//!
//! - [`RecordLookup`]: Find the existing address record for a subdomain
//! - [`RecordMutator`]: Create or update a record at the provider
//! - [`DnsProvider`]: A named provider offering both capabilities
//! - [`IpSource`]: Discover the host's current public address

pub mod dns_provider;
pub mod ip_source;

pub use dns_provider::{DnsProvider, DnsProviderFactory, RecordLookup, RecordMutator};
pub use ip_source::{IpSource, IpVersion};
