//! Plugin-based provider registry
//!
//! The registry maps provider type names to factories, so the binary can
//! build whichever provider the configuration names without an if-else
//! chain over every provider crate.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ddns_core::registry::ProviderRegistry;
//!
//! let registry = ProviderRegistry::with_builtin();
//! ddns_provider_dnsimple::register(&registry);
//!
//! let provider = registry.create_provider(&config.provider)?;
//! ```

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::provider::MemoryZoneFactory;
use crate::traits::{DnsProvider, DnsProviderFactory};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Provider registry for plugin-based DNS provider creation
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered DNS provider factories
    providers: RwLock<HashMap<String, Box<dyn DnsProviderFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the providers built into the core
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        registry.register_provider("memory", Box::new(MemoryZoneFactory));
        registry
    }

    /// Register a DNS provider factory
    ///
    /// # Parameters
    ///
    /// - `name`: Provider type name, as in `ProviderConfig::type_name()`
    /// - `factory`: Factory object for creating provider instances
    ///
    /// Registering the same name twice replaces the earlier factory.
    pub fn register_provider(&self, name: impl Into<String>, factory: Box<dyn DnsProviderFactory>) {
        let mut providers = self.providers.write().unwrap_or_else(PoisonError::into_inner);
        providers.insert(name.into(), factory);
    }

    /// Create a provider from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Arc<dyn DnsProvider>)`: The created provider
    /// - `Err(Error::Config)`: If no factory is registered for the type, or
    ///   the configuration is invalid
    pub fn create_provider(&self, config: &ProviderConfig) -> Result<Arc<dyn DnsProvider>> {
        config.validate()?;

        let type_name = config.type_name();
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        let factory = providers.get(type_name).ok_or_else(|| {
            Error::config(format!("No provider registered for type '{}'", type_name))
        })?;

        factory.create(config)
    }

    /// Check if a provider type is registered
    pub fn has_provider(&self, name: &str) -> bool {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// List registered provider types, sorted
    pub fn list_providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}
