// # IP Source Trait
//
// Defines the interface for discovering the host's current public address
// when the caller does not pass one explicitly.
//
// ## Implementations
//
// - HTTP-based: `ddns-ip-http` crate
//
// Sources are one-shot: each call performs a single discovery and nothing
// is remembered between calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// IP version filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// Whether `ip` belongs to this family
    pub fn matches(&self, ip: &IpAddr) -> bool {
        match self {
            IpVersion::V4 => ip.is_ipv4(),
            IpVersion::V6 => ip.is_ipv6(),
        }
    }
}

/// Trait for public address discovery
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Fetch the current public address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The discovered address, matching [`IpSource::version`]
    ///   when a filter is set
    /// - `Err(Error::IpSource)`: If discovery failed
    async fn current(&self) -> crate::Result<IpAddr>;

    /// The address family this source is restricted to, if any
    fn version(&self) -> Option<IpVersion> {
        None
    }
}
