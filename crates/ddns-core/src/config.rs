//! Configuration types for the DDNS updater
//!
//! Configuration comes from an optional JSON file, overridden by
//! environment variables. Credentials never come from command-line flags.
//!
//! ## Environment variables
//!
//! - `DDNS_PROVIDER_TYPE`: Provider type (`dnsimple`, `memory`)
//! - `DDNS_DNSIMPLE_API_TOKEN`: DNSimple API token
//! - `DDNS_DNSIMPLE_ACCOUNT_ID`: DNSimple account identifier
//! - `DDNS_DNSIMPLE_BASE_URL`: API base URL (sandbox or tests)
//! - `DDNS_MODE`: `dry-run` to skip provider writes, `live` otherwise
//! - `DDNS_IP_SOURCE_URL`: Public-address discovery endpoint
//! - `DDNS_IP_VERSION`: Restrict discovery to `v4` or `v6`
//! - `DDNS_TIMEOUT_SECS`: Upper bound for each provider call

use crate::error::{Error, Result};
use crate::record::RecordType;
use crate::traits::IpVersion;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default public-address discovery endpoint
pub const DEFAULT_IP_SOURCE_URL: &str = "https://api64.ipify.org";

/// Main DDNS configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// DNS provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Public-address discovery, used when no address is given
    #[serde(default)]
    pub ip_source: IpSourceConfig,

    /// Reconciler settings
    #[serde(default)]
    pub reconciler: ReconcilerConfig,
}

impl DdnsConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            Error::config(format!("Failed to parse config file {}: {}", path.display(), e))
        })
    }

    /// Load configuration: optional file first, then process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::new(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override settings from environment-style variables
    ///
    /// `var` is queried instead of the process environment directly, so
    /// callers (and tests) can supply any source.
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(kind) = var("DDNS_PROVIDER_TYPE")
            && kind != self.provider.type_name()
        {
            self.provider = ProviderConfig::empty(&kind)?;
        }

        if let ProviderConfig::Dnsimple {
            api_token,
            account_id,
            base_url,
            dry_run,
        } = &mut self.provider
        {
            if let Some(token) = var("DDNS_DNSIMPLE_API_TOKEN") {
                *api_token = token;
            }
            if let Some(account) = var("DDNS_DNSIMPLE_ACCOUNT_ID") {
                *account_id = account;
            }
            if let Some(url) = var("DDNS_DNSIMPLE_BASE_URL") {
                *base_url = Some(url);
            }
            if let Some(mode) = var("DDNS_MODE") {
                *dry_run = match mode.to_lowercase().as_str() {
                    "dry-run" | "dry_run" | "dryrun" => true,
                    "live" => false,
                    other => {
                        return Err(Error::config(format!(
                            "DDNS_MODE '{other}' is not valid. Valid modes: live, dry-run"
                        )));
                    }
                };
            }
        }

        if let Some(url) = var("DDNS_IP_SOURCE_URL") {
            self.ip_source.url = url;
        }
        if let Some(version) = var("DDNS_IP_VERSION") {
            self.ip_source.version = Some(match version.to_lowercase().as_str() {
                "v4" | "4" | "ipv4" => IpVersion::V4,
                "v6" | "6" | "ipv6" => IpVersion::V6,
                other => {
                    return Err(Error::config(format!(
                        "DDNS_IP_VERSION '{other}' is not valid. Valid versions: v4, v6"
                    )));
                }
            });
        }
        if let Some(secs) = var("DDNS_TIMEOUT_SECS") {
            let secs = secs.parse::<u64>().map_err(|e| {
                Error::config(format!("DDNS_TIMEOUT_SECS '{secs}' is not a number: {e}"))
            })?;
            self.reconciler.timeout_secs = Some(secs);
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.provider.validate()?;
        self.ip_source.validate()?;
        self.reconciler.validate()?;
        Ok(())
    }
}

/// DNS provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// DNSimple API v2
    Dnsimple {
        /// API token with zone write access
        api_token: String,
        /// Account identifier the zones belong to
        account_id: String,
        /// API base URL override (defaults to the production API)
        #[serde(default)]
        base_url: Option<String>,
        /// Perform lookups but skip writes
        #[serde(default)]
        dry_run: bool,
    },

    /// In-process zone, seeded from the listed records
    Memory {
        #[serde(default)]
        records: Vec<MemoryRecordConfig>,
    },
}

impl ProviderConfig {
    /// An unconfigured provider of the named type
    fn empty(kind: &str) -> Result<Self> {
        match kind {
            "dnsimple" => Ok(Self::default()),
            "memory" => Ok(Self::Memory {
                records: Vec::new(),
            }),
            other => Err(Error::config(format!(
                "DDNS_PROVIDER_TYPE '{other}' is not supported. Supported providers: dnsimple, memory"
            ))),
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<()> {
        match self {
            ProviderConfig::Dnsimple {
                api_token,
                account_id,
                base_url,
                ..
            } => {
                if api_token.is_empty() {
                    return Err(Error::config(
                        "DNSimple API token is required. Set it via: export DDNS_DNSIMPLE_API_TOKEN=your_token",
                    ));
                }
                if account_id.is_empty() {
                    return Err(Error::config(
                        "DNSimple account ID is required. Set it via: export DDNS_DNSIMPLE_ACCOUNT_ID=12345",
                    ));
                }
                if let Some(url) = base_url {
                    validate_http_url("DNSimple base URL", url)?;
                }
                Ok(())
            }
            ProviderConfig::Memory { records } => {
                for record in records {
                    if record.domain.trim().is_empty() || record.name.trim().is_empty() {
                        return Err(Error::config("Memory records need a domain and a name"));
                    }
                    if record.address.parse::<std::net::IpAddr>().is_err() {
                        return Err(Error::config(format!(
                            "Memory record {}.{} has invalid address '{}'",
                            record.name, record.domain, record.address
                        )));
                    }
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Dnsimple { .. } => "dnsimple",
            ProviderConfig::Memory { .. } => "memory",
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Dnsimple {
            api_token: String::new(),
            account_id: String::new(),
            base_url: None,
            dry_run: false,
        }
    }
}

/// Seed record for the memory provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecordConfig {
    pub domain: String,
    pub name: String,
    pub record_type: RecordType,
    pub address: String,
    #[serde(default = "default_ttl")]
    pub ttl: u32,
}

fn default_ttl() -> u32 {
    3600
}

/// Public-address discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpSourceConfig {
    /// URL returning the caller's address as plain text
    #[serde(default = "default_ip_source_url")]
    pub url: String,

    /// Only accept addresses of this family
    #[serde(default)]
    pub version: Option<IpVersion>,
}

impl IpSourceConfig {
    /// Validate the IP source configuration
    pub fn validate(&self) -> Result<()> {
        validate_http_url("IP source URL", &self.url)
    }
}

impl Default for IpSourceConfig {
    fn default() -> Self {
        Self {
            url: default_ip_source_url(),
            version: None,
        }
    }
}

fn default_ip_source_url() -> String {
    DEFAULT_IP_SOURCE_URL.to_string()
}

/// Reconciler configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Upper bound for each provider call, in seconds. Unset means no bound
    /// beyond the provider's own HTTP timeout.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ReconcilerConfig {
    /// Validate the reconciler configuration
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == Some(0) {
            return Err(Error::config("Reconciler timeout must be > 0"));
        }
        Ok(())
    }

    /// The configured timeout as a Duration
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn validate_http_url(what: &str, url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(Error::config(format!("{what} cannot be empty")));
    }
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(Error::config(format!(
            "{what} must use HTTP or HTTPS scheme. Got: {url}"
        )));
    }
    Ok(())
}
