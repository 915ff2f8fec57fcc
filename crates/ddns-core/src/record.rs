//! Record model shared by the reconciler and provider adapters
//!
//! - [`UpdateRequest`]: validated desired state for one subdomain
//! - [`ExistingRecord`]: snapshot of provider state at lookup time
//! - [`ChangeDescriptor`]: payload handed to the mutator

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Address record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// A record (IPv4)
    A,
    /// AAAA record (IPv6)
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    /// Record type matching the family of `address`
    pub fn for_address(address: &IpAddr) -> Self {
        match address {
            IpAddr::V4(_) => RecordType::A,
            IpAddr::V6(_) => RecordType::Aaaa,
        }
    }

    /// Wire name of the type (`"A"` or `"AAAA"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            other => Err(Error::validation(
                "record_type",
                format!("unsupported record type '{other}' (expected A or AAAA)"),
            )),
        }
    }
}

/// Desired state for a single subdomain record
///
/// Only constructible through [`UpdateRequest::new`] or
/// [`UpdateRequest::parse`], so every instance satisfies the input
/// invariants: non-blank domain and subdomain, and an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    domain: String,
    subdomain: String,
    ttl: u32,
    address: IpAddr,
}

impl UpdateRequest {
    /// Validate and build a request
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] naming `domain`, `subdomain` or `address`,
    /// checked in that order.
    pub fn new(
        domain: impl Into<String>,
        subdomain: impl Into<String>,
        ttl: u32,
        address: Option<IpAddr>,
    ) -> Result<Self> {
        let domain = domain.into();
        let subdomain = subdomain.into();

        Self::check_names(&domain, &subdomain)?;
        let address = address.ok_or_else(|| Error::validation("address", "no IP address given"))?;

        Ok(Self {
            domain,
            subdomain,
            ttl,
            address,
        })
    }

    /// Check the domain and subdomain alone, in that order
    ///
    /// Lets callers that still have to discover the address reject bad
    /// names before any network interaction.
    pub fn check_names(domain: &str, subdomain: &str) -> Result<()> {
        if domain.trim().is_empty() {
            return Err(Error::validation("domain", "must not be empty or whitespace"));
        }
        if subdomain.trim().is_empty() {
            return Err(Error::validation(
                "subdomain",
                "must not be empty or whitespace",
            ));
        }
        Ok(())
    }

    /// Like [`UpdateRequest::new`], parsing the address from text
    pub fn parse(
        domain: impl Into<String>,
        subdomain: impl Into<String>,
        ttl: u32,
        address: &str,
    ) -> Result<Self> {
        let domain = domain.into();
        let subdomain = subdomain.into();

        // Blank names win over a bad address so the first offending field is reported.
        Self::check_names(&domain, &subdomain)?;

        let parsed = address.trim().parse::<IpAddr>().map_err(|e| {
            Error::validation("address", format!("'{address}' is not an IP address: {e}"))
        })?;
        Self::new(domain, subdomain, ttl, Some(parsed))
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn address(&self) -> IpAddr {
        self.address
    }

    /// Record type implied by the address family
    pub fn record_type(&self) -> RecordType {
        RecordType::for_address(&self.address)
    }

    /// `subdomain.domain`, used in logs and error context
    pub fn fqdn(&self) -> String {
        format!("{}.{}", self.subdomain, self.domain)
    }

    /// Fresh descriptor for a record that does not exist yet
    pub fn to_new_record(&self) -> ChangeDescriptor {
        ChangeDescriptor {
            name: self.subdomain.clone(),
            record_type: self.record_type(),
            ttl: self.ttl,
            value: canonical(&self.address),
        }
    }
}

/// Provider-side record as observed at lookup time
///
/// Not owned by this system; it can be stale by the time a mutation lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingRecord {
    /// Provider-assigned identifier
    pub id: String,
    /// Record name as the provider reports it
    pub name: String,
    /// Current record content
    pub address: String,
    pub record_type: RecordType,
    pub ttl: u32,
}

impl ExistingRecord {
    /// Whether the record already holds `address`.
    ///
    /// Compares canonical string forms, so `"0:0::1"` never matches `::1`
    /// even though both parse to the same address.
    pub fn points_to(&self, address: &IpAddr) -> bool {
        self.address == canonical(address)
    }

    /// Address-only change: name, type and TTL stay as they are
    pub fn with_address(&self, address: &IpAddr) -> ChangeDescriptor {
        ChangeDescriptor {
            name: self.name.clone(),
            record_type: self.record_type,
            ttl: self.ttl,
            value: canonical(address),
        }
    }
}

/// Payload sent to a [`RecordMutator`](crate::traits::RecordMutator)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeDescriptor {
    pub name: String,
    pub record_type: RecordType,
    pub ttl: u32,
    /// Canonical string form of the address
    pub value: String,
}

/// Canonical text form of an address
pub fn canonical(address: &IpAddr) -> String {
    address.to_string()
}
