//! Error types for the DDNS updater
//!
//! [`Error`] is what a reconciliation returns. Its four reconcile kinds
//! (validation, lookup, no-change, update) are distinct so callers can tell
//! "nothing to do" apart from a genuine failure. [`ProviderError`] is what
//! the injected lookup/mutator collaborators return; it always travels as
//! the `source` of a [`Error::Lookup`] or [`Error::Update`].

use crate::record::RecordType;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing input. Raised before any provider call.
    #[error("Invalid {field}: {reason}")]
    Validation {
        /// Name of the offending input field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// The existing record could not be discovered, including "not found"
    #[error("Lookup of {record} ({record_type}) failed: {source}")]
    Lookup {
        /// Fully qualified record name (`subdomain.domain`)
        record: String,
        /// Record type that was looked up
        record_type: RecordType,
        /// Underlying provider failure
        #[source]
        source: ProviderError,
    },

    /// The existing record already points to the requested address
    #[error("No change needed: {record} already resolves to {address}")]
    NoChangeNeeded {
        /// Fully qualified record name (`subdomain.domain`)
        record: String,
        /// The address both sides agree on
        address: String,
    },

    /// The provider rejected or failed the create/update call
    #[error("Update of record {name} in {domain} failed: {source}")]
    Update {
        /// Zone the mutation targeted
        domain: String,
        /// Record name from the change descriptor
        name: String,
        /// Underlying provider failure
        #[source]
        source: ProviderError,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Public address discovery failed
    #[error("IP source error: {0}")]
    IpSource(String),
}

/// Fieldless discriminant of [`Error`], for matching and exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Lookup,
    NoChangeNeeded,
    Update,
    Config,
    IpSource,
}

impl Error {
    /// Create a validation error for `field`
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an IP source error
    pub fn ip_source(msg: impl Into<String>) -> Self {
        Self::IpSource(msg.into())
    }

    /// The kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Lookup { .. } => ErrorKind::Lookup,
            Self::NoChangeNeeded { .. } => ErrorKind::NoChangeNeeded,
            Self::Update { .. } => ErrorKind::Update,
            Self::Config(_) => ErrorKind::Config,
            Self::IpSource(_) => ErrorKind::IpSource,
        }
    }

    /// True when the reconciliation aborted because nothing had to change.
    ///
    /// Callers that only care about convergence can treat this as success.
    pub fn is_no_change(&self) -> bool {
        matches!(self, Self::NoChangeNeeded { .. })
    }

    /// The collaborator failure behind a lookup or update error, if any
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::Lookup { source, .. } | Self::Update { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors returned by [`RecordLookup`](crate::traits::RecordLookup) and
/// [`RecordMutator`](crate::traits::RecordMutator) implementations
#[derive(Error, Debug)]
pub enum ProviderError {
    /// No matching record exists
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Credentials were rejected
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The provider throttled the request
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// The call did not finish within the caller-supplied timeout
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// The provider answered with something we could not interpret
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// True for the distinguished "record does not exist" case
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Lets custom providers built on `anyhow` use `?` inside trait methods
impl From<anyhow::Error> for ProviderError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
