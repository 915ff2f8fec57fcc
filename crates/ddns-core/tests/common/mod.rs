//! Test doubles and common utilities for reconciler contract tests
//!
//! The doubles record every call so tests can assert not only on the
//! outcome but on which collaborators were touched, and with what.

#![allow(dead_code)]

use ddns_core::traits::{RecordLookup, RecordMutator};
use ddns_core::{ChangeDescriptor, ExistingRecord, ProviderError, Reconciler, RecordType};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type LookupFn = dyn Fn(&str, &str, RecordType) -> Result<ExistingRecord, ProviderError> + Send + Sync;
type MutateFn = dyn Fn(&str, &ChangeDescriptor) -> Result<String, ProviderError> + Send + Sync;

/// A RecordLookup whose answer is scripted by the test
pub struct StubLookup {
    /// Call counter for lookup()
    calls: AtomicUsize,
    /// Arguments of every lookup() call
    seen: Mutex<Vec<(String, String, RecordType)>>,
    /// Scripted response
    respond: Box<LookupFn>,
    /// Artificial latency before answering
    delay: Option<Duration>,
}

impl StubLookup {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&str, &str, RecordType) -> Result<ExistingRecord, ProviderError> + Send + Sync + 'static,
    {
        Self {
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            respond: Box::new(respond),
            delay: None,
        }
    }

    /// Always find `record`
    pub fn returning(record: ExistingRecord) -> Self {
        Self::new(move |_, _, _| Ok(record.clone()))
    }

    /// Always report that no record exists
    pub fn not_found() -> Self {
        Self::new(|domain, subdomain, _| {
            Err(ProviderError::not_found(format!("{subdomain}.{domain}")))
        })
    }

    /// Always fail with a provider-side error
    pub fn failing(message: &'static str) -> Self {
        Self::new(move |_, _, _| Err(ProviderError::provider("stub", message)))
    }

    /// Sleep for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get the number of times lookup() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Get the arguments lookup() was called with
    pub fn seen(&self) -> Vec<(String, String, RecordType)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RecordLookup for StubLookup {
    async fn lookup(
        &self,
        domain: &str,
        subdomain: &str,
        record_type: RecordType,
    ) -> Result<ExistingRecord, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((domain.to_string(), subdomain.to_string(), record_type));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.respond)(domain, subdomain, record_type)
    }
}

/// A RecordMutator that records every change it receives
pub struct RecordingMutator {
    /// Call counter for mutate()
    calls: AtomicUsize,
    /// (domain, change) of every mutate() call
    changes: Mutex<Vec<(String, ChangeDescriptor)>>,
    /// Scripted response
    respond: Box<MutateFn>,
    /// Artificial latency before answering
    delay: Option<Duration>,
}

impl RecordingMutator {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&str, &ChangeDescriptor) -> Result<String, ProviderError> + Send + Sync + 'static,
    {
        Self {
            calls: AtomicUsize::new(0),
            changes: Mutex::new(Vec::new()),
            respond: Box::new(respond),
            delay: None,
        }
    }

    /// Accept every change, answering with `id`
    pub fn succeeding(id: &'static str) -> Self {
        Self::new(move |_, _| Ok(id.to_string()))
    }

    /// Reject every change
    pub fn failing(message: &'static str) -> Self {
        Self::new(move |_, _| Err(ProviderError::provider("stub", message)))
    }

    /// Sleep for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get the number of times mutate() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Get the (domain, change) pairs mutate() was called with
    pub fn changes(&self) -> Vec<(String, ChangeDescriptor)> {
        self.changes.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RecordMutator for RecordingMutator {
    async fn mutate(&self, domain: &str, change: &ChangeDescriptor) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.changes
            .lock()
            .unwrap()
            .push((domain.to_string(), change.clone()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.respond)(domain, change)
    }
}

/// Build a reconciler over shared doubles, keeping handles for assertions
pub fn reconciler(lookup: &Arc<StubLookup>, mutator: &Arc<RecordingMutator>) -> Reconciler {
    Reconciler::new(lookup.clone(), mutator.clone())
}

/// The AAAA record most scenarios start from
pub fn existing_aaaa() -> ExistingRecord {
    ExistingRecord {
        id: "1".to_string(),
        name: "example.com".to_string(),
        address: "::1".to_string(),
        record_type: RecordType::Aaaa,
        ttl: 600,
    }
}
