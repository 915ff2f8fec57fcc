//! Contract Test: Caller-Supplied Timeouts
//!
//! Constraints verified:
//! - A lookup exceeding the timeout fails as a lookup error
//! - A mutation exceeding the timeout fails as an update error
//! - A timed-out lookup never leads to a mutation
//! - Without a timeout, slow providers are simply awaited

mod common;

use common::*;
use ddns_core::{ErrorKind, ProviderError, Reconciler};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

const LIMIT: Duration = Duration::from_millis(50);
const SLOW: Duration = Duration::from_secs(5);

fn new_ip() -> Option<IpAddr> {
    Some("::2".parse().unwrap())
}

#[tokio::test]
async fn slow_lookup_times_out_as_lookup_error() {
    let lookup = Arc::new(StubLookup::returning(existing_aaaa()).with_delay(SLOW));
    let mutator = Arc::new(RecordingMutator::succeeding("1"));
    let reconciler = Reconciler::new(lookup.clone(), mutator.clone()).with_timeout(LIMIT);

    let err = reconciler
        .reconcile("example.com", "www", 600, new_ip())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Lookup);
    assert!(matches!(err.provider_error(), Some(ProviderError::Timeout(limit)) if *limit == LIMIT));
    assert_eq!(mutator.call_count(), 0);
}

#[tokio::test]
async fn slow_mutation_times_out_as_update_error() {
    let lookup = Arc::new(StubLookup::returning(existing_aaaa()));
    let mutator = Arc::new(RecordingMutator::succeeding("1").with_delay(SLOW));
    let reconciler = Reconciler::new(lookup.clone(), mutator.clone()).with_timeout(LIMIT);

    let err = reconciler
        .reconcile("example.com", "www", 600, new_ip())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Update);
    assert!(matches!(err.provider_error(), Some(ProviderError::Timeout(_))));
    assert_eq!(mutator.call_count(), 1);
}

#[tokio::test]
async fn no_timeout_waits_for_provider() {
    let lookup = Arc::new(StubLookup::returning(existing_aaaa()).with_delay(Duration::from_millis(20)));
    let mutator = Arc::new(RecordingMutator::succeeding("1").with_delay(Duration::from_millis(20)));

    let done = reconciler(&lookup, &mutator)
        .reconcile("example.com", "www", 600, new_ip())
        .await
        .unwrap();

    assert_eq!(done.record_id, "1");
}
