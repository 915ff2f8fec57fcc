//! Contract Test: No-Change Abort
//!
//! Constraints verified:
//! - An existing record holding the requested address aborts the run
//! - The abort is a distinct no-change error, not a generic failure
//! - The mutator is never called when nothing has to change
//! - Addresses are compared in canonical string form
//!
//! If this test fails, unchanged records are being rewritten.

mod common;

use common::*;
use ddns_core::{Error, ErrorKind, ExistingRecord, RecordType};
use std::net::IpAddr;
use std::sync::Arc;

#[tokio::test]
async fn same_address_aborts_without_mutation() {
    let lookup = Arc::new(StubLookup::returning(existing_aaaa()));
    let mutator = Arc::new(RecordingMutator::succeeding("1"));
    let reconciler = reconciler(&lookup, &mutator);

    let ip: IpAddr = "::1".parse().unwrap();
    let err = reconciler
        .reconcile("example.com", "www", 3600, Some(ip))
        .await
        .unwrap_err();

    assert!(err.is_no_change(), "expected no-change, got {err}");
    assert_eq!(err.kind(), ErrorKind::NoChangeNeeded);
    assert!(err.provider_error().is_none());
    assert_eq!(lookup.call_count(), 1);
    assert_eq!(mutator.call_count(), 0, "unchanged record must not be written");
}

#[tokio::test]
async fn non_canonical_spelling_of_same_address_counts_as_equal() {
    let lookup = Arc::new(StubLookup::returning(ExistingRecord {
        id: "7".to_string(),
        name: "www".to_string(),
        address: "2001:db8::1".to_string(),
        record_type: RecordType::Aaaa,
        ttl: 600,
    }));
    let mutator = Arc::new(RecordingMutator::succeeding("7"));
    let reconciler = reconciler(&lookup, &mutator);

    // Parses to the same address whose canonical form the record already holds.
    let ip: IpAddr = "2001:0db8:0000::0001".parse().unwrap();
    let err = reconciler
        .reconcile("example.com", "www", 600, Some(ip))
        .await
        .unwrap_err();

    match err {
        Error::NoChangeNeeded { record, address } => {
            assert_eq!(record, "www.example.com");
            assert_eq!(address, "2001:db8::1");
        }
        other => panic!("expected no-change, got {other}"),
    }
    assert_eq!(mutator.call_count(), 0);
}

#[tokio::test]
async fn non_canonical_provider_content_is_treated_as_different() {
    let lookup = Arc::new(StubLookup::returning(ExistingRecord {
        address: "0:0:0:0:0:0:0:1".to_string(),
        ..existing_aaaa()
    }));
    let mutator = Arc::new(RecordingMutator::succeeding("1"));
    let reconciler = reconciler(&lookup, &mutator);

    let done = reconciler
        .reconcile("example.com", "www", 600, Some("::1".parse().unwrap()))
        .await
        .unwrap();

    assert_eq!(done.change.value, "::1");
    assert_eq!(mutator.call_count(), 1);
}
