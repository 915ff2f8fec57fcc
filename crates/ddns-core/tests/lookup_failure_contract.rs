//! Contract Test: Lookup Failure Policy
//!
//! Constraints verified:
//! - Any lookup failure, including "not found", fails the reconciliation
//! - The failure is a lookup error carrying the provider cause
//! - A missing record is never created: the mutator is not called
//! - The lookup is asked for the record type matching the address family
//!
//! If this test fails, the reconciler has started creating records on
//! lookup failure, which is a policy change that needs an explicit decision.

mod common;

use common::*;
use ddns_core::{Error, ErrorKind, ProviderError, RecordType};
use std::net::IpAddr;
use std::sync::Arc;

#[tokio::test]
async fn missing_record_is_an_error_not_a_create_trigger() {
    let lookup = Arc::new(StubLookup::not_found());
    let mutator = Arc::new(RecordingMutator::succeeding("new"));
    let reconciler = reconciler(&lookup, &mutator);

    let ip: IpAddr = "::1".parse().unwrap();
    let err = reconciler
        .reconcile("example.com", "www", 600, Some(ip))
        .await
        .unwrap_err();

    match &err {
        Error::Lookup {
            record,
            record_type,
            source,
        } => {
            assert_eq!(record, "www.example.com");
            assert_eq!(*record_type, RecordType::Aaaa);
            assert!(source.is_not_found());
        }
        other => panic!("expected lookup error, got {other}"),
    }

    assert_eq!(lookup.call_count(), 1);
    assert_eq!(mutator.call_count(), 0, "absent record must not be created");
}

#[tokio::test]
async fn provider_failure_during_lookup_is_a_lookup_error() {
    let lookup = Arc::new(StubLookup::failing("service unavailable"));
    let mutator = Arc::new(RecordingMutator::succeeding("1"));
    let reconciler = reconciler(&lookup, &mutator);

    let err = reconciler
        .reconcile("example.com", "www", 600, Some(IpAddr::from([192, 0, 2, 1])))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Lookup);
    assert!(matches!(
        err.provider_error(),
        Some(ProviderError::Provider { message, .. }) if message == "service unavailable"
    ));
    assert_eq!(mutator.call_count(), 0);
}

#[tokio::test]
async fn lookup_receives_request_identifiers_and_family_type() {
    let lookup = Arc::new(StubLookup::not_found());
    let mutator = Arc::new(RecordingMutator::succeeding("1"));
    let reconciler = reconciler(&lookup, &mutator);

    let _ = reconciler
        .reconcile("example.com", "home", 300, Some(IpAddr::from([198, 51, 100, 4])))
        .await;
    let _ = reconciler
        .reconcile("example.org", "nas", 300, Some("2001:db8::4".parse().unwrap()))
        .await;

    assert_eq!(
        lookup.seen(),
        vec![
            ("example.com".to_string(), "home".to_string(), RecordType::A),
            ("example.org".to_string(), "nas".to_string(), RecordType::Aaaa),
        ]
    );
}
