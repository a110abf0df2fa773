//! Offset-based enumeration of (id, hash) pairs

use crate::common::*;
use std::collections::BTreeSet;

const PAGE: u64 = 3;

fn ids_of(entries: &[IdEntry]) -> Vec<String> {
    entries.iter().map(|e| e.id.clone()).collect()
}

#[test]
fn empty_store_enumerates_nothing() {
    let t = TestService::with_page_size(PAGE);
    let before = t.graph.batches_executed();
    assert!(t.all_ids().is_empty());
    assert_eq!(t.graph.batches_executed() - before, 1);
}

#[test]
fn exactly_one_full_page() {
    let t = TestService::with_page_size(PAGE);
    let uuids = t.write_many(PAGE as usize);
    let before = t.graph.batches_executed();

    let entries = t.all_ids();

    assert_eq!(ids_of(&entries), uuids);
    // The full page, then the empty page that ends the scan.
    assert_eq!(t.graph.batches_executed() - before, 2);
}

#[test]
fn one_past_a_full_page() {
    let t = TestService::with_page_size(PAGE);
    let uuids = t.write_many(PAGE as usize + 1);

    let entries = t.all_ids();

    assert_eq!(ids_of(&entries), uuids);
}

#[test]
fn enumeration_matches_classified_set() {
    let t = TestService::with_page_size(PAGE);
    let uuids = t.write_many(10);
    t.seed_identifier("org-uuid-1", IdentifierScheme::Upp, "org-ext-1");
    t.service
        .write(&sample_instrument(&uuids[0]).with_issuer("org-ext-1"))
        .unwrap();

    let entries = t.all_ids();
    let unique: BTreeSet<String> = entries.iter().map(|e| e.id.clone()).collect();

    assert_eq!(entries.len(), 10);
    assert_eq!(unique, uuids.iter().cloned().collect::<BTreeSet<_>>());
    assert_eq!(entries.len() as u64, t.service.count().unwrap());
    assert!(entries.iter().all(|e| !e.hash.is_empty()));
}

#[test]
fn default_page_size_is_4096() {
    let t = TestService::new();
    assert_eq!(t.service.config().page_size, 4096);
}

#[test]
fn visitor_can_stop_early() {
    let t = TestService::with_page_size(PAGE);
    t.write_many(7);

    let mut visited = 0;
    t.service
        .ids(|_| {
            visited += 1;
            Ok(visited < 4)
        })
        .unwrap();
    assert_eq!(visited, 4);
}

#[test]
fn visitor_error_stops_and_is_returned() {
    let t = TestService::with_page_size(PAGE);
    t.write_many(5);

    let mut visited = 0;
    let err = t
        .service
        .ids(|_| {
            visited += 1;
            Err(Error::invalid_request("consumer gave up"))
        })
        .unwrap_err();
    assert_eq!(visited, 1);
    assert_eq!(err.invalid_request_details(), Some("consumer gave up"));
}

#[test]
fn scan_restarts_from_offset() {
    let t = TestService::with_page_size(PAGE);
    let uuids = t.write_many(8);

    let mut seen = Vec::new();
    t.service
        .ids_from(5, |entry| {
            seen.push(entry.id);
            Ok(true)
        })
        .unwrap();
    assert_eq!(seen, uuids[5..].to_vec());
}

#[test]
fn fetch_failure_propagates_and_scan_resumes() {
    let t = TestService::with_page_size(PAGE);
    let uuids = t.write_many(7);

    let mut pages = t.service.id_pages(0);
    let mut seen = Vec::new();
    for _ in 0..PAGE {
        seen.push(pages.next().unwrap().unwrap().id);
    }
    t.graph.fail_next_batch_at(0, "page fetch lost");
    assert!(matches!(
        pages.next(),
        Some(Err(Error::Executor(ExecutorError::StatementFailed { .. })))
    ));
    assert!(pages.next().is_none());

    let offset = pages.offset();
    assert_eq!(offset, PAGE);
    for entry in t.service.id_pages(offset) {
        seen.push(entry.unwrap().id);
    }
    assert_eq!(seen, uuids);
}

#[test]
fn legacy_policy_ends_scan_silently() {
    let t = TestService::with_config(ServiceConfig {
        page_size: PAGE,
        enumeration_failure: EnumerationFailure::EndOfStream,
        ..ServiceConfig::default()
    });
    t.write_many(7);

    let mut pages = t.service.id_pages(0);
    for _ in 0..PAGE {
        pages.next().unwrap().unwrap();
    }
    t.graph.fail_next_batch_at(0, "page fetch lost");
    assert!(pages.next().is_none());

    t.graph.set_available(false);
    let mut visited = 0;
    t.service
        .ids(|_| {
            visited += 1;
            Ok(true)
        })
        .unwrap();
    assert_eq!(visited, 0);
}

#[test]
fn offline_store_fails_enumeration_by_default() {
    let t = TestService::with_page_size(PAGE);
    t.write_many(2);
    t.graph.set_available(false);

    let err = t.service.ids(|_| Ok(true)).unwrap_err();
    assert!(matches!(
        err,
        Error::Executor(ExecutorError::Unavailable { .. })
    ));
}
