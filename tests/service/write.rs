//! Write choreography: full replace, label preservation, issuer resolution

use crate::common::*;

#[test]
fn empty_label_never_erases_stored_label() {
    let t = TestService::new();
    let uuid = new_uuid();
    t.service
        .write(&FinancialInstrument::new(uuid.as_str()).with_label("Acme"))
        .unwrap();
    t.service
        .write(&FinancialInstrument::new(uuid.as_str()).with_label(""))
        .unwrap();
    t.service.write(&FinancialInstrument::new(uuid.as_str())).unwrap();

    let stored = t.service.read(&uuid).unwrap().unwrap();
    assert_eq!(stored.label(), Some("Acme"));
}

#[test]
fn new_label_replaces_stored_label() {
    let t = TestService::new();
    let uuid = new_uuid();
    t.service
        .write(&FinancialInstrument::new(uuid.as_str()).with_label("Acme"))
        .unwrap();
    t.service
        .write(&FinancialInstrument::new(uuid.as_str()).with_label("Acme Holdings"))
        .unwrap();

    let stored = t.service.read(&uuid).unwrap().unwrap();
    assert_eq!(stored.label(), Some("Acme Holdings"));
}

#[test]
fn identifiers_mirror_latest_write() {
    let t = TestService::new();
    let uuid = new_uuid();
    t.service
        .write(
            &FinancialInstrument::new(uuid.as_str())
                .with_primary_id("old-1")
                .with_primary_id("old-2")
                .with_factset("F-OLD")
                .with_wsod("W-OLD"),
        )
        .unwrap();
    t.service
        .write(
            &FinancialInstrument::new(uuid.as_str())
                .with_primary_id("new-1")
                .with_figi("G-NEW"),
        )
        .unwrap();

    let ids = t.service.read(&uuid).unwrap().unwrap().alternative_identifiers;
    assert_eq!(ids.primary().collect::<Vec<_>>(), vec!["new-1"]);
    assert_eq!(ids.single(IdentifierScheme::Factset), None);
    assert_eq!(ids.single(IdentifierScheme::Figi), Some("G-NEW"));
    assert_eq!(ids.single(IdentifierScheme::Wsod), None);
    assert_eq!(t.graph.identifier_count(IdentifierScheme::Upp), 1);
    assert_eq!(t.graph.identifier_count(IdentifierScheme::Factset), 0);
}

#[test]
fn write_stores_full_classification_and_hash() {
    let t = TestService::new();
    let uuid = new_uuid();
    let fi = sample_instrument(&uuid).with_label("Acme");
    t.service.write(&fi).unwrap();

    let labels = t.graph.labels_of(&uuid).unwrap();
    for label in ["Thing", "Concept", "FinancialInstrument", "Equity"] {
        assert!(labels.contains(label), "missing label {}", label);
    }
    let props = t.graph.properties_of(&uuid).unwrap();
    assert_eq!(props["hash"], fi.content_hash().unwrap().as_str());
    assert_eq!(props["prefLabel"], "Acme");
}

#[test]
fn enumerated_hash_tracks_content() {
    let t = TestService::new();
    let uuid = new_uuid();
    let v1 = sample_instrument(&uuid).with_label("Acme");
    let v2 = sample_instrument(&uuid).with_label("Acme Holdings");

    t.service.write(&v1).unwrap();
    let first = t.all_ids();
    t.service.write(&v2).unwrap();
    let second = t.all_ids();

    assert_eq!(first, vec![IdEntry::new(uuid.as_str(), v1.content_hash().unwrap())]);
    assert_eq!(second, vec![IdEntry::new(uuid.as_str(), v2.content_hash().unwrap())]);
    assert_ne!(first, second);
}

#[test]
fn empty_values_do_not_change_enumerated_hash() {
    let t = TestService::new();
    let plain = FinancialInstrument::new("fi-1").with_primary_id("p");
    let with_empties = plain
        .clone()
        .with_label("")
        .with_figi("")
        .with_primary_id("");

    t.service.write(&plain).unwrap();
    let first = t.all_ids();
    t.service.write(&with_empties).unwrap();
    let second = t.all_ids();

    assert_eq!(t.service.read("fi-1").unwrap(), Some(plain));
    assert_eq!(first, second);
}

#[test]
fn issuer_resolves_through_existing_identifier() {
    let t = TestService::new();
    t.seed_identifier("org-uuid-1", IdentifierScheme::Upp, "org-ext-1");

    let uuid = new_uuid();
    t.service
        .write(&sample_instrument(&uuid).with_issuer("org-ext-1"))
        .unwrap();

    let stored = t.service.read(&uuid).unwrap().unwrap();
    assert_eq!(stored.issuer(), Some("org-uuid-1"));
    // No organisation node was created for the raw reference.
    assert_eq!(t.graph.nodes_with_uuid("org-ext-1"), 0);
    assert_eq!(t.graph.nodes_with_uuid("org-uuid-1"), 1);
}

#[test]
fn unknown_issuer_becomes_placeholder() {
    let t = TestService::new();
    let uuid = new_uuid();
    t.service
        .write(&sample_instrument(&uuid).with_issuer("org-new"))
        .unwrap();

    assert_eq!(
        t.service.read(&uuid).unwrap().unwrap().issuer(),
        Some("org-new")
    );
    assert_eq!(t.graph.nodes_with_uuid("org-new"), 1);
    assert_eq!(
        t.graph.labels_of("org-new").unwrap().into_iter().collect::<Vec<_>>(),
        vec!["Thing".to_string()]
    );
}

#[test]
fn instruments_share_one_issuer_placeholder() {
    let t = TestService::new();
    let a = new_uuid();
    let b = new_uuid();
    t.service.write(&sample_instrument(&a).with_issuer("org-1")).unwrap();
    t.service.write(&sample_instrument(&b).with_issuer("org-1")).unwrap();

    assert_eq!(t.graph.nodes_with_uuid("org-1"), 1);
    assert_eq!(t.service.read(&b).unwrap().unwrap().issuer(), Some("org-1"));
}

#[test]
fn dropping_issuer_unlinks_it() {
    let t = TestService::new();
    let uuid = new_uuid();
    t.service
        .write(&sample_instrument(&uuid).with_issuer("org-1"))
        .unwrap();
    t.service.write(&sample_instrument(&uuid)).unwrap();

    assert_eq!(t.service.read(&uuid).unwrap().unwrap().issuer(), None);
}

#[test]
fn empty_uuid_is_invalid_request() {
    let t = TestService::new();
    let err = t
        .service
        .write(&FinancialInstrument::new("").with_label("nameless"))
        .unwrap_err();
    assert!(err.is_client_error());
    assert_eq!(err.to_string(), "invalid request");
    assert_eq!(t.graph.batches_executed(), 0);
}

#[test]
fn duplicate_identifier_value_violates_constraint() {
    let t = TestService::new();
    let a = new_uuid();
    let b = new_uuid();
    t.service
        .write(&FinancialInstrument::new(a.as_str()).with_factset("F-1"))
        .unwrap();
    let err = t
        .service
        .write(&FinancialInstrument::new(b.as_str()).with_factset("F-1"))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Executor(ExecutorError::ConstraintViolation { .. })
    ));
    assert!(!err.is_client_error());
}

#[test]
fn decode_json_feeds_write() {
    let t = TestService::new();
    let body = r#"{
        "uuid": "6562674e-dbfa-4cb0-85b2-41b0948b7cc2",
        "prefLabel": "Acme Ordinary Shares",
        "alternativeIdentifiers": {
            "uuids": ["6562674e-dbfa-4cb0-85b2-41b0948b7cc2"],
            "figiCode": "BBG000B9XRY4"
        }
    }"#;
    let (fi, uuid) = t.service.decode_json(body.as_bytes()).unwrap();
    t.service.write(&fi).unwrap();
    assert_eq!(t.service.read(&uuid).unwrap(), Some(fi));
}

#[test]
fn decode_json_rejects_malformed_payload() {
    let t = TestService::new();
    let err = t.service.decode_json("{\"uuid\": [".as_bytes()).unwrap_err();
    assert!(err.is_client_error());
    assert!(err.invalid_request_details().is_some());
}
