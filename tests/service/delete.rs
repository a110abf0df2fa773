//! Delete: demote to placeholder, strip identifiers, collect if unreferenced

use crate::common::*;

#[test]
fn delete_then_read_then_delete_again() {
    let t = TestService::new();
    let uuid = new_uuid();
    t.service
        .write(&sample_instrument(&uuid).with_issuer("org-1").with_label("Acme"))
        .unwrap();

    assert!(t.service.delete(&uuid).unwrap());
    assert_eq!(t.service.read(&uuid).unwrap(), None);
    assert!(!t.service.delete(&uuid).unwrap());
}

#[test]
fn delete_unknown_is_false_not_error() {
    let t = TestService::new();
    assert!(!t.service.delete(&new_uuid()).unwrap());
    assert!(!t.service.delete("").unwrap());
}

#[test]
fn unreferenced_instrument_is_fully_removed() {
    let t = TestService::new();
    let uuid = new_uuid();
    t.service
        .write(&sample_instrument(&uuid).with_factset("F-1").with_issuer("org-1"))
        .unwrap();
    assert_eq!(t.graph.nodes_with_uuid(&uuid), 1);

    assert!(t.service.delete(&uuid).unwrap());

    assert_eq!(t.graph.nodes_with_uuid(&uuid), 0);
    assert_eq!(t.graph.identifier_count(IdentifierScheme::Figi), 0);
    assert_eq!(t.graph.identifier_count(IdentifierScheme::Factset), 0);
    // The organisation keeps its own placeholder and identifier.
    assert_eq!(t.graph.nodes_with_uuid("org-1"), 1);
    assert_eq!(t.graph.identifier_count(IdentifierScheme::Upp), 1);
}

#[test]
fn referenced_instrument_persists_as_placeholder() {
    let t = TestService::new();
    let issuer = new_uuid();
    let issued = new_uuid();
    t.service
        .write(&sample_instrument(&issuer).with_label("Issuer Co"))
        .unwrap();
    t.service
        .write(&sample_instrument(&issued).with_issuer(issuer.as_str()))
        .unwrap();

    assert!(t.service.delete(&issuer).unwrap());

    assert_eq!(t.service.read(&issuer).unwrap(), None);
    assert_eq!(t.graph.nodes_with_uuid(&issuer), 1);
    let labels: Vec<String> = t.graph.labels_of(&issuer).unwrap().into_iter().collect();
    assert_eq!(labels, vec!["Thing".to_string()]);
    let props = t.graph.properties_of(&issuer).unwrap();
    assert_eq!(props.len(), 1);
    assert_eq!(props["uuid"], issuer.as_str());

    // The other instrument still points at the placeholder.
    assert_eq!(
        t.service.read(&issued).unwrap().unwrap().issuer(),
        Some(issuer.as_str())
    );
}

#[test]
fn placeholder_is_not_reported_as_deleted() {
    let t = TestService::new();
    t.seed_identifier("org-uuid-1", IdentifierScheme::Upp, "org-ext-1");
    assert!(!t.service.delete("org-uuid-1").unwrap());
}

#[test]
fn delete_updates_count_and_enumeration() {
    let t = TestService::new();
    let uuids = t.write_many(3);
    assert_eq!(t.service.count().unwrap(), 3);

    assert!(t.service.delete(&uuids[1]).unwrap());

    assert_eq!(t.service.count().unwrap(), 2);
    let ids: Vec<String> = t.all_ids().into_iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![uuids[0].clone(), uuids[2].clone()]);
}

#[test]
fn rewrite_after_delete_restores_instrument() {
    let t = TestService::new();
    let uuid = new_uuid();
    let fi = sample_instrument(&uuid).with_label("Acme");
    t.service.write(&fi).unwrap();
    assert!(t.service.delete(&uuid).unwrap());

    t.service.write(&fi).unwrap();
    assert_eq!(t.service.read(&uuid).unwrap(), Some(fi));
    assert_eq!(t.service.count().unwrap(), 1);
}
