//! Executor failures: partial batches, convergence on retry, availability

use crate::common::*;

#[test]
fn partial_write_surfaces_error_and_retry_converges() {
    let t = TestService::new();
    let uuid = new_uuid();
    let v1 = sample_instrument(&uuid).with_label("Acme").with_factset("F-1");
    t.service.write(&v1).unwrap();

    let v2 = sample_instrument(&uuid)
        .with_label("Acme Holdings")
        .with_factset("F-2")
        .with_issuer("org-1");
    // Detach and upsert land, the first identifier does not.
    t.graph.fail_next_batch_at(2, "connection reset");
    let err = t.service.write(&v2).unwrap_err();
    assert_eq!(
        err,
        Error::Executor(ExecutorError::StatementFailed {
            index: 2,
            reason: "connection reset".to_string(),
        })
    );

    let partial = t.service.read(&uuid).unwrap().unwrap();
    assert_eq!(partial.label(), Some("Acme Holdings"));
    assert!(partial.alternative_identifiers.is_empty());
    assert_eq!(partial.issuer(), None);

    t.service.write(&v2).unwrap();
    assert_eq!(t.service.read(&uuid).unwrap(), Some(v2));
}

#[test]
fn partial_delete_leaves_bare_node_until_retry() {
    let t = TestService::new();
    let uuid = new_uuid();
    t.service.write(&sample_instrument(&uuid)).unwrap();

    t.graph.fail_next_batch_at(1, "timeout");
    assert!(t.service.delete(&uuid).is_err());
    assert_eq!(t.service.read(&uuid).unwrap(), None);
    assert_eq!(t.graph.nodes_with_uuid(&uuid), 1);

    // Already demoted, so not reported as deleted, but the node is collected.
    assert!(!t.service.delete(&uuid).unwrap());
    assert_eq!(t.graph.nodes_with_uuid(&uuid), 0);
}

#[test]
fn offline_store_fails_every_operation() {
    let t = TestService::new();
    let uuid = new_uuid();
    t.service.write(&sample_instrument(&uuid)).unwrap();
    t.graph.set_available(false);

    let unavailable = |err: Error| matches!(err, Error::Executor(ExecutorError::Unavailable { .. }));
    assert!(unavailable(t.service.check().unwrap_err()));
    assert!(unavailable(t.service.read(&uuid).unwrap_err()));
    assert!(unavailable(t.service.write(&sample_instrument(&uuid)).unwrap_err()));
    assert!(unavailable(t.service.delete(&uuid).unwrap_err()));
    assert!(unavailable(t.service.count().unwrap_err()));
    assert!(unavailable(t.service.initialise().unwrap_err()));

    t.graph.set_available(true);
    t.service.check().unwrap();
    assert_eq!(t.service.count().unwrap(), 1);
    assert!(t.service.read(&uuid).unwrap().is_some());
}

#[test]
fn initialise_twice_is_harmless() {
    let t = TestService::new();
    t.service.initialise().unwrap();
    assert_eq!(t.graph.constraints().len(), 7);
}
