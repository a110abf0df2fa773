//! Concurrent writers

use crate::common::*;
use std::collections::BTreeSet;
use std::sync::{Arc, Barrier};
use std::thread;

const WRITERS: usize = 8;
const ROUNDS: usize = 25;

fn writer_record(uuid: &str, writer: usize) -> FinancialInstrument {
    FinancialInstrument::new(uuid)
        .with_primary_id(format!("w{}-a", writer))
        .with_primary_id(format!("w{}-b", writer))
        .with_factset(format!("F-w{}", writer))
        .with_label(format!("Writer {}", writer))
}

#[test]
fn serialized_writes_leave_one_writers_identifiers() {
    let t = TestService::with_config(ServiceConfig {
        serialize_writes: true,
        ..ServiceConfig::default()
    });
    let service = Arc::new(t.service.clone());
    let uuid = new_uuid();
    let barrier = Arc::new(Barrier::new(WRITERS));

    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            let uuid = uuid.clone();
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..ROUNDS {
                    service.write(&writer_record(&uuid, writer)).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let stored = t.service.read(&uuid).unwrap().unwrap();
    let winner = (0..WRITERS)
        .find(|w| stored.label() == Some(format!("Writer {}", w).as_str()))
        .expect("label from one of the writers");
    assert_eq!(stored, writer_record(&uuid, winner));
    assert_eq!(t.graph.identifier_count(IdentifierScheme::Upp), 2);
    assert_eq!(t.graph.identifier_count(IdentifierScheme::Factset), 1);
}

#[test]
fn serialized_write_and_delete_race_settles() {
    let t = TestService::with_config(ServiceConfig {
        serialize_writes: true,
        ..ServiceConfig::default()
    });
    let service = Arc::new(t.service.clone());
    let uuid = new_uuid();
    let barrier = Arc::new(Barrier::new(2));

    let writer = {
        let service = Arc::clone(&service);
        let barrier = Arc::clone(&barrier);
        let uuid = uuid.clone();
        thread::spawn(move || {
            barrier.wait();
            for _ in 0..ROUNDS {
                service.write(&writer_record(&uuid, 0)).unwrap();
            }
        })
    };
    let deleter = {
        let service = Arc::clone(&service);
        let barrier = Arc::clone(&barrier);
        let uuid = uuid.clone();
        thread::spawn(move || {
            barrier.wait();
            for _ in 0..ROUNDS {
                service.delete(&uuid).unwrap();
            }
        })
    };
    writer.join().unwrap();
    deleter.join().unwrap();

    match t.service.read(&uuid).unwrap() {
        Some(stored) => {
            assert_eq!(stored, writer_record(&uuid, 0));
            assert_eq!(t.graph.identifier_count(IdentifierScheme::Upp), 2);
        }
        None => {
            assert_eq!(t.graph.nodes_with_uuid(&uuid), 0);
            assert_eq!(t.graph.identifier_count(IdentifierScheme::Upp), 0);
        }
    }
}

#[test]
fn concurrent_writes_to_distinct_ids() {
    let t = TestService::with_page_size(16);
    let service = Arc::new(t.service.clone());

    let handles: Vec<_> = (0..WRITERS)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                (0..ROUNDS)
                    .map(|_| {
                        let uuid = new_uuid();
                        service.write(&sample_instrument(&uuid)).unwrap();
                        uuid
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    let written: BTreeSet<String> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    assert_eq!(t.service.count().unwrap(), (WRITERS * ROUNDS) as u64);
    let enumerated: BTreeSet<String> = t.all_ids().into_iter().map(|e| e.id).collect();
    assert_eq!(enumerated, written);
}

#[test]
fn concept_service_shared_across_threads() {
    let t = TestService::new();
    let shared: Arc<dyn ConceptService<Record = FinancialInstrument>> = Arc::new(t.service.clone());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                let uuid = new_uuid();
                shared.write(&sample_instrument(&uuid)).unwrap();
                assert!(shared.read(&uuid).unwrap().is_some());
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(shared.count().unwrap(), 4);
}
