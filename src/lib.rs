//! Finstrument - financial instrument concept store over a labeled-property graph
//!
//! Keeps an instrument, its typed alternative identifiers and its issuer
//! relation consistent in a graph store that only offers ordered,
//! best-effort statement batches.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use finstrument::{FinancialInstrument, FinancialInstrumentService, MemoryGraph};
//!
//! let graph = Arc::new(MemoryGraph::new());
//! let service = FinancialInstrumentService::new(graph.clone(), graph);
//! service.initialise().unwrap();
//!
//! let fi = FinancialInstrument::new("fi-1")
//!     .with_label("Acme Ordinary Shares")
//!     .with_primary_id("fi-1")
//!     .with_issuer("org-1");
//! service.write(&fi).unwrap();
//!
//! assert_eq!(service.read("fi-1").unwrap().unwrap().issuer(), Some("org-1"));
//! assert!(service.delete("fi-1").unwrap());
//! ```
//!
//! # Architecture
//!
//! The [`FinancialInstrumentService`] turns each operation into one batch of
//! [`Statement`]s for a [`BatchExecutor`]. [`MemoryGraph`] is the in-process
//! executor; a remote graph database plugs in by running
//! [`Statement::cypher`] against its own driver.

pub use finstrument_core::{
    content_hash, AlternativeIdentifiers, Classification, FinancialInstrument, IdEntry,
    IdentifierScheme, Relation,
};
pub use finstrument_executor::{
    BatchExecutor, CypherQuery, Error as ExecutorError, IndexManager, QueryStats, Row, Statement,
    StatementResult,
};
pub use finstrument_service::{
    ConceptService, EnumerationFailure, Error, FinancialInstrumentService, IdPages, Result,
    ServiceConfig, CONFIG_FILE_NAME, DEFAULT_PAGE_SIZE,
};
pub use finstrument_storage::MemoryGraph;
