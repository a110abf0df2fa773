//! # Finstrument Executor
//!
//! Contracts between the instrument service and the graph store.
//!
//! This crate provides:
//! - [`Statement`] - The typed instruction set, renderable as Cypher
//! - [`StatementResult`]/[`QueryStats`] - Rows and update counters per statement
//! - [`BatchExecutor`] - Ordered, best-effort batch execution
//! - [`IndexManager`] - Index and uniqueness constraint declaration
//!
//! ## Batches
//!
//! ```text
//! use finstrument_executor::{BatchExecutor, Statement};
//!
//! let results = executor.execute_batch(&[
//!     Statement::DetachInstrument { uuid: id.clone() },
//!     Statement::UpsertInstrument { uuid: id.clone(), props },
//! ])?;
//! ```

#![warn(missing_docs)]

mod error;
mod executor;
mod output;
mod statement;

pub use error::Error;
pub use executor::{BatchExecutor, IndexManager};
pub use output::{QueryStats, Row, StatementResult};
pub use statement::{CypherQuery, Statement};

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, Error>;
