//! # Finstrument Service
//!
//! The financial instrument consistency protocol on top of the executor
//! contracts.
//!
//! This crate provides:
//! - [`FinancialInstrumentService`] - Read, write, delete, count, enumerate
//! - [`IdPages`] - Lazy offset-based (id, hash) enumeration
//! - [`ConceptService`] - Object-safe surface for transport layers
//! - [`ServiceConfig`] - `finstrument.toml` configuration
//!
//! ## Usage
//!
//! ```text
//! let service = FinancialInstrumentService::with_config(executor, indexes, config)?;
//! service.initialise()?;
//! service.write(&instrument)?;
//! service.ids(|entry| { reconcile(entry)?; Ok(true) })?;
//! ```

#![warn(missing_docs)]

mod concept;
pub mod config;
mod error;
mod locks;
mod service;

pub use concept::ConceptService;
pub use config::{EnumerationFailure, ServiceConfig, CONFIG_FILE_NAME, DEFAULT_PAGE_SIZE};
pub use error::Error;
pub use service::{
    delete_statements, lookup_indexes, unique_constraints, write_statements,
    FinancialInstrumentService, IdPages,
};

/// Result type for service operations
pub type Result<T> = std::result::Result<T, Error>;
