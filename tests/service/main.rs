//! Service Layer Tests
//!
//! Exercises FinancialInstrumentService against MemoryGraph:
//! - Write/Read round trip and idempotent re-write
//! - Label preservation and issuer resolution
//! - Delete semantics and placeholder cleanup
//! - Offset-based enumeration and its failure policies
//! - Partial batch failure and convergence on retry
//! - Per-id write serialization

#[path = "../common/mod.rs"]
mod common;

mod concurrency;
mod delete;
mod enumeration;
mod failures;
mod write;
