//! Collaborator contracts consumed by the instrument service.
//!
//! Two seams separate the consistency protocol from the graph store:
//!
//! - [`BatchExecutor`] runs an ordered list of statements best-effort. There
//!   is no rollback across the list: statements applied before a failure stay
//!   applied.
//! - [`IndexManager`] idempotently declares indexes and uniqueness
//!   constraints on label/property pairs.

use std::collections::BTreeMap;

use tracing::debug;

use crate::{Result, Statement, StatementResult};

/// Executes ordered batches of parameterized statements.
///
/// # Contract
///
/// - Statements run in the given order.
/// - On success, exactly one [`StatementResult`] is returned per statement,
///   in the same order.
/// - On failure, the error of the first failing statement is returned and
///   later statements are not run. Earlier statements are not undone.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; concurrent batches may interleave
/// at statement granularity.
pub trait BatchExecutor: Send + Sync {
    /// Execute `statements` in order
    fn execute_batch(&self, statements: &[Statement]) -> Result<Vec<StatementResult>>;

    /// Connectivity probe
    fn check(&self) -> Result<()> {
        debug!(target: "finstrument::executor", "Probing graph store");
        self.execute_batch(&[Statement::Probe]).map(|_| ())
    }
}

/// Declares indexes and uniqueness constraints.
///
/// Both operations take a mapping of label to property and must be safe to
/// call repeatedly.
pub trait IndexManager: Send + Sync {
    /// Ensure a lookup index exists for every `label -> property` pair
    fn ensure_indexes(&self, indexes: &BTreeMap<&str, &str>) -> Result<()>;

    /// Ensure a uniqueness constraint exists for every `label -> property` pair
    fn ensure_constraints(&self, constraints: &BTreeMap<&str, &str>) -> Result<()>;
}
