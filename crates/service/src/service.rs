//! FinancialInstrumentService: the entity-and-identifier consistency protocol
//!
//! ## Design
//!
//! The service is a stateless facade over a [`BatchExecutor`]. Every public
//! operation translates to exactly one ordered batch; all state lives in the
//! graph store.
//!
//! ## Write
//!
//! Full replace, never a diff:
//!
//! 1. `DetachInstrument` drops the issuer relation and every identifier node
//! 2. `UpsertInstrument` rewrites the property bag and classification
//! 3. `CreateIdentifier` once per non-empty identifier value
//! 4. `LinkIssuer` if an issuer is given
//!
//! The store does not roll back a failed batch. Because step 1 clears
//! whatever a previous attempt left, repeating the same write converges.
//!
//! ## Delete
//!
//! `ClearInstrument` demotes the node to a bare `Thing` placeholder, then
//! `RemoveIfUnused` deletes it if nothing references it any more. Only the
//! statistics of the first statement decide the result.
//!
//! ## Thread Safety
//!
//! Concurrent writes to the same id can interleave at statement granularity.
//! Set `serialize_writes` to make them take turns within this process.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, info, warn};

use finstrument_core::{
    Classification, FinancialInstrument, IdEntry, IdentifierScheme, HASH_PROPERTY,
    IDENTIFIER_LABEL, PREF_LABEL_PROPERTY, UUID_PROPERTY, VALUE_PROPERTY,
};
use finstrument_executor::{BatchExecutor, Error as ExecutorError, IndexManager, Statement};

use crate::config::{EnumerationFailure, ServiceConfig};
use crate::error::Error;
use crate::locks::WriteLocks;
use crate::Result;

#[derive(Deserialize)]
struct CountRow {
    count: u64,
}

/// Uniqueness constraints declared at initialisation
///
/// Every classification is unique on `uuid`. Identifier values are unique
/// per scheme, except WSOD which is left unconstrained.
pub fn unique_constraints() -> BTreeMap<&'static str, &'static str> {
    let classifications = Classification::ALL
        .into_iter()
        .map(|c| (c.label(), UUID_PROPERTY));
    let schemes = IdentifierScheme::ALL
        .into_iter()
        .filter(|s| *s != IdentifierScheme::Wsod)
        .map(|s| (s.label(), VALUE_PROPERTY));
    classifications.chain(schemes).collect()
}

/// Lookup indexes declared at initialisation
pub fn lookup_indexes() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([(IDENTIFIER_LABEL, VALUE_PROPERTY)])
}

/// Ordered statements that fully replace `fi` in the store
pub fn write_statements(fi: &FinancialInstrument, hash: &str) -> Vec<Statement> {
    let uuid = fi.uuid.as_str();

    let mut props = Map::new();
    props.insert(UUID_PROPERTY.to_string(), Value::from(uuid));
    props.insert(HASH_PROPERTY.to_string(), Value::from(hash));
    if let Some(label) = fi.label() {
        props.insert(PREF_LABEL_PROPERTY.to_string(), Value::from(label));
    }

    let mut statements = vec![
        Statement::DetachInstrument {
            uuid: uuid.to_string(),
        },
        Statement::UpsertInstrument {
            uuid: uuid.to_string(),
            props,
        },
    ];
    statements.extend(fi.alternative_identifiers.iter().map(|(scheme, value)| {
        Statement::CreateIdentifier {
            uuid: uuid.to_string(),
            scheme,
            value: value.to_string(),
        }
    }));
    if let Some(issuer) = fi.issuer() {
        statements.push(Statement::LinkIssuer {
            uuid: uuid.to_string(),
            issuer: issuer.to_string(),
        });
    }
    statements
}

/// Ordered statements that delete `uuid`
pub fn delete_statements(uuid: &str) -> [Statement; 2] {
    [
        Statement::ClearInstrument {
            uuid: uuid.to_string(),
        },
        Statement::RemoveIfUnused {
            uuid: uuid.to_string(),
        },
    ]
}

/// Financial instrument store over a graph batch executor
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use finstrument_core::FinancialInstrument;
/// use finstrument_service::FinancialInstrumentService;
/// use finstrument_storage::MemoryGraph;
///
/// let graph = Arc::new(MemoryGraph::new());
/// let service = FinancialInstrumentService::new(graph.clone(), graph);
/// service.initialise().unwrap();
///
/// let fi = FinancialInstrument::new("fi-1").with_label("Acme Ordinary Shares");
/// service.write(&fi).unwrap();
///
/// let stored = service.read("fi-1").unwrap().unwrap();
/// assert_eq!(stored.label(), Some("Acme Ordinary Shares"));
/// assert_eq!(service.count().unwrap(), 1);
/// ```
pub struct FinancialInstrumentService<E: BatchExecutor> {
    executor: Arc<E>,
    indexes: Arc<dyn IndexManager>,
    config: ServiceConfig,
    locks: Option<Arc<WriteLocks>>,
}

impl<E: BatchExecutor> Clone for FinancialInstrumentService<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            indexes: Arc::clone(&self.indexes),
            config: self.config.clone(),
            locks: self.locks.clone(),
        }
    }
}

impl<E: BatchExecutor> FinancialInstrumentService<E> {
    /// Create a service with the default configuration
    pub fn new(executor: Arc<E>, indexes: Arc<dyn IndexManager>) -> Self {
        Self::build(executor, indexes, ServiceConfig::default())
    }

    /// Create a service with an explicit configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid.
    pub fn with_config(
        executor: Arc<E>,
        indexes: Arc<dyn IndexManager>,
        config: ServiceConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(executor, indexes, config))
    }

    fn build(executor: Arc<E>, indexes: Arc<dyn IndexManager>, config: ServiceConfig) -> Self {
        let locks = config
            .serialize_writes
            .then(|| Arc::new(WriteLocks::new()));
        Self {
            executor,
            indexes,
            config,
            locks,
        }
    }

    /// The underlying executor
    pub fn executor(&self) -> &Arc<E> {
        &self.executor
    }

    /// Active configuration
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn serialized<T>(&self, uuid: &str, f: impl FnOnce() -> T) -> T {
        match &self.locks {
            Some(locks) => locks.with_lock(uuid, f),
            None => f(),
        }
    }

    // ========== Lifecycle ==========

    /// Declare the identifier index and the uniqueness constraints
    ///
    /// Safe to call more than once.
    pub fn initialise(&self) -> Result<()> {
        let indexes = lookup_indexes();
        self.indexes.ensure_indexes(&indexes)?;
        let constraints = unique_constraints();
        self.indexes.ensure_constraints(&constraints)?;
        info!(
            target: "finstrument::service",
            indexes = indexes.len(),
            constraints = constraints.len(),
            "Indexes and constraints ensured"
        );
        Ok(())
    }

    /// Connectivity probe against the graph store
    pub fn check(&self) -> Result<()> {
        self.executor.check()?;
        Ok(())
    }

    // ========== Read ==========

    /// Fetch one instrument with its issuer and identifiers
    ///
    /// Returns `None` for an empty or unknown uuid.
    pub fn read(&self, uuid: &str) -> Result<Option<FinancialInstrument>> {
        if uuid.is_empty() {
            return Ok(None);
        }
        let results = self.executor.execute_batch(&[Statement::ReadInstrument {
            uuid: uuid.to_string(),
        }])?;
        match results.first() {
            Some(result) => Ok(result.decode_first()?),
            None => Ok(None),
        }
    }

    /// Number of nodes classified as financial instruments
    pub fn count(&self) -> Result<u64> {
        let results = self.executor.execute_batch(&[Statement::CountInstruments])?;
        let row = results
            .first()
            .map(|r| r.decode_first::<CountRow>())
            .transpose()?
            .flatten();
        Ok(row.map_or(0, |r| r.count))
    }

    // ========== Write ==========

    /// Create or fully replace an instrument
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRequest`] if `fi.uuid` is empty
    /// - [`Error::Executor`] if the batch failed; the store may hold a
    ///   partially applied write that a repeated call repairs
    pub fn write(&self, fi: &FinancialInstrument) -> Result<()> {
        if fi.uuid.is_empty() {
            return Err(Error::invalid_request("uuid must not be empty"));
        }
        let hash = fi.content_hash()?;
        let statements = write_statements(fi, &hash);

        self.serialized(&fi.uuid, || self.executor.execute_batch(&statements))
            .map_err(|e| {
                warn!(
                    target: "finstrument::write",
                    uuid = %fi.uuid,
                    statements = statements.len(),
                    error = %e,
                    "Write batch failed; instrument may be partially written"
                );
                e
            })?;

        debug!(
            target: "finstrument::write",
            uuid = %fi.uuid,
            statements = statements.len(),
            hash = %hash,
            "Instrument written"
        );
        Ok(())
    }

    // ========== Delete ==========

    /// Delete an instrument
    ///
    /// Returns `true` if a classified instrument was demoted. An empty or
    /// unknown uuid, or one that is only a placeholder, yields `false`.
    pub fn delete(&self, uuid: &str) -> Result<bool> {
        if uuid.is_empty() {
            return Ok(false);
        }
        let statements = delete_statements(uuid);
        let results = self.serialized(uuid, || self.executor.execute_batch(&statements))?;

        let stats = results
            .first()
            .map(|r| r.stats)
            .ok_or_else(|| ExecutorError::Decode {
                reason: "delete batch returned no statement results".to_string(),
            })?;
        let deleted = stats.contains_updates() && stats.labels_removed > 0;
        let removed = results.get(1).is_some_and(|r| r.stats.nodes_deleted > 0);

        debug!(
            target: "finstrument::delete",
            uuid,
            deleted,
            removed,
            "Delete batch executed"
        );
        Ok(deleted)
    }

    // ========== Enumeration ==========

    /// Visit every (id, hash) pair from the start
    ///
    /// Stops when `visit` returns `Ok(false)` or an error; the error is
    /// returned.
    pub fn ids<F>(&self, visit: F) -> Result<()>
    where
        F: FnMut(IdEntry) -> Result<bool>,
    {
        self.ids_from(0, visit)
    }

    /// Visit every (id, hash) pair starting at position `offset`
    pub fn ids_from<F>(&self, offset: u64, mut visit: F) -> Result<()>
    where
        F: FnMut(IdEntry) -> Result<bool>,
    {
        for entry in self.id_pages(offset) {
            if !visit(entry?)? {
                break;
            }
        }
        Ok(())
    }

    /// Lazy page-by-page enumeration starting at position `offset`
    pub fn id_pages(&self, offset: u64) -> IdPages<'_, E> {
        IdPages {
            service: self,
            offset,
            page: Vec::new().into_iter(),
            done: false,
        }
    }

    fn fetch_page(&self, skip: u64) -> Result<Vec<IdEntry>> {
        let results = self.executor.execute_batch(&[Statement::ListIdentities {
            skip,
            limit: self.config.page_size,
        }])?;
        match results.first() {
            Some(result) => Ok(result.decode_rows()?),
            None => Ok(Vec::new()),
        }
    }

    // ========== Decoding ==========

    /// Decode an instrument payload from a JSON stream
    ///
    /// Returns the record and its uuid. Malformed input is an
    /// [`Error::InvalidRequest`].
    pub fn decode_json<R: Read>(&self, reader: R) -> Result<(FinancialInstrument, String)> {
        Ok(finstrument_core::decode_json(reader)?)
    }
}

/// Offset-based iterator over (id, hash) pairs
///
/// Pages of `page_size` entries are fetched on demand. An empty page ends the
/// sequence. Ordering is whatever the store yields, so entries may be missed
/// or repeated if the store changes mid-scan.
///
/// A failed page fetch either yields the error once and ends, or ends
/// silently, depending on [`ServiceConfig::enumeration_failure`].
pub struct IdPages<'a, E: BatchExecutor> {
    service: &'a FinancialInstrumentService<E>,
    offset: u64,
    page: std::vec::IntoIter<IdEntry>,
    done: bool,
}

impl<E: BatchExecutor> IdPages<'_, E> {
    /// Position of the next entry; restart a scan here with
    /// [`FinancialInstrumentService::id_pages`]
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl<E: BatchExecutor> Iterator for IdPages<'_, E> {
    type Item = Result<IdEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.page.next() {
                self.offset += 1;
                return Some(Ok(entry));
            }
            if self.done {
                return None;
            }
            match self.service.fetch_page(self.offset) {
                Ok(page) if page.is_empty() => {
                    self.done = true;
                    return None;
                }
                Ok(page) => {
                    debug!(
                        target: "finstrument::ids",
                        offset = self.offset,
                        entries = page.len(),
                        "Fetched identity page"
                    );
                    self.page = page.into_iter();
                }
                Err(e) => {
                    self.done = true;
                    match self.service.config.enumeration_failure {
                        EnumerationFailure::Propagate => return Some(Err(e)),
                        EnumerationFailure::EndOfStream => {
                            warn!(
                                target: "finstrument::ids",
                                offset = self.offset,
                                error = %e,
                                "Page fetch failed; ending enumeration"
                            );
                            return None;
                        }
                    }
                }
            }
        }
    }
}
