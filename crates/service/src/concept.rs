//! ConceptService: the surface a transport layer programs against
//!
//! One service instance handles one concept type. The trait is object safe,
//! so a router can hold several services behind `Box<dyn ConceptService<..>>`.

use std::io::Read;

use finstrument_core::{FinancialInstrument, IdEntry};
use finstrument_executor::BatchExecutor;

use crate::service::FinancialInstrumentService;
use crate::Result;

/// Read, write, delete and enumerate one concept type
pub trait ConceptService: Send + Sync {
    /// Record type stored by this service
    type Record;

    /// Declare indexes and constraints
    fn initialise(&self) -> Result<()>;

    /// Fetch one record; `None` if absent
    fn read(&self, uuid: &str) -> Result<Option<Self::Record>>;

    /// Create or fully replace a record
    fn write(&self, record: &Self::Record) -> Result<()>;

    /// Delete a record; `false` if there was nothing to delete
    fn delete(&self, uuid: &str) -> Result<bool>;

    /// Number of stored records
    fn count(&self) -> Result<u64>;

    /// Visit every (id, hash) pair until `visit` returns `Ok(false)` or an error
    fn ids(&self, visit: &mut dyn FnMut(IdEntry) -> Result<bool>) -> Result<()>;

    /// Connectivity probe
    fn check(&self) -> Result<()>;

    /// Decode a record payload, returning it with its uuid
    fn decode_json(&self, reader: &mut dyn Read) -> Result<(Self::Record, String)>;
}

impl<E: BatchExecutor> ConceptService for FinancialInstrumentService<E> {
    type Record = FinancialInstrument;

    fn initialise(&self) -> Result<()> {
        FinancialInstrumentService::initialise(self)
    }

    fn read(&self, uuid: &str) -> Result<Option<FinancialInstrument>> {
        FinancialInstrumentService::read(self, uuid)
    }

    fn write(&self, record: &FinancialInstrument) -> Result<()> {
        FinancialInstrumentService::write(self, record)
    }

    fn delete(&self, uuid: &str) -> Result<bool> {
        FinancialInstrumentService::delete(self, uuid)
    }

    fn count(&self) -> Result<u64> {
        FinancialInstrumentService::count(self)
    }

    fn ids(&self, visit: &mut dyn FnMut(IdEntry) -> Result<bool>) -> Result<()> {
        FinancialInstrumentService::ids(self, visit)
    }

    fn check(&self) -> Result<()> {
        FinancialInstrumentService::check(self)
    }

    fn decode_json(&self, reader: &mut dyn Read) -> Result<(FinancialInstrument, String)> {
        FinancialInstrumentService::decode_json(self, reader)
    }
}
