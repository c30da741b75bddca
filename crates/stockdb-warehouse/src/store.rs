use crate::schema::quote::QuoteRecord;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// In-memory collection of the quotes scraped since the last successful insert.
///
/// Cloning the handle shares the collection. Every operation takes the same lock for its whole
/// duration, so readers observe either all of an append or none of it.
#[derive(Clone, Debug, Default)]
pub struct RecordStore {
    records: Arc<Mutex<Vec<QuoteRecord>>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking holder can only have been mid `push` or `take`, both of which leave a valid Vec.
    fn lock(&self) -> MutexGuard<'_, Vec<QuoteRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add `record` at the end of the collection.
    pub fn append(&self, record: QuoteRecord) {
        self.lock().push(record);
    }

    /// Copy of every record, in insertion order.
    pub fn snapshot(&self) -> Vec<QuoteRecord> {
        self.lock().clone()
    }

    /// Take every record and leave the store empty, in one critical section.
    pub fn drain_and_clear(&self) -> Vec<QuoteRecord> {
        std::mem::take(&mut *self.lock())
    }

    /// Swap the whole collection for `records`, returning what it held before.
    pub fn replace(&self, records: Vec<QuoteRecord>) -> Vec<QuoteRecord> {
        std::mem::replace(&mut *self.lock(), records)
    }

    /// Append every record of `records`, in order, in one critical section.
    pub fn extend(&self, records: Vec<QuoteRecord>) {
        self.lock().extend(records);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
