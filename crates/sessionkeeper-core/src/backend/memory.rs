use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::trace;

use super::{Match, SecureStore, Status};
use crate::query::{Attributes, Query};

#[derive(Debug, Clone)]
struct Record {
    attributes: Attributes,
    data: Vec<u8>,
}

/// In-process secure store.
///
/// Follows keychain matching rules: attributes missing from a query match
/// anything, adding an exact duplicate fails, and updates or deletes that
/// match nothing report `ITEM_NOT_FOUND`. Nothing is persisted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn records(&self) -> MutexGuard<'_, Vec<Record>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SecureStore for MemoryStore {
    fn copy_matching(&self, query: &Query) -> Result<Match, Status> {
        let records = self.records();
        let record = records
            .iter()
            .find(|r| query.matches(&r.attributes))
            .ok_or(Status::ITEM_NOT_FOUND)?;

        Ok(Match {
            attributes: query.return_attributes.then(|| record.attributes.clone()),
            data: query.return_data.then(|| record.data.clone()),
        })
    }

    fn add(&self, query: &Query, data: &[u8]) -> Result<(), Status> {
        let attributes = query.attributes();
        let mut records = self.records();
        if records.iter().any(|r| r.attributes == attributes) {
            return Err(Status::DUPLICATE_ITEM);
        }
        trace!(service = ?attributes.service, "Adding record");
        records.push(Record {
            attributes,
            data: data.to_vec(),
        });
        Ok(())
    }

    fn update(&self, query: &Query, data: &[u8]) -> Result<(), Status> {
        let mut records = self.records();
        let mut updated = 0;
        for record in records.iter_mut().filter(|r| query.matches(&r.attributes)) {
            record.data = data.to_vec();
            updated += 1;
        }
        if updated == 0 {
            return Err(Status::ITEM_NOT_FOUND);
        }
        Ok(())
    }

    fn delete(&self, query: &Query) -> Result<(), Status> {
        let mut records = self.records();
        let before = records.len();
        records.retain(|r| !query.matches(&r.attributes));
        if records.len() == before {
            return Err(Status::ITEM_NOT_FOUND);
        }
        trace!(removed = before - records.len(), "Deleted records");
        Ok(())
    }
}
