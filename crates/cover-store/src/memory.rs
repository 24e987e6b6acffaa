//! In-memory store.

use std::collections::BTreeMap;

use cover_model::{CoverageRecord, LayoutType, LoadScope, RecordKey};

use crate::error::Result;
use crate::store::{CoverageStore, RecordFilter, StoreTransaction};

type StoreKey = (LayoutType, Option<String>, RecordKey);

/// A store held in a sorted map.
///
/// Transactions work on a copy of the committed map and swap it in on
/// commit, so readers never see a half-applied reload.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<StoreKey, CoverageRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> impl Iterator<Item = &CoverageRecord> {
        self.records.values()
    }
}

pub struct MemoryTransaction<'a> {
    store: &'a mut MemoryStore,
    staged: BTreeMap<StoreKey, CoverageRecord>,
}

impl StoreTransaction for MemoryTransaction<'_> {
    fn delete_scope(&mut self, scope: &LoadScope) -> Result<usize> {
        let before = self.staged.len();
        self.staged.retain(|_, record| !scope.contains(record));
        Ok(before - self.staged.len())
    }

    fn upsert(&mut self, record: &CoverageRecord) -> Result<()> {
        self.staged.insert(
            (record.layout, record.series.clone(), record.key.clone()),
            record.clone(),
        );
        Ok(())
    }

    fn commit(self) -> Result<()> {
        self.store.records = self.staged;
        Ok(())
    }
}

impl CoverageStore for MemoryStore {
    type Transaction<'a> = MemoryTransaction<'a>;

    fn begin(&mut self) -> Result<Self::Transaction<'_>> {
        let staged = self.records.clone();
        Ok(MemoryTransaction {
            store: self,
            staged,
        })
    }

    fn query(&self, filter: &RecordFilter) -> Result<Vec<CoverageRecord>> {
        Ok(self
            .records
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.records.len())
    }
}
