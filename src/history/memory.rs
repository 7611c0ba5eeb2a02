use std::collections::HashMap;

use super::store::{validate_batch, HistoryError, HistoryStore};
use super::types::{BatchId, BatchState, BatchSummary, NewRecord, RenameRecord};

/// History kept in process memory; the sidecar store persists one of these
#[derive(Debug, Clone)]
pub struct MemoryStore {
    records: Vec<RenameRecord>,
    next_id: u64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }

    /// Rebuild a store from previously saved records
    pub fn from_records(records: Vec<RenameRecord>) -> Self {
        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        Self { records, next_id }
    }

    pub fn records(&self) -> &[RenameRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn latest_batch(&self, eligible: impl Fn(BatchState) -> bool) -> Option<BatchId> {
        self.records
            .iter()
            .filter(|r| eligible(r.state))
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
            .map(|r| r.batch_id.clone())
    }
}

impl HistoryStore for MemoryStore {
    fn append(&mut self, records: &[NewRecord]) -> Result<(), HistoryError> {
        validate_batch(records)?;

        let Some(first) = records.first() else {
            return Ok(());
        };

        if self.records.iter().any(|r| r.batch_id == first.batch_id) {
            return Err(HistoryError::DuplicateBatch(first.batch_id.clone()));
        }

        for record in records {
            self.records.push(RenameRecord::from_new(self.next_id, record));
            self.next_id += 1;
        }

        Ok(())
    }

    fn last_applied_batch(&self) -> Result<Option<BatchId>, HistoryError> {
        Ok(self.latest_batch(|s| s.is_undoable()))
    }

    fn last_undone_batch(&self) -> Result<Option<BatchId>, HistoryError> {
        Ok(self.latest_batch(|s| s.is_redoable()))
    }

    fn records_of(&self, batch_id: &BatchId) -> Result<Vec<RenameRecord>, HistoryError> {
        let mut records: Vec<RenameRecord> = self
            .records
            .iter()
            .filter(|r| &r.batch_id == batch_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    fn mark_batch(&mut self, batch_id: &BatchId, state: BatchState) -> Result<(), HistoryError> {
        let mut touched = 0;
        for record in self.records.iter_mut().filter(|r| &r.batch_id == batch_id) {
            record.state = state;
            touched += 1;
        }

        if touched == 0 {
            return Err(HistoryError::UnknownBatch(batch_id.clone()));
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<usize, HistoryError> {
        let removed = self.records.len();
        self.records.clear();
        Ok(removed)
    }

    fn batches(&self) -> Result<Vec<BatchSummary>, HistoryError> {
        let mut by_batch: HashMap<&BatchId, BatchSummary> = HashMap::new();

        for record in &self.records {
            by_batch
                .entry(&record.batch_id)
                .and_modify(|summary| {
                    summary.record_count += 1;
                    summary.created_at = summary.created_at.max(record.created_at);
                })
                .or_insert_with(|| BatchSummary {
                    batch_id: record.batch_id.clone(),
                    operation: record.operation,
                    state: record.state,
                    record_count: 1,
                    created_at: record.created_at,
                });
        }

        let mut summaries: Vec<BatchSummary> = by_batch.into_values().collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }
}
