//! In-process [`SubmissionStore`] used by the test suites.
//!
//! Inserted rows are held uncommitted until their transaction commits and are
//! discarded on rollback or drop. Only committed rows answer the duplicate
//! check. Like a Postgres unique index, the email/phone constraint is checked
//! at insert time against committed and in-flight rows alike. The store can
//! skip the constraint, fail every insert, and pause each transaction right
//! after its duplicate check so concurrent submissions interleave
//! deterministically.

use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Barrier;

use crate::form_models::FormResponseRecord;
use crate::storage::{StoreError, SubmissionStore, SubmissionTransaction};

struct Row {
    id: i64,
    record: FormResponseRecord,
    committed: bool,
}

#[derive(Default)]
struct Shared {
    rows: Mutex<Vec<Row>>,
    next_id: AtomicI64,
    open_transactions: AtomicUsize,
    rollbacks: AtomicUsize,
}

impl Shared {
    fn rows(&self) -> MutexGuard<'_, Vec<Row>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drops the uncommitted rows written by one transaction.
    fn discard(&self, ids: &[i64]) {
        self.rows().retain(|row| row.committed || !ids.contains(&row.id));
    }
}

#[derive(Clone)]
pub struct MemoryStore {
    shared: Arc<Shared>,
    unique_constraint: bool,
    fail_inserts: bool,
    check_barrier: Option<Arc<Barrier>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store with email/phone uniqueness enforced.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            unique_constraint: true,
            fail_inserts: false,
            check_barrier: None,
        }
    }

    /// Accept duplicate email/phone rows.
    pub fn without_unique_constraint(mut self) -> Self {
        self.unique_constraint = false;
        self
    }

    /// Every insert writes its row and then reports a backend failure.
    pub fn failing_inserts(mut self) -> Self {
        self.fail_inserts = true;
        self
    }

    /// Every transaction waits on `barrier` after its duplicate check.
    pub fn with_check_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.check_barrier = Some(barrier);
        self
    }

    /// Committed rows in insertion order.
    pub async fn records(&self) -> Vec<FormResponseRecord> {
        self.shared
            .rows()
            .iter()
            .filter(|row| row.committed)
            .map(|row| row.record.clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.shared.rows().iter().filter(|row| row.committed).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Transactions begun and not yet committed, rolled back, or dropped.
    pub fn open_transactions(&self) -> usize {
        self.shared.open_transactions.load(Ordering::SeqCst)
    }

    /// Explicit rollbacks performed so far.
    pub fn rollbacks(&self) -> usize {
        self.shared.rollbacks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn SubmissionTransaction>, StoreError> {
        self.shared.open_transactions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryTransaction {
            store: self.clone(),
            written: Vec::new(),
        }))
    }
}

pub struct MemoryTransaction {
    store: MemoryStore,
    written: Vec<i64>,
}

fn conflicts(a: &FormResponseRecord, b: &FormResponseRecord) -> bool {
    a.email == b.email || a.phone == b.phone
}

#[async_trait]
impl SubmissionTransaction for MemoryTransaction {
    async fn find_existing(
        &mut self,
        email: &str,
        phone: &str,
    ) -> Result<Option<i64>, StoreError> {
        let existing = self
            .store
            .shared
            .rows()
            .iter()
            .filter(|row| row.committed)
            .find(|row| row.record.email == email || row.record.phone == phone)
            .map(|row| row.id);

        if let Some(barrier) = &self.store.check_barrier {
            barrier.wait().await;
        }

        Ok(existing)
    }

    async fn insert(&mut self, record: &FormResponseRecord) -> Result<i64, StoreError> {
        let mut rows = self.store.shared.rows();

        if self.store.unique_constraint && rows.iter().any(|row| conflicts(&row.record, record)) {
            return Err(StoreError::UniqueViolation);
        }

        let id = self.store.shared.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        rows.push(Row {
            id,
            record: record.clone(),
            committed: false,
        });
        self.written.push(id);

        if self.store.fail_inserts {
            return Err(StoreError::Backend("simulated insert failure".to_string()));
        }

        Ok(id)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let mut tx = self;
        let written = std::mem::take(&mut tx.written);
        for row in tx.store.shared.rows().iter_mut() {
            if written.contains(&row.id) {
                row.committed = true;
            }
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        let mut tx = self;
        let written = std::mem::take(&mut tx.written);
        tx.store.shared.discard(&written);
        tx.store.shared.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        if !self.written.is_empty() {
            self.store.shared.discard(&self.written);
        }
        self.store
            .shared
            .open_transactions
            .fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(email: &str, phone: &str) -> FormResponseRecord {
        FormResponseRecord {
            email: email.to_string(),
            phone: phone.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_conflicts_with_in_flight_row() {
        let store = MemoryStore::new();
        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();

        first.insert(&record("a@example.com", "1")).await.unwrap();
        let err = second
            .insert(&record("a@example.com", "2"))
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::UniqueViolation);
        second.rollback().await.unwrap();
        first.commit().await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(store.open_transactions(), 0);
    }

    #[tokio::test]
    async fn test_uncommitted_rows_invisible_and_discarded_on_drop() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert(&record("b@example.com", "3")).await.unwrap();

        let mut reader = store.begin().await.unwrap();
        assert_eq!(reader.find_existing("b@example.com", "3").await.unwrap(), None);
        drop(reader);

        drop(tx);
        assert!(store.is_empty().await);

        // The dropped row no longer blocks the same contact.
        let mut retry = store.begin().await.unwrap();
        retry.insert(&record("b@example.com", "3")).await.unwrap();
        retry.commit().await.unwrap();
        assert_eq!(store.len().await, 1);
    }
}
