//! In-process tables with the same transactional contract as PostgreSQL
//!
//! Transactions are serialized: `begin` takes the table lock and works on a
//! copy, `commit` swaps the copy in, dropping the transaction discards it.

use chrono::Utc;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{Pagination, Record};

#[derive(Clone)]
struct Row {
    /// Insertion order, standing in for `ORDER BY created_at, id`
    seq: u64,
    record: Arc<dyn Any + Send + Sync>,
}

#[derive(Clone, Default)]
struct Tables {
    rows: HashMap<&'static str, BTreeMap<Uuid, Row>>,
    next_seq: u64,
}

#[derive(Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) async fn begin(&self) -> MemoryTx {
        let committed = Arc::clone(&self.tables).lock_owned().await;
        let working = committed.clone();
        MemoryTx { committed, working }
    }
}

pub struct MemoryTx {
    committed: OwnedMutexGuard<Tables>,
    working: Tables,
}

impl MemoryTx {
    fn rows<R: Record>(&self) -> Vec<&R> {
        let mut rows: Vec<&Row> = self
            .working
            .rows
            .get(R::TABLE)
            .into_iter()
            .flat_map(|table| table.values())
            .collect();
        rows.sort_by_key(|row| row.seq);
        rows.into_iter()
            .filter_map(|row| row.record.downcast_ref::<R>())
            .collect()
    }

    fn table_mut(&mut self, table: &'static str) -> &mut BTreeMap<Uuid, Row> {
        self.working.rows.entry(table).or_default()
    }

    pub fn find<R: Record>(&self, id: Uuid) -> Option<R> {
        self.working
            .rows
            .get(R::TABLE)
            .and_then(|table| table.get(&id))
            .and_then(|row| row.record.downcast_ref::<R>())
            .cloned()
    }

    pub fn find_by<R: Record>(&self, column: &str, value: &str) -> Option<R> {
        self.rows::<R>()
            .into_iter()
            .find(|r| r.text_column(column) == Some(value))
            .cloned()
    }

    pub fn count<R: Record>(&self) -> u64 {
        self.working
            .rows
            .get(R::TABLE)
            .map(|table| table.len() as u64)
            .unwrap_or(0)
    }

    pub fn page<R: Record>(&self, pagination: &Pagination) -> Vec<R> {
        let offset = usize::try_from(pagination.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(pagination.limit()).unwrap_or(usize::MAX);
        self.rows::<R>()
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn all<R: Record>(&self) -> Vec<R> {
        self.rows::<R>().into_iter().cloned().collect()
    }

    fn stored<R: Record>(record: &R) -> Arc<dyn Any + Send + Sync> {
        let mut row = record.clone();
        row.scrub();
        Arc::new(row)
    }

    pub fn create<R: Record>(&mut self, record: &mut R) {
        let now = Utc::now();
        record.stamp(Uuid::new_v4(), now, now);
        let seq = self.working.next_seq;
        self.working.next_seq += 1;
        let row = Row {
            seq,
            record: Self::stored(record),
        };
        self.table_mut(R::TABLE).insert(record.id(), row);
    }

    /// Replace an existing row; a row that vanished is not resurrected
    pub fn update<R: Record>(&mut self, record: &mut R) {
        record.stamp(record.id(), record.created_at(), Utc::now());
        let updated = Self::stored(record);
        if let Some(row) = self.table_mut(R::TABLE).get_mut(&record.id()) {
            row.record = updated;
        }
    }

    pub fn destroy<R: Record>(&mut self, id: Uuid) -> bool {
        self.table_mut(R::TABLE).remove(&id).is_some()
    }

    pub fn commit(self) {
        let MemoryTx {
            mut committed,
            working,
        } = self;
        *committed = working;
    }
}
