//! Shared test doubles: a simple in-memory multimap index keyed on owned
//! tuples, plus a monotonic transaction/commit-id source.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Once;

use mvcc::index::{ConstraintKind, Index};
use mvcc::storage::tuple::OwnedTuple;
use mvcc::types::{ItemPointer, Oid, TxID};
use mvcc::{SimpleTransaction, Transaction};
use parking_lot::Mutex;

static LOG_INIT: Once = Once::new();

/// Install `env_logger` once per test binary. The library itself never
/// bundles a logger; tests that want to see `debug!`/`trace!` output on
/// failure call this first.
pub fn init_logging() {
    LOG_INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub struct MemIndex {
    oid: Oid,
    indexed_columns: Vec<Oid>,
    constraint_kind: ConstraintKind,
    entries: Mutex<Vec<(OwnedTuple, ItemPointer)>>,
}

impl MemIndex {
    pub fn new(oid: Oid, indexed_columns: Vec<Oid>, constraint_kind: ConstraintKind) -> Self {
        MemIndex {
            oid,
            indexed_columns,
            constraint_kind,
            entries: Mutex::new(Vec::new()),
        }
    }
}

impl Index for MemIndex {
    fn oid(&self) -> Oid {
        self.oid
    }

    fn indexed_columns(&self) -> &[Oid] {
        &self.indexed_columns
    }

    fn constraint_kind(&self) -> ConstraintKind {
        self.constraint_kind
    }

    fn scan(&self, key: &OwnedTuple) -> Vec<ItemPointer> {
        self.entries
            .lock()
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, p)| *p)
            .collect()
    }

    fn insert(&self, key: OwnedTuple, ptr: ItemPointer) -> bool {
        self.entries.lock().push((key, ptr));
        true
    }

    fn update(&self, key: OwnedTuple, ptr: ItemPointer) -> bool {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = ptr;
            true
        } else {
            false
        }
    }

    fn delete(&self, key: &OwnedTuple, ptr: ItemPointer) {
        self.entries.lock().retain(|(k, p)| !(k == key && *p == ptr));
    }
}

/// Monotonic transaction-id/commit-id source for tests: a single shared
/// counter domain, treating a committed transaction's own id as its
/// eventual commit-id watermark.
pub struct TxnSource {
    next: AtomicU64,
}

impl TxnSource {
    pub fn new() -> Self {
        TxnSource {
            next: AtomicU64::new(1),
        }
    }

    /// Begin a new transaction whose snapshot sees everything up to
    /// `last_commit_id`.
    pub fn begin(&self, last_commit_id: TxID) -> SimpleTransaction {
        let id = self.next.fetch_add(1, Ordering::SeqCst);
        SimpleTransaction::new(id, last_commit_id)
    }
}

pub fn commit_id_of(txn: &dyn Transaction) -> TxID {
    txn.transaction_id()
}
