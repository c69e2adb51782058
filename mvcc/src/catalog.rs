//! Process-wide context: the row-group directory and id minters. Modeled
//! as an explicitly-constructed, `Arc`-shared object rather than a
//! `lazy_static!` singleton, so tests can spin up an isolated catalog per
//! table instead of sharing hidden global state.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::storage::manager::StorageManager;
use crate::storage::row_group::RowGroup;
use crate::types::Oid;

/// Maps row-group id to the `RowGroup` it names, and mints fresh ids.
/// Lookups are lock-free from the caller's perspective (sharded internally
/// by `DashMap`).
pub struct RowGroupDirectory {
    groups: DashMap<Oid, Arc<RowGroup>>,
    next_id: AtomicU32,
}

impl RowGroupDirectory {
    pub fn new() -> Self {
        RowGroupDirectory {
            groups: DashMap::new(),
            next_id: AtomicU32::new(0),
        }
    }

    pub fn mint_id(&self) -> Oid {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn register(&self, id: Oid, group: Arc<RowGroup>) {
        self.groups.insert(id, group);
    }

    pub fn lookup(&self, id: Oid) -> Option<Arc<RowGroup>> {
        self.groups.get(&id).map(|entry| entry.value().clone())
    }

    /// Atomically rebind `id` to `group`, returning the previous row group
    /// if one was registered.
    pub fn rebind(&self, id: Oid, group: Arc<RowGroup>) -> Option<Arc<RowGroup>> {
        self.groups.insert(id, group)
    }

    pub fn remove(&self, id: Oid) -> Option<Arc<RowGroup>> {
        self.groups.remove(&id).map(|(_, v)| v)
    }
}

impl Default for RowGroupDirectory {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide context threaded through table construction: the row-group
/// directory, its id minter, the storage backend, and an object-id minter
/// for tables, the catalog's other job.
pub struct Catalog {
    pub directory: RowGroupDirectory,
    pub manager: StorageManager,
    next_table_id: AtomicU32,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog {
            directory: RowGroupDirectory::new(),
            manager: StorageManager::new(),
            next_table_id: AtomicU32::new(0),
        }
    }

    pub fn mint_table_id(&self) -> Oid {
        self.next_table_id.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
