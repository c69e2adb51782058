//! Row groups: fixed-capacity slot arrays with an MVCC header, laid out as
//! one or more tiles (column groups). Built on safe, typed, per-column
//! storage behind `parking_lot::RwLock` rather than raw pointer arithmetic,
//! since this subsystem's concurrency model requires real thread safety.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::storage::manager::StorageManager;
use crate::storage::table::Schema;
use crate::storage::tuple::{Tuple, Value};
use crate::types::{CID, Oid, TxID};

/// `column_index -> (tile_index, column_offset_within_tile)`.
pub type ColumnMap = HashMap<Oid, (Oid, Oid)>;

/// A single-tile identity column map: column `k` lives at tile 0, offset `k`.
pub fn default_column_map(column_count: usize) -> ColumnMap {
    (0..column_count as Oid).map(|k| (k, (0, k))).collect()
}

struct SlotHeader {
    /// Transaction that created this version. 0 = slot not yet allocated.
    creator: AtomicU64,
    /// Transaction that deleted this version. 0 = not deleted.
    deleter: AtomicU64,
}

impl SlotHeader {
    fn empty() -> Self {
        SlotHeader {
            creator: AtomicU64::new(0),
            deleter: AtomicU64::new(0),
        }
    }
}

/// Per-slot MVCC metadata for an entire row group.
pub struct RowGroupHeader {
    slots: Vec<SlotHeader>,
    next_slot: AtomicU32,
    allocated_count: u32,
}

impl RowGroupHeader {
    fn new(allocated_count: u32) -> Self {
        RowGroupHeader {
            slots: (0..allocated_count).map(|_| SlotHeader::empty()).collect(),
            next_slot: AtomicU32::new(0),
            allocated_count,
        }
    }

    fn claim_slot(&self) -> Option<Oid> {
        let slot = self.next_slot.fetch_add(1, Ordering::SeqCst);
        if slot >= self.allocated_count {
            return None;
        }
        Some(slot)
    }

    fn install_creator(&self, slot: Oid, txn_id: TxID) {
        self.slots[slot as usize].creator.store(txn_id, Ordering::SeqCst);
    }

    /// High-water mark of slots ever claimed, capped at `allocated_count`.
    fn next_slot_count(&self) -> Oid {
        self.next_slot.load(Ordering::SeqCst).min(self.allocated_count)
    }

    pub fn is_visible(&self, slot: Oid, txn_id: TxID, last_commit_id: CID) -> bool {
        if slot >= self.allocated_count {
            return false;
        }
        let header = &self.slots[slot as usize];
        let creator = header.creator.load(Ordering::SeqCst);
        if creator == 0 {
            return false;
        }
        let created_visible = creator == txn_id || creator as CID <= last_commit_id;
        if !created_visible {
            return false;
        }
        let deleter = header.deleter.load(Ordering::SeqCst);
        if deleter == 0 {
            return true;
        }
        let deleted_visible = deleter == txn_id || deleter as CID <= last_commit_id;
        !deleted_visible
    }

    fn delete(&self, slot: Oid, txn_id: TxID, last_commit_id: CID) -> bool {
        if !self.is_visible(slot, txn_id, last_commit_id) {
            return false;
        }
        let header = &self.slots[slot as usize];
        header
            .deleter
            .compare_exchange(0, txn_id, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn copy_from(&self, other: &RowGroupHeader) {
        let n = self.allocated_count.min(other.allocated_count) as usize;
        for i in 0..n {
            let creator = other.slots[i].creator.load(Ordering::SeqCst);
            let deleter = other.slots[i].deleter.load(Ordering::SeqCst);
            self.slots[i].creator.store(creator, Ordering::SeqCst);
            self.slots[i].deleter.store(deleter, Ordering::SeqCst);
        }
        self.next_slot
            .store(other.next_slot.load(Ordering::SeqCst), Ordering::SeqCst);
    }
}

/// A column-group within a row group: a contiguous run of columns sharing
/// one physical layout, stored column-major (`columns[offset][slot]`).
pub struct Tile {
    schema: Schema,
    columns: RwLock<Vec<Vec<Value>>>,
}

impl Tile {
    fn new(manager: &StorageManager, schema: Schema, capacity: usize) -> Self {
        let columns = manager.allocate_tile_storage(schema.column_count(), capacity);
        Tile {
            schema,
            columns: RwLock::new(columns),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    fn set(&self, offset: usize, slot: usize, value: Value) {
        self.columns.write()[offset][slot] = value;
    }

    fn get(&self, offset: usize, slot: usize) -> Value {
        self.columns.read()[offset][slot].clone()
    }

    fn into_storage(self) -> Vec<Vec<Value>> {
        self.columns.into_inner()
    }
}

/// Fixed-capacity container of tuple slots backed by one or more tiles; the
/// unit of allocation and reorganization.
pub struct RowGroup {
    id: Oid,
    database_id: Oid,
    table_id: Oid,
    tiles: Vec<Tile>,
    column_map: ColumnMap,
    header: RowGroupHeader,
}

impl RowGroup {
    pub fn new(
        id: Oid,
        database_id: Oid,
        table_id: Oid,
        manager: &StorageManager,
        tile_schemas: Vec<Schema>,
        column_map: ColumnMap,
        capacity: u32,
    ) -> Self {
        let tiles = tile_schemas
            .into_iter()
            .map(|schema| Tile::new(manager, schema, capacity as usize))
            .collect();
        RowGroup {
            id,
            database_id,
            table_id,
            tiles,
            column_map,
            header: RowGroupHeader::new(capacity),
        }
    }

    pub fn id(&self) -> Oid {
        self.id
    }

    pub fn database_id(&self) -> Oid {
        self.database_id
    }

    pub fn table_id(&self) -> Oid {
        self.table_id
    }

    pub fn next_slot(&self) -> Oid {
        self.header.next_slot_count()
    }

    pub fn allocated_count(&self) -> Oid {
        self.header.allocated_count
    }

    pub fn is_full(&self) -> bool {
        self.next_slot() >= self.allocated_count()
    }

    pub fn column_map(&self) -> &ColumnMap {
        &self.column_map
    }

    pub fn tile_schemas(&self) -> Vec<Schema> {
        self.tiles.iter().map(|t| t.schema().clone()).collect()
    }

    pub fn locate_tile_and_column(&self, col: Oid) -> Option<(Oid, Oid)> {
        self.column_map.get(&col).copied()
    }

    pub fn get_tile(&self, t: Oid) -> Option<&Tile> {
        self.tiles.get(t as usize)
    }

    pub fn get_value(&self, slot: Oid, col: Oid) -> Option<Value> {
        let (tile, offset) = self.locate_tile_and_column(col)?;
        Some(self.tiles[tile as usize].get(offset as usize, slot as usize))
    }

    /// Insert `tuple`'s values into a freshly claimed slot. Returns `None`
    /// if the row group is full.
    pub fn insert(&self, txn_id: TxID, tuple: &dyn Tuple) -> Option<Oid> {
        let slot = self.header.claim_slot()?;
        self.header.install_creator(slot, txn_id);
        for (&col, &(tile, offset)) in &self.column_map {
            self.tiles[tile as usize].set(offset as usize, slot as usize, tuple.get_value(col));
        }
        Some(slot)
    }

    pub fn delete(&self, slot: Oid, txn_id: TxID, last_commit_id: CID) -> bool {
        self.header.delete(slot, txn_id, last_commit_id)
    }

    pub fn is_visible(&self, slot: Oid, txn_id: TxID, last_commit_id: CID) -> bool {
        self.header.is_visible(slot, txn_id, last_commit_id)
    }

    /// Copy another row group's MVCC header into this one, slot for slot.
    /// Used by the reorganizer to carry visibility state across a rewrite.
    pub fn copy_header_from(&self, other: &RowGroup) {
        self.header.copy_from(&other.header);
    }

    /// Copy one logical column's values from `self` into `dest`, slot by
    /// slot, across `allocated_count` slots.
    pub fn copy_column_into(&self, dest: &RowGroup, col: Oid) {
        let (src_tile, src_offset) = match self.locate_tile_and_column(col) {
            Some(loc) => loc,
            None => return,
        };
        let (dst_tile, dst_offset) = match dest.locate_tile_and_column(col) {
            Some(loc) => loc,
            None => return,
        };
        let count = self.allocated_count().min(dest.allocated_count());
        for slot in 0..count {
            let value = self.tiles[src_tile as usize].get(src_offset as usize, slot as usize);
            dest.tiles[dst_tile as usize].set(dst_offset as usize, slot as usize, value);
        }
    }

    /// Reclaim this row group's per-tile storage back into the pool it was
    /// allocated from.
    pub fn reclaim(self, manager: &StorageManager) {
        for tile in self.tiles {
            manager.reclaim_tile_storage(tile.into_storage());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::table::Column;
    use crate::storage::tuple::{OwnedTuple, Value, ValueType};

    fn schema() -> Schema {
        Schema::new(vec![
            Column::new("id", ValueType::Integer, false),
            Column::new("name", ValueType::Varchar, true),
        ])
    }

    #[test]
    fn insert_claims_sequential_slots_and_is_visible_to_self() {
        let manager = StorageManager::new();
        let rg = RowGroup::new(0, 0, 0, &manager, vec![schema()], default_column_map(2), 4);
        let tuple = OwnedTuple::from_values(vec![Value::Integer(1), Value::Varchar("a".into())]);
        let slot = rg.insert(1, &tuple).expect("slot");
        assert_eq!(slot, 0);
        assert!(rg.is_visible(slot, 1, 0));
        assert_eq!(rg.get_value(slot, 0), Some(Value::Integer(1)));
    }

    #[test]
    fn insert_fails_once_full() {
        let manager = StorageManager::new();
        let rg = RowGroup::new(0, 0, 0, &manager, vec![schema()], default_column_map(2), 2);
        let tuple = OwnedTuple::from_values(vec![Value::Integer(1), Value::Null]);
        assert!(rg.insert(1, &tuple).is_some());
        assert!(rg.insert(1, &tuple).is_some());
        assert!(rg.insert(1, &tuple).is_none());
        assert!(rg.is_full());
    }

    #[test]
    fn delete_then_visibility_for_other_committed_txn() {
        let manager = StorageManager::new();
        let rg = RowGroup::new(0, 0, 0, &manager, vec![schema()], default_column_map(2), 4);
        let tuple = OwnedTuple::from_values(vec![Value::Integer(5), Value::Null]);
        let slot = rg.insert(10, &tuple).unwrap();
        assert!(rg.delete(slot, 11, 10));
        // txn 12 with a snapshot that has seen both commits should not see it.
        assert!(!rg.is_visible(slot, 12, 11));
        // the deleting transaction still sees its own delete as "not visible".
        assert!(!rg.is_visible(slot, 11, 0));
        // double delete fails.
        assert!(!rg.delete(slot, 13, 11));
    }
}
