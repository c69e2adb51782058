//! `Table`: owns a table's ordered row-group ids, its indexes, and its
//! foreign keys; serializes growth and list mutation behind a single mutex.
//! The MVCC insert/update/delete surface lives in `index_coordinator`,
//! which operates on `&Table`.

use std::sync::Arc;

use log::{debug, trace};
use parking_lot::Mutex;

use crate::catalog::Catalog;
use crate::error::{StorageError, StorageResult};
use crate::foreign_key::{ForeignKey, ForeignKeySet};
use crate::index::{Index, IndexSet};
use crate::index_coordinator;
use crate::reorganizer;
use crate::stats::Stats;
use crate::storage::row_group::{default_column_map, ColumnMap, RowGroup};
use crate::storage::table::Schema;
use crate::storage::tuple::Tuple;
use crate::txn::Transaction;
use crate::types::{ItemPointer, Oid};

struct TableInner {
    row_groups: Vec<Oid>,
    indexes: IndexSet,
    foreign_keys: ForeignKeySet,
    schema: Schema,
}

pub struct Table {
    database_id: Oid,
    table_id: Oid,
    name: String,
    tuples_per_row_group: u32,
    catalog: Arc<Catalog>,
    inner: Mutex<TableInner>,
    stats: Stats,
}

impl Table {
    /// Construct a table seeded with one row group; the row-group id
    /// sequence is never empty once a table exists.
    pub fn new(
        catalog: Arc<Catalog>,
        database_id: Oid,
        table_id: Oid,
        name: impl Into<String>,
        schema: Schema,
        tuples_per_row_group: u32,
    ) -> Self {
        let table = Table {
            database_id,
            table_id,
            name: name.into(),
            tuples_per_row_group,
            catalog,
            inner: Mutex::new(TableInner {
                row_groups: Vec::new(),
                indexes: IndexSet::new(),
                foreign_keys: ForeignKeySet::new(),
                schema,
            }),
            stats: Stats::new(),
        };
        table.add_default_row_group();
        table
    }

    pub fn database_id(&self) -> Oid {
        self.database_id
    }

    pub fn table_id(&self) -> Oid {
        self.table_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tuples_per_row_group(&self) -> u32 {
        self.tuples_per_row_group
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn schema(&self) -> Schema {
        self.inner.lock().schema.clone()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn row_group_count(&self) -> usize {
        self.inner.lock().row_groups.len()
    }

    pub fn row_group_ids(&self) -> Vec<Oid> {
        self.inner.lock().row_groups.clone()
    }

    pub fn has_primary_key(&self) -> bool {
        self.inner.lock().indexes.has_primary_key()
    }

    pub fn unique_constraint_count(&self) -> usize {
        self.inner.lock().indexes.unique_constraint_count()
    }

    /// Claim a slot for `tuple`, growing the table if the tail row group is
    /// full. Returns `ItemPointer::INVALID` on a nullability constraint
    /// violation.
    pub fn get_tuple_slot(&self, txn_id: crate::types::TxID, tuple: &dyn Tuple) -> ItemPointer {
        if let Err(e) = self.check_not_null(tuple) {
            debug!("get_tuple_slot rejected: {e}");
            return ItemPointer::INVALID;
        }

        loop {
            let tail_id = {
                let inner = self.inner.lock();
                *inner
                    .row_groups
                    .last()
                    .expect("row_groups is never empty")
            };
            let row_group = self
                .catalog
                .directory
                .lookup(tail_id)
                .expect("registered row group must be resolvable");

            match row_group.insert(txn_id, tuple) {
                Some(slot) => return ItemPointer::new(tail_id, slot),
                None => {
                    trace!("tail row group {tail_id} full, growing");
                    self.add_default_row_group();
                }
            }
        }
    }

    fn check_not_null(&self, tuple: &dyn Tuple) -> StorageResult<()> {
        let inner = self.inner.lock();
        for (idx, column) in inner.schema.columns.iter().enumerate() {
            if !column.nullable && tuple.is_null(idx as Oid) {
                return Err(StorageError::ConstraintViolation(format!(
                    "column '{}' is not nullable",
                    column.name
                )));
            }
        }
        Ok(())
    }

    /// Pre-mint a candidate row group outside the lock, then append it
    /// under the table mutex iff the table is empty or the current tail is
    /// full. Losers of the race discard their candidate.
    fn add_default_row_group(&self) {
        let id = self.catalog.directory.mint_id();
        let column_count = {
            let inner = self.inner.lock();
            inner.schema.column_count()
        };
        let schema = self.schema();
        let candidate = Arc::new(RowGroup::new(
            id,
            self.database_id,
            self.table_id,
            &self.catalog.manager,
            vec![schema],
            default_column_map(column_count),
            self.tuples_per_row_group,
        ));

        let mut inner = self.inner.lock();
        let should_grow = match inner.row_groups.last() {
            None => true,
            Some(&tail_id) => {
                let tail = self
                    .catalog
                    .directory
                    .lookup(tail_id)
                    .expect("registered row group must be resolvable");
                tail.is_full()
            }
        };

        if should_grow {
            self.catalog.directory.register(id, candidate);
            inner.row_groups.push(id);
            debug!("table {} grew to {} row groups", self.table_id, inner.row_groups.len());
        } else {
            trace!("discarding losing growth candidate {id}");
            drop(inner);
            if let Ok(rg) = Arc::try_unwrap(candidate) {
                rg.reclaim(&self.catalog.manager);
            }
        }
    }

    // -- index management --

    pub fn add_index(&self, index: Arc<dyn Index>) {
        let mut inner = self.inner.lock();
        inner.indexes.add(index);
    }

    pub fn get_index_by_offset(&self, offset: usize) -> Option<Arc<dyn Index>> {
        self.inner.lock().indexes.get_by_offset(offset).cloned()
    }

    pub fn get_index_by_oid(&self, oid: Oid) -> Option<Arc<dyn Index>> {
        self.inner.lock().indexes.get_by_oid(oid).cloned()
    }

    pub fn drop_index_by_oid(&self, oid: Oid) -> bool {
        self.inner.lock().indexes.drop_by_oid(oid)
    }

    pub fn index_count(&self) -> usize {
        self.inner.lock().indexes.len()
    }

    /// Snapshot the current index list (cheap `Arc` clones) without holding
    /// the table mutex across any index I/O. `index_coordinator` operates
    /// on this snapshot, never on a locked `IndexSet` directly.
    pub(crate) fn index_snapshot(&self) -> Vec<Arc<dyn Index>> {
        self.inner.lock().indexes.snapshot()
    }

    // -- foreign-key management --

    pub fn add_foreign_key(&self, fk: ForeignKey) {
        let mut inner = self.inner.lock();
        for source_column in &fk.source_columns {
            if let Some(idx) = inner.schema.find_column_index(source_column) {
                inner.schema.columns[idx].constraints.push(fk.name.clone());
            }
        }
        inner.foreign_keys.add(fk);
    }

    pub fn drop_foreign_key(&self, name: &str) -> bool {
        self.inner.lock().foreign_keys.drop_by_name(name)
    }

    pub fn foreign_key_count(&self) -> usize {
        self.inner.lock().foreign_keys.len()
    }

    // -- stats passthroughs --

    pub fn get_row_count(&self) -> i64 {
        self.stats.row_count()
    }

    pub fn is_dirty(&self) -> bool {
        self.stats.is_dirty()
    }

    pub fn reset_dirty(&self) {
        self.stats.reset_dirty()
    }

    pub fn debug_dump(&self, out: &mut dyn std::io::Write) -> std::io::Result<()> {
        let inner = self.inner.lock();
        writeln!(
            out,
            "table {} ({}:{}) row_groups={:?} indexes={} foreign_keys={} row_count={} dirty={}",
            self.name,
            self.database_id,
            self.table_id,
            inner.row_groups,
            inner.indexes.len(),
            inner.foreign_keys.len(),
            self.stats.row_count(),
            self.stats.is_dirty(),
        )
    }

    // -- MVCC hot path --
    // Thin, engine-facing wrappers; the protocol itself lives in
    // `index_coordinator`, which takes `&Table` rather than being a method
    // on it.

    pub fn insert_tuple(&self, txn: &dyn Transaction, tuple: &dyn Tuple) -> ItemPointer {
        index_coordinator::insert_tuple(self, txn, tuple)
    }

    pub fn update_tuple(&self, txn: &dyn Transaction, new_tuple: &dyn Tuple) -> ItemPointer {
        index_coordinator::update_tuple(self, txn, new_tuple)
    }

    pub fn delete_tuple(&self, txn: &dyn Transaction, ptr: ItemPointer) -> bool {
        index_coordinator::delete_tuple(self, txn, ptr)
    }

    /// Rewrite a row group's physical column layout in place.
    pub fn transform_row_group(
        &self,
        row_group_id: Oid,
        new_column_map: ColumnMap,
        cleanup: bool,
    ) -> StorageResult<Arc<RowGroup>> {
        reorganizer::transform_row_group(self, row_group_id, new_column_map, cleanup)
    }
}

impl Drop for Table {
    /// Row groups live only as long as the table that owns their ids: unlink
    /// every row group this table ever registered from the catalog's
    /// directory and reclaim its tile storage.
    fn drop(&mut self) {
        let row_groups = std::mem::take(&mut self.inner.lock().row_groups);
        for id in row_groups {
            if let Some(row_group) = self.catalog.directory.remove(id) {
                match Arc::try_unwrap(row_group) {
                    Ok(rg) => rg.reclaim(&self.catalog.manager),
                    Err(_) => trace!("row group {id} still referenced at table drop, not reclaimed"),
                }
            }
        }
        debug!("table {} dropped, row groups unregistered", self.table_id);
    }
}
