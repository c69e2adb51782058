//! Enforces primary/unique visibility on insert and keeps every index
//! synchronized with the heap on insert and same-key update. Implemented as
//! free functions over `&Table` rather than a type with its own state; the
//! coordinator owns no data of its own, only the protocol wiring the
//! table's row groups to its indexes.
//!
//! Every function here takes `Table::index_snapshot()` (cheap `Arc` clones)
//! instead of locking `Table`'s internal `IndexSet` directly, so that index
//! scans/inserts, which can block, never run under the table mutex.

use log::{error, warn};

use crate::index::ConstraintKind;
use crate::storage::tuple::Tuple;
use crate::table::Table;
use crate::txn::Transaction;
use crate::types::ItemPointer;

fn is_visible_to(table: &Table, ptr: ItemPointer, txn: &dyn Transaction) -> bool {
    table
        .catalog()
        .directory
        .lookup(ptr.row_group_id)
        .map(|rg| rg.is_visible(ptr.slot_offset, txn.transaction_id(), txn.last_commit_id()))
        .unwrap_or(false)
}

/// Insert a new tuple, enforcing primary/unique visibility and fanning the
/// key out to every index.
pub fn insert_tuple(table: &Table, txn: &dyn Transaction, tuple: &dyn Tuple) -> ItemPointer {
    let ptr = table.get_tuple_slot(txn.transaction_id(), tuple);
    if !ptr.is_valid() {
        return ItemPointer::INVALID;
    }

    let indexes = table.index_snapshot();

    for index in indexes.iter().rev() {
        if matches!(
            index.constraint_kind(),
            ConstraintKind::Primary | ConstraintKind::Unique
        ) {
            let key = tuple.project(index.indexed_columns());
            let conflict = index
                .scan(&key)
                .into_iter()
                .any(|existing| existing != ptr && is_visible_to(table, existing, txn));
            if conflict {
                warn!(
                    "unique violation on insert into table {} (slot left unreachable)",
                    table.table_id()
                );
                return ItemPointer::INVALID;
            }
        }
    }

    for index in indexes.iter().rev() {
        let key = tuple.project(index.indexed_columns());
        if !index.insert(key, ptr) {
            error!(
                "index {} insert failed on table {} after its uniqueness check already passed",
                index.oid(),
                table.table_id()
            );
            panic!("index insert failed after a successful uniqueness check");
        }
    }
    table.stats().increment();
    ptr
}

/// Update by insert-then-repoint. Always allocates a fresh slot; attempts a
/// same-key repoint across every index before falling back to a fresh
/// index insertion (without the unique-visibility pre-check `insert_tuple`
/// does, since the caller has already committed to this slot for
/// `new_tuple` and re-running that check would self-conflict against the
/// key the update itself is installing).
///
/// Retiring the superseded version's old heap slot isn't implied by the
/// repoint step itself, but a same-key update must leave it gone (see
/// DESIGN.md "update old-slot retirement"): before repointing, look up the
/// currently-visible pointer for the new tuple's key and, if the same-key
/// repoint succeeds, delete that old slot the same way `delete_tuple`
/// would. This keeps a pure same-key update net-zero on `row_count` (one
/// slot retired, one installed); the fresh-insert fallback has no reliable
/// old pointer to retire and is treated as a genuine new row.
pub fn update_tuple(table: &Table, txn: &dyn Transaction, new_tuple: &dyn Tuple) -> ItemPointer {
    let ptr = table.get_tuple_slot(txn.transaction_id(), new_tuple);
    if !ptr.is_valid() {
        return ItemPointer::INVALID;
    }

    let indexes = table.index_snapshot();

    let old_ptr = indexes.iter().find_map(|index| {
        let key = new_tuple.project(index.indexed_columns());
        index
            .scan(&key)
            .into_iter()
            .find(|&p| p != ptr && is_visible_to(table, p, txn))
    });

    let mut same_key_update = true;
    for index in indexes.iter() {
        let key = new_tuple.project(index.indexed_columns());
        if !index.update(key, ptr) {
            same_key_update = false;
        }
    }

    if same_key_update {
        if let Some(old) = old_ptr {
            if let Some(old_row_group) = table.catalog().directory.lookup(old.row_group_id) {
                old_row_group.delete(old.slot_offset, txn.transaction_id(), txn.last_commit_id());
            }
        }
        return ptr;
    }

    warn!(
        "same-key update missed an index entry on table {}, falling back to fresh insert",
        table.table_id()
    );
    for index in indexes.iter().rev() {
        let key = new_tuple.project(index.indexed_columns());
        if !index.insert(key, ptr) {
            error!(
                "index {} insert failed on table {} during the fresh-insert update fallback",
                index.oid(),
                table.table_id()
            );
            panic!("index insert failed during the fresh-insert update fallback");
        }
    }
    table.stats().increment();
    ptr
}

/// Delete a tuple: a pure row-group header operation.
/// Indexes are never touched; stale pointers are filtered later by
/// visibility.
pub fn delete_tuple(table: &Table, txn: &dyn Transaction, ptr: ItemPointer) -> bool {
    let Some(row_group) = table.catalog().directory.lookup(ptr.row_group_id) else {
        return false;
    };
    let deleted = row_group.delete(ptr.slot_offset, txn.transaction_id(), txn.last_commit_id());
    if deleted {
        table.stats().decrement();
    }
    deleted
}
