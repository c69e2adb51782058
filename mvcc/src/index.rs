//! Secondary index contract and the ordered collection of
//! indexes a table carries, plus its has-primary/unique-count metadata.

use std::sync::Arc;

use crate::storage::tuple::OwnedTuple;
use crate::types::{ItemPointer, Oid};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Primary,
    Unique,
    None,
}

/// Keyed scan/insert/update contract provided by an (external) index
/// structure. Keys are owned, materialized tuples rather than a generic
/// type so that `Index` stays object-safe. `IndexSet` holds a
/// heterogeneous `Vec<Arc<dyn Index>>`.
pub trait Index: Send + Sync {
    fn oid(&self) -> Oid;
    fn indexed_columns(&self) -> &[Oid];
    fn constraint_kind(&self) -> ConstraintKind;
    fn scan(&self, key: &OwnedTuple) -> Vec<ItemPointer>;
    /// Insert `key -> ptr`. Returns `false` on failure (e.g. the backing
    /// structure rejected the entry) so callers can tell an insert that
    /// silently did nothing apart from a real one.
    fn insert(&self, key: OwnedTuple, ptr: ItemPointer) -> bool;
    /// Repoint the existing entry for `key` to `ptr`. Returns `true` iff an
    /// entry existed and was repointed.
    fn update(&self, key: OwnedTuple, ptr: ItemPointer) -> bool;
    fn delete(&self, key: &OwnedTuple, ptr: ItemPointer);
}

/// Ordered collection of a table's secondary indexes, plus the derived
/// `has_primary_key` / `unique_constraint_count` flags.
#[derive(Default)]
pub struct IndexSet {
    indexes: Vec<Arc<dyn Index>>,
}

impl IndexSet {
    pub fn new() -> Self {
        IndexSet { indexes: Vec::new() }
    }

    pub fn add(&mut self, index: Arc<dyn Index>) {
        self.indexes.push(index);
    }

    pub fn drop_by_oid(&mut self, oid: Oid) -> bool {
        let before = self.indexes.len();
        self.indexes.retain(|i| i.oid() != oid);
        self.indexes.len() != before
    }

    pub fn get_by_offset(&self, offset: usize) -> Option<&Arc<dyn Index>> {
        self.indexes.get(offset)
    }

    pub fn get_by_oid(&self, oid: Oid) -> Option<&Arc<dyn Index>> {
        self.indexes.iter().find(|i| i.oid() == oid)
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    pub fn has_primary_key(&self) -> bool {
        self.indexes
            .iter()
            .any(|i| i.constraint_kind() == ConstraintKind::Primary)
    }

    pub fn unique_constraint_count(&self) -> usize {
        self.indexes
            .iter()
            .filter(|i| i.constraint_kind() == ConstraintKind::Unique)
            .count()
    }

    /// Iterate in addition order (used by the same-key update path, which
    /// must touch every index regardless of order).
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Index>> {
        self.indexes.iter()
    }

    /// Iterate in *reverse* addition order, the order `insert_tuple` walks
    /// indexes in.
    pub fn iter_rev(&self) -> impl Iterator<Item = &Arc<dyn Index>> {
        self.indexes.iter().rev()
    }

    /// Cheap clone of the index list (`Arc` bumps only). Lets callers
    /// release the table mutex before doing any index I/O
    /// ("not held during ... index operations").
    pub fn snapshot(&self) -> Vec<Arc<dyn Index>> {
        self.indexes.clone()
    }
}
