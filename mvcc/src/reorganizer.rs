//! Online tile rewrite: replace a row group's physical column layout
//! without breaking outstanding references. The caller is responsible for
//! only targeting a row group that is no longer the table's tail (so no
//! concurrent insert can race the copy).

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;

use crate::error::{StorageError, StorageResult};
use crate::storage::row_group::{ColumnMap, RowGroup};
use crate::storage::table::{Column, Schema};
use crate::table::Table;
use crate::types::Oid;

/// Rewrite a row group under a new column-to-tile mapping.
pub fn transform_row_group(
    table: &Table,
    row_group_id: Oid,
    new_column_map: ColumnMap,
    cleanup: bool,
) -> StorageResult<Arc<RowGroup>> {
    if !table.row_group_ids().contains(&row_group_id) {
        return Err(StorageError::NotFound(format!(
            "row group {row_group_id} is not owned by table {}",
            table.table_id()
        )));
    }

    let original = table.catalog().directory.lookup(row_group_id).ok_or_else(|| {
        StorageError::NotFound(format!("row group {row_group_id} not registered"))
    })?;

    let new_tile_schemas = derive_tile_schemas(&original, &new_column_map);
    let capacity = original.allocated_count();

    let rewritten = Arc::new(RowGroup::new(
        row_group_id,
        original.database_id(),
        original.table_id(),
        &table.catalog().manager,
        new_tile_schemas,
        new_column_map.clone(),
        capacity,
    ));

    let column_count = new_column_map.len() as Oid;
    for col in 0..column_count {
        original.copy_column_into(&rewritten, col);
    }
    rewritten.copy_header_from(&original);

    table
        .catalog()
        .directory
        .rebind(row_group_id, rewritten.clone());
    debug!("row group {row_group_id} reorganized ({column_count} columns)");

    if cleanup {
        if let Ok(old) = Arc::try_unwrap(original) {
            old.reclaim(&table.catalog().manager);
        }
    }

    Ok(rewritten)
}

/// Derive one schema per new tile, ascending tile index, columns within a
/// tile ordered by ascending new offset.
fn derive_tile_schemas(original: &RowGroup, new_column_map: &ColumnMap) -> Vec<Schema> {
    // tile_index -> (new_offset -> Column descriptor)
    let mut by_tile: BTreeMap<Oid, BTreeMap<Oid, Column>> = BTreeMap::new();

    for (&col, &(new_tile, new_offset)) in new_column_map {
        let (old_tile, old_offset) = original
            .locate_tile_and_column(col)
            .expect("new column map must reference an existing column");
        let descriptor = original
            .get_tile(old_tile)
            .expect("old tile must exist")
            .schema()
            .columns[old_offset as usize]
            .clone();
        by_tile
            .entry(new_tile)
            .or_default()
            .insert(new_offset, descriptor);
    }

    by_tile
        .into_values()
        .map(|columns_by_offset| Schema::new(columns_by_offset.into_values().collect()))
        .collect()
}
