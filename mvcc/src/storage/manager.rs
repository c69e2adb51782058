//! Opaque storage backend handle. Row groups are
//! constructed against a `StorageManager`; this crate's only concrete backend
//! keeps a pool of previously-freed per-column buffers so that row groups
//! discarded by a losing growth race or destroyed by reorganization cleanup
//! hand their backing storage back for reuse instead of letting the
//! allocator reclaim it.

use object_pool::Pool;

use crate::storage::tuple::Value;

pub struct StorageManager {
    column_pool: Pool<Vec<Value>>,
}

impl StorageManager {
    pub fn new() -> Self {
        StorageManager {
            column_pool: Pool::new(0, Vec::new),
        }
    }

    /// Allocate `columns` backing vectors, each holding `capacity` slots
    /// initialized to `Value::Null`, reusing pooled buffers where available.
    pub fn allocate_tile_storage(&self, columns: usize, capacity: usize) -> Vec<Vec<Value>> {
        (0..columns)
            .map(|_| {
                let mut buf = self.column_pool.pull(Vec::new);
                buf.clear();
                buf.resize(capacity, Value::Null);
                let (_, owned) = buf.detach();
                owned
            })
            .collect()
    }

    /// Return a destroyed row group's per-column buffers to the pool.
    pub fn reclaim_tile_storage(&self, tiles: Vec<Vec<Value>>) {
        for mut buf in tiles {
            buf.clear();
            self.column_pool.attach(buf);
        }
    }
}

impl Default for StorageManager {
    fn default() -> Self {
        Self::new()
    }
}
