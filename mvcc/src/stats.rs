//! Approximate row count and dirty flag. Neither is
//! transactional nor persisted by this subsystem.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

#[derive(Default)]
pub struct Stats {
    row_count: AtomicI64,
    dirty: AtomicBool,
}

impl Stats {
    pub fn new() -> Self {
        Stats {
            row_count: AtomicI64::new(0),
            dirty: AtomicBool::new(false),
        }
    }

    pub fn increment(&self) {
        self.row_count.fetch_add(1, Ordering::SeqCst);
        self.mark_dirty();
    }

    pub fn decrement(&self) {
        self.row_count.fetch_sub(1, Ordering::SeqCst);
        self.mark_dirty();
    }

    pub fn row_count(&self) -> i64 {
        self.row_count.load(Ordering::SeqCst)
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub fn reset_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}
