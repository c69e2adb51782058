//! Shared scalar identifiers used throughout the storage core.

/// Object id: row-group ids, table ids, database ids, tile indices.
pub type Oid = u32;

/// Transaction id, as minted by the (external) transaction manager.
pub type TxID = u64;

/// Commit id / timestamp, as minted by the (external) transaction manager.
pub type CID = u64;

/// A transaction id meaning "no transaction holds this slot".
pub const INVALID_TXN_ID: TxID = 0;

/// A commit id meaning "not yet committed" / "still open".
pub const MAX_CID: CID = u64::MAX;

pub const INVALID_OID: Oid = u32::MAX;

/// Physical location of a tuple: which row group, and which slot within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemPointer {
    pub row_group_id: Oid,
    pub slot_offset: Oid,
}

impl ItemPointer {
    pub const INVALID: ItemPointer = ItemPointer {
        row_group_id: INVALID_OID,
        slot_offset: INVALID_OID,
    };

    pub fn new(row_group_id: Oid, slot_offset: Oid) -> Self {
        ItemPointer {
            row_group_id,
            slot_offset,
        }
    }

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl Default for ItemPointer {
    fn default() -> Self {
        Self::INVALID
    }
}
