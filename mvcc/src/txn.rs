//! Narrow contract consumed from the (external) transaction manager.

use crate::types::{CID, TxID};

pub trait Transaction: Send + Sync {
    fn transaction_id(&self) -> TxID;
    fn last_commit_id(&self) -> CID;
}

/// A bare-bones transaction handle for tests and simple callers that don't
/// need a full transaction manager.
pub struct SimpleTransaction {
    txn_id: TxID,
    last_commit_id: CID,
}

impl SimpleTransaction {
    pub fn new(txn_id: TxID, last_commit_id: CID) -> Self {
        SimpleTransaction {
            txn_id,
            last_commit_id,
        }
    }
}

impl Transaction for SimpleTransaction {
    fn transaction_id(&self) -> TxID {
        self.txn_id
    }

    fn last_commit_id(&self) -> CID {
        self.last_commit_id
    }
}
