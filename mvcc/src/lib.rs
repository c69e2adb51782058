//! Table storage core: owns a table's physical layout as a growing
//! sequence of fixed-capacity row groups, mediates transactional
//! insert/update/delete under MVCC, keeps secondary indexes synchronized
//! with visible row state, and supports online row-group reorganization.
//!
pub mod catalog;
pub mod error;
pub mod foreign_key;
pub mod index;
mod index_coordinator;
mod reorganizer;
pub mod stats;
pub mod storage;
pub mod table;
pub mod txn;
pub mod types;

pub use catalog::Catalog;
pub use error::{StorageError, StorageResult};
pub use table::Table;
pub use txn::{SimpleTransaction, Transaction};
pub use types::{ItemPointer, Oid, CID, TxID};
