use std::fmt;

/// Errors surfaced by table-storage operations that have a fallible, engine-facing
/// API (list mutation, reorganization). The hot MVCC path (insert/update/delete)
/// deliberately does not use this type; see `ItemPointer::INVALID`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// A non-nullable column held a null value.
    ConstraintViolation(String),
    /// A visible primary/unique index entry already exists for the key.
    UniqueViolation(String),
    /// Reorganization (or index/foreign-key lookup) referenced an unknown object.
    NotFound(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ConstraintViolation(msg) => {
                write!(f, "constraint violation: {msg}")
            }
            StorageError::UniqueViolation(msg) => write!(f, "unique violation: {msg}"),
            StorageError::NotFound(msg) => write!(f, "not found: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}

pub type StorageResult<T> = Result<T, StorageError>;
