//! Tuple representation: the narrow contract this crate consumes from the
//! (external) tuple layer, plus a concrete owned implementation used for
//! constructing test doubles and projected index keys.

use crate::types::Oid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Varchar,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Null,
    Boolean(bool),
    TinyInt(i8),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    Varchar(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(ValueType::Boolean),
            Value::TinyInt(_) => Some(ValueType::TinyInt),
            Value::SmallInt(_) => Some(ValueType::SmallInt),
            Value::Integer(_) => Some(ValueType::Integer),
            Value::BigInt(_) => Some(ValueType::BigInt),
            Value::Varchar(_) => Some(ValueType::Varchar),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

/// Narrow contract consumed from the (external) tuple representation: column
/// count, nullability, and value access by column, plus a key-projection
/// helper used when an index needs only a subset of a tuple's columns.
pub trait Tuple: Send + Sync {
    fn column_count(&self) -> usize;
    fn is_null(&self, col: Oid) -> bool;
    fn get_value(&self, col: Oid) -> Value;

    /// Project this tuple onto `columns`, producing a standalone key tuple.
    /// Column order in the result follows `columns`, not the source schema.
    fn project(&self, columns: &[Oid]) -> OwnedTuple {
        OwnedTuple::from_values(columns.iter().map(|&c| self.get_value(c)).collect())
    }
}

/// A fully materialized, owned tuple. Used both as the insert/update payload
/// in tests and as the concrete key type indexes are keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct OwnedTuple {
    values: Vec<Value>,
}

impl OwnedTuple {
    pub fn from_values(values: Vec<Value>) -> Self {
        OwnedTuple { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl Tuple for OwnedTuple {
    fn column_count(&self) -> usize {
        self.values.len()
    }

    fn is_null(&self, col: Oid) -> bool {
        self.values
            .get(col as usize)
            .map(Value::is_null)
            .unwrap_or(true)
    }

    fn get_value(&self, col: Oid) -> Value {
        self.values.get(col as usize).cloned().unwrap_or_default()
    }
}
