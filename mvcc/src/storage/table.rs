//! Column and schema description. Kept separate from the `Table` entity
//! (crate::table) so tile-group storage concerns stay apart from the
//! tuple/schema vocabulary they borrow.

use crate::storage::tuple::{Value, ValueType};

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub value_type: ValueType,
    pub nullable: bool,
    pub default: Option<Value>,
    /// Names of constraints (currently: foreign keys) attached to this
    /// column by `Table::add_foreign_key`.
    pub constraints: Vec<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, value_type: ValueType, nullable: bool) -> Self {
        Column {
            name: name.into(),
            value_type,
            nullable,
            default: None,
            constraints: Vec::new(),
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Schema { columns }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn find_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}
