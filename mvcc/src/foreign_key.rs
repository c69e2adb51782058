//! Foreign-key metadata bound to schema constraints.

#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub name: String,
    pub source_columns: Vec<String>,
    pub reference_table: String,
    pub reference_columns: Vec<String>,
}

/// Builder that also, on `build`, is consumed by `Table::add_foreign_key` to
/// attach a constraint marker to each named source column, the only
/// write-through from foreign-key metadata into the schema.
pub struct ForeignKeyBuilder {
    name: String,
    source_columns: Vec<String>,
    reference_table: String,
    reference_columns: Vec<String>,
}

impl ForeignKeyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        ForeignKeyBuilder {
            name: name.into(),
            source_columns: Vec::new(),
            reference_table: String::new(),
            reference_columns: Vec::new(),
        }
    }

    pub fn source_columns(mut self, columns: Vec<String>) -> Self {
        self.source_columns = columns;
        self
    }

    pub fn references(mut self, table: impl Into<String>, columns: Vec<String>) -> Self {
        self.reference_table = table.into();
        self.reference_columns = columns;
        self
    }

    pub fn build(self) -> ForeignKey {
        ForeignKey {
            name: self.name,
            source_columns: self.source_columns,
            reference_table: self.reference_table,
            reference_columns: self.reference_columns,
        }
    }
}

/// Ordered collection of a table's foreign-key descriptors. Entries are
/// deep-copied on add.
#[derive(Default)]
pub struct ForeignKeySet {
    keys: Vec<ForeignKey>,
}

impl ForeignKeySet {
    pub fn new() -> Self {
        ForeignKeySet { keys: Vec::new() }
    }

    pub fn add(&mut self, fk: ForeignKey) {
        self.keys.push(fk);
    }

    pub fn drop_by_name(&mut self, name: &str) -> bool {
        let before = self.keys.len();
        self.keys.retain(|k| k.name != name);
        self.keys.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &ForeignKey> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
