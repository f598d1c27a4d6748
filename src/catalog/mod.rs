//! Raw schema metadata.
//!
//! A [`SchemaCatalog`] is the read-only snapshot produced by a schema
//! extractor: tables, their ordered columns, declared primary keys, foreign
//! keys and index groups. Nothing in this module interprets the metadata; the
//! resolvers in [`crate::resolve`] do.
//!
//! Table and column names are kept exactly as the database reported them.
//! Lookups try an exact match first and only then a case-insensitive one.

mod jdbc;

pub use jdbc::JdbcType;

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Kind of relation object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableType {
    #[default]
    Table,
    View,
}

/// Whole schema snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaCatalog {
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl SchemaCatalog {
    pub fn new(tables: Vec<Table>) -> Self {
        let mut catalog = Self { tables };
        catalog.normalize();
        catalog
    }

    /// Parse a serialized snapshot
    pub fn from_json(json: &str) -> Result<Self> {
        let mut catalog: SchemaCatalog = serde_json::from_str(json)?;
        catalog.normalize();
        Ok(catalog)
    }

    /// Fill ordinal positions the extractor left unset (1-based, table order)
    fn normalize(&mut self) {
        for table in &mut self.tables {
            for (index, column) in table.columns.iter_mut().enumerate() {
                if column.ordinal_position <= 0 {
                    column.ordinal_position = index as i32 + 1;
                }
            }
        }
    }

    /// Find a table by name
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .or_else(|| self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name)))
    }
}

/// One table or view
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    pub name: String,
    #[serde(default)]
    pub table_type: TableType,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Declared primary-key column names, in key order
    #[serde(default)]
    pub primary_keys: Vec<String>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
    #[serde(default)]
    pub indexes: Vec<IndexHolder>,
}

impl Table {
    /// Find a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .or_else(|| self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name)))
    }

    pub fn is_view(&self) -> bool {
        self.table_type == TableType::View
    }

    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_keys.iter().any(|pk| pk.eq_ignore_ascii_case(column))
    }

    /// Unique index groups, in declaration order
    pub fn unique_indexes(&self) -> impl Iterator<Item = &IndexHolder> {
        self.indexes.iter().filter(|i| i.unique)
    }

    /// Whether a single-column unique index covers `column`
    pub fn is_unique(&self, column: &str) -> bool {
        self.unique_indexes()
            .any(|i| i.is_simple() && i.columns[0].eq_ignore_ascii_case(column))
    }

    /// Whether `column` takes part in any foreign key of this table
    pub fn is_foreign_key(&self, column: &str) -> bool {
        self.foreign_keys
            .iter()
            .flat_map(|fk| fk.imported_keys.iter())
            .any(|k| k.fk_column_name.eq_ignore_ascii_case(column))
    }
}

/// One column of a table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Raw `java.sql.Types` code
    pub data_type: i32,
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub size: i32,
    #[serde(default)]
    pub decimal_digits: i32,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// `None` when the driver could not tell
    #[serde(default)]
    pub auto_increment: Option<bool>,
    #[serde(default)]
    pub remarks: Option<String>,
    /// Default value literal, as written in the DDL
    #[serde(default)]
    pub default_value: Option<String>,
    /// Fixed value set (database enum or check constraint)
    #[serde(default)]
    pub enum_values: Vec<String>,
    /// 1-based position in the table
    #[serde(default)]
    pub ordinal_position: i32,
}

fn default_nullable() -> bool {
    true
}

impl Column {
    pub fn jdbc_type(&self) -> Option<JdbcType> {
        JdbcType::from_code(self.data_type)
    }

    pub fn has_enum_values(&self) -> bool {
        !self.enum_values.is_empty()
    }
}

/// A named foreign key, made of one or more imported key pairs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForeignKey {
    #[serde(default)]
    pub name: String,
    pub imported_keys: Vec<ImportedKey>,
}

impl ForeignKey {
    pub fn size(&self) -> usize {
        self.imported_keys.len()
    }

    pub fn is_simple(&self) -> bool {
        self.imported_keys.len() == 1
    }

    /// Referenced table; all pairs of one foreign key point at the same table
    pub fn pk_table_name(&self) -> Option<&str> {
        self.imported_keys.first().map(|k| k.pk_table_name.as_str())
    }
}

/// Local foreign-key column mapped to a remote primary-key column
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportedKey {
    pub fk_column_name: String,
    pub pk_table_name: String,
    pub pk_column_name: String,
    #[serde(default)]
    pub pk_table_schema: Option<String>,
}

/// Index over one or more columns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexHolder {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unique: bool,
    pub columns: Vec<String>,
}

impl IndexHolder {
    pub fn is_simple(&self) -> bool {
        self.columns.len() == 1
    }

    pub fn is_composite(&self) -> bool {
        self.columns.len() > 1
    }
}
