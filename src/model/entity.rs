//! Resolved entities.

use crate::model::key::{PrimaryKey, Unique};
use crate::model::{AttributeId, EntityId, RelationId};
use serde::{Deserialize, Serialize};

/// How an entity hierarchy maps onto tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InheritanceStrategy {
    /// One table for the whole hierarchy, rows told apart by a discriminator
    SingleTable,
    /// One table per entity, joined on the shared primary key
    Joined,
    /// One table per concrete entity holding every inherited column
    TablePerClass,
}

/// Collection type used for to-many accessors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionType {
    #[default]
    List,
    Set,
    Collection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inheritance {
    pub strategy: InheritanceStrategy,
    pub discriminator_column: Option<String>,
    pub discriminator_value: Option<String>,
}

/// Qualified table reference
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TableRef {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Entity {
    pub id: EntityId,
    /// Type name, unique project-wide (case-insensitive)
    pub name: String,
    pub var_name: String,
    pub table: TableRef,
    /// Extra tables contributing columns through column overrides
    pub secondary_tables: Vec<String>,
    pub is_view: bool,
    pub parent: Option<EntityId>,
    pub inheritance: Option<Inheritance>,
    pub package: String,
    pub collection_type: CollectionType,
    pub sequence_name: Option<String>,
    pub label: String,
    pub plural_label: String,
    pub primary_key: PrimaryKey,
    pub attributes: Vec<AttributeId>,
    pub uniques: Vec<Unique>,
    pub relations: Vec<RelationId>,
    pub is_many_to_many_join: bool,
    pub business_key: Vec<AttributeId>,
}

impl Entity {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn has_inheritance(&self) -> bool {
        self.inheritance.is_some()
    }

    /// Tables contributing columns, primary table first
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.table.name.as_str()).chain(self.secondary_tables.iter().map(String::as_str))
    }
}
