//! User-supplied override declarations.
//!
//! [`ConfigOverrides`] is the parsed form of the declarative project
//! configuration: per-entity and per-column settings that win over every
//! convention. Every field is optional; `None` means "let the resolver decide".

mod association;

pub use association::{AssociationConfig, CascadeType, FetchType, RelationOptions};

use crate::error::Result;
use crate::model::{AssociationDirection, CollectionType, EnumType, InheritanceStrategy, MappedType};
use serde::Deserialize;

/// Root of the override tree
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigOverrides {
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
    /// Project-wide enum definitions referenced by `shared_enum_name`
    #[serde(default)]
    pub shared_enums: Vec<EnumConfig>,
}

impl ConfigOverrides {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Overrides for one entity
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntityConfig {
    #[serde(default)]
    pub entity_name: Option<String>,
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub catalog: Option<String>,
    /// Name of the parent entity
    #[serde(default, alias = "extends")]
    pub parent_name: Option<String>,
    #[serde(default)]
    pub inheritance: Option<InheritanceConfig>,
    #[serde(default)]
    pub root_package: Option<String>,
    #[serde(default)]
    pub sub_package: Option<String>,
    #[serde(default)]
    pub collection_type: Option<CollectionType>,
    #[serde(default)]
    pub sequence_name: Option<String>,
    #[serde(default)]
    pub association_direction: Option<AssociationDirection>,
    /// Force (`true`) or forbid (`false`) junction-table treatment
    #[serde(default)]
    pub middle_table: Option<bool>,
    /// One-to-one relations pointing here get a virtual inverse
    #[serde(default)]
    pub virtual_one_to_one: Option<bool>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub plural_label: Option<String>,
    /// Exclude the table from the model
    #[serde(default)]
    pub ignore: Option<bool>,
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
}

impl EntityConfig {
    pub fn is_ignored(&self) -> bool {
        self.ignore == Some(true)
    }

    pub fn has_table_name(&self) -> bool {
        self.table_name.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn has_entity_name(&self) -> bool {
        self.entity_name.as_deref().is_some_and(|e| !e.is_empty())
    }

    pub fn has_parent(&self) -> bool {
        self.parent_name.as_deref().is_some_and(|p| !p.is_empty())
    }

    pub fn declared_strategy(&self) -> Option<InheritanceStrategy> {
        self.inheritance.as_ref().and_then(|i| i.strategy)
    }

    /// Override for `column`, optionally restricted to `table`
    pub fn column_config(&self, table: &str, column: &str) -> Option<&ColumnConfig> {
        self.columns.iter().find(|c| {
            c.column_name.eq_ignore_ascii_case(column)
                && c.table_name
                    .as_deref()
                    .map_or(true, |t| t.eq_ignore_ascii_case(table))
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InheritanceConfig {
    #[serde(default)]
    pub strategy: Option<InheritanceStrategy>,
    #[serde(default)]
    pub discriminator_column: Option<String>,
    #[serde(default)]
    pub discriminator_value: Option<String>,
}

/// Overrides for one column
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnConfig {
    pub column_name: String,
    /// Secondary table holding the column; the entity's own table when unset
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub field_name: Option<String>,
    #[serde(default)]
    pub mapped_type: Option<MappedType>,
    #[serde(default)]
    pub size: Option<i32>,
    #[serde(default)]
    pub scale: Option<i32>,
    #[serde(default)]
    pub nullable: Option<bool>,
    #[serde(default)]
    pub unique: Option<bool>,
    #[serde(default)]
    pub auto_increment: Option<bool>,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default)]
    pub search_order: Option<i32>,
    #[serde(default)]
    pub form_order: Option<i32>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub ignore: Option<bool>,
    #[serde(default)]
    pub business_key: Option<bool>,
    #[serde(default)]
    pub shared_enum_name: Option<String>,
    #[serde(default)]
    pub enum_config: Option<EnumConfig>,
    #[serde(default)]
    pub association_direction: Option<AssociationDirection>,
    /// On a junction foreign key: this side is the inverse (right) side
    #[serde(default)]
    pub inverse: Option<bool>,
    /// Force the target entity of this foreign key
    #[serde(default)]
    pub target_entity: Option<String>,
    #[serde(default)]
    pub one_to_one_config: Option<AssociationConfig>,
    #[serde(default)]
    pub inverse_one_to_one_config: Option<AssociationConfig>,
    #[serde(default)]
    pub many_to_one_config: Option<AssociationConfig>,
    #[serde(default)]
    pub one_to_many_config: Option<AssociationConfig>,
    #[serde(default)]
    pub many_to_many_config: Option<AssociationConfig>,
}

impl ColumnConfig {
    pub fn is_ignored(&self) -> bool {
        self.ignore == Some(true)
    }

    pub fn is_business_key(&self) -> bool {
        self.business_key == Some(true)
    }
}

/// Enum declaration, inline on a column or shared project-wide
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnumConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub enum_type: Option<EnumType>,
    #[serde(default)]
    pub values: Vec<EnumValueConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnumValueConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_overrides() {
        let overrides = ConfigOverrides::from_json(
            r#"{
                "entities": [{
                    "table_name": "book",
                    "association_direction": "unidirectional",
                    "columns": [
                        {"column_name": "price", "mapped_type": "big_decimal"},
                        {"column_name": "status", "shared_enum_name": "Status"},
                        {"column_name": "author_id", "many_to_one_config": {"var": "writer"}}
                    ]
                }],
                "shared_enums": [{"name": "Status", "enum_type": "string",
                                  "values": [{"name": "DRAFT"}, {"name": "DONE"}]}]
            }"#,
        )
        .unwrap();
        let book = &overrides.entities[0];
        assert_eq!(book.association_direction, Some(AssociationDirection::Unidirectional));
        assert_eq!(
            book.column_config("BOOK", "PRICE").unwrap().mapped_type,
            Some(MappedType::BigDecimal)
        );
        let author = book.column_config("book", "author_id").unwrap();
        assert_eq!(author.many_to_one_config.as_ref().unwrap().var.as_deref(), Some("writer"));
        assert_eq!(overrides.shared_enums[0].values.len(), 2);
    }

    #[test]
    fn test_column_config_respects_secondary_table() {
        let config = EntityConfig {
            table_name: Some("person".into()),
            columns: vec![ColumnConfig {
                column_name: "street".into(),
                table_name: Some("address".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(config.column_config("address", "street").is_some());
        assert!(config.column_config("person", "street").is_none());
    }

    #[test]
    fn test_extends_alias() {
        let config: EntityConfig =
            serde_json::from_str(r#"{"entity_name": "Car", "extends": "Vehicle"}"#).unwrap();
        assert!(config.has_parent());
        assert!(!config.has_table_name());
    }
}
