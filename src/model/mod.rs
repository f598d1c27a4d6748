//! Resolved entity-relationship model.
//!
//! The [`Project`] is an arena: entities, attributes, relations and enums
//! live in flat vectors and point at each other through the typed ids below.
//! Parents and inverses are ids, never embedded references, which keeps the
//! inheritance tree and inverse pairs free of ownership cycles.

pub mod attribute;
pub mod entity;
pub mod enums;
pub mod key;
pub mod relation;

pub use attribute::{Attribute, MappedType, ResolvedColumn};
pub use entity::{CollectionType, Entity, Inheritance, InheritanceStrategy, TableRef};
pub use enums::{EnumDefinition, EnumType, EnumValue};
pub use key::{PrimaryKey, Unique};
pub use relation::{
    AssociationActions, AssociationDirection, MiddleLink, Relation, RelationKind,
};

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub(crate) usize);

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

arena_id!(
    /// Index of an [`Entity`] in [`Project::entities`]
    EntityId
);
arena_id!(
    /// Index of an [`Attribute`] in [`Project::attributes`]
    AttributeId
);
arena_id!(
    /// Index of a [`Relation`] in [`Project::relations`]
    RelationId
);
arena_id!(
    /// Index of an [`EnumDefinition`] in [`Project::enums`]
    EnumId
);

/// Fully resolved model handed to the emission stage
#[derive(Debug, Clone, Default, Serialize)]
pub struct Project {
    pub entities: Vec<Entity>,
    pub attributes: Vec<Attribute>,
    pub relations: Vec<Relation>,
    pub enums: Vec<EnumDefinition>,
    /// Lower-cased accessor names in use, per entity type
    pub accessor_names: BTreeMap<String, BTreeSet<String>>,
    /// Lower-cased enum type names in use
    pub enum_names: BTreeSet<String>,
}

impl Project {
    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.0]
    }

    pub fn attribute(&self, id: AttributeId) -> &Attribute {
        &self.attributes[id.0]
    }

    pub fn relation(&self, id: RelationId) -> &Relation {
        &self.relations[id.0]
    }

    pub fn enum_def(&self, id: EnumId) -> &EnumDefinition {
        &self.enums[id.0]
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.entities[id.0]
    }

    pub(crate) fn attribute_mut(&mut self, id: AttributeId) -> &mut Attribute {
        &mut self.attributes[id.0]
    }

    pub(crate) fn relation_mut(&mut self, id: RelationId) -> &mut Relation {
        &mut self.relations[id.0]
    }

    /// Case-insensitive lookup by entity name
    pub fn entity_by_name(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn enum_by_name(&self, name: &str) -> Option<&EnumDefinition> {
        self.enums.iter().find(|e| e.name.eq_ignore_ascii_case(name))
    }

    /// Top of the inheritance chain (the entity itself when it has no parent)
    pub fn root_of(&self, id: EntityId) -> EntityId {
        let mut current = id;
        // chains are validated acyclic before any entity is built
        while let Some(parent) = self.entity(current).parent {
            current = parent;
        }
        current
    }

    pub fn children_of(&self, id: EntityId) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|e| e.parent == Some(id))
            .map(|e| e.id)
            .collect()
    }

    /// The entity followed by its ancestors, nearest first
    pub fn ancestry(&self, id: EntityId) -> Vec<EntityId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.entity(current).parent {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    pub fn attributes_of(&self, id: EntityId) -> impl Iterator<Item = &Attribute> {
        self.entity(id).attributes.iter().map(|a| self.attribute(*a))
    }

    pub fn relations_of(&self, id: EntityId) -> impl Iterator<Item = &Relation> {
        self.entity(id).relations.iter().map(|r| self.relation(*r))
    }

    /// Plain value attributes of an entity
    pub fn simple_attributes(&self, id: EntityId) -> Vec<&Attribute> {
        self.attributes_of(id).filter(|a| a.is_simple()).collect()
    }

    /// Attribute of `entity` mapping `table.column`
    pub fn find_attribute(&self, entity: EntityId, table: &str, column: &str) -> Option<AttributeId> {
        self.attributes_of(entity)
            .find(|a| a.maps(table, column))
            .map(|a| a.id)
    }

    pub fn pertinent_default_value(&self, id: AttributeId) -> Option<String> {
        let attribute = self.attribute(id);
        let enum_def = attribute.column.enum_ref.map(|e| self.enum_def(e));
        attribute::pertinent_default_value(&attribute.column, enum_def)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
