//! Relation definitions between resolved entities.
//!
//! A [`Relation`] is a directed edge from the attributes of one entity to the
//! attributes of another. Relations mediated by a junction entity carry a
//! [`MiddleLink`]. Inverses are separate relations referencing each other by
//! id, so `inverse(inverse(r)) == r` holds by construction.

use crate::model::{AttributeId, EntityId, RelationId};
use crate::overrides::RelationOptions;
use serde::{Deserialize, Serialize};

/// Classification of a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
    /// Non-persistent inverse of a one-to-one
    OneToVirtualOne,
}

impl RelationKind {
    /// Whether the accessor holds a collection
    pub fn is_to_many(self) -> bool {
        matches!(self, Self::OneToMany | Self::ManyToMany)
    }
}

/// Whether the inverse side of an association is materialised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationDirection {
    Unidirectional,
    Bidirectional,
}

/// Operations the emission stage exposes for an association
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssociationActions {
    pub create: bool,
    pub edit: bool,
    pub view: bool,
    pub select: bool,
    pub autocomplete: bool,
    pub remove: bool,
}

impl Default for AssociationActions {
    fn default() -> Self {
        Self {
            create: true,
            edit: true,
            view: true,
            select: true,
            autocomplete: true,
            remove: true,
        }
    }
}

/// Junction entity and its two foreign-key attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MiddleLink {
    pub entity: EntityId,
    /// Junction attribute pointing at the relation's source entity
    pub from_side: AttributeId,
    /// Junction attribute pointing at the relation's target entity
    pub to_side: AttributeId,
}

#[derive(Debug, Clone, Serialize)]
pub struct Relation {
    pub id: RelationId,
    pub kind: RelationKind,
    pub from_entity: EntityId,
    pub to_entity: EntityId,
    pub from_attributes: Vec<AttributeId>,
    pub to_attributes: Vec<AttributeId>,
    pub middle: Option<MiddleLink>,
    pub inverse: Option<RelationId>,
    /// This relation was created as the inverse of another
    pub is_inverse: bool,
    /// Accessor name on `from_entity`, unique within that entity
    pub accessor: String,
    pub label: String,
    pub direction: AssociationDirection,
    pub actions: AssociationActions,
    pub options: RelationOptions,
}

impl Relation {
    pub fn is_simple(&self) -> bool {
        self.from_attributes.len() == 1
    }

    pub fn is_composite(&self) -> bool {
        self.from_attributes.len() > 1
    }

    pub fn is_intermediate(&self) -> bool {
        self.middle.is_some()
    }

    pub fn is_bidirectional(&self) -> bool {
        self.inverse.is_some()
    }
}
