//! Primary keys and unique constraints.
//!
//! Both are closed enums over attribute ids. A non-root entity of an
//! inheritance chain carries [`PrimaryKey::NoKey`]; its identity is the root's.

use crate::model::AttributeId;
use serde::Serialize;

/// Identity of an entity
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", content = "attributes", rename_all = "snake_case")]
pub enum PrimaryKey {
    #[default]
    NoKey,
    Simple(AttributeId),
    /// Ordered as the table declares (or the promoted unique lists) them
    Composite(Vec<AttributeId>),
}

impl PrimaryKey {
    pub fn is_simple(&self) -> bool {
        matches!(self, Self::Simple(_))
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }

    pub fn is_no_key(&self) -> bool {
        matches!(self, Self::NoKey)
    }

    pub fn attributes(&self) -> Vec<AttributeId> {
        match self {
            Self::NoKey => Vec::new(),
            Self::Simple(id) => vec![*id],
            Self::Composite(ids) => ids.clone(),
        }
    }

    pub fn contains(&self, attribute: AttributeId) -> bool {
        match self {
            Self::NoKey => false,
            Self::Simple(id) => *id == attribute,
            Self::Composite(ids) => ids.contains(&attribute),
        }
    }
}

/// Unique constraint over resolved attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Unique {
    Simple {
        name: String,
        attribute: AttributeId,
    },
    Composite {
        name: String,
        attributes: Vec<AttributeId>,
    },
}

impl Unique {
    pub fn name(&self) -> &str {
        match self {
            Self::Simple { name, .. } | Self::Composite { name, .. } => name,
        }
    }

    pub fn is_simple(&self) -> bool {
        matches!(self, Self::Simple { .. })
    }

    pub fn attributes(&self) -> Vec<AttributeId> {
        match self {
            Self::Simple { attribute, .. } => vec![*attribute],
            Self::Composite { attributes, .. } => attributes.clone(),
        }
    }
}
