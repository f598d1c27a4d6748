//! Relation sub-configs.
//!
//! The same shape serves one-to-one, many-to-one, one-to-many and
//! many-to-many declarations. Cascades, fetch, order-by, cache and
//! orphan-removal are not interpreted here; they travel with the relation as
//! [`RelationOptions`].

use crate::model::AssociationActions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeType {
    All,
    Persist,
    Merge,
    Remove,
    Refresh,
    Detach,
    SaveUpdate,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchType {
    Lazy,
    Eager,
}

/// Pass-through settings for the emission stage
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RelationOptions {
    #[serde(default)]
    pub cascades: Vec<CascadeType>,
    #[serde(default)]
    pub fetch: Option<FetchType>,
    #[serde(default)]
    pub order_by: Option<String>,
    #[serde(default)]
    pub cache: Option<bool>,
    #[serde(default)]
    pub orphan_removal: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssociationConfig {
    /// Accessor name
    #[serde(default)]
    pub var: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(flatten)]
    pub options: RelationOptions,
    #[serde(default)]
    pub create: Option<bool>,
    #[serde(default)]
    pub edit: Option<bool>,
    #[serde(default)]
    pub view: Option<bool>,
    #[serde(default)]
    pub select: Option<bool>,
    #[serde(default)]
    pub autocomplete: Option<bool>,
    #[serde(default)]
    pub remove: Option<bool>,
}

impl AssociationConfig {
    /// Defaults overlaid with whatever this config sets
    pub fn actions(&self) -> AssociationActions {
        let defaults = AssociationActions::default();
        AssociationActions {
            create: self.create.unwrap_or(defaults.create),
            edit: self.edit.unwrap_or(defaults.edit),
            view: self.view.unwrap_or(defaults.view),
            select: self.select.unwrap_or(defaults.select),
            autocomplete: self.autocomplete.unwrap_or(defaults.autocomplete),
            remove: self.remove.unwrap_or(defaults.remove),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flattened_options_and_actions() {
        let config: AssociationConfig = serde_json::from_str(
            r#"{"var": "tags", "cascades": ["persist", "merge"], "fetch": "lazy",
                "orphan_removal": true, "remove": false}"#,
        )
        .unwrap();
        assert_eq!(config.options.cascades, vec![CascadeType::Persist, CascadeType::Merge]);
        assert_eq!(config.options.fetch, Some(FetchType::Lazy));
        assert_eq!(config.options.orphan_removal, Some(true));
        let actions = config.actions();
        assert!(!actions.remove);
        assert!(actions.create && actions.autocomplete);
    }
}
