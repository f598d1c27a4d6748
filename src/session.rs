//! Per-run mutable state shared by every resolver stage.
//!
//! A [`ResolutionSession`] owns the two collision tables and the project-wide
//! enum registry. It is created fresh for each run and threaded by `&mut`
//! through the pipeline, so there is exactly one owner mutating it and the
//! order of claims (and therefore every suffix) is reproducible.

use crate::model::{EnumDefinition, EnumId};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default)]
pub struct ResolutionSession {
    /// entity type (lower-cased) → accessor names in use (lower-cased)
    accessors: BTreeMap<String, BTreeSet<String>>,
    /// enum type names in use (lower-cased)
    enum_names: BTreeSet<String>,
    enums: Vec<EnumDefinition>,
}

impl ResolutionSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn namespace(&mut self, entity_type: &str) -> &mut BTreeSet<String> {
        let key = entity_type.to_ascii_lowercase();
        self.accessors.entry(key.clone()).or_insert_with(|| {
            // the type name itself is reserved so no accessor shadows it
            let mut names = BTreeSet::new();
            names.insert(key);
            names
        })
    }

    /// Reserve the entity's own type name in its namespace
    pub fn reserve_type_name(&mut self, entity_type: &str) {
        self.namespace(entity_type);
    }

    pub fn is_claimed(&self, entity_type: &str, name: &str) -> bool {
        self.accessors
            .get(&entity_type.to_ascii_lowercase())
            .is_some_and(|names| names.contains(&name.to_ascii_lowercase()))
    }

    /// Claim `desired` on `entity_type`, suffixing `2`, `3`, ... on collision
    pub fn claim_accessor(&mut self, entity_type: &str, desired: &str) -> String {
        let names = self.namespace(entity_type);
        if names.insert(desired.to_ascii_lowercase()) {
            return desired.to_string();
        }
        let mut counter = 2;
        loop {
            let candidate = format!("{desired}{counter}");
            if names.insert(candidate.to_ascii_lowercase()) {
                log::warn!(
                    "name collision on {}: '{}' is already used, using '{}' instead",
                    entity_type,
                    desired,
                    candidate
                );
                return candidate;
            }
            counter += 1;
        }
    }

    /// Free a name so a later claim can take it
    pub fn release_accessor(&mut self, entity_type: &str, name: &str) {
        if let Some(names) = self.accessors.get_mut(&entity_type.to_ascii_lowercase()) {
            // never release the reserved type name
            if !name.eq_ignore_ascii_case(entity_type) {
                names.remove(&name.to_ascii_lowercase());
            }
        }
    }

    /// Claim an enum type name, suffixing on collision
    pub fn claim_enum_name(&mut self, desired: &str) -> String {
        if self.enum_names.insert(desired.to_ascii_lowercase()) {
            return desired.to_string();
        }
        let mut counter = 2;
        loop {
            let candidate = format!("{desired}{counter}");
            if self.enum_names.insert(candidate.to_ascii_lowercase()) {
                log::warn!(
                    "enum name collision: '{}' renamed to '{}'; declare it once as a shared enum to reuse a single type",
                    desired,
                    candidate
                );
                return candidate;
            }
            counter += 1;
        }
    }

    pub fn is_enum_name_claimed(&self, name: &str) -> bool {
        self.enum_names.contains(&name.to_ascii_lowercase())
    }

    pub fn register_enum(&mut self, definition: EnumDefinition) -> EnumId {
        self.enums.push(definition);
        EnumId(self.enums.len() - 1)
    }

    pub fn enum_count(&self) -> usize {
        self.enums.len()
    }

    pub fn enum_def(&self, id: EnumId) -> &EnumDefinition {
        &self.enums[id.0]
    }

    pub fn shared_enum(&self, name: &str) -> Option<EnumId> {
        self.enums
            .iter()
            .position(|e| e.shared && e.name.eq_ignore_ascii_case(name))
            .map(EnumId)
    }

    /// Hand the frozen tables over to the resolved project
    pub fn freeze(
        self,
    ) -> (
        Vec<EnumDefinition>,
        BTreeMap<String, BTreeSet<String>>,
        BTreeSet<String>,
    ) {
        (self.enums, self.accessors, self.enum_names)
    }
}
