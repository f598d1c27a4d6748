//! Schema-to-model resolution pipeline.
//!
//! Stages run strictly in this order, each over every entity before the next
//! starts:
//!
//! 1. shared enums are registered ([`column::register_shared_enums`])
//! 2. entities are discovered, hierarchies validated, columns bound
//!    ([`entity`], [`column`], [`type_mapper`])
//! 3. primary keys and unique constraints ([`key`])
//! 4. foreign keys classified into relations ([`relation`], [`junction`])
//! 5. business keys ([`business_key`])
//!
//! Relation inference reads primary keys of other entities, so stage 3 must
//! be complete project-wide before stage 4 starts. Collision tables live in
//! the [`ResolutionSession`] owned by the context; nothing here is shared
//! across threads.

pub mod business_key;
pub mod column;
pub mod entity;
pub mod fallback;
pub mod inheritance;
pub mod junction;
pub mod key;
pub mod relation;
pub mod type_mapper;

use crate::catalog::{SchemaCatalog, Table};
use crate::config::{Conventions, ResolverSettings};
use crate::error::Result;
use crate::model::{EntityId, Project};
use crate::overrides::{ColumnConfig, ConfigOverrides, EntityConfig};
use crate::session::ResolutionSession;

/// Everything a stage needs: read-only inputs plus the run's mutable state
pub(crate) struct ResolutionContext<'a> {
    pub catalog: &'a SchemaCatalog,
    pub overrides: &'a ConfigOverrides,
    pub conventions: &'a Conventions,
    pub session: ResolutionSession,
    pub project: Project,
    /// Override of each entity, indexed by `EntityId`
    pub configs: Vec<Option<&'a EntityConfig>>,
}

impl<'a> ResolutionContext<'a> {
    pub fn new(
        catalog: &'a SchemaCatalog,
        overrides: &'a ConfigOverrides,
        conventions: &'a Conventions,
    ) -> Self {
        Self {
            catalog,
            overrides,
            conventions,
            session: ResolutionSession::new(),
            project: Project::default(),
            configs: Vec::new(),
        }
    }

    pub fn settings(&self) -> &'a ResolverSettings {
        self.conventions.settings()
    }

    pub fn entity_config(&self, id: EntityId) -> Option<&'a EntityConfig> {
        self.configs.get(id.index()).copied().flatten()
    }

    pub fn column_config(&self, id: EntityId, table: &str, column: &str) -> Option<&'a ColumnConfig> {
        self.entity_config(id).and_then(|c| c.column_config(table, column))
    }

    pub fn table(&self, name: &str) -> Option<&'a Table> {
        self.catalog.table(name)
    }

    /// Hand the resolved model over, freezing the session tables
    pub fn finish(self) -> Project {
        let mut project = self.project;
        let (enums, accessor_names, enum_names) = self.session.freeze();
        project.enums = enums;
        project.accessor_names = accessor_names;
        project.enum_names = enum_names;
        project
    }
}

/// Run every stage over `catalog` and `overrides`
pub(crate) fn run(
    catalog: &SchemaCatalog,
    overrides: &ConfigOverrides,
    conventions: &Conventions,
) -> Result<Project> {
    let mut ctx = ResolutionContext::new(catalog, overrides, conventions);

    column::register_shared_enums(&mut ctx)?;

    {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("resolve_entities").entered();
        entity::resolve_entities(&mut ctx)?;
    }
    {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("resolve_keys").entered();
        key::resolve_keys(&mut ctx);
    }
    {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("resolve_relations").entered();
        relation::resolve_relations(&mut ctx)?;
    }
    {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("resolve_business_keys").entered();
        business_key::resolve_business_keys(&mut ctx);
    }

    log::info!(
        "resolved {} entities, {} attributes, {} relations, {} enums",
        ctx.project.entities.len(),
        ctx.project.attributes.len(),
        ctx.project.relations.len(),
        ctx.session.enum_count()
    );
    Ok(ctx.finish())
}
