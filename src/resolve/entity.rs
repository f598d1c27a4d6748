//! Entity discovery and column binding.
//!
//! Entities come from two passes: first every non-ignored entry of the
//! overrides, then one default entity per remaining table that is neither
//! excluded by the settings nor already claimed. Inheritance is validated
//! over the complete list (see [`inheritance`](super::inheritance)) before any
//! entity is created, then columns are bound according to each entity's
//! strategy.

use crate::catalog::Table;
use crate::error::{ResolveError, Result};
use crate::model::{
    Attribute, AttributeId, Entity, EntityId, Inheritance, InheritanceStrategy, PrimaryKey,
    TableRef,
};
use crate::naming;
use crate::overrides::{ColumnConfig, EntityConfig};
use crate::resolve::column;
use crate::resolve::fallback::{fallback, first_non_empty};
use crate::resolve::{inheritance, ResolutionContext};

/// An entity before it exists: name, table and inheritance links
#[derive(Debug)]
pub(crate) struct EntityPlan<'a> {
    pub name: String,
    pub table: Option<&'a Table>,
    pub config: Option<&'a EntityConfig>,
    /// Index of the parent plan
    pub parent: Option<usize>,
    /// Index of the hierarchy root (the plan itself when it has no parent)
    pub root: usize,
    /// Set only for members of a hierarchy with more than one entity
    pub strategy: Option<InheritanceStrategy>,
}

impl<'a> EntityPlan<'a> {
    pub fn new(name: String, table: Option<&'a Table>, config: Option<&'a EntityConfig>) -> Self {
        Self {
            name,
            table,
            config,
            parent: None,
            root: 0,
            strategy: None,
        }
    }

    pub fn declared_strategy(&self) -> Option<InheritanceStrategy> {
        self.config.and_then(|c| c.declared_strategy())
    }
}

/// Discover, validate and build every entity with its attributes
pub(crate) fn resolve_entities(ctx: &mut ResolutionContext<'_>) -> Result<()> {
    let mut plans = plan_entities(ctx)?;
    inheritance::link(&mut plans)?;

    for (index, plan) in plans.iter().enumerate() {
        let entity = build_entity(ctx, &plans, index, plan)?;
        ctx.session.reserve_type_name(&entity.name);
        ctx.project.entities.push(entity);
        ctx.configs.push(plan.config);
    }

    for index in 0..plans.len() {
        bind_columns(ctx, &plans, index)?;
        bind_remaining_overrides(ctx, EntityId(index))?;
    }
    Ok(())
}

fn plan_entities<'a>(ctx: &ResolutionContext<'a>) -> Result<Vec<EntityPlan<'a>>> {
    let mut plans: Vec<EntityPlan<'a>> = Vec::new();
    let mut ignored_tables: Vec<&str> = Vec::new();

    for (index, config) in ctx.overrides.entities.iter().enumerate() {
        if config.is_ignored() {
            if let Some(table) = config.table_name.as_deref() {
                log::info!("table '{}' is ignored by configuration", table);
                ignored_tables.push(table);
            }
            continue;
        }
        if !config.has_table_name() && !(config.has_entity_name() && config.has_parent()) {
            return Err(ResolveError::MissingTableOrParent { index });
        }

        let table = match config.table_name.as_deref().filter(|t| !t.is_empty()) {
            Some(table_name) => {
                let table = ctx.table(table_name).ok_or_else(|| ResolveError::UnknownTable {
                    entity: config
                        .entity_name
                        .clone()
                        .unwrap_or_else(|| table_name.to_string()),
                    table: table_name.to_string(),
                })?;
                Some(table)
            }
            None => None,
        };

        let name = match first_non_empty([config.entity_name.as_deref()]) {
            Some(name) => name.to_string(),
            // has_table_name() holds when there is no entity name
            None => default_entity_name(ctx, table.map(|t| t.name.as_str()).unwrap_or_default()),
        };
        push_plan(&mut plans, EntityPlan::new(name, table, Some(config)))?;
    }

    for table in &ctx.catalog.tables {
        let claimed = plans
            .iter()
            .any(|p| p.table.is_some_and(|t| t.name.eq_ignore_ascii_case(&table.name)))
            || ignored_tables.iter().any(|t| t.eq_ignore_ascii_case(&table.name));
        if claimed {
            continue;
        }
        if table.is_view() && !ctx.settings().include_views {
            log::debug!("skipping view '{}'", table.name);
            continue;
        }
        if ctx.conventions.is_table_excluded(&table.name) {
            log::info!("table '{}' is excluded by settings", table.name);
            continue;
        }
        let name = default_entity_name(ctx, &table.name);
        push_plan(&mut plans, EntityPlan::new(name, Some(table), None))?;
    }

    Ok(plans)
}

fn default_entity_name(ctx: &ResolutionContext<'_>, table: &str) -> String {
    match ctx.conventions.rename_table(table) {
        Some(renamed) => naming::to_type_name(&renamed),
        None => naming::to_type_name(table),
    }
}

fn push_plan<'a>(plans: &mut Vec<EntityPlan<'a>>, plan: EntityPlan<'a>) -> Result<()> {
    if let Some(existing) = plans.iter().find(|p| p.name.eq_ignore_ascii_case(&plan.name)) {
        return Err(ResolveError::DuplicateEntityName {
            name: plan.name,
            first_table: existing.table.map(|t| t.name.clone()).unwrap_or_default(),
            second_table: plan.table.map(|t| t.name.clone()).unwrap_or_default(),
        });
    }
    plans.push(plan);
    Ok(())
}

fn build_entity(
    ctx: &ResolutionContext<'_>,
    plans: &[EntityPlan<'_>],
    index: usize,
    plan: &EntityPlan<'_>,
) -> Result<Entity> {
    let table = plan.table.ok_or(ResolveError::MissingTableOrParent { index })?;
    let settings = ctx.settings();
    let config = plan.config;

    let root_package = config
        .and_then(|c| first_non_empty([c.root_package.as_deref()]))
        .unwrap_or(settings.root_package.as_str());
    let sub_package = config
        .and_then(|c| first_non_empty([c.sub_package.as_deref()]))
        .unwrap_or(settings.default_sub_package.as_str());

    let sequence_name = config
        .and_then(|c| c.sequence_name.clone())
        .or_else(|| {
            settings
                .sequence_pattern
                .as_ref()
                .map(|pattern| pattern.replace("{table}", &table.name))
        });

    let label = config
        .and_then(|c| c.label.clone())
        .unwrap_or_else(|| naming::humanize(&plan.name));
    let plural_label = config
        .and_then(|c| c.plural_label.clone())
        .unwrap_or_else(|| naming::pluralize(&label));

    let inheritance = plan.strategy.map(|strategy| {
        let own = config.and_then(|c| c.inheritance.as_ref());
        let root = plans[plan.root].config.and_then(|c| c.inheritance.as_ref());
        Inheritance {
            strategy,
            discriminator_column: own
                .and_then(|i| i.discriminator_column.clone())
                .or_else(|| root.and_then(|i| i.discriminator_column.clone())),
            discriminator_value: own.and_then(|i| i.discriminator_value.clone()),
        }
    });

    Ok(Entity {
        id: EntityId(index),
        name: plan.name.clone(),
        var_name: naming::uncapitalize(&plan.name),
        table: TableRef {
            catalog: config
                .and_then(|c| c.catalog.clone())
                .or_else(|| table.catalog.clone()),
            schema: config
                .and_then(|c| c.schema_name.clone())
                .or_else(|| table.schema.clone()),
            name: table.name.clone(),
        },
        secondary_tables: Vec::new(),
        is_view: table.is_view(),
        parent: plan.parent.map(EntityId),
        inheritance,
        package: format!("{root_package}.{sub_package}"),
        collection_type: fallback(
            config.and_then(|c| c.collection_type),
            None,
            settings.default_collection_type,
        ),
        sequence_name,
        label,
        plural_label,
        primary_key: PrimaryKey::NoKey,
        attributes: Vec::new(),
        uniques: Vec::new(),
        relations: Vec::new(),
        is_many_to_many_join: false,
        business_key: Vec::new(),
    })
}

/// Whether `column` of `table` is claimed by another member of the plan's hierarchy
fn claimed_by_sibling(plans: &[EntityPlan<'_>], index: usize, table: &str, column: &str) -> bool {
    let root = plans[index].root;
    plans.iter().enumerate().any(|(other, plan)| {
        other != index
            && plan.root == root
            && plan
                .config
                .and_then(|c| c.column_config(table, column))
                .is_some()
    })
}

fn bind_columns(ctx: &mut ResolutionContext<'_>, plans: &[EntityPlan<'_>], index: usize) -> Result<()> {
    let plan = &plans[index];
    let Some(table) = plan.table else {
        return Err(ResolveError::MissingTableOrParent { index });
    };
    let id = EntityId(index);
    let is_root = plan.parent.is_none();
    let discriminator = ctx
        .project
        .entity(id)
        .inheritance
        .as_ref()
        .and_then(|i| i.discriminator_column.clone());

    for column in &table.columns {
        let config = ctx.column_config(id, &table.name, &column.name);
        if config.is_some_and(ColumnConfig::is_ignored) {
            log::debug!("column '{}.{}' is ignored", table.name, column.name);
            continue;
        }
        if discriminator
            .as_deref()
            .is_some_and(|d| d.eq_ignore_ascii_case(&column.name))
        {
            continue;
        }

        let bind = match plan.strategy {
            None => true,
            Some(InheritanceStrategy::Joined) | Some(InheritanceStrategy::TablePerClass) => {
                is_root || !table.is_primary_key(&column.name)
            }
            Some(InheritanceStrategy::SingleTable) if is_root => {
                config.is_some() || !claimed_by_sibling(plans, index, &table.name, &column.name)
            }
            Some(InheritanceStrategy::SingleTable) => config.is_some(),
        };
        if bind {
            add_attribute(ctx, id, table, column, config)?;
        }
    }
    Ok(())
}

/// Column overrides not matched by the table scan: secondary tables or errors
fn bind_remaining_overrides(ctx: &mut ResolutionContext<'_>, id: EntityId) -> Result<()> {
    let Some(config) = ctx.entity_config(id) else {
        return Ok(());
    };
    let primary_table = ctx.project.entity(id).table.name.clone();

    for column_config in &config.columns {
        if column_config.is_ignored() {
            continue;
        }
        let table_name = column_config.table_name.as_deref().unwrap_or(&primary_table);
        let already_bound = ctx
            .project
            .find_attribute(id, table_name, &column_config.column_name)
            .is_some();
        if already_bound {
            continue;
        }

        let unknown_column = || ResolveError::UnknownColumn {
            entity: ctx.project.entity(id).name.clone(),
            column: format!("{}.{}", table_name, column_config.column_name),
        };
        let table = ctx.table(table_name).ok_or_else(unknown_column)?;
        let column = table.column(&column_config.column_name).ok_or_else(unknown_column)?;

        if table.name.eq_ignore_ascii_case(&primary_table) {
            // left out on purpose by the inheritance strategy
            log::debug!(
                "column override '{}.{}' on '{}' is not bound under its inheritance strategy",
                table.name,
                column.name,
                ctx.project.entity(id).name
            );
            continue;
        }

        let entity = ctx.project.entity_mut(id);
        if !entity
            .secondary_tables
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&table.name))
        {
            log::info!("entity '{}' maps secondary table '{}'", entity.name, table.name);
            entity.secondary_tables.push(table.name.clone());
        }
        add_attribute(ctx, id, table, column, Some(column_config))?;
    }
    Ok(())
}

/// Resolve one column and attach it to `entity` under a collision-free name
pub(crate) fn add_attribute(
    ctx: &mut ResolutionContext<'_>,
    entity: EntityId,
    table: &Table,
    column: &crate::catalog::Column,
    config: Option<&ColumnConfig>,
) -> Result<Option<AttributeId>> {
    if ctx.project.find_attribute(entity, &table.name, &column.name).is_some() {
        return Ok(None);
    }
    let mut resolved = column::resolve_column(ctx.conventions, &mut ctx.session, table, column, config)?;

    let entity_name = ctx.project.entity(entity).name.clone();
    resolved.field_name = ctx.session.claim_accessor(&entity_name, &resolved.field_name);

    let is_version = ctx.conventions.is_version_column(&column.name)
        && (resolved.mapped_type.is_integral() || resolved.mapped_type.is_temporal());

    let id = AttributeId(ctx.project.attributes.len());
    let mut attribute = Attribute::new(id, entity, resolved);
    attribute.is_version = is_version;
    ctx.project.attributes.push(attribute);
    ctx.project.entity_mut(entity).attributes.push(id);
    Ok(Some(id))
}
