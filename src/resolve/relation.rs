//! Relation inference.
//!
//! Foreign keys are classified into relations once every entity has its
//! primary key:
//!
//! 1. candidates are gathered per entity from every table contributing
//!    columns to it; a foreign key with any leg that does not resolve is
//!    dropped with a warning
//! 2. every candidate's attributes are flagged as foreign keys and pure
//!    foreign-key attributes give their name back, before any accessor is
//!    claimed
//! 3. junction entities become many-to-many (or intermediate) pairs, see
//!    [`junction`](super::junction)
//! 4. everything else becomes one-to-one, many-to-one or composite
//!    many-to-one, with an inverse when the association direction or an
//!    inverse-side config asks for one

use crate::catalog::{ForeignKey, Table};
use crate::error::{ResolveError, Result};
use crate::model::{
    AssociationDirection, AttributeId, Entity, EntityId, MiddleLink, PrimaryKey, Project,
    Relation, RelationId, RelationKind,
};
use crate::naming;
use crate::overrides::{AssociationConfig, ColumnConfig};
use crate::resolve::fallback::{fallback, first_non_empty};
use crate::resolve::{junction, ResolutionContext};

/// A foreign key whose every leg resolved
#[derive(Debug)]
pub(crate) struct Candidate<'a> {
    pub entity: EntityId,
    pub table: &'a Table,
    pub foreign_key: &'a ForeignKey,
    pub from: Vec<AttributeId>,
    pub target: EntityId,
    pub to: Vec<AttributeId>,
    /// Column override of each leg, in `from` order
    pub configs: Vec<Option<&'a ColumnConfig>>,
}

impl<'a> Candidate<'a> {
    pub fn is_simple(&self) -> bool {
        self.from.len() == 1
    }

    pub fn is_self_referencing(&self) -> bool {
        self.entity == self.target
    }

    /// Override of the first leg
    pub fn config(&self) -> Option<&'a ColumnConfig> {
        self.configs.first().copied().flatten()
    }
}

/// A relation about to be added
pub(crate) struct RelationDraft<'a> {
    pub kind: RelationKind,
    pub from_entity: EntityId,
    pub to_entity: EntityId,
    pub from_attributes: Vec<AttributeId>,
    pub to_attributes: Vec<AttributeId>,
    pub middle: Option<MiddleLink>,
    /// Conventional accessor, used when the config has no `var`
    pub accessor: String,
    pub config: Option<&'a AssociationConfig>,
}

pub(crate) fn resolve_relations(ctx: &mut ResolutionContext<'_>) -> Result<()> {
    let mut candidates = Vec::new();
    for index in 0..ctx.project.entities.len() {
        candidates.extend(gather(ctx, EntityId(index))?);
    }
    mark_foreign_keys(ctx, &candidates);

    for index in 0..ctx.project.entities.len() {
        let id = EntityId(index);
        let own: Vec<&Candidate<'_>> = candidates.iter().filter(|c| c.entity == id).collect();
        match junction::detect(ctx, id, &own) {
            Some((left, right)) => junction::build(ctx, id, left, right),
            None => {
                for candidate in own {
                    build_direct(ctx, candidate)?;
                }
            }
        }
    }
    Ok(())
}

fn gather<'a>(ctx: &ResolutionContext<'a>, id: EntityId) -> Result<Vec<Candidate<'a>>> {
    let entity = ctx.project.entity(id);
    let mut table_names: Vec<&str> = Vec::new();
    for name in entity.tables() {
        if !table_names.iter().any(|t| t.eq_ignore_ascii_case(name)) {
            table_names.push(name);
        }
    }

    let mut candidates = Vec::new();
    for table_name in table_names {
        let Some(table) = ctx.table(table_name) else {
            continue;
        };
        for foreign_key in &table.foreign_keys {
            if foreign_key.imported_keys.is_empty() {
                continue;
            }
            let from: Option<Vec<AttributeId>> = foreign_key
                .imported_keys
                .iter()
                .map(|k| ctx.project.find_attribute(id, &table.name, &k.fk_column_name))
                .collect();
            let Some(from) = from else {
                log::debug!(
                    "foreign key '{}' of '{}' is not fully mapped by entity '{}'",
                    foreign_key.name,
                    table.name,
                    entity.name
                );
                continue;
            };
            let configs: Vec<Option<&ColumnConfig>> = foreign_key
                .imported_keys
                .iter()
                .map(|k| ctx.column_config(id, &table.name, &k.fk_column_name))
                .collect();

            let Some(target) = resolve_target_entity(ctx, table, foreign_key, &configs)? else {
                log::warn!(
                    "foreign key '{}' of '{}' references '{}' which maps to no entity, dropping it",
                    foreign_key.name,
                    table.name,
                    foreign_key.pk_table_name().unwrap_or_default()
                );
                continue;
            };
            let to: Option<Vec<AttributeId>> = foreign_key
                .imported_keys
                .iter()
                .map(|k| resolve_target_attribute(&ctx.project, target, &k.pk_table_name, &k.pk_column_name))
                .collect();
            let Some(to) = to else {
                let one_to_one = foreign_key
                    .imported_keys
                    .iter()
                    .zip(&configs)
                    .find(|(_, config)| config.is_some_and(|c| c.one_to_one_config.is_some()));
                let root = ctx.project.root_of(target);
                if let Some((key, _)) = one_to_one {
                    if ctx.project.entity(root).primary_key.is_composite() {
                        return Err(ResolveError::CompositeKeyOneToOne {
                            table: table.name.clone(),
                            column: key.fk_column_name.clone(),
                        });
                    }
                }
                log::warn!(
                    "foreign key '{}' of '{}' references columns entity '{}' does not map, dropping it",
                    foreign_key.name,
                    table.name,
                    ctx.project.entity(target).name
                );
                continue;
            };

            candidates.push(Candidate {
                entity: id,
                table,
                foreign_key,
                from,
                target,
                to,
                configs,
            });
        }
    }
    Ok(candidates)
}

fn resolve_target_entity(
    ctx: &ResolutionContext<'_>,
    table: &Table,
    foreign_key: &ForeignKey,
    configs: &[Option<&ColumnConfig>],
) -> Result<Option<EntityId>> {
    let explicit = foreign_key
        .imported_keys
        .iter()
        .zip(configs)
        .find_map(|(key, config)| {
            config
                .and_then(|c| first_non_empty([c.target_entity.as_deref()]))
                .map(|target| (key, target))
        });
    if let Some((key, target)) = explicit {
        return ctx
            .project
            .entity_by_name(target)
            .map(|e| Some(e.id))
            .ok_or_else(|| ResolveError::UnknownRelationTarget {
                table: table.name.clone(),
                column: key.fk_column_name.clone(),
                target: target.to_string(),
            });
    }

    let Some(pk_table) = foreign_key.pk_table_name() else {
        return Ok(None);
    };
    let mapping: Vec<&Entity> = ctx
        .project
        .entities
        .iter()
        .filter(|e| e.table.name.eq_ignore_ascii_case(pk_table))
        .collect();
    Ok(mapping
        .iter()
        .find(|e| e.is_root())
        .or_else(|| mapping.first())
        .map(|e| e.id))
}

/// Attribute of `target` (or one of its ancestors) mapping `table.column`,
/// else the hierarchy root's simple primary key
pub(crate) fn resolve_target_attribute(
    project: &Project,
    target: EntityId,
    table: &str,
    column: &str,
) -> Option<AttributeId> {
    for entity in project.ancestry(target) {
        if let Some(attribute) = project.find_attribute(entity, table, column) {
            return Some(attribute);
        }
    }
    let root = project.entity(project.root_of(target));
    match &root.primary_key {
        PrimaryKey::Simple(attribute) => Some(*attribute),
        PrimaryKey::Composite(_) => {
            log::error!(
                "'{}.{}' is not mapped by '{}' and its composite primary key cannot stand in for it",
                table,
                column,
                root.name
            );
            None
        }
        PrimaryKey::NoKey => None,
    }
}

/// Flag foreign-key attributes and free the names of pure foreign keys
fn mark_foreign_keys(ctx: &mut ResolutionContext<'_>, candidates: &[Candidate<'_>]) {
    for candidate in candidates {
        for attribute in &candidate.from {
            let attribute = ctx.project.attribute_mut(*attribute);
            if candidate.is_simple() {
                attribute.simple_foreign_key = true;
            } else {
                attribute.in_composite_foreign_key = true;
            }
        }
    }
    for attribute in &ctx.project.attributes {
        if attribute.in_foreign_key() && !attribute.in_primary_key {
            let owner = &ctx.project.entity(attribute.entity).name;
            ctx.session.release_accessor(owner, attribute.name());
        }
    }
}

/// Direction of an association: its foreign-key columns, then the owning
/// entity, then settings
pub(crate) fn direction(
    ctx: &ResolutionContext<'_>,
    owner: EntityId,
    columns: &[AttributeId],
) -> AssociationDirection {
    fallback(
        columns
            .iter()
            .find_map(|a| ctx.project.attribute(*a).column.association_direction),
        ctx.entity_config(owner).and_then(|c| c.association_direction),
        ctx.settings().default_association_direction,
    )
}

/// `authorId` → `author`; a name without an id suffix is kept as is
pub(crate) fn forward_name(attribute_name: &str) -> String {
    naming::strip_id_suffix(attribute_name).unwrap_or_else(|| attribute_name.to_string())
}

/// Accessor on `target` navigating back to `source` through `fk_attribute`
fn inverse_name(source: &Entity, target: &Entity, fk_attribute: &str, to_many: bool) -> String {
    let base = if to_many {
        naming::pluralize(&source.var_name)
    } else {
        source.var_name.clone()
    };
    let via = forward_name(fk_attribute);
    if via.eq_ignore_ascii_case(&target.var_name) {
        base
    } else {
        format!("{base}By{}", naming::capitalize(&via))
    }
}

/// Claim the accessor and attach a new relation to its source entity
pub(crate) fn add_relation(ctx: &mut ResolutionContext<'_>, draft: RelationDraft<'_>) -> RelationId {
    let owner = ctx.project.entity(draft.from_entity).name.clone();
    let desired = draft
        .config
        .and_then(|c| first_non_empty([c.var.as_deref()]))
        .unwrap_or(draft.accessor.as_str());
    let accessor = ctx.session.claim_accessor(&owner, desired);
    let label = draft
        .config
        .and_then(|c| c.label.clone())
        .unwrap_or_else(|| naming::humanize(&accessor));

    let id = RelationId(ctx.project.relations.len());
    log::debug!(
        "{:?} {}.{} -> {}",
        draft.kind,
        owner,
        accessor,
        ctx.project.entity(draft.to_entity).name
    );
    ctx.project.relations.push(Relation {
        id,
        kind: draft.kind,
        from_entity: draft.from_entity,
        to_entity: draft.to_entity,
        from_attributes: draft.from_attributes,
        to_attributes: draft.to_attributes,
        middle: draft.middle,
        inverse: None,
        is_inverse: false,
        accessor,
        label,
        direction: AssociationDirection::Unidirectional,
        actions: draft.config.map(AssociationConfig::actions).unwrap_or_default(),
        options: draft.config.map(|c| c.options.clone()).unwrap_or_default(),
    });
    ctx.project.entity_mut(draft.from_entity).relations.push(id);
    id
}

/// Make `forward` and `inverse` point at each other
pub(crate) fn link_inverse(ctx: &mut ResolutionContext<'_>, forward: RelationId, inverse: RelationId) {
    let relation = ctx.project.relation_mut(forward);
    relation.inverse = Some(inverse);
    relation.direction = AssociationDirection::Bidirectional;

    let relation = ctx.project.relation_mut(inverse);
    relation.inverse = Some(forward);
    relation.is_inverse = true;
    relation.direction = AssociationDirection::Bidirectional;
}

fn build_direct(ctx: &mut ResolutionContext<'_>, candidate: &Candidate<'_>) -> Result<()> {
    if candidate.is_simple() {
        build_simple(ctx, candidate);
        return Ok(());
    }

    let one_to_one = candidate
        .foreign_key
        .imported_keys
        .iter()
        .zip(&candidate.configs)
        .find(|(_, config)| config.is_some_and(|c| c.one_to_one_config.is_some()));
    if let Some((key, _)) = one_to_one {
        return Err(ResolveError::CompositeKeyOneToOne {
            table: candidate.table.name.clone(),
            column: key.fk_column_name.clone(),
        });
    }

    let config = candidate.configs.iter().flatten().next().copied();
    let bidirectional =
        direction(ctx, candidate.entity, &candidate.from) == AssociationDirection::Bidirectional;
    let source = ctx.project.entity(candidate.entity);
    let target = ctx.project.entity(candidate.target);
    let forward_accessor = target.var_name.clone();
    let inverse_accessor = naming::pluralize(&source.var_name);

    let forward = add_relation(
        ctx,
        RelationDraft {
            kind: RelationKind::ManyToOne,
            from_entity: candidate.entity,
            to_entity: candidate.target,
            from_attributes: candidate.from.clone(),
            to_attributes: candidate.to.clone(),
            middle: None,
            accessor: forward_accessor,
            config: config.and_then(|c| c.many_to_one_config.as_ref()),
        },
    );
    let inverse_config = config.and_then(|c| c.one_to_many_config.as_ref());
    if bidirectional || inverse_config.is_some() {
        let inverse = add_relation(
            ctx,
            RelationDraft {
                kind: RelationKind::OneToMany,
                from_entity: candidate.target,
                to_entity: candidate.entity,
                from_attributes: candidate.to.clone(),
                to_attributes: candidate.from.clone(),
                middle: None,
                accessor: inverse_accessor,
                config: inverse_config,
            },
        );
        link_inverse(ctx, forward, inverse);
    }
    Ok(())
}

fn build_simple(ctx: &mut ResolutionContext<'_>, candidate: &Candidate<'_>) {
    let fk = candidate.from[0];
    let config = candidate.config();
    let source = ctx.project.entity(candidate.entity);
    let target = ctx.project.entity(candidate.target);
    let attribute = ctx.project.attribute(fk);

    let one_to_one = attribute.is_unique()
        || config.is_some_and(|c| c.one_to_one_config.is_some())
        || source.primary_key == PrimaryKey::Simple(fk);
    let bidirectional = direction(ctx, candidate.entity, &[fk]) == AssociationDirection::Bidirectional;
    let forward_accessor = forward_name(attribute.name());
    let inverse_accessor = inverse_name(source, target, attribute.name(), !one_to_one);

    let (forward_kind, forward_config, inverse_kind, inverse_config) = if one_to_one {
        let virtual_inverse = ctx
            .entity_config(candidate.target)
            .and_then(|c| c.virtual_one_to_one)
            == Some(true);
        let inverse_kind = if virtual_inverse {
            RelationKind::OneToVirtualOne
        } else {
            RelationKind::OneToOne
        };
        (
            RelationKind::OneToOne,
            config.and_then(|c| c.one_to_one_config.as_ref()),
            inverse_kind,
            config.and_then(|c| c.inverse_one_to_one_config.as_ref()),
        )
    } else {
        (
            RelationKind::ManyToOne,
            config.and_then(|c| c.many_to_one_config.as_ref()),
            RelationKind::OneToMany,
            config.and_then(|c| c.one_to_many_config.as_ref()),
        )
    };

    let forward = add_relation(
        ctx,
        RelationDraft {
            kind: forward_kind,
            from_entity: candidate.entity,
            to_entity: candidate.target,
            from_attributes: vec![fk],
            to_attributes: candidate.to.clone(),
            middle: None,
            accessor: forward_accessor,
            config: forward_config,
        },
    );

    let wants_inverse = bidirectional
        || inverse_config.is_some()
        || inverse_kind == RelationKind::OneToVirtualOne;
    if wants_inverse {
        let inverse = add_relation(
            ctx,
            RelationDraft {
                kind: inverse_kind,
                from_entity: candidate.target,
                to_entity: candidate.entity,
                from_attributes: candidate.to.clone(),
                to_attributes: vec![fk],
                middle: None,
                accessor: inverse_accessor,
                config: inverse_config,
            },
        );
        link_inverse(ctx, forward, inverse);
    }
}
