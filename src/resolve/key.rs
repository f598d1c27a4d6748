//! Primary key and unique constraint resolution.
//!
//! Runs for every entity once all attributes are bound. Unique constraints
//! are replayed from the table's unique indexes first because the primary key
//! heuristics may promote one of them. Only hierarchy roots own a key; every
//! other entity keeps [`PrimaryKey::NoKey`].

use crate::catalog::Table;
use crate::model::{Attribute, AttributeId, EntityId, MappedType, PrimaryKey, Unique};
use crate::resolve::ResolutionContext;

pub(crate) fn resolve_keys(ctx: &mut ResolutionContext<'_>) {
    for index in 0..ctx.project.entities.len() {
        let id = EntityId(index);
        let Some(table) = ctx.table(&ctx.project.entity(id).table.name) else {
            continue;
        };

        let uniques = resolve_uniques(ctx, id, table);
        ctx.project.entity_mut(id).uniques = uniques;

        if ctx.project.entity(id).is_root() {
            let primary_key = resolve_primary_key(ctx, id, table);
            apply_primary_key(ctx, id, &primary_key);
            let entity = ctx.project.entity_mut(id);
            // a unique constraint on exactly the key columns says nothing new
            let key_attributes = primary_key.attributes();
            entity.uniques.retain(|u| u.attributes() != key_attributes);
            entity.primary_key = primary_key;
        }
    }
}

fn resolve_uniques(ctx: &ResolutionContext<'_>, id: EntityId, table: &Table) -> Vec<Unique> {
    let project = &ctx.project;
    let entity = project.entity(id);
    let mut uniques = Vec::new();

    for index in table.unique_indexes() {
        let found: Vec<AttributeId> = index
            .columns
            .iter()
            .filter_map(|c| project.find_attribute(id, &table.name, c))
            .collect();
        if found.is_empty() {
            continue;
        }
        if found.len() < index.columns.len() {
            log::warn!(
                "unique index '{}' on '{}' is only partly mapped by entity '{}', dropping it",
                index.name,
                table.name,
                entity.name
            );
            continue;
        }
        let name = if index.name.is_empty() {
            format!("UK_{}", index.columns.join("_").to_ascii_uppercase())
        } else {
            index.name.clone()
        };
        uniques.push(if found.len() == 1 {
            Unique::Simple {
                name,
                attribute: found[0],
            }
        } else {
            Unique::Composite {
                name,
                attributes: found,
            }
        });
    }

    // columns declared unique by configuration alone
    for attribute in project.attributes_of(id) {
        let covered = uniques
            .iter()
            .any(|u| u.is_simple() && u.attributes() == [attribute.id]);
        if attribute.is_unique() && !covered {
            uniques.push(Unique::Simple {
                name: format!("UK_{}", attribute.column_name().to_ascii_uppercase()),
                attribute: attribute.id,
            });
        }
    }
    uniques
}

fn resolve_primary_key(ctx: &ResolutionContext<'_>, id: EntityId, table: &Table) -> PrimaryKey {
    let project = &ctx.project;
    let entity = project.entity(id);

    let declared: Vec<AttributeId> = table
        .primary_keys
        .iter()
        .filter_map(|c| project.find_attribute(id, &table.name, c))
        .collect();
    if declared.len() < table.primary_keys.len() {
        log::warn!(
            "entity '{}' does not map every primary key column of '{}'",
            entity.name,
            table.name
        );
    }
    match declared.len() {
        1 => return PrimaryKey::Simple(declared[0]),
        n if n > 1 => return PrimaryKey::Composite(declared),
        _ => {}
    }

    let attributes: Vec<_> = project.attributes_of(id).collect();
    let (primary_key, how) = if let Some(a) = attributes
        .iter()
        .find(|a| a.column_name().eq_ignore_ascii_case("id"))
    {
        (PrimaryKey::Simple(a.id), "a column named id")
    } else if let Some(a) = attributes.iter().find(|a| a.is_unique() && !a.is_nullable()) {
        (PrimaryKey::Simple(a.id), "the first unique non-nullable column")
    } else if let Some(a) = attributes.iter().find(|a| a.is_unique()) {
        (PrimaryKey::Simple(a.id), "the first unique column")
    } else if let Some(Unique::Composite { attributes, .. }) =
        entity.uniques.iter().find(|u| !u.is_simple())
    {
        (
            PrimaryKey::Composite(attributes.clone()),
            "the first composite unique constraint",
        )
    } else if let Some(a) = attributes.first() {
        (PrimaryKey::Simple(a.id), "the first column")
    } else {
        log::warn!("entity '{}' has no attribute to use as primary key", entity.name);
        return PrimaryKey::NoKey;
    };

    log::warn!(
        "table '{}' declares no primary key, entity '{}' uses {}; configure the key explicitly",
        table.name,
        entity.name,
        how
    );
    primary_key
}

fn apply_primary_key(ctx: &mut ResolutionContext<'_>, id: EntityId, primary_key: &PrimaryKey) {
    let entity_name = ctx.project.entity(id).name.clone();
    match primary_key {
        PrimaryKey::NoKey => {}
        PrimaryKey::Simple(attribute) => {
            let member = ctx.project.attribute_mut(*attribute);
            member.in_primary_key = true;
            cap_key_type(member);
            let Some(property) = ctx.settings().identifiable_property.as_deref() else {
                return;
            };
            let current = ctx.project.attribute(*attribute).name().to_string();
            if current != property {
                ctx.session.release_accessor(&entity_name, &current);
                let renamed = ctx.session.claim_accessor(&entity_name, property);
                log::debug!("primary key '{}.{}' renamed to '{}'", entity_name, current, renamed);
                ctx.project.attribute_mut(*attribute).column.field_name = renamed;
            }
        }
        PrimaryKey::Composite(attributes) => {
            for attribute in attributes {
                let member = ctx.project.attribute_mut(*attribute);
                member.in_primary_key = true;
                member.in_composite_key = true;
                cap_key_type(member);
                let name = member.name().to_string();
                // composite members are reached through the key, not their own accessor
                ctx.session.release_accessor(&entity_name, &name);
            }
        }
    }
}

/// Key members never map to big integer; a key found by the heuristics was
/// typed before it was known to be one
fn cap_key_type(member: &mut Attribute) {
    if member.column.mapped_type == MappedType::BigInteger && !member.column.explicit_type {
        log::debug!("key column '{}' mapped to Long", member.column_name());
        member.column.mapped_type = MappedType::Long;
    }
}
