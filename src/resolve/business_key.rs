//! Business key resolution.
//!
//! First non-empty of: attributes flagged `business_key` in the column
//! overrides, the first simple unique constraint whose attribute is a good
//! candidate, the first composite unique constraint made only of good
//! candidates. An entity without one falls back to its primary key
//! downstream.

use crate::model::{Attribute, AttributeId, EntityId, Project, Unique};
use crate::resolve::ResolutionContext;

pub(crate) fn resolve_business_keys(ctx: &mut ResolutionContext<'_>) {
    for index in 0..ctx.project.entities.len() {
        let id = EntityId(index);
        let business_key = configured(ctx, id)
            .or_else(|| first_unique(&ctx.project, id, true))
            .or_else(|| first_unique(&ctx.project, id, false))
            .unwrap_or_default();

        if business_key.is_empty() {
            log::debug!(
                "entity '{}' has no business key configured, the primary key stands in",
                ctx.project.entity(id).name
            );
            continue;
        }
        for attribute in &business_key {
            ctx.project.attribute_mut(*attribute).in_business_key = true;
        }
        ctx.project.entity_mut(id).business_key = business_key;
    }
}

fn configured(ctx: &ResolutionContext<'_>, id: EntityId) -> Option<Vec<AttributeId>> {
    let attributes: Vec<AttributeId> = ctx
        .project
        .attributes_of(id)
        .filter(|a| {
            ctx.column_config(id, a.table_name(), a.column_name())
                .is_some_and(|c| c.is_business_key())
        })
        .map(|a| a.id)
        .collect();
    (!attributes.is_empty()).then_some(attributes)
}

fn first_unique(project: &Project, id: EntityId, simple: bool) -> Option<Vec<AttributeId>> {
    project
        .entity(id)
        .uniques
        .iter()
        .filter(|u| u.is_simple() == simple)
        .map(Unique::attributes)
        .find(|attributes| {
            attributes
                .iter()
                .all(|a| is_good_candidate(project.attribute(*a)))
        })
}

/// Mandatory plain value that is not a key, a foreign key, a version or a large object
fn is_good_candidate(attribute: &Attribute) -> bool {
    !attribute.is_nullable()
        && !attribute.in_primary_key
        && !attribute.in_foreign_key()
        && !attribute.is_version
        && !attribute.column.mapped_type.is_large_object()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, IndexHolder, JdbcType, SchemaCatalog, Table};
    use crate::config::Conventions;
    use crate::overrides::ConfigOverrides;
    use crate::resolve::{entity, key, relation};

    fn column(name: &str, nullable: bool) -> Column {
        Column {
            name: name.into(),
            data_type: JdbcType::VarChar.code(),
            size: 40,
            nullable,
            ..Default::default()
        }
    }

    fn unique(name: &str, columns: &[&str]) -> IndexHolder {
        IndexHolder {
            name: name.into(),
            unique: true,
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn resolve(table: Table, overrides_json: &str) -> Project {
        let catalog = SchemaCatalog::new(vec![table]);
        let overrides = ConfigOverrides::from_json(overrides_json).unwrap();
        let conventions = Conventions::default();
        let mut ctx = ResolutionContext::new(&catalog, &overrides, &conventions);
        entity::resolve_entities(&mut ctx).unwrap();
        key::resolve_keys(&mut ctx);
        relation::resolve_relations(&mut ctx).unwrap();
        resolve_business_keys(&mut ctx);
        ctx.finish()
    }

    fn business_key_columns(project: &Project) -> Vec<&str> {
        project.entities[0]
            .business_key
            .iter()
            .map(|a| project.attribute(*a).column_name())
            .collect()
    }

    fn person(indexes: Vec<IndexHolder>) -> Table {
        Table {
            name: "person".into(),
            columns: vec![
                column("id", false),
                column("first_name", false),
                column("last_name", false),
                column("email", false),
                column("nickname", true),
            ],
            primary_keys: vec!["id".into()],
            indexes,
            ..Default::default()
        }
    }

    #[test]
    fn test_configured_business_key() {
        let project = resolve(
            person(vec![unique("uk_email", &["email"])]),
            r#"{"entities": [{"table_name": "person", "columns": [
                {"column_name": "first_name", "business_key": true},
                {"column_name": "last_name", "business_key": true}
            ]}]}"#,
        );
        assert_eq!(business_key_columns(&project), vec!["first_name", "last_name"]);
        assert!(project.attributes[1].in_business_key);
        assert!(project.attributes[2].in_business_key);
        assert!(!project.attributes[3].in_business_key);
    }

    #[test]
    fn test_single_mandatory_unique() {
        let project = resolve(person(vec![unique("uk_email", &["email"])]), "{}");
        assert_eq!(business_key_columns(&project), vec!["email"]);
        assert!(project.attributes[3].in_business_key);
    }

    #[test]
    fn test_nullable_unique_is_skipped_for_composite() {
        let project = resolve(
            person(vec![
                unique("uk_nick", &["nickname"]),
                unique("uk_name", &["first_name", "last_name"]),
            ]),
            "{}",
        );
        assert_eq!(business_key_columns(&project), vec!["first_name", "last_name"]);
    }

    #[test]
    fn test_no_candidate_leaves_it_empty() {
        let project = resolve(person(vec![unique("uk_nick", &["nickname"])]), "{}");
        assert!(project.entities[0].business_key.is_empty());
        assert!(project.attributes.iter().all(|a| !a.in_business_key));
    }
}
