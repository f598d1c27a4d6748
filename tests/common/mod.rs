//! Shared fixtures for the resolver integration tests.

#![allow(dead_code)]

use lifeguard_schema::catalog::{Column, ForeignKey, ImportedKey, IndexHolder, JdbcType, Table};
use lifeguard_schema::model::{EntityId, Project};
use lifeguard_schema::SchemaCatalog;
use std::collections::BTreeSet;

/// Route resolver diagnostics through the test harness (`RUST_LOG=debug`)
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn column(name: &str, jdbc_type: JdbcType, size: i32) -> Column {
    Column {
        name: name.to_string(),
        data_type: jdbc_type.code(),
        size,
        nullable: true,
        ..Default::default()
    }
}

pub fn numeric(name: &str, size: i32, scale: i32) -> Column {
    Column {
        decimal_digits: scale,
        ..column(name, JdbcType::Numeric, size)
    }
}

pub fn not_null(column: Column) -> Column {
    Column {
        nullable: false,
        ..column
    }
}

pub fn table(name: &str, columns: Vec<Column>, primary_keys: &[&str]) -> Table {
    Table {
        name: name.to_string(),
        columns,
        primary_keys: primary_keys.iter().map(|c| c.to_string()).collect(),
        ..Default::default()
    }
}

pub fn foreign_key(column: &str, pk_table: &str, pk_column: &str) -> ForeignKey {
    ForeignKey {
        name: format!("fk_{column}"),
        imported_keys: vec![ImportedKey {
            fk_column_name: column.to_string(),
            pk_table_name: pk_table.to_string(),
            pk_column_name: pk_column.to_string(),
            pk_table_schema: None,
        }],
    }
}

pub fn unique_index(name: &str, columns: &[&str]) -> IndexHolder {
    IndexHolder {
        name: name.to_string(),
        unique: true,
        columns: columns.iter().map(|c| c.to_string()).collect(),
    }
}

/// `author(id PK, name)` and `book(id PK, title, author_id FK -> author.id)`
pub fn author_book() -> SchemaCatalog {
    let author = table(
        "author",
        vec![
            not_null(column("id", JdbcType::BigInt, 19)),
            column("name", JdbcType::VarChar, 100),
        ],
        &["id"],
    );
    let mut book = table(
        "book",
        vec![
            not_null(column("id", JdbcType::BigInt, 19)),
            column("title", JdbcType::VarChar, 200),
            column("author_id", JdbcType::BigInt, 19),
        ],
        &["id"],
    );
    book.foreign_keys.push(foreign_key("author_id", "author", "id"));
    SchemaCatalog::new(vec![author, book])
}

/// Lower-cased names an entity exposes: materialized attributes and relation accessors
pub fn exposed_names(project: &Project, entity: EntityId) -> Vec<String> {
    let attributes = project
        .attributes_of(entity)
        .filter(|a| !a.in_composite_key && !(a.in_foreign_key() && !a.in_primary_key))
        .map(|a| a.name().to_ascii_lowercase());
    let accessors = project
        .relations_of(entity)
        .map(|r| r.accessor.to_ascii_lowercase());
    attributes.chain(accessors).collect()
}

pub fn assert_no_collisions(project: &Project) {
    for entity in &project.entities {
        let names = exposed_names(project, entity.id);
        let unique: BTreeSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len(), "colliding names on {}: {:?}", entity.name, names);
    }
}

pub fn assert_inverse_symmetry(project: &Project) {
    for relation in &project.relations {
        if let Some(inverse) = relation.inverse {
            assert_eq!(
                project.relation(inverse).inverse,
                Some(relation.id),
                "inverse of {} does not point back",
                relation.accessor
            );
            assert_eq!(project.relation(inverse).from_entity, relation.to_entity);
            assert_eq!(project.relation(inverse).to_entity, relation.from_entity);
        }
    }
}
