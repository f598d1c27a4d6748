//! End-to-end resolution tests.
//!
//! Each test builds a small catalog in memory, resolves it through the public
//! API and checks the resulting project:
//! 1. Relations between plain entities (both directions, unidirectional)
//! 2. Junction tables collapsed into many-to-many
//! 3. Project-wide invariants (determinism, keys, inverses, names)
//! 4. Type conventions and business keys
//! 5. Fatal configuration errors
//! 6. Settings loaded from TOML

mod common;

use common::*;
use lifeguard_schema::catalog::{JdbcType, TableType};
use lifeguard_schema::model::{AssociationDirection, MappedType, PrimaryKey, RelationKind};
use lifeguard_schema::{
    resolve, ConfigOverrides, Project, ResolveError, ResolverSettings, SchemaCatalog, SchemaResolver,
};

fn resolve_default(catalog: &SchemaCatalog, overrides_json: &str) -> Project {
    init_logging();
    let overrides = ConfigOverrides::from_json(overrides_json).expect("overrides parse");
    resolve(catalog, &overrides, ResolverSettings::default()).expect("resolution succeeds")
}

fn resolve_err(catalog: &SchemaCatalog, overrides_json: &str) -> ResolveError {
    init_logging();
    let overrides = ConfigOverrides::from_json(overrides_json).expect("overrides parse");
    resolve(catalog, &overrides, ResolverSettings::default()).expect_err("resolution fails")
}

/// (accessor, kind, target entity name) of every relation on `entity`
fn relations(project: &Project, entity: &str) -> Vec<(String, RelationKind, String)> {
    let entity = project.entity_by_name(entity).expect("entity exists");
    project
        .relations_of(entity.id)
        .map(|r| {
            (
                r.accessor.clone(),
                r.kind,
                project.entity(r.to_entity).name.clone(),
            )
        })
        .collect()
}

/// `author`, `book` and the `book_author` junction between them
fn library() -> SchemaCatalog {
    let mut catalog = author_book();
    let book = catalog.tables.iter_mut().find(|t| t.name == "book").unwrap();
    book.columns.retain(|c| c.name != "author_id");
    book.foreign_keys.clear();
    let mut book_author = table(
        "book_author",
        vec![
            not_null(column("book_id", JdbcType::BigInt, 19)),
            not_null(column("author_id", JdbcType::BigInt, 19)),
        ],
        &["book_id", "author_id"],
    );
    book_author.foreign_keys = vec![
        foreign_key("book_id", "book", "id"),
        foreign_key("author_id", "author", "id"),
    ];
    catalog.tables.push(book_author);
    catalog
}

// ============================================================================
// Plain relations
// ============================================================================

#[test]
fn test_author_book_bidirectional() {
    let project = resolve_default(&author_book(), "{}");

    assert_eq!(
        relations(&project, "Book"),
        vec![("author".to_string(), RelationKind::ManyToOne, "Author".to_string())]
    );
    assert_eq!(
        relations(&project, "Author"),
        vec![("books".to_string(), RelationKind::OneToMany, "Book".to_string())]
    );

    let book = project.entity_by_name("Book").unwrap();
    let author_id = project
        .attributes_of(book.id)
        .find(|a| a.column_name() == "author_id")
        .unwrap();
    assert_eq!(author_id.name(), "authorId");
    assert!(author_id.simple_foreign_key);
    assert!(!author_id.is_simple());

    let forward = project.relation(book.relations[0]);
    assert!(forward.is_bidirectional());
    assert!(!forward.is_inverse);
    assert!(project.relation(forward.inverse.unwrap()).is_inverse);
}

#[test]
fn test_author_book_unidirectional() {
    let project = resolve_default(
        &author_book(),
        r#"{"entities": [{"table_name": "book", "association_direction": "unidirectional"}]}"#,
    );
    assert_eq!(relations(&project, "Book").len(), 1);
    assert!(relations(&project, "Author").is_empty());
    let book = project.entity_by_name("Book").unwrap();
    assert!(project.relation(book.relations[0]).inverse.is_none());
}

#[test]
fn test_column_direction_beats_entity_direction() {
    let project = resolve_default(
        &author_book(),
        r#"{"entities": [{"table_name": "book", "association_direction": "unidirectional", "columns": [
            {"column_name": "author_id", "association_direction": "bidirectional"}
        ]}]}"#,
    );
    let book = project.entity_by_name("Book").unwrap();
    let author_id = project
        .attributes_of(book.id)
        .find(|a| a.column_name() == "author_id")
        .unwrap();
    assert_eq!(
        author_id.column.association_direction,
        Some(AssociationDirection::Bidirectional)
    );
    assert!(project.relation(book.relations[0]).inverse.is_some());
    assert_eq!(relations(&project, "Author").len(), 1);
}

#[test]
fn test_configured_accessor_names() {
    let project = resolve_default(
        &author_book(),
        r#"{"entities": [{"table_name": "book", "columns": [{
            "column_name": "author_id",
            "many_to_one_config": {"var": "writer"},
            "one_to_many_config": {"var": "works", "fetch": "lazy"}
        }]}]}"#,
    );
    assert_eq!(relations(&project, "Book")[0].0, "writer");
    assert_eq!(relations(&project, "Author")[0].0, "works");
}

// ============================================================================
// Junction tables
// ============================================================================

#[test]
fn test_junction_becomes_many_to_many() {
    let project = resolve_default(&library(), "{}");

    let junction = project.entity_by_name("BookAuthor").unwrap();
    assert!(junction.is_many_to_many_join);
    assert!(junction.primary_key.is_composite());

    let book = relations(&project, "Book");
    assert!(book.contains(&("authors".to_string(), RelationKind::ManyToMany, "Author".to_string())));
    let author = relations(&project, "Author");
    assert!(author.contains(&("books".to_string(), RelationKind::ManyToMany, "Book".to_string())));

    // helper links from the junction to both sides
    let helpers = relations(&project, "BookAuthor");
    assert_eq!(
        helpers,
        vec![
            ("book".to_string(), RelationKind::ManyToOne, "Book".to_string()),
            ("author".to_string(), RelationKind::ManyToOne, "Author".to_string()),
        ]
    );
}

#[test]
fn test_third_column_breaks_junction() {
    let mut catalog = library();
    let junction = catalog.tables.iter_mut().find(|t| t.name == "book_author").unwrap();
    junction.columns.push(column("contribution", JdbcType::VarChar, 40));

    let project = resolve_default(&catalog, "{}");
    assert!(!project.entity_by_name("BookAuthor").unwrap().is_many_to_many_join);
    assert!(relations(&project, "Book")
        .iter()
        .all(|(_, kind, _)| *kind != RelationKind::ManyToMany));
    assert!(relations(&project, "BookAuthor")
        .iter()
        .all(|(_, kind, _)| *kind == RelationKind::ManyToOne));
}

// ============================================================================
// Project-wide invariants
// ============================================================================

#[test]
fn test_resolution_is_deterministic() {
    init_logging();
    let catalog = library();
    let overrides = ConfigOverrides::default();
    let resolver = SchemaResolver::new(ResolverSettings::default()).unwrap();

    let first = resolver.resolve(&catalog, &overrides).unwrap().to_json().unwrap();
    let second = resolver.resolve(&catalog, &overrides).unwrap().to_json().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_every_root_has_a_key() {
    let mut catalog = library();
    catalog.tables.push(table(
        "person",
        vec![
            not_null(column("id", JdbcType::BigInt, 19)),
            column("name", JdbcType::VarChar, 80),
            column("kind", JdbcType::VarChar, 10),
            column("salary", JdbcType::Integer, 10),
        ],
        &["id"],
    ));
    // a log table without a declared key
    catalog.tables.push(table(
        "audit_log",
        vec![
            not_null(column("logged_at", JdbcType::Timestamp, 0)),
            column("message", JdbcType::VarChar, 200),
        ],
        &[],
    ));
    let project = resolve_default(
        &catalog,
        r#"{"entities": [
            {"table_name": "person", "inheritance": {"strategy": "single_table", "discriminator_column": "kind"}},
            {"entity_name": "Employee", "parent_name": "Person", "columns": [{"column_name": "salary"}]}
        ]}"#,
    );

    for entity in &project.entities {
        if entity.is_root() {
            assert!(!entity.primary_key.is_no_key(), "{} has no key", entity.name);
        } else {
            assert_eq!(entity.primary_key, PrimaryKey::NoKey, "{} carries a key", entity.name);
        }
    }
    let person = project.entity_by_name("Person").unwrap();
    let employee = project.entity_by_name("Employee").unwrap();
    assert_eq!(employee.table.name, "person");
    assert_eq!(project.children_of(person.id), vec![employee.id]);
    assert!(project.children_of(employee.id).is_empty());
    assert_eq!(project.ancestry(employee.id), vec![employee.id, person.id]);
    assert_eq!(project.root_of(employee.id), person.id);
    assert!(project
        .attributes_of(employee.id)
        .all(|a| a.column_name() == "salary"));

    // the key is not a plain value attribute; the child's own column is
    let person_simple: Vec<&str> = project
        .simple_attributes(person.id)
        .iter()
        .map(|a| a.column_name())
        .collect();
    assert!(person_simple.contains(&"name"));
    assert!(!person_simple.contains(&"id"));
    let employee_simple: Vec<&str> = project
        .simple_attributes(employee.id)
        .iter()
        .map(|a| a.column_name())
        .collect();
    assert_eq!(employee_simple, vec!["salary"]);
}

#[test]
fn test_unique_split_across_hierarchy_is_dropped() {
    let mut person = table(
        "person",
        vec![
            not_null(column("id", JdbcType::BigInt, 19)),
            column("name", JdbcType::VarChar, 80),
            column("kind", JdbcType::VarChar, 10),
            column("badge", JdbcType::VarChar, 20),
        ],
        &["id"],
    );
    person.indexes = vec![
        unique_index("uk_name_badge", &["name", "badge"]),
        unique_index("uk_badge", &["badge"]),
    ];
    let project = resolve_default(
        &SchemaCatalog::new(vec![person]),
        r#"{"entities": [
            {"table_name": "person", "inheritance": {"strategy": "single_table", "discriminator_column": "kind"}},
            {"entity_name": "Employee", "parent_name": "Person", "columns": [{"column_name": "badge"}]}
        ]}"#,
    );

    for entity in &project.entities {
        assert!(
            entity.uniques.iter().all(|u| u.name() != "uk_name_badge"),
            "{} kept a constraint it only partly maps",
            entity.name
        );
    }
    // a constraint wholly inside the child stays with the child
    let employee = project.entity_by_name("Employee").unwrap();
    let names: Vec<&str> = employee.uniques.iter().map(|u| u.name()).collect();
    assert_eq!(names, vec!["uk_badge"]);
    assert!(project.entity_by_name("Person").unwrap().uniques.is_empty());
}

#[test]
fn test_inverses_point_back() {
    let project = resolve_default(&library(), "{}");
    assert_inverse_symmetry(&project);
    assert!(project.relations.iter().any(|r| r.inverse.is_some()));
}

#[test]
fn test_accessors_never_collide_with_attributes() {
    let mut employee = table(
        "employee",
        vec![
            not_null(column("id", JdbcType::BigInt, 19)),
            column("manager", JdbcType::VarChar, 80),
            column("manager_id", JdbcType::BigInt, 19),
        ],
        &["id"],
    );
    employee.foreign_keys.push(foreign_key("manager_id", "employee", "id"));
    let project = resolve_default(&SchemaCatalog::new(vec![employee]), "{}");

    let accessors: Vec<String> = relations(&project, "Employee").into_iter().map(|r| r.0).collect();
    assert_eq!(accessors, vec!["manager2", "employeesByManager"]);
    assert_no_collisions(&project);
}

#[test]
fn test_views_follow_settings() {
    let mut catalog = author_book();
    let mut view = table("book_summary", vec![column("title", JdbcType::VarChar, 200)], &[]);
    view.table_type = TableType::View;
    catalog.tables.push(view);

    let with_views = resolve_default(&catalog, "{}");
    assert!(with_views.entity_by_name("BookSummary").unwrap().is_view);

    let overrides = ConfigOverrides::default();
    let settings = ResolverSettings {
        include_views: false,
        ..Default::default()
    };
    let without_views = resolve(&catalog, &overrides, settings).unwrap();
    assert!(without_views.entity_by_name("BookSummary").is_none());
}

// ============================================================================
// Type conventions and business keys
// ============================================================================

#[test]
fn test_numeric_type_conventions() {
    let measure = table(
        "measure",
        vec![
            not_null(numeric("id", 20, 0)),
            numeric("quantity", 1, 0),
            numeric("is_active", 1, 0),
            numeric("amount", 20, 0),
            numeric("ratio", 5, 2),
        ],
        &["id"],
    );
    let project = resolve_default(&SchemaCatalog::new(vec![measure]), "{}");

    let mapped = |column: &str| {
        project
            .attributes
            .iter()
            .find(|a| a.column_name() == column)
            .map(|a| a.column.mapped_type)
    };
    assert_eq!(mapped("id"), Some(MappedType::Long));
    assert_eq!(mapped("quantity"), Some(MappedType::Integer));
    assert_eq!(mapped("is_active"), Some(MappedType::Boolean));
    assert_eq!(mapped("amount"), Some(MappedType::BigInteger));
    assert_eq!(mapped("ratio"), Some(MappedType::Double));
}

#[test]
fn test_heuristic_key_matches_referencing_type() {
    // no declared key: `id` is picked by name after it was typed
    let author = table(
        "author",
        vec![
            not_null(numeric("id", 20, 0)),
            column("name", JdbcType::VarChar, 100),
        ],
        &[],
    );
    let mut book = table(
        "book",
        vec![
            not_null(numeric("id", 19, 0)),
            numeric("author_id", 20, 0),
        ],
        &["id"],
    );
    book.foreign_keys.push(foreign_key("author_id", "author", "id"));
    let project = resolve_default(&SchemaCatalog::new(vec![author, book]), "{}");

    let type_of = |entity: &str, column: &str| {
        let entity = project.entity_by_name(entity).unwrap();
        project
            .attributes_of(entity.id)
            .find(|a| a.column_name() == column)
            .map(|a| (a.in_primary_key, a.column.mapped_type))
            .unwrap()
    };
    assert_eq!(type_of("Author", "id"), (true, MappedType::Long));
    assert_eq!(type_of("Book", "author_id"), (false, MappedType::Long));
}

#[test]
fn test_explicit_type_survives_heuristic_key() {
    let ledger = table("ledger", vec![not_null(numeric("id", 20, 0))], &[]);
    let project = resolve_default(
        &SchemaCatalog::new(vec![ledger]),
        r#"{"entities": [{"table_name": "ledger", "columns": [
            {"column_name": "id", "mapped_type": "big_integer"}
        ]}]}"#,
    );
    let id = &project.attributes[0];
    assert!(id.in_primary_key);
    assert_eq!(id.column.mapped_type, MappedType::BigInteger);
}

#[test]
fn test_business_key_from_mandatory_unique() {
    let mut customer = table(
        "customer",
        vec![
            not_null(column("id", JdbcType::BigInt, 19)),
            not_null(column("email", JdbcType::VarChar, 120)),
            column("phone", JdbcType::VarChar, 20),
        ],
        &["id"],
    );
    customer.indexes = vec![
        unique_index("uk_phone", &["phone"]),
        unique_index("uk_email", &["email"]),
    ];
    let project = resolve_default(&SchemaCatalog::new(vec![customer]), "{}");

    let entity = project.entity_by_name("Customer").unwrap();
    assert_eq!(entity.uniques.len(), 2);
    let business_key: Vec<&str> = entity
        .business_key
        .iter()
        .map(|a| project.attribute(*a).column_name())
        .collect();
    assert_eq!(business_key, vec!["email"]);
}

// ============================================================================
// Fatal errors
// ============================================================================

#[test]
fn test_unknown_shared_enum_is_fatal() {
    let err = resolve_err(
        &author_book(),
        r#"{"entities": [{"table_name": "book", "columns": [
            {"column_name": "title", "shared_enum_name": "Genre"}
        ]}]}"#,
    );
    assert!(matches!(err, ResolveError::UnknownSharedEnum { ref name, .. } if name == "Genre"));
}

#[test]
fn test_duplicate_shared_enum_is_fatal() {
    let err = resolve_err(
        &author_book(),
        r#"{"shared_enums": [
            {"name": "Genre", "values": [{"name": "NOVEL", "value": "N"}]},
            {"name": "Genre", "values": [{"name": "POEM", "value": "P"}]}
        ]}"#,
    );
    assert!(matches!(err, ResolveError::DuplicateSharedEnum { .. }));
}

#[test]
fn test_unsupported_type_code_is_fatal() {
    let mut odd = column("payload", JdbcType::VarChar, 10);
    odd.data_type = 4242;
    let catalog = SchemaCatalog::new(vec![table("blob_store", vec![odd], &[])]);
    let err = resolve_err(&catalog, "{}");
    assert!(matches!(err, ResolveError::UnsupportedJdbcType { code: 4242, .. }));
}

#[test]
fn test_unknown_relation_target_is_fatal() {
    let err = resolve_err(
        &author_book(),
        r#"{"entities": [{"table_name": "book", "columns": [
            {"column_name": "author_id", "target_entity": "Writer"}
        ]}]}"#,
    );
    assert!(matches!(err, ResolveError::UnknownRelationTarget { ref target, .. } if target == "Writer"));
}

#[test]
fn test_inheritance_cycle_is_fatal() {
    let catalog = SchemaCatalog::new(vec![
        table("a", vec![column("id", JdbcType::BigInt, 19)], &["id"]),
        table("b", vec![column("id", JdbcType::BigInt, 19)], &["id"]),
    ]);
    let err = resolve_err(
        &catalog,
        r#"{"entities": [
            {"table_name": "a", "parent_name": "B"},
            {"table_name": "b", "parent_name": "A"}
        ]}"#,
    );
    assert!(matches!(err, ResolveError::InheritanceCycle { .. }));
}

#[test]
fn test_invalid_pattern_fails_before_resolution() {
    let settings = ResolverSettings::from_toml_str(
        r#"
        [resolver]
        table_excludes = ["(unclosed"]
        "#,
    )
    .unwrap();
    let err = SchemaResolver::new(settings).err().expect("pattern rejected");
    assert!(matches!(err, ResolveError::InvalidPattern { .. }));
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn test_settings_from_toml() {
    init_logging();
    let settings = ResolverSettings::from_toml_str(
        r#"
        [resolver]
        root_package = "org.acme"
        sequence_pattern = "seq_{table}"
        table_renamers = [{ regexp = "^tbl_", replace = "" }]
        "#,
    )
    .unwrap();
    let catalog = SchemaCatalog::new(vec![table(
        "tbl_customer",
        vec![not_null(column("id", JdbcType::BigInt, 19))],
        &["id"],
    )]);
    let project = resolve(&catalog, &ConfigOverrides::default(), settings).unwrap();

    let customer = project.entity_by_name("Customer").expect("renamed entity");
    assert_eq!(customer.table.name, "tbl_customer");
    assert_eq!(customer.package, "org.acme.domain");
    assert_eq!(customer.sequence_name.as_deref(), Some("seq_tbl_customer"));
    assert_eq!(customer.var_name, "customer");
}

#[test]
fn test_missing_resolver_section_yields_defaults() {
    let settings = ResolverSettings::from_toml_str("[other]\nkey = 1\n").unwrap();
    assert_eq!(settings.root_package, ResolverSettings::default().root_package);
    assert!(settings.include_views);
}
