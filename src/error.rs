//! Error types for schema resolution.
//!
//! Every variant of [`ResolveError`] is fatal: it aborts the whole run and no
//! partially resolved [`Project`](crate::model::Project) is handed out.
//! Recoverable conditions (dropped relations, partial uniques, naming
//! collisions, heuristic keys) never surface here; they are logged where they
//! happen and the pipeline keeps going.

use crate::model::InheritanceStrategy;
use thiserror::Error;

/// Fatal resolution failure
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Two entities resolve to the same name (case-insensitive)
    #[error("duplicate entity name '{name}' (tables '{first_table}' and '{second_table}')")]
    DuplicateEntityName {
        name: String,
        first_table: String,
        second_table: String,
    },

    /// An entity config names neither a table nor an (entity name, parent) pair
    #[error("entity config #{index} declares neither a table name nor an entity name with a parent")]
    MissingTableOrParent { index: usize },

    /// An entity config declares itself as its own parent
    #[error("entity '{entity}' cannot extend itself")]
    SelfInheritance { entity: String },

    /// Walking up the parent chain came back to an entity already visited
    #[error("inheritance cycle detected through entity '{entity}'")]
    InheritanceCycle { entity: String },

    /// A descendant declares a strategy that differs from its root's
    #[error(
        "entity '{entity}' declares inheritance strategy {found:?} but its root '{root}' uses {expected:?}"
    )]
    InconsistentInheritance {
        entity: String,
        root: String,
        expected: InheritanceStrategy,
        found: InheritanceStrategy,
    },

    /// A configured table does not exist in the catalog
    #[error("entity '{entity}' references unknown table '{table}'")]
    UnknownTable { entity: String, table: String },

    /// A configured parent entity does not exist
    #[error("entity '{entity}' extends unknown entity '{parent}'")]
    UnknownParent { entity: String, parent: String },

    /// A joined or table-per-class child has no table of its own
    #[error("entity '{entity}' uses {strategy:?} inheritance and must declare its own table")]
    MissingChildTable {
        entity: String,
        strategy: InheritanceStrategy,
    },

    /// A column override references a shared enum that was never declared
    #[error("column '{table}.{column}' references undeclared shared enum '{name}'")]
    UnknownSharedEnum {
        table: String,
        column: String,
        name: String,
    },

    /// Two shared enums share a name
    #[error("shared enum '{name}' is declared more than once")]
    DuplicateSharedEnum { name: String },

    /// A custom enum entry has no `value`
    #[error("enum '{enum_name}' entry '{entry}' has no value")]
    MissingEnumValue { enum_name: String, entry: String },

    /// A column override could not be matched to any column
    #[error("entity '{entity}' configures unknown column '{column}'")]
    UnknownColumn { entity: String, column: String },

    /// An explicitly configured relation target cannot be found
    #[error("column '{table}.{column}' targets unknown entity '{target}'")]
    UnknownRelationTarget {
        table: String,
        column: String,
        target: String,
    },

    /// A one-to-one relation was requested where a simple key is required
    #[error("column '{table}.{column}' is configured one-to-one but the key involved is composite")]
    CompositeKeyOneToOne { table: String, column: String },

    /// The raw type code is not a known JDBC type
    #[error("column '{table}.{column}' has unsupported JDBC type code {code}")]
    UnsupportedJdbcType {
        table: String,
        column: String,
        code: i32,
    },

    /// A regular expression in the settings does not compile
    #[error("invalid pattern '{pattern}' in resolver settings: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Settings could not be loaded
    #[error("resolver settings could not be loaded: {0}")]
    Settings(#[from] config::ConfigError),

    /// A schema snapshot or override tree could not be parsed
    #[error("input document could not be parsed: {0}")]
    Input(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
