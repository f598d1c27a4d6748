//! # Lifeguard Schema
//!
//! Turns a raw relational schema snapshot plus declarative overrides into the
//! entity model Lifeguard's code generation renders: entities, attributes,
//! primary keys, unique constraints, relations and business keys.
//!
//! ```no_run
//! use lifeguard_schema::{ConfigOverrides, ResolverSettings, SchemaCatalog, SchemaResolver};
//!
//! # fn main() -> lifeguard_schema::Result<()> {
//! let catalog = SchemaCatalog::from_json(&std::fs::read_to_string("schema.json").unwrap())?;
//! let overrides = ConfigOverrides::default();
//! let resolver = SchemaResolver::new(ResolverSettings::load()?)?;
//! let project = resolver.resolve(&catalog, &overrides)?;
//! for entity in &project.entities {
//!     println!("{} <- {}", entity.name, entity.table.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! See [README on GitHub](https://github.com/microscaler/lifeguard) for the
//! code generation pipeline this feeds.

pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod naming;
pub mod overrides;
pub mod resolve;
pub mod session;

pub use crate::catalog::SchemaCatalog;
pub use crate::config::{Conventions, ResolverSettings};
pub use crate::error::{ResolveError, Result};
pub use crate::model::Project;
pub use crate::overrides::ConfigOverrides;

/// Resolver bound to one set of compiled conventions
pub struct SchemaResolver {
    conventions: Conventions,
}

impl SchemaResolver {
    /// Compile `settings`; an invalid pattern fails here, before any run
    pub fn new(settings: ResolverSettings) -> Result<Self> {
        Ok(Self {
            conventions: Conventions::compile(settings)?,
        })
    }

    pub fn conventions(&self) -> &Conventions {
        &self.conventions
    }

    /// Resolve `catalog` under `overrides`.
    ///
    /// Each call starts from a fresh session, so resolving the same input
    /// twice yields identical projects. Any fatal error aborts the run and
    /// no partial project is returned.
    pub fn resolve(&self, catalog: &SchemaCatalog, overrides: &ConfigOverrides) -> Result<Project> {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("resolve_schema", tables = catalog.tables.len()).entered();

        resolve::run(catalog, overrides, &self.conventions).map_err(|err| {
            log::error!("schema resolution failed: {}", err);
            err
        })
    }
}

/// One-shot resolution with `settings`
pub fn resolve(
    catalog: &SchemaCatalog,
    overrides: &ConfigOverrides,
    settings: ResolverSettings,
) -> Result<Project> {
    SchemaResolver::new(settings)?.resolve(catalog, overrides)
}
