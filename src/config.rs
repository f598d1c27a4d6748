//! Project-wide resolver settings.
//!
//! [`ResolverSettings`] holds the conventions that apply to every entity:
//! packages, naming renamers, global number/date type mappings, boolean and
//! version column conventions. Applications load them from
//! `config/resolver.toml` or environment variables using
//! `ResolverSettings::load()`. Before a run the settings are compiled into
//! [`Conventions`], which owns the compiled regular expressions.

use crate::catalog::JdbcType;
use crate::error::{ResolveError, Result};
use crate::model::{AssociationDirection, CollectionType, MappedType};
use config::{Config, ConfigError, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;

const SETTINGS_FILE: &str = "config/resolver.toml";
const ENV_PREFIX: &str = "LIFEGUARD_SCHEMA";

#[derive(Debug, Clone, Deserialize)]
pub struct ResolverSettings {
    #[serde(default = "default_root_package")]
    pub root_package: String,
    #[serde(default = "default_sub_package")]
    pub default_sub_package: String,
    #[serde(default)]
    pub default_collection_type: CollectionType,
    #[serde(default = "default_association_direction")]
    pub default_association_direction: AssociationDirection,
    /// `{table}` is replaced with the table name
    #[serde(default)]
    pub sequence_pattern: Option<String>,
    /// Field name forced on every simple primary key
    #[serde(default)]
    pub identifiable_property: Option<String>,
    #[serde(default = "default_boolean_prefixes")]
    pub boolean_prefixes: Vec<String>,
    /// numeric(1,0) columns become booleans
    #[serde(default)]
    pub decimal_one_is_boolean: bool,
    #[serde(default = "default_enum_value_prefix")]
    pub enum_value_prefix: String,
    #[serde(default = "default_version_column_names")]
    pub version_column_names: Vec<String>,
    #[serde(default = "default_include_views")]
    pub include_views: bool,
    #[serde(default)]
    pub table_excludes: Vec<String>,
    #[serde(default)]
    pub table_renamers: Vec<Renamer>,
    #[serde(default)]
    pub column_renamers: Vec<Renamer>,
    #[serde(default)]
    pub number_mappings: Vec<NumberMapping>,
    #[serde(default)]
    pub date_mappings: Vec<DateMapping>,
}

/// Regex rewrite applied to a raw name before identifier conversion
#[derive(Debug, Clone, Deserialize)]
pub struct Renamer {
    pub regexp: String,
    #[serde(default)]
    pub replace: String,
}

/// Global numeric type rule; every pattern that is set must match
#[derive(Debug, Clone, Deserialize)]
pub struct NumberMapping {
    #[serde(default)]
    pub size_pattern: Option<String>,
    #[serde(default)]
    pub scale_pattern: Option<String>,
    #[serde(default)]
    pub column_name_pattern: Option<String>,
    pub mapped_type: MappedType,
}

/// Global temporal type rule; every criterion that is set must match
#[derive(Debug, Clone, Deserialize)]
pub struct DateMapping {
    #[serde(default)]
    pub jdbc_type: Option<JdbcType>,
    #[serde(default)]
    pub column_name_pattern: Option<String>,
    pub mapped_type: MappedType,
}

fn default_root_package() -> String {
    "com.example".to_string()
}

fn default_sub_package() -> String {
    "domain".to_string()
}

fn default_association_direction() -> AssociationDirection {
    AssociationDirection::Bidirectional
}

fn default_boolean_prefixes() -> Vec<String> {
    ["is", "has", "use", "can", "should", "must"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

fn default_enum_value_prefix() -> String {
    "V_".to_string()
}

fn default_version_column_names() -> Vec<String> {
    vec!["version".to_string()]
}

fn default_include_views() -> bool {
    true
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            root_package: default_root_package(),
            default_sub_package: default_sub_package(),
            default_collection_type: CollectionType::default(),
            default_association_direction: default_association_direction(),
            sequence_pattern: None,
            identifiable_property: None,
            boolean_prefixes: default_boolean_prefixes(),
            decimal_one_is_boolean: false,
            enum_value_prefix: default_enum_value_prefix(),
            version_column_names: default_version_column_names(),
            include_views: default_include_views(),
            table_excludes: Vec::new(),
            table_renamers: Vec::new(),
            column_renamers: Vec::new(),
            number_mappings: Vec::new(),
            date_mappings: Vec::new(),
        }
    }
}

impl ResolverSettings {
    /// Load settings from `config/resolver.toml`, falling back to env vars.
    ///
    /// Values live under a `[resolver]` table; environment variables use the
    /// `LIFEGUARD_SCHEMA__RESOLVER__` prefix. A missing section yields the
    /// defaults.
    pub fn load() -> Result<Self> {
        let builder = Config::builder()
            .add_source(File::with_name(SETTINGS_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                if std::path::Path::new(SETTINGS_FILE).exists() {
                    log::warn!(
                        "failed to load {}, falling back to env: {}",
                        SETTINGS_FILE,
                        err
                    );
                }
                Config::builder()
                    .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
                    .build()?
            }
        };

        Self::from_config(&settings)
    }

    /// Parse settings from an in-memory TOML document
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Self::from_config(&settings)
    }

    fn from_config(settings: &Config) -> Result<Self> {
        match settings.get::<ResolverSettings>("resolver") {
            Ok(resolver) => Ok(resolver),
            Err(ConfigError::NotFound(_)) => Ok(Self::default()),
            Err(e) => Err(ResolveError::Settings(e)),
        }
    }
}

struct CompiledRenamer {
    pattern: Regex,
    replace: String,
}

struct CompiledNumberMapping {
    size: Option<Regex>,
    scale: Option<Regex>,
    column_name: Option<Regex>,
    mapped_type: MappedType,
}

struct CompiledDateMapping {
    jdbc_type: Option<JdbcType>,
    column_name: Option<Regex>,
    mapped_type: MappedType,
}

/// Settings with every pattern compiled, built once per run
pub struct Conventions {
    settings: ResolverSettings,
    table_excludes: Vec<Regex>,
    table_renamers: Vec<CompiledRenamer>,
    column_renamers: Vec<CompiledRenamer>,
    number_mappings: Vec<CompiledNumberMapping>,
    date_mappings: Vec<CompiledDateMapping>,
}

/// Full-match pattern
fn anchored(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|source| ResolveError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn unanchored(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| ResolveError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn compile_renamers(renamers: &[Renamer]) -> Result<Vec<CompiledRenamer>> {
    renamers
        .iter()
        .map(|r| {
            Ok(CompiledRenamer {
                pattern: unanchored(&r.regexp)?,
                replace: r.replace.clone(),
            })
        })
        .collect()
}

fn apply_renamers(renamers: &[CompiledRenamer], name: &str) -> Option<String> {
    renamers
        .iter()
        .find(|r| r.pattern.is_match(name))
        .map(|r| r.pattern.replace_all(name, r.replace.as_str()).into_owned())
}

impl Conventions {
    pub fn compile(settings: ResolverSettings) -> Result<Self> {
        let table_excludes = settings
            .table_excludes
            .iter()
            .map(|p| anchored(p))
            .collect::<Result<Vec<_>>>()?;
        let table_renamers = compile_renamers(&settings.table_renamers)?;
        let column_renamers = compile_renamers(&settings.column_renamers)?;
        let number_mappings = settings
            .number_mappings
            .iter()
            .map(|m| {
                Ok(CompiledNumberMapping {
                    size: m.size_pattern.as_deref().map(anchored).transpose()?,
                    scale: m.scale_pattern.as_deref().map(anchored).transpose()?,
                    column_name: m.column_name_pattern.as_deref().map(anchored).transpose()?,
                    mapped_type: m.mapped_type,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let date_mappings = settings
            .date_mappings
            .iter()
            .map(|m| {
                Ok(CompiledDateMapping {
                    jdbc_type: m.jdbc_type,
                    column_name: m.column_name_pattern.as_deref().map(anchored).transpose()?,
                    mapped_type: m.mapped_type,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            settings,
            table_excludes,
            table_renamers,
            column_renamers,
            number_mappings,
            date_mappings,
        })
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub fn is_table_excluded(&self, table: &str) -> bool {
        self.table_excludes.iter().any(|p| p.is_match(table))
    }

    /// Table name rewritten by the first matching renamer
    pub fn rename_table(&self, table: &str) -> Option<String> {
        apply_renamers(&self.table_renamers, table)
    }

    /// Column name rewritten by the first matching renamer
    pub fn rename_column(&self, column: &str) -> Option<String> {
        apply_renamers(&self.column_renamers, column)
    }

    /// First global number mapping matching size, scale and column name
    pub fn number_mapping(&self, size: i32, scale: i32, column: &str) -> Option<MappedType> {
        let size = size.to_string();
        let scale = scale.to_string();
        self.number_mappings
            .iter()
            .find(|m| {
                m.size.as_ref().map_or(true, |p| p.is_match(&size))
                    && m.scale.as_ref().map_or(true, |p| p.is_match(&scale))
                    && m.column_name.as_ref().map_or(true, |p| p.is_match(column))
            })
            .map(|m| m.mapped_type)
    }

    /// First global date mapping matching the JDBC type and column name
    pub fn date_mapping(&self, jdbc_type: JdbcType, column: &str) -> Option<MappedType> {
        self.date_mappings
            .iter()
            .find(|m| {
                m.jdbc_type.map_or(true, |t| t == jdbc_type)
                    && m.column_name.as_ref().map_or(true, |p| p.is_match(column))
            })
            .map(|m| m.mapped_type)
    }

    /// `is_active`, `isActive`, `HAS_CHILDREN` match; `island` does not
    pub fn has_boolean_prefix(&self, column: &str) -> bool {
        self.settings.boolean_prefixes.iter().any(|prefix| {
            let Some(head) = column.get(..prefix.len()) else {
                return false;
            };
            if !head.eq_ignore_ascii_case(prefix) {
                return false;
            }
            match column[prefix.len()..].chars().next() {
                Some('_') => column.len() > prefix.len() + 1,
                Some(c) => c.is_ascii_uppercase() && head.chars().any(|h| h.is_ascii_lowercase()),
                None => false,
            }
        })
    }

    pub fn is_version_column(&self, column: &str) -> bool {
        self.settings
            .version_column_names
            .iter()
            .any(|v| v.eq_ignore_ascii_case(column))
    }
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            settings: ResolverSettings::default(),
            table_excludes: Vec::new(),
            table_renamers: Vec::new(),
            column_renamers: Vec::new(),
            number_mappings: Vec::new(),
            date_mappings: Vec::new(),
        }
    }
}
