//! Column resolution.
//!
//! Merges one column's raw metadata, its override and conventions into a
//! [`ResolvedColumn`], field by field, through [`fallback`]. Also builds
//! enumeration definitions: shared ones declared project-wide, inline ones
//! declared on a column override, and default ones detected from a column's
//! fixed value set.

use crate::catalog::{Column, Table};
use crate::config::Conventions;
use crate::error::{ResolveError, Result};
use crate::model::{EnumDefinition, EnumId, EnumType, EnumValue, MappedType, ResolvedColumn};
use crate::naming;
use crate::overrides::{ColumnConfig, EnumConfig};
use crate::resolve::fallback::{fallback, fallback_with, first_non_empty};
use crate::resolve::type_mapper::{TypeMapper, TypeRequest};
use crate::resolve::ResolutionContext;
use crate::session::ResolutionSession;

/// Register every shared enum before any column refers to one
pub(crate) fn register_shared_enums(ctx: &mut ResolutionContext<'_>) -> Result<()> {
    let prefix = &ctx.settings().enum_value_prefix;
    for config in &ctx.overrides.shared_enums {
        let Some(name) = first_non_empty([config.name.as_deref()]) else {
            log::warn!("skipping shared enum without a name");
            continue;
        };
        if ctx.session.is_enum_name_claimed(name) {
            return Err(ResolveError::DuplicateSharedEnum {
                name: name.to_string(),
            });
        }
        let definition = build_configured_enum(name.to_string(), config, true, prefix)?;
        ctx.session.claim_enum_name(name);
        ctx.session.register_enum(definition);
        log::debug!("registered shared enum {}", name);
    }
    Ok(())
}

/// Resolve one column of `table` with its optional override
pub(crate) fn resolve_column(
    conventions: &Conventions,
    session: &mut ResolutionSession,
    table: &Table,
    column: &Column,
    config: Option<&ColumnConfig>,
) -> Result<ResolvedColumn> {
    let jdbc_type = TypeMapper::jdbc_type(&table.name, column)?;

    let field_name = match config.and_then(|c| first_non_empty([c.field_name.as_deref()])) {
        Some(explicit) => explicit.to_string(),
        None => {
            let renamed = conventions.rename_column(&column.name);
            naming::to_var_name(renamed.as_deref().unwrap_or(&column.name))
        }
    };

    let is_enum = config.is_some_and(|c| c.shared_enum_name.is_some() || c.enum_config.is_some())
        || column.has_enum_values();
    let in_key = table.is_primary_key(&column.name) || table.is_foreign_key(&column.name);
    let mapped_type = TypeMapper::new(conventions).map(TypeRequest {
        table: &table.name,
        column,
        explicit: config.and_then(|c| c.mapped_type),
        in_key,
        is_enum,
    })?;

    let enum_ref = resolve_enum(conventions, session, table, column, config, &field_name, mapped_type)?;

    let display_order = fallback(config.and_then(|c| c.display_order), None, column.ordinal_position);
    let label = fallback_with(config.and_then(|c| c.label.clone()), None, || {
        naming::humanize(&column.name)
    });

    Ok(ResolvedColumn {
        table_name: table.name.clone(),
        column_name: column.name.clone(),
        field_name,
        jdbc_type,
        mapped_type,
        explicit_type: config.is_some_and(|c| c.mapped_type.is_some()),
        nullable: fallback(config.and_then(|c| c.nullable), None, column.nullable),
        size: fallback(config.and_then(|c| c.size), None, column.size),
        decimal_digits: fallback(config.and_then(|c| c.scale), None, column.decimal_digits),
        ordinal_position: column.ordinal_position,
        display_order,
        search_order: fallback(config.and_then(|c| c.search_order), None, display_order),
        form_order: fallback(config.and_then(|c| c.form_order), None, display_order),
        auto_increment: fallback(
            config.and_then(|c| c.auto_increment),
            column.auto_increment,
            false,
        ),
        unique: fallback(config.and_then(|c| c.unique), None, table.is_unique(&column.name)),
        default_value: config
            .and_then(|c| c.default_value.clone())
            .or_else(|| column.default_value.clone()),
        enum_ref,
        association_direction: config.and_then(|c| c.association_direction),
        label,
        remarks: column.remarks.clone(),
    })
}

fn resolve_enum(
    conventions: &Conventions,
    session: &mut ResolutionSession,
    table: &Table,
    column: &Column,
    config: Option<&ColumnConfig>,
    field_name: &str,
    mapped_type: MappedType,
) -> Result<Option<EnumId>> {
    let prefix = &conventions.settings().enum_value_prefix;

    if let Some(shared) = config.and_then(|c| c.shared_enum_name.as_deref()) {
        return session
            .shared_enum(shared)
            .map(Some)
            .ok_or_else(|| ResolveError::UnknownSharedEnum {
                table: table.name.clone(),
                column: column.name.clone(),
                name: shared.to_string(),
            });
    }

    let default_name = naming::to_type_name(field_name);

    if let Some(enum_config) = config.and_then(|c| c.enum_config.as_ref()) {
        let desired = first_non_empty([enum_config.name.as_deref()]).unwrap_or(&default_name);
        let name = session.claim_enum_name(desired);
        let definition = build_configured_enum(name, enum_config, false, prefix)?;
        return Ok(Some(session.register_enum(definition)));
    }

    if !column.has_enum_values() {
        return Ok(None);
    }

    let all_identifiers = column.enum_values.iter().all(|v| naming::is_valid_identifier(v));
    let enum_type = if !all_identifiers {
        EnumType::Custom
    } else if mapped_type.is_numeric() {
        EnumType::Ordinal
    } else {
        EnumType::String
    };

    let values = column
        .enum_values
        .iter()
        .map(|raw| EnumValue {
            name: if all_identifiers {
                raw.clone()
            } else {
                constant_name(raw, prefix)
            },
            value: raw.clone(),
            label: naming::humanize(raw),
        })
        .collect();

    let name = session.claim_enum_name(&default_name);
    log::info!(
        "column {}.{} has a fixed value set, generating {:?} enum {}",
        table.name,
        column.name,
        enum_type,
        name
    );
    Ok(Some(session.register_enum(EnumDefinition {
        name,
        enum_type,
        values,
        shared: false,
    })))
}

/// Build an enum from a declaration; every entry must carry a value
fn build_configured_enum(
    name: String,
    config: &EnumConfig,
    shared: bool,
    prefix: &str,
) -> Result<EnumDefinition> {
    let enum_type = config.enum_type.unwrap_or(EnumType::String);
    let mut values = Vec::with_capacity(config.values.len());

    for (index, entry) in config.values.iter().enumerate() {
        let constant = match (entry.name.as_deref(), entry.value.as_deref()) {
            (Some(n), _) if naming::is_valid_identifier(n) => n.to_string(),
            (Some(n), _) => constant_name(n, prefix),
            (None, Some(v)) => constant_name(v, prefix),
            (None, None) => {
                return Err(ResolveError::MissingEnumValue {
                    enum_name: name,
                    entry: format!("#{index}"),
                })
            }
        };
        let Some(value) = entry.value.clone() else {
            return Err(ResolveError::MissingEnumValue {
                enum_name: name,
                entry: constant,
            });
        };
        let label = entry
            .label
            .clone()
            .unwrap_or_else(|| naming::humanize(&constant));
        values.push(EnumValue {
            name: constant,
            value,
            label,
        });
    }

    Ok(EnumDefinition {
        name,
        enum_type,
        values,
        shared,
    })
}

/// Constant identifier for a raw enum value; a leading digit gets `prefix`
fn constant_name(raw: &str, prefix: &str) -> String {
    let constant = naming::to_constant_name(raw);
    if constant.is_empty() {
        return format!("{prefix}EMPTY");
    }
    if constant.starts_with(|c: char| c.is_ascii_digit()) {
        let prefixed = format!("{prefix}{constant}");
        log::warn!(
            "enum value '{}' starts with a digit, using constant '{}'",
            raw,
            prefixed
        );
        return prefixed;
    }
    constant
}
