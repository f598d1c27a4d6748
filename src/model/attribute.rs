//! Resolved attributes.
//!
//! An [`Attribute`] is one column mapped into one entity. Its
//! [`ResolvedColumn`] carries the merged result of raw metadata, column
//! override and conventions; the flags are flipped later by the key and
//! relation resolvers.

use crate::catalog::JdbcType;
use crate::model::enums::{EnumDefinition, EnumType};
use crate::model::relation::AssociationDirection;
use crate::model::{AttributeId, EntityId, EnumId};
use serde::{Deserialize, Serialize};

/// Semantic type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappedType {
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    BigInteger,
    Float,
    Double,
    BigDecimal,
    String,
    Char,
    Date,
    LocalDate,
    LocalTime,
    LocalDateTime,
    OffsetTime,
    ZonedDateTime,
    ByteArray,
    Blob,
    Clob,
    Object,
}

impl MappedType {
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Byte
                | Self::Short
                | Self::Integer
                | Self::Long
                | Self::BigInteger
                | Self::Float
                | Self::Double
                | Self::BigDecimal
        )
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            Self::Byte | Self::Short | Self::Integer | Self::Long | Self::BigInteger
        )
    }

    pub fn is_string(self) -> bool {
        matches!(self, Self::String | Self::Char | Self::Clob)
    }

    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            Self::Date
                | Self::LocalDate
                | Self::LocalTime
                | Self::LocalDateTime
                | Self::OffsetTime
                | Self::ZonedDateTime
        )
    }

    pub fn is_large_object(self) -> bool {
        matches!(self, Self::ByteArray | Self::Blob | Self::Clob)
    }
}

/// Column metadata merged with its override and conventions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedColumn {
    /// Owning table, case preserved
    pub table_name: String,
    /// Column name, case preserved
    pub column_name: String,
    /// Generated field identifier
    pub field_name: String,
    pub jdbc_type: JdbcType,
    pub mapped_type: MappedType,
    /// `mapped_type` came from the column override rather than conventions
    pub explicit_type: bool,
    pub nullable: bool,
    pub size: i32,
    pub decimal_digits: i32,
    pub ordinal_position: i32,
    pub display_order: i32,
    pub search_order: i32,
    pub form_order: i32,
    pub auto_increment: bool,
    pub unique: bool,
    pub default_value: Option<String>,
    pub enum_ref: Option<EnumId>,
    /// Direction of the association this column's foreign key starts, when configured
    pub association_direction: Option<AssociationDirection>,
    pub label: String,
    pub remarks: Option<String>,
}

/// A column bound to an entity
#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    pub id: AttributeId,
    pub entity: EntityId,
    pub column: ResolvedColumn,
    pub in_primary_key: bool,
    pub in_composite_key: bool,
    pub simple_foreign_key: bool,
    pub in_composite_foreign_key: bool,
    pub in_business_key: bool,
    pub is_version: bool,
}

impl Attribute {
    pub(crate) fn new(id: AttributeId, entity: EntityId, column: ResolvedColumn) -> Self {
        Self {
            id,
            entity,
            column,
            in_primary_key: false,
            in_composite_key: false,
            simple_foreign_key: false,
            in_composite_foreign_key: false,
            in_business_key: false,
            is_version: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.column.field_name
    }

    pub fn column_name(&self) -> &str {
        &self.column.column_name
    }

    pub fn table_name(&self) -> &str {
        &self.column.table_name
    }

    pub fn is_nullable(&self) -> bool {
        self.column.nullable
    }

    pub fn is_unique(&self) -> bool {
        self.column.unique
    }

    pub fn is_enum(&self) -> bool {
        self.column.enum_ref.is_some()
    }

    pub fn in_foreign_key(&self) -> bool {
        self.simple_foreign_key || self.in_composite_foreign_key
    }

    /// A plain value attribute: not a key, not a foreign key, not a version
    pub fn is_simple(&self) -> bool {
        !(self.in_primary_key || self.in_foreign_key() || self.is_version)
    }

    /// Whether this attribute maps `table.column`
    pub fn maps(&self, table: &str, column: &str) -> bool {
        self.column.table_name.eq_ignore_ascii_case(table)
            && self.column.column_name.eq_ignore_ascii_case(column)
    }
}

/// Turn a raw default literal into something usable downstream.
///
/// Function defaults (`nextval(...)`, `CURRENT_TIMESTAMP`) yield `None`.
/// For enums the string branch matches constant names while custom and
/// ordinal enums share one branch that matches on the stored value.
pub fn pertinent_default_value(
    column: &ResolvedColumn,
    enum_def: Option<&EnumDefinition>,
) -> Option<String> {
    let raw = column.default_value.as_deref()?.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
        return None;
    }
    let unquoted = unquote(raw);

    if let Some(enum_def) = enum_def {
        return match enum_def.enum_type {
            EnumType::String => enum_def
                .values
                .iter()
                .find(|v| v.name == unquoted || v.value == unquoted)
                .map(|v| format!("{}.{}", enum_def.name, v.name)),
            EnumType::Custom | EnumType::Ordinal => enum_def
                .values
                .iter()
                .find(|v| v.value == unquoted)
                .map(|v| format!("{}.{}", enum_def.name, v.name)),
        };
    }

    match column.mapped_type {
        MappedType::Boolean => match unquoted.to_ascii_lowercase().as_str() {
            "1" | "true" | "y" | "yes" | "t" => Some("true".to_string()),
            "0" | "false" | "n" | "no" | "f" => Some("false".to_string()),
            _ => None,
        },
        t if t.is_numeric() => unquoted
            .parse::<f64>()
            .ok()
            .map(|_| unquoted.to_string()),
        t if t.is_string() => {
            if is_quoted(strip_cast(raw)) {
                Some(unquoted.to_string())
            } else {
                None
            }
        }
        _ => None,
    }
}

fn is_quoted(raw: &str) -> bool {
    raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'')
}

/// Postgres writes `'x'::character varying`
fn strip_cast(raw: &str) -> &str {
    raw.split("::").next().unwrap_or(raw).trim()
}

fn unquote(raw: &str) -> &str {
    let raw = strip_cast(raw);
    if is_quoted(raw) {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::enums::EnumValue;

    fn column(mapped_type: MappedType, default_value: Option<&str>) -> ResolvedColumn {
        ResolvedColumn {
            table_name: "t".into(),
            column_name: "c".into(),
            field_name: "c".into(),
            jdbc_type: JdbcType::VarChar,
            mapped_type,
            explicit_type: false,
            nullable: true,
            size: 0,
            decimal_digits: 0,
            ordinal_position: 1,
            display_order: 1,
            search_order: 1,
            form_order: 1,
            auto_increment: false,
            unique: false,
            default_value: default_value.map(str::to_string),
            enum_ref: None,
            association_direction: None,
            label: "C".into(),
            remarks: None,
        }
    }

    fn status_enum(enum_type: EnumType) -> EnumDefinition {
        EnumDefinition {
            name: "Status".into(),
            enum_type,
            shared: false,
            values: vec![
                EnumValue {
                    name: "DRAFT".into(),
                    value: "D".into(),
                    label: "Draft".into(),
                },
                EnumValue {
                    name: "PUBLISHED".into(),
                    value: "P".into(),
                    label: "Published".into(),
                },
            ],
        }
    }

    #[test]
    fn test_is_simple_follows_flags() {
        let mut attr = Attribute::new(AttributeId(0), EntityId(0), column(MappedType::String, None));
        assert!(attr.is_simple());
        attr.simple_foreign_key = true;
        assert!(!attr.is_simple());
        attr.simple_foreign_key = false;
        attr.is_version = true;
        assert!(!attr.is_simple());
    }

    #[test]
    fn test_default_value_literals() {
        let c = column(MappedType::String, Some("'abc'::character varying"));
        assert_eq!(pertinent_default_value(&c, None), Some("abc".to_string()));

        let c = column(MappedType::Boolean, Some("1"));
        assert_eq!(pertinent_default_value(&c, None), Some("true".to_string()));

        let c = column(MappedType::Long, Some("nextval('seq_book')"));
        assert_eq!(pertinent_default_value(&c, None), None);

        let c = column(MappedType::Integer, Some("42"));
        assert_eq!(pertinent_default_value(&c, None), Some("42".to_string()));

        let c = column(MappedType::LocalDateTime, Some("CURRENT_TIMESTAMP"));
        assert_eq!(pertinent_default_value(&c, None), None);
    }

    #[test]
    fn test_default_value_enum_branches() {
        let c = column(MappedType::String, Some("'DRAFT'"));
        let string_enum = status_enum(EnumType::String);
        assert_eq!(
            pertinent_default_value(&c, Some(&string_enum)),
            Some("Status.DRAFT".to_string())
        );

        // custom and ordinal both match on the stored value
        let c = column(MappedType::String, Some("'P'"));
        let custom_enum = status_enum(EnumType::Custom);
        assert_eq!(
            pertinent_default_value(&c, Some(&custom_enum)),
            Some("Status.PUBLISHED".to_string())
        );
        let ordinal_enum = status_enum(EnumType::Ordinal);
        assert_eq!(
            pertinent_default_value(&c, Some(&ordinal_enum)),
            Some("Status.PUBLISHED".to_string())
        );
        let c = column(MappedType::String, Some("'DRAFT'"));
        assert_eq!(pertinent_default_value(&c, Some(&ordinal_enum)), None);
    }
}
