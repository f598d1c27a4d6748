//! Semantic type resolution.
//!
//! Resolution order, first match wins:
//!
//! 1. explicit per-column type from the overrides
//! 2. global number mappings (numeric types) or date mappings (temporal types)
//! 3. convention from the JDBC type, with size/scale refinement for
//!    `DECIMAL`/`NUMERIC`
//!
//! A primary or foreign key is never mapped to a big integer; it is capped at
//! long.

use crate::catalog::{Column, JdbcType};
use crate::config::Conventions;
use crate::error::{ResolveError, Result};
use crate::model::MappedType;

/// What the mapper needs to know about one column
#[derive(Debug, Clone, Copy)]
pub struct TypeRequest<'a> {
    pub table: &'a str,
    pub column: &'a Column,
    pub explicit: Option<MappedType>,
    /// Part of a primary or foreign key
    pub in_key: bool,
    pub is_enum: bool,
}

pub struct TypeMapper<'a> {
    conventions: &'a Conventions,
}

impl<'a> TypeMapper<'a> {
    pub fn new(conventions: &'a Conventions) -> Self {
        Self { conventions }
    }

    /// Validated JDBC type of a column
    pub fn jdbc_type(table: &str, column: &Column) -> Result<JdbcType> {
        column
            .jdbc_type()
            .ok_or_else(|| ResolveError::UnsupportedJdbcType {
                table: table.to_string(),
                column: column.name.clone(),
                code: column.data_type,
            })
    }

    pub fn map(&self, request: TypeRequest<'_>) -> Result<MappedType> {
        let jdbc_type = Self::jdbc_type(request.table, request.column)?;
        if let Some(explicit) = request.explicit {
            return Ok(explicit);
        }
        if let Some(mapped) = self.global_mapping(jdbc_type, request.column) {
            return Ok(mapped);
        }
        Ok(self.convention(jdbc_type, request))
    }

    fn global_mapping(&self, jdbc_type: JdbcType, column: &Column) -> Option<MappedType> {
        if jdbc_type.is_numeric() {
            self.conventions
                .number_mapping(column.size, column.decimal_digits, &column.name)
        } else if jdbc_type.is_temporal() {
            self.conventions.date_mapping(jdbc_type, &column.name)
        } else {
            None
        }
    }

    fn convention(&self, jdbc_type: JdbcType, request: TypeRequest<'_>) -> MappedType {
        let column = request.column;
        match jdbc_type {
            JdbcType::Numeric | JdbcType::Decimal => self.decimal(request),
            JdbcType::Bit | JdbcType::Boolean => MappedType::Boolean,
            JdbcType::TinyInt | JdbcType::SmallInt | JdbcType::Integer => MappedType::Integer,
            JdbcType::BigInt => MappedType::Long,
            JdbcType::Real => MappedType::Float,
            JdbcType::Float | JdbcType::Double => MappedType::Double,
            JdbcType::Char | JdbcType::NChar if column.size == 1 && !request.is_enum => {
                if self.conventions.has_boolean_prefix(&column.name) {
                    MappedType::Boolean
                } else {
                    MappedType::String
                }
            }
            JdbcType::Char
            | JdbcType::VarChar
            | JdbcType::LongVarChar
            | JdbcType::NChar
            | JdbcType::NVarChar
            | JdbcType::LongNVarChar
            | JdbcType::SqlXml
            | JdbcType::RowId => MappedType::String,
            JdbcType::Clob | JdbcType::NClob => MappedType::Clob,
            JdbcType::Date => MappedType::LocalDate,
            JdbcType::Time => MappedType::LocalTime,
            JdbcType::Timestamp => MappedType::LocalDateTime,
            JdbcType::TimeWithTimezone => MappedType::OffsetTime,
            JdbcType::TimestampWithTimezone => MappedType::ZonedDateTime,
            JdbcType::Binary | JdbcType::VarBinary | JdbcType::LongVarBinary => MappedType::ByteArray,
            JdbcType::Blob => MappedType::Blob,
            JdbcType::Null
            | JdbcType::Other
            | JdbcType::JavaObject
            | JdbcType::Distinct
            | JdbcType::Struct
            | JdbcType::Array
            | JdbcType::Ref
            | JdbcType::DataLink
            | JdbcType::RefCursor => MappedType::Object,
        }
    }

    fn decimal(&self, request: TypeRequest<'_>) -> MappedType {
        let column = request.column;
        let size = column.size;
        let scale = column.decimal_digits;

        if scale > 0 {
            return if size < 11 && scale < 4 {
                MappedType::Double
            } else {
                MappedType::BigDecimal
            };
        }

        if size == 1 && !request.is_enum {
            if self.conventions.has_boolean_prefix(&column.name) {
                return MappedType::Boolean;
            }
            // decimal(1,0) is a boolean, when enabled
            if self.conventions.settings().decimal_one_is_boolean && !request.in_key {
                return MappedType::Boolean;
            }
        }

        if size < 11 {
            MappedType::Integer
        } else if size < 19 || request.in_key {
            MappedType::Long
        } else {
            MappedType::BigInteger
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NumberMapping, ResolverSettings};

    fn numeric(name: &str, size: i32, scale: i32) -> Column {
        Column {
            name: name.to_string(),
            data_type: JdbcType::Numeric.code(),
            size,
            decimal_digits: scale,
            ..Default::default()
        }
    }

    fn map(conventions: &Conventions, column: &Column, in_key: bool) -> MappedType {
        TypeMapper::new(conventions)
            .map(TypeRequest {
                table: "t",
                column,
                explicit: None,
                in_key,
                is_enum: false,
            })
            .unwrap()
    }

    #[test]
    fn test_numeric_one_zero_without_boolean_name_is_integer() {
        let conventions = Conventions::default();
        assert_eq!(map(&conventions, &numeric("quantity", 1, 0), false), MappedType::Integer);
    }

    #[test]
    fn test_numeric_one_zero_with_boolean_name_is_boolean() {
        let conventions = Conventions::default();
        assert_eq!(map(&conventions, &numeric("is_active", 1, 0), false), MappedType::Boolean);
    }

    #[test]
    fn test_numeric_twenty_caps_at_long_in_keys() {
        let conventions = Conventions::default();
        assert_eq!(map(&conventions, &numeric("id", 20, 0), true), MappedType::Long);
        assert_eq!(map(&conventions, &numeric("amount", 20, 0), false), MappedType::BigInteger);
        assert_eq!(map(&conventions, &numeric("amount", 18, 0), false), MappedType::Long);
        assert_eq!(map(&conventions, &numeric("amount", 10, 0), false), MappedType::Integer);
    }

    #[test]
    fn test_numeric_with_scale() {
        let conventions = Conventions::default();
        assert_eq!(map(&conventions, &numeric("ratio", 5, 2), false), MappedType::Double);
        assert_eq!(map(&conventions, &numeric("price", 12, 2), false), MappedType::BigDecimal);
        assert_eq!(map(&conventions, &numeric("rate", 8, 5), false), MappedType::BigDecimal);
    }

    #[test]
    fn test_decimal_one_is_boolean_when_enabled() {
        let conventions = Conventions::compile(ResolverSettings {
            decimal_one_is_boolean: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(map(&conventions, &numeric("flag", 1, 0), false), MappedType::Boolean);
        assert_eq!(map(&conventions, &numeric("flag", 1, 0), true), MappedType::Integer);

        let enum_column = numeric("level", 1, 0);
        let mapped = TypeMapper::new(&conventions)
            .map(TypeRequest {
                table: "t",
                column: &enum_column,
                explicit: None,
                in_key: false,
                is_enum: true,
            })
            .unwrap();
        assert_eq!(mapped, MappedType::Integer);
    }

    #[test]
    fn test_explicit_then_global_then_convention() {
        let conventions = Conventions::compile(ResolverSettings {
            number_mappings: vec![NumberMapping {
                size_pattern: Some("1[0-9]".into()),
                scale_pattern: Some("0".into()),
                column_name_pattern: None,
                mapped_type: MappedType::BigInteger,
            }],
            ..Default::default()
        })
        .unwrap();
        let column = numeric("amount", 12, 0);
        let mapper = TypeMapper::new(&conventions);
        let explicit = mapper
            .map(TypeRequest {
                table: "t",
                column: &column,
                explicit: Some(MappedType::String),
                in_key: false,
                is_enum: false,
            })
            .unwrap();
        assert_eq!(explicit, MappedType::String);
        assert_eq!(map(&conventions, &column, false), MappedType::BigInteger);
        assert_eq!(map(&conventions, &numeric("amount", 9, 0), false), MappedType::Integer);
    }

    #[test]
    fn test_plain_jdbc_conventions() {
        let conventions = Conventions::default();
        let cases = [
            (JdbcType::VarChar, MappedType::String),
            (JdbcType::Timestamp, MappedType::LocalDateTime),
            (JdbcType::Date, MappedType::LocalDate),
            (JdbcType::BigInt, MappedType::Long),
            (JdbcType::Blob, MappedType::Blob),
            (JdbcType::VarBinary, MappedType::ByteArray),
            (JdbcType::Clob, MappedType::Clob),
            (JdbcType::Bit, MappedType::Boolean),
        ];
        for (jdbc_type, expected) in cases {
            let column = Column {
                name: "c".into(),
                data_type: jdbc_type.code(),
                size: 10,
                ..Default::default()
            };
            assert_eq!(map(&conventions, &column, false), expected, "{jdbc_type:?}");
        }
    }

    #[test]
    fn test_unknown_type_code_is_fatal() {
        let conventions = Conventions::default();
        let column = Column {
            name: "weird".into(),
            data_type: 31337,
            ..Default::default()
        };
        let err = TypeMapper::new(&conventions)
            .map(TypeRequest {
                table: "t",
                column: &column,
                explicit: Some(MappedType::String),
                in_key: false,
                is_enum: false,
            })
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnsupportedJdbcType { code: 31337, .. }));
    }
}
