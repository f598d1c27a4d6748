//! JDBC type codes.
//!
//! Schema snapshots carry the raw `java.sql.Types` integer code of every
//! column. [`JdbcType::from_code`] turns it into a closed enum; an unknown code
//! is a configuration error and never silently falls back.

use serde::{Deserialize, Serialize};

/// Raw column type, as reported by the schema extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JdbcType {
    Bit,
    #[serde(rename = "TINYINT")]
    TinyInt,
    #[serde(rename = "SMALLINT")]
    SmallInt,
    Integer,
    #[serde(rename = "BIGINT")]
    BigInt,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Char,
    #[serde(rename = "VARCHAR")]
    VarChar,
    #[serde(rename = "LONGVARCHAR")]
    LongVarChar,
    Date,
    Time,
    Timestamp,
    Binary,
    #[serde(rename = "VARBINARY")]
    VarBinary,
    #[serde(rename = "LONGVARBINARY")]
    LongVarBinary,
    Null,
    Other,
    JavaObject,
    Distinct,
    Struct,
    Array,
    Blob,
    Clob,
    Ref,
    #[serde(rename = "DATALINK")]
    DataLink,
    Boolean,
    #[serde(rename = "ROWID")]
    RowId,
    #[serde(rename = "NCHAR")]
    NChar,
    #[serde(rename = "NVARCHAR")]
    NVarChar,
    #[serde(rename = "LONGNVARCHAR")]
    LongNVarChar,
    #[serde(rename = "NCLOB")]
    NClob,
    #[serde(rename = "SQLXML")]
    SqlXml,
    RefCursor,
    TimeWithTimezone,
    TimestampWithTimezone,
}

impl JdbcType {
    /// Map a `java.sql.Types` code to its variant
    pub fn from_code(code: i32) -> Option<Self> {
        let jdbc_type = match code {
            -7 => Self::Bit,
            -6 => Self::TinyInt,
            5 => Self::SmallInt,
            4 => Self::Integer,
            -5 => Self::BigInt,
            6 => Self::Float,
            7 => Self::Real,
            8 => Self::Double,
            2 => Self::Numeric,
            3 => Self::Decimal,
            1 => Self::Char,
            12 => Self::VarChar,
            -1 => Self::LongVarChar,
            91 => Self::Date,
            92 => Self::Time,
            93 => Self::Timestamp,
            -2 => Self::Binary,
            -3 => Self::VarBinary,
            -4 => Self::LongVarBinary,
            0 => Self::Null,
            1111 => Self::Other,
            2000 => Self::JavaObject,
            2001 => Self::Distinct,
            2002 => Self::Struct,
            2003 => Self::Array,
            2004 => Self::Blob,
            2005 => Self::Clob,
            2006 => Self::Ref,
            70 => Self::DataLink,
            16 => Self::Boolean,
            -8 => Self::RowId,
            -15 => Self::NChar,
            -9 => Self::NVarChar,
            -16 => Self::LongNVarChar,
            2011 => Self::NClob,
            2009 => Self::SqlXml,
            2012 => Self::RefCursor,
            2013 => Self::TimeWithTimezone,
            2014 => Self::TimestampWithTimezone,
            _ => return None,
        };
        Some(jdbc_type)
    }

    /// The `java.sql.Types` code of this variant
    pub fn code(self) -> i32 {
        match self {
            Self::Bit => -7,
            Self::TinyInt => -6,
            Self::SmallInt => 5,
            Self::Integer => 4,
            Self::BigInt => -5,
            Self::Float => 6,
            Self::Real => 7,
            Self::Double => 8,
            Self::Numeric => 2,
            Self::Decimal => 3,
            Self::Char => 1,
            Self::VarChar => 12,
            Self::LongVarChar => -1,
            Self::Date => 91,
            Self::Time => 92,
            Self::Timestamp => 93,
            Self::Binary => -2,
            Self::VarBinary => -3,
            Self::LongVarBinary => -4,
            Self::Null => 0,
            Self::Other => 1111,
            Self::JavaObject => 2000,
            Self::Distinct => 2001,
            Self::Struct => 2002,
            Self::Array => 2003,
            Self::Blob => 2004,
            Self::Clob => 2005,
            Self::Ref => 2006,
            Self::DataLink => 70,
            Self::Boolean => 16,
            Self::RowId => -8,
            Self::NChar => -15,
            Self::NVarChar => -9,
            Self::LongNVarChar => -16,
            Self::NClob => 2011,
            Self::SqlXml => 2009,
            Self::RefCursor => 2012,
            Self::TimeWithTimezone => 2013,
            Self::TimestampWithTimezone => 2014,
        }
    }

    /// Fixed-point types that need size/scale refinement
    pub fn is_decimal(self) -> bool {
        matches!(self, Self::Numeric | Self::Decimal)
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::TinyInt
                | Self::SmallInt
                | Self::Integer
                | Self::BigInt
                | Self::Float
                | Self::Real
                | Self::Double
                | Self::Numeric
                | Self::Decimal
        )
    }

    pub fn is_string(self) -> bool {
        matches!(
            self,
            Self::Char
                | Self::VarChar
                | Self::LongVarChar
                | Self::NChar
                | Self::NVarChar
                | Self::LongNVarChar
        )
    }

    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            Self::Date
                | Self::Time
                | Self::Timestamp
                | Self::TimeWithTimezone
                | Self::TimestampWithTimezone
        )
    }
}
