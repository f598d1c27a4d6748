//! Enumeration definitions.

use serde::{Deserialize, Serialize};

/// How enum constants are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumType {
    /// Stored as the constant's position
    Ordinal,
    /// Stored as the constant's name
    String,
    /// Stored as a value mapped separately from the constant
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumValue {
    /// Constant identifier
    pub name: String,
    /// Persisted value
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumDefinition {
    /// Type name, unique project-wide
    pub name: String,
    pub enum_type: EnumType,
    pub values: Vec<EnumValue>,
    /// Declared once for the whole project rather than per column
    pub shared: bool,
}

impl EnumDefinition {
    pub fn value(&self, name: &str) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.name == name)
    }
}
