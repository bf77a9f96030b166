//! Property key definitions

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GraphError, GraphResult};

/// Value type of a property key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    String,
    Integer,
    Float,
    Boolean,
}

/// How many values a vertex may hold for one property key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Cardinality {
    #[default]
    Single,
    List,
    Set,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataType::String => "String",
            DataType::Integer => "Integer",
            DataType::Float => "Float",
            DataType::Boolean => "Boolean",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Cardinality::Single => "SINGLE",
            Cardinality::List => "LIST",
            Cardinality::Set => "SET",
        };
        f.write_str(s)
    }
}

/// A property key: name, value type and cardinality
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyKey {
    pub name: String,
    pub data_type: DataType,
    #[serde(default)]
    pub cardinality: Cardinality,
}

impl PropertyKey {
    pub fn new(name: impl Into<String>, data_type: DataType, cardinality: Cardinality) -> GraphResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GraphError::invalid("property key name is null or empty"));
        }
        Ok(Self {
            name,
            data_type,
            cardinality,
        })
    }

    /// Single-valued property key
    pub fn single(name: impl Into<String>, data_type: DataType) -> GraphResult<Self> {
        Self::new(name, data_type, Cardinality::Single)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_empty_name() {
        assert!(PropertyKey::single("", DataType::String).is_err());
        assert!(PropertyKey::single("   ", DataType::String).is_err());
    }

    #[test]
    fn test_json_names() {
        let pk = PropertyKey::new("tags", DataType::String, Cardinality::Set).unwrap();
        assert_eq!(
            serde_json::to_value(&pk).unwrap(),
            json!({"name": "tags", "dataType": "String", "cardinality": "SET"})
        );
    }

    #[test]
    fn test_cardinality_defaults_to_single() {
        let pk: PropertyKey = serde_json::from_value(json!({"name": "age", "dataType": "Integer"})).unwrap();
        assert_eq!(pk.cardinality, Cardinality::Single);
        assert_eq!(pk.data_type, DataType::Integer);
    }
}
