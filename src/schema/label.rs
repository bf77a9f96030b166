//! Vertex and edge labels

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

fn check_name(kind: &str, name: &str) -> GraphResult<()> {
    if name.trim().is_empty() {
        return Err(GraphError::invalid(format!("{} name is null or empty", kind)));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexLabel {
    pub name: String,
}

impl VertexLabel {
    pub fn new(name: impl Into<String>) -> GraphResult<Self> {
        let name = name.into();
        check_name("vertex label", &name)?;
        Ok(Self { name })
    }
}

/// How many edges with one label may connect a pair of vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Multiplicity {
    /// Any number of parallel edges
    #[default]
    Multi,
    /// At most one edge per vertex pair
    Simple,
    #[serde(rename = "MANY2ONE")]
    ManyToOne,
    #[serde(rename = "ONE2MANY")]
    OneToMany,
    #[serde(rename = "ONE2ONE")]
    OneToOne,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeLabel {
    pub name: String,
    #[serde(default)]
    pub multiplicity: Multiplicity,
}

impl EdgeLabel {
    pub fn new(name: impl Into<String>, multiplicity: Multiplicity) -> GraphResult<Self> {
        let name = name.into();
        check_name("edge label", &name)?;
        Ok(Self { name, multiplicity })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_names_rejected() {
        assert!(VertexLabel::new("").is_err());
        assert!(EdgeLabel::new(" ", Multiplicity::Multi).is_err());
    }

    #[test]
    fn test_multiplicity_wire_names() {
        let cases = [
            (Multiplicity::Multi, "MULTI"),
            (Multiplicity::Simple, "SIMPLE"),
            (Multiplicity::ManyToOne, "MANY2ONE"),
            (Multiplicity::OneToMany, "ONE2MANY"),
            (Multiplicity::OneToOne, "ONE2ONE"),
        ];
        for (m, name) in cases {
            assert_eq!(serde_json::to_value(m).unwrap(), json!(name));
            assert_eq!(serde_json::from_value::<Multiplicity>(json!(name)).unwrap(), m);
        }
    }

    #[test]
    fn test_edge_label_default_multiplicity() {
        let l: EdgeLabel = serde_json::from_value(json!({"name": "knows"})).unwrap();
        assert_eq!(l.multiplicity, Multiplicity::Multi);
    }
}
