//! Graph elements exchanged with the service
//!
//! - [`Vertex`]: label plus properties
//! - [`Edge`]: label, incident vertices and properties
//! - [`ElementId`]: service-assigned id, numeric for vertices, textual for edges

pub mod edge;
pub mod vertex;

pub use edge::Edge;
pub use vertex::Vertex;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Property key/value pairs of a vertex or edge
pub type PropertyMap = serde_json::Map<String, serde_json::Value>;

/// Identifier assigned by the service to a vertex or edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementId::Number(n) => write!(f, "{}", n),
            ElementId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ElementId {
    fn from(n: i64) -> Self {
        ElementId::Number(n)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        ElementId::Text(s.to_string())
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        ElementId::Text(s)
    }
}

impl From<&ElementId> for ElementId {
    fn from(id: &ElementId) -> Self {
        id.clone()
    }
}
