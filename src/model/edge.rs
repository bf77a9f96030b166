//! Edge representation

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ElementId, PropertyMap};

/// A directed edge of the remote graph, from `out_v` to `in_v`
///
/// Incident vertices and label are immutable once the edge exists; only the
/// properties can be updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Service-assigned id; `None` until the edge has been added
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ElementId>,

    /// Edge label (e.g. "knows")
    pub label: String,

    /// Source vertex
    #[serde(rename = "outV")]
    pub out_v: ElementId,

    /// Target vertex
    #[serde(rename = "inV")]
    pub in_v: ElementId,

    #[serde(rename = "outVLabel", default, skip_serializing_if = "Option::is_none")]
    pub out_v_label: Option<String>,

    #[serde(rename = "inVLabel", default, skip_serializing_if = "Option::is_none")]
    pub in_v_label: Option<String>,

    /// Edge properties
    #[serde(default)]
    pub properties: PropertyMap,
}

impl Edge {
    /// Create an unsaved edge `out_v -[label]-> in_v`
    pub fn new(label: impl Into<String>, out_v: impl Into<ElementId>, in_v: impl Into<ElementId>) -> Self {
        Self {
            id: None,
            label: label.into(),
            out_v: out_v.into(),
            in_v: in_v.into(),
            out_v_label: None,
            in_v_label: None,
            properties: PropertyMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Payload for `POST /edges`
    pub(crate) fn create_payload(&self) -> Value {
        serde_json::json!({
            "outV": self.out_v,
            "inV": self.in_v,
            "label": self.label,
            "properties": self.properties,
        })
    }
}
