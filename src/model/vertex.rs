//! Vertex representation

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{ElementId, PropertyMap};

/// A vertex of the remote graph
///
/// Vertices read back from the service carry their properties in the
/// multi-valued form `{"name": [{"id": "..", "value": "Alice"}]}`; they are
/// flattened to `{"name": "Alice"}` on deserialization. A key holding several
/// values is flattened to an array of the values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Vertex {
    /// Service-assigned id; `None` until the vertex has been added
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ElementId>,

    /// Vertex label (e.g. "person")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Vertex properties
    #[serde(default, deserialize_with = "flatten_vertex_properties")]
    pub properties: PropertyMap,
}

impl Vertex {
    /// Create an unsaved vertex with the given label
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: None,
            label: Some(label.into()),
            properties: PropertyMap::new(),
        }
    }

    /// Create an unsaved vertex without a label; the service assigns its default label
    pub fn unlabeled() -> Self {
        Self::default()
    }

    /// Add or replace a property
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

    /// Payload for `POST /vertices`
    pub(crate) fn create_payload(&self) -> Value {
        let mut payload = serde_json::Map::new();
        if let Some(label) = &self.label {
            payload.insert("label".to_string(), Value::String(label.clone()));
        }
        payload.insert("properties".to_string(), Value::Object(self.properties.clone()));
        Value::Object(payload)
    }
}

fn flatten_vertex_properties<'de, D>(deserializer: D) -> Result<PropertyMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<PropertyMap>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .map(|(key, value)| (key, flatten_property_value(value)))
        .collect())
}

fn flatten_property_value(value: Value) -> Value {
    let items = match value {
        Value::Array(items) => items,
        other => return other,
    };
    let is_vertex_property = !items.is_empty()
        && items
            .iter()
            .all(|item| item.as_object().is_some_and(|obj| obj.contains_key("value")));
    if !is_vertex_property {
        return Value::Array(items);
    }

    let mut values: Vec<Value> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(mut obj) => obj.remove("value"),
            _ => None,
        })
        .collect();
    if values.len() == 1 {
        values.remove(0)
    } else {
        Value::Array(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let v = Vertex::new("person").with_property("name", "Alice").with_property("age", 30);
        assert_eq!(v.label.as_deref(), Some("person"));
        assert_eq!(v.property("age"), Some(&json!(30)));
        assert!(v.id.is_none());
    }

    #[test]
    fn test_create_payload() {
        let v = Vertex::new("person").with_property("name", "Alice");
        assert_eq!(
            v.create_payload(),
            json!({"label": "person", "properties": {"name": "Alice"}})
        );
        assert_eq!(Vertex::unlabeled().create_payload(), json!({"properties": {}}));
    }

    #[test]
    fn test_flattens_service_properties() {
        let v: Vertex = serde_json::from_value(json!({
            "id": 4232,
            "label": "person",
            "type": "vertex",
            "properties": {
                "name": [{"id": "1l9-39k-sl", "value": "Alice"}],
                "nick": [{"id": "a", "value": "Al"}, {"id": "b", "value": "Ali"}]
            }
        }))
        .unwrap();
        assert_eq!(v.id, Some(ElementId::Number(4232)));
        assert_eq!(v.properties["name"], json!("Alice"));
        assert_eq!(v.properties["nick"], json!(["Al", "Ali"]));
    }

    #[test]
    fn test_keeps_flat_properties() {
        let v: Vertex = serde_json::from_value(json!({
            "label": "person",
            "properties": {"name": "Bob", "tags": ["a", "b"]}
        }))
        .unwrap();
        assert_eq!(v.properties["name"], json!("Bob"));
        assert_eq!(v.properties["tags"], json!(["a", "b"]));
    }

    #[test]
    fn test_missing_or_null_properties() {
        let v: Vertex = serde_json::from_value(json!({"id": 1, "label": "x"})).unwrap();
        assert!(v.properties.is_empty());
        let v: Vertex = serde_json::from_value(json!({"id": 1, "properties": null})).unwrap();
        assert!(v.properties.is_empty());
    }
}
