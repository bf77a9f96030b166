//! Graph schema
//!
//! A schema declares the property keys, vertex labels, edge labels and indexes
//! of a graph. Schemas are additive on the service: saving a schema adds new
//! elements and silently ignores elements that already exist, even if their
//! definition changed.

pub mod index;
pub mod label;
pub mod property_key;

pub use index::Index;
pub use label::{EdgeLabel, Multiplicity, VertexLabel};
pub use property_key::{Cardinality, DataType, PropertyKey};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{GraphError, GraphResult};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(default)]
    pub property_keys: Vec<PropertyKey>,
    #[serde(default)]
    pub vertex_labels: Vec<VertexLabel>,
    #[serde(default)]
    pub edge_labels: Vec<EdgeLabel>,
    #[serde(default)]
    pub vertex_indexes: Vec<Index>,
    #[serde(default)]
    pub edge_indexes: Vec<Index>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property_key(mut self, key: PropertyKey) -> Self {
        self.property_keys.push(key);
        self
    }

    pub fn with_vertex_label(mut self, label: VertexLabel) -> Self {
        self.vertex_labels.push(label);
        self
    }

    pub fn with_edge_label(mut self, label: EdgeLabel) -> Self {
        self.edge_labels.push(label);
        self
    }

    pub fn with_vertex_index(mut self, index: Index) -> Self {
        self.vertex_indexes.push(index);
        self
    }

    pub fn with_edge_index(mut self, index: Index) -> Self {
        self.edge_indexes.push(index);
        self
    }

    pub fn property_key(&self, name: &str) -> Option<&PropertyKey> {
        self.property_keys.iter().find(|k| k.name == name)
    }

    pub fn vertex_label(&self, name: &str) -> Option<&VertexLabel> {
        self.vertex_labels.iter().find(|l| l.name == name)
    }

    pub fn edge_label(&self, name: &str) -> Option<&EdgeLabel> {
        self.edge_labels.iter().find(|l| l.name == name)
    }

    pub fn vertex_index(&self, name: &str) -> Option<&Index> {
        self.vertex_indexes.iter().find(|i| i.name == name)
    }

    pub fn edge_index(&self, name: &str) -> Option<&Index> {
        self.edge_indexes.iter().find(|i| i.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.property_keys.is_empty()
            && self.vertex_labels.is_empty()
            && self.edge_labels.is_empty()
            && self.vertex_indexes.is_empty()
            && self.edge_indexes.is_empty()
    }

    /// Checks that hold for any schema sent to the service: names are unique
    /// within each category and every index definition is well formed.
    ///
    /// Elements may refer to keys and labels that already exist on the
    /// service, so references are not resolved here.
    pub fn check(&self) -> GraphResult<()> {
        unique_names("property key", self.property_keys.iter().map(|k| k.name.as_str()))?;
        unique_names("vertex label", self.vertex_labels.iter().map(|l| l.name.as_str()))?;
        unique_names("edge label", self.edge_labels.iter().map(|l| l.name.as_str()))?;
        unique_names("vertex index", self.vertex_indexes.iter().map(|i| i.name.as_str()))?;
        unique_names("edge index", self.edge_indexes.iter().map(|i| i.name.as_str()))?;

        for index in self.vertex_indexes.iter().chain(&self.edge_indexes) {
            index.check()?;
        }
        Ok(())
    }

    /// Check that the schema is complete on its own.
    ///
    /// On top of [`check`](Self::check), every index must reference declared
    /// property keys and label restrictions must name a declared label of the
    /// right kind. Use this for a full schema, not for additions to one.
    pub fn validate(&self) -> GraphResult<()> {
        self.check()?;
        for index in &self.vertex_indexes {
            self.check_index(index, |label| self.vertex_label(label).is_some())?;
        }
        for index in &self.edge_indexes {
            self.check_index(index, |label| self.edge_label(label).is_some())?;
        }
        Ok(())
    }

    fn check_index(&self, index: &Index, label_declared: impl Fn(&str) -> bool) -> GraphResult<()> {
        if let Some(key) = index.property_keys.iter().find(|k| self.property_key(k).is_none()) {
            return Err(GraphError::invalid(format!(
                "index {} references undeclared property key {}",
                index.name, key
            )));
        }
        if let Some(label) = &index.index_only {
            if !label_declared(label) {
                return Err(GraphError::invalid(format!(
                    "index {} is restricted to undeclared label {}",
                    index.name, label
                )));
            }
        }
        Ok(())
    }
}

fn unique_names<'a>(kind: &str, names: impl Iterator<Item = &'a str>) -> GraphResult<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(GraphError::invalid(format!("duplicate {} {}", kind, name)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Schema {
        Schema::new()
            .with_property_key(PropertyKey::single("name", DataType::String).unwrap())
            .with_property_key(PropertyKey::single("since", DataType::Integer).unwrap())
            .with_vertex_label(VertexLabel::new("person").unwrap())
            .with_edge_label(EdgeLabel::new("knows", Multiplicity::Multi).unwrap())
            .with_vertex_index(Index::composite("vByName", ["name"]).unwrap())
            .with_edge_index(Index::mixed("eBySince", ["since"]).unwrap().only_for("knows"))
    }

    #[test]
    fn test_valid_schema() {
        assert!(sample().validate().is_ok());
        assert!(Schema::new().validate().is_ok());
    }

    #[test]
    fn test_json_round_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["propertyKeys"][0]["dataType"], json!("String"));
        assert_eq!(value["edgeLabels"][0]["multiplicity"], json!("MULTI"));
        assert_eq!(value["vertexIndexes"][0]["propertyKeys"], json!(["name"]));
        assert_eq!(value["edgeIndexes"][0]["indexOnly"], json!("knows"));
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let s: Schema = serde_json::from_value(json!({
            "propertyKeys": [{"name": "name", "dataType": "String", "cardinality": "SINGLE"}]
        }))
        .unwrap();
        assert_eq!(s.property_keys.len(), 1);
        assert!(s.vertex_labels.is_empty());
        assert!(s.edge_indexes.is_empty());
        assert!(!s.is_empty());
    }

    #[test]
    fn test_lookups() {
        let s = sample();
        assert_eq!(s.property_key("since").unwrap().data_type, DataType::Integer);
        assert!(s.vertex_label("person").is_some());
        assert!(s.edge_label("person").is_none());
        assert!(s.vertex_index("vByName").is_some());
        assert!(s.edge_index("eBySince").is_some());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let s = sample().with_vertex_label(VertexLabel::new("person").unwrap());
        assert!(matches!(s.validate(), Err(GraphError::InvalidArgument(_))));
    }

    #[test]
    fn test_index_on_undeclared_key_rejected() {
        let s = sample().with_vertex_index(Index::composite("vByAge", ["age"]).unwrap());
        let err = s.validate().unwrap_err().to_string();
        assert!(err.contains("undeclared property key age"));
    }

    #[test]
    fn test_index_restricted_to_wrong_label_kind() {
        let s = sample().with_vertex_index(Index::composite("vKnows", ["name"]).unwrap().only_for("knows"));
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_check_accepts_additions_to_existing_schema() {
        // keys and labels already live on the service
        let s = Schema::new().with_vertex_index(Index::composite("vByName", ["name"]).unwrap().only_for("person"));
        assert!(s.check().is_ok());
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_check_rejects_malformed_index() {
        let mut index = Index::composite("vByName", ["name"]).unwrap();
        index.unique = true;
        index.composite = false;
        assert!(Schema::new().with_vertex_index(index).check().is_err());

        let dup = Schema::new()
            .with_edge_index(Index::mixed("eBySince", ["since"]).unwrap())
            .with_edge_index(Index::mixed("eBySince", ["since"]).unwrap());
        assert!(matches!(dup.check(), Err(GraphError::InvalidArgument(_))));
    }
}
