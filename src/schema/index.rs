//! Vertex and edge index definitions

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

/// An index over one or more property keys
///
/// Composite indexes serve exact-match lookups and may enforce uniqueness;
/// mixed (non-composite) indexes serve range and full-text lookups and can
/// never be unique. `index_only` restricts the index to one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    pub name: String,
    pub property_keys: Vec<String>,
    #[serde(default)]
    pub composite: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_only: Option<String>,
}

impl Index {
    pub fn new(
        name: impl Into<String>,
        property_keys: Vec<String>,
        composite: bool,
        unique: bool,
    ) -> GraphResult<Self> {
        let index = Self {
            name: name.into(),
            property_keys,
            composite,
            unique,
            index_only: None,
        };
        index.check()?;
        Ok(index)
    }

    /// Non-unique composite index
    pub fn composite<I, S>(name: impl Into<String>, property_keys: I) -> GraphResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, property_keys.into_iter().map(Into::into).collect(), true, false)
    }

    /// Unique composite index
    pub fn unique<I, S>(name: impl Into<String>, property_keys: I) -> GraphResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, property_keys.into_iter().map(Into::into).collect(), true, true)
    }

    /// Mixed index
    pub fn mixed<I, S>(name: impl Into<String>, property_keys: I) -> GraphResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, property_keys.into_iter().map(Into::into).collect(), false, false)
    }

    /// Restrict the index to elements carrying `label`
    pub fn only_for(mut self, label: impl Into<String>) -> Self {
        self.index_only = Some(label.into());
        self
    }

    pub(crate) fn check(&self) -> GraphResult<()> {
        if self.name.trim().is_empty() {
            return Err(GraphError::invalid("index name is null or empty"));
        }
        if self.property_keys.is_empty() {
            return Err(GraphError::invalid(format!(
                "index {} must reference at least one property key",
                self.name
            )));
        }
        if self.property_keys.iter().any(|k| k.trim().is_empty()) {
            return Err(GraphError::invalid(format!(
                "index {} references an empty property key name",
                self.name
            )));
        }
        if self.unique && !self.composite {
            return Err(GraphError::invalid(format!(
                "index {} is unique but not composite",
                self.name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constructors() {
        let i = Index::composite("vByName", ["name"]).unwrap();
        assert!(i.composite && !i.unique);
        let i = Index::unique("vByEmail", ["email"]).unwrap();
        assert!(i.composite && i.unique);
        let i = Index::mixed("vByAge", ["age"]).unwrap();
        assert!(!i.composite && !i.unique);
    }

    #[test]
    fn test_invalid_definitions() {
        assert!(Index::composite("", ["name"]).is_err());
        assert!(Index::composite("x", Vec::<String>::new()).is_err());
        assert!(Index::composite("x", [""]).is_err());
        assert!(Index::new("x", vec!["name".into()], false, true).is_err());
    }

    #[test]
    fn test_json_shape() {
        let i = Index::composite("eBySince", ["since"]).unwrap().only_for("knows");
        assert_eq!(
            serde_json::to_value(&i).unwrap(),
            json!({
                "name": "eBySince",
                "propertyKeys": ["since"],
                "composite": true,
                "unique": false,
                "indexOnly": "knows"
            })
        );
    }
}
