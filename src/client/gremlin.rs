//! Gremlin traversals and GraphSON bulk loading

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, error, info};

use super::IbmGraphClient;
use crate::error::{GraphError, GraphResult};
use crate::response::{GraphStatus, ResultSet};

/// Statement prepended to every traversal so scripts can use `g`
pub const TRAVERSAL_PREFIX: &str = "def g = graph.traversal(); ";

/// Largest GraphSON document accepted for bulk loading (10 MiB)
pub const MAX_GRAPHSON_BYTES: u64 = 10 * 1024 * 1024;

/// Multipart field carrying the GraphSON document
const GRAPHSON_PART: &str = "graphson";

/// Build the `/gremlin` request body
pub(crate) fn gremlin_payload(gremlin: &str, bindings: Option<&Map<String, Value>>) -> Value {
    let mut payload = Map::new();
    payload.insert(
        "gremlin".to_string(),
        Value::String(format!("{}{}", TRAVERSAL_PREFIX, gremlin)),
    );
    if let Some(bindings) = bindings.filter(|b| !b.is_empty()) {
        payload.insert("bindings".to_string(), Value::Object(bindings.clone()));
    }
    Value::Object(payload)
}

impl IbmGraphClient {
    /// Run a Gremlin traversal against the current graph.
    ///
    /// The reply is returned as-is; check [`ResultSet::status_code`] for
    /// service-side failures.
    pub async fn execute_gremlin(
        &self,
        gremlin: &str,
        bindings: Option<&Map<String, Value>>,
    ) -> GraphResult<ResultSet> {
        if gremlin.trim().is_empty() {
            return Err(GraphError::invalid("gremlin parameter is null or empty"));
        }
        debug!("Executing gremlin {:?} bindings: {:?}", gremlin, bindings);

        let url = format!("{}/gremlin", self.api_url());
        let response = self
            .post(&url, Some(gremlin_payload(gremlin, bindings)))
            .await
            .map_err(|e| {
                error!("Error executing gremlin {:?}: {}", gremlin, e);
                e
            })?;
        Ok(response.result_set())
    }

    /// Run a traversal and decode every result item into `T`.
    ///
    /// Unlike [`execute_gremlin`](Self::execute_gremlin) a non-success reply is
    /// an error.
    pub async fn query<T: DeserializeOwned>(
        &self,
        gremlin: &str,
        bindings: Option<&Map<String, Value>>,
    ) -> GraphResult<Vec<T>> {
        let rs = self.execute_gremlin(gremlin, bindings).await?;
        if !rs.http_status().is_success() {
            return Err(GraphError::Service {
                context: format!("Error processing gremlin {}", gremlin),
                http_status: rs.http_status().clone(),
                graph_status: GraphStatus {
                    code: Some(rs.status_code().to_string()),
                    message: Some(rs.status_message().to_string()),
                    attributes: None,
                },
            });
        }
        (0..rs.len()).map(|i| rs.result_as(i)).collect()
    }

    /// Bulk load a GraphSON document into the current graph.
    ///
    /// Returns `true` if the service reports a successful load.
    pub async fn load_graphson(&self, graphson: &str) -> GraphResult<bool> {
        if graphson.trim().is_empty() {
            return Err(GraphError::invalid("graphson parameter is missing or empty"));
        }
        if graphson.len() as u64 > MAX_GRAPHSON_BYTES {
            return Err(GraphError::invalid("graphson parameter value exceeds maximum length (10MB)"));
        }

        let part = Part::text(graphson.to_string());
        self.bulk_load(Form::new().part(GRAPHSON_PART, part)).await
    }

    /// Bulk load the GraphSON file at `path` into the current graph
    pub async fn load_graphson_from_file(&self, path: impl AsRef<Path>) -> GraphResult<bool> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(GraphError::invalid("filename parameter is missing or empty"));
        }

        let metadata = tokio::fs::metadata(path)
            .await
            .ok()
            .filter(|m| m.is_file())
            .ok_or_else(|| {
                GraphError::invalid(format!("File {} was not found or cannot be read", path.display()))
            })?;
        if metadata.len() > MAX_GRAPHSON_BYTES {
            return Err(GraphError::invalid(format!(
                "File {} is larger than 10MB and can therefore not be processed",
                path.display()
            )));
        }

        let contents = tokio::fs::read(path).await.map_err(|e| {
            GraphError::invalid(format!("File {} cannot be read: {}", path.display(), e))
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "graphson.json".to_string());
        let part = Part::bytes(contents).file_name(file_name);
        self.bulk_load(Form::new().part(GRAPHSON_PART, part)).await
    }

    async fn bulk_load(&self, form: Form) -> GraphResult<bool> {
        let url = format!("{}/bulkload/graphson/", self.api_url());
        let rs = self.post_multipart(&url, form).await?.result_set();

        let loaded = rs.status_code() == "200"
            && rs.has_results()
            && rs.result_as_string(0).map(|s| s == "true").unwrap_or(false);
        if loaded {
            info!("Loaded GraphSON into graph {}", self.graph_id);
        } else {
            error!("Error loading GraphSON into graph {}: {}", self.graph_id, rs);
        }
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_prefixes_traversal() {
        let payload = gremlin_payload("g.V().count()", None);
        assert_eq!(payload, json!({"gremlin": "def g = graph.traversal(); g.V().count()"}));
    }

    #[test]
    fn test_payload_omits_empty_bindings() {
        let empty = Map::new();
        assert!(gremlin_payload("g.V()", Some(&empty)).get("bindings").is_none());

        let mut bindings = Map::new();
        bindings.insert("name".to_string(), json!("Alice"));
        let payload = gremlin_payload("g.V().has('name', name)", Some(&bindings));
        assert_eq!(payload["bindings"], json!({"name": "Alice"}));
    }
}
