//! Graph management: list, create, delete and switch graphs

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, info};

use super::{path_segment, required, IbmGraphClient};
use crate::error::{GraphError, GraphResult};

/// Valid ids for user-named graphs
static GRAPH_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]*$").expect("graph id pattern compiles"));

/// Whether `graph_id` is acceptable as the name of a new graph
pub fn is_valid_graph_id(graph_id: &str) -> bool {
    GRAPH_ID.is_match(graph_id)
}

impl IbmGraphClient {
    fn graphs_url(&self) -> String {
        format!("{}/_graphs", self.base_url)
    }

    /// Ids of all graphs defined in the service instance
    pub async fn list_graphs(&self) -> GraphResult<Vec<String>> {
        let response = self.get(&self.graphs_url()).await?;
        if !response.http_status().is_success() {
            return Err(response.service_error("Error getting list of graphs"));
        }

        let rs = response.result_set();
        let graphs = rs
            .result_as_object(0)
            .ok()
            .and_then(|obj| obj.get("graphs"))
            .and_then(Value::as_array)
            .ok_or_else(|| response.unexpected("Error getting list of graphs"))?;

        Ok(graphs
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect())
    }

    /// Switch to the graph `graph_id`; it must already exist.
    pub async fn set_graph(&mut self, graph_id: &str) -> GraphResult<()> {
        let graph_id = required("graphId", graph_id)?;
        if !self.list_graphs().await?.iter().any(|g| g == graph_id) {
            return Err(GraphError::GraphNotFound(graph_id.to_string()));
        }
        debug!("Switching from graph {} to {}", self.graph_id, graph_id);
        self.graph_id = graph_id.to_string();
        Ok(())
    }

    /// Create a graph and return its id.
    ///
    /// Without `graph_id` the service assigns a unique id. A supplied id must
    /// match `^[a-z0-9][a-z0-9_-]*$`.
    pub async fn create_graph(&self, graph_id: Option<&str>) -> GraphResult<String> {
        let mut url = self.graphs_url();
        if let Some(id) = graph_id.map(str::trim).filter(|id| !id.is_empty()) {
            if !is_valid_graph_id(id) {
                return Err(GraphError::invalid(format!(
                    "graph id {} must match ^[a-z0-9][a-z0-9_-]*$",
                    id
                )));
            }
            url = format!("{}/{}", url, path_segment(id));
        }

        let response = self.post(&url, None).await?;
        if !response.http_status().is_success() {
            return Err(response.service_error("The graph could not be created"));
        }

        let created = response
            .result_set()
            .result_as_object(0)
            .ok()
            .and_then(|obj| obj.get("graphId"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| response.unexpected("No graph id was returned"))?;

        info!("Created graph {}", created);
        Ok(created)
    }

    /// Delete the graph `graph_id`.
    ///
    /// Returns `false` if the service does not know the graph.
    pub async fn delete_graph(&self, graph_id: &str) -> GraphResult<bool> {
        let graph_id = required("graphId", graph_id)?;
        let url = format!("{}/{}", self.graphs_url(), path_segment(graph_id));

        let response = self.delete(&url).await?;
        if response.http_status().is_success() {
            info!("Deleted graph {}", graph_id);
            return Ok(true);
        }
        if response.http_status().code() == 404 {
            debug!("Graph {} not found, nothing deleted", graph_id);
            return Ok(false);
        }
        Err(response.unexpected("The graph could not be deleted"))
    }
}
