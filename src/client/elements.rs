//! Vertex and edge operations on the current graph
//!
//! Vertices live under `/vertices`, edges under `/edges`. Both share the same
//! contract: reads distinguish "not found" (`Ok(None)`) from failures, writes
//! return the element as stored by the service, deletes return the service's
//! verdict.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, error};

use super::{path_segment, IbmGraphClient};
use crate::error::{GraphError, GraphResult};
use crate::model::{Edge, ElementId, PropertyMap, Vertex};

const VERTICES: &str = "vertices";
const EDGES: &str = "edges";

fn id_segment(id: &ElementId) -> GraphResult<String> {
    match id {
        ElementId::Text(s) if s.trim().is_empty() => Err(GraphError::invalid("id parameter is missing")),
        ElementId::Text(s) => Ok(path_segment(s.trim())),
        ElementId::Number(n) => Ok(n.to_string()),
    }
}

impl IbmGraphClient {
    fn element_url(&self, collection: &str, id: Option<&ElementId>) -> GraphResult<String> {
        let base = format!("{}/{}", self.api_url(), collection);
        match id {
            Some(id) => Ok(format!("{}/{}", base, id_segment(id)?)),
            None => Ok(base),
        }
    }

    async fn get_element<T: DeserializeOwned>(&self, collection: &str, id: &ElementId) -> GraphResult<Option<T>> {
        let url = self.element_url(collection, Some(id))?;
        let response = self.get(&url).await?;
        let rs = response.result_set();

        if rs.is_not_found() {
            debug!("GET {} found nothing", url);
            return Ok(None);
        }
        if response.http_status().is_success() && rs.has_results() {
            return rs.result_as(0).map(Some);
        }

        error!("GET {} result set info: {}", url, rs);
        Err(response.service_error(format!("Error fetching {} with id {}", collection, id)))
    }

    async fn write_element<T: DeserializeOwned>(
        &self,
        url: &str,
        payload: Value,
        update: bool,
        context: &str,
    ) -> GraphResult<T> {
        let response = if update {
            self.put(url, payload).await?
        } else {
            self.post(url, Some(payload)).await?
        };

        let rs = response.result_set();
        if response.http_status().is_success() && rs.has_results() {
            return rs.result_as(0);
        }

        error!("{} {} result set info: {}", if update { "PUT" } else { "POST" }, url, rs);
        Err(response.service_error(context))
    }

    async fn delete_element(&self, collection: &str, id: &ElementId) -> GraphResult<bool> {
        let url = self.element_url(collection, Some(id))?;
        let rs = self.delete(&url).await?.result_set();
        if rs.has_results() {
            return rs.result_as_bool(0);
        }
        debug!("DELETE {} returned no result: {}", url, rs);
        Ok(false)
    }

    fn update_payload(properties: &PropertyMap) -> Value {
        json!({ "properties": properties })
    }

    // -- vertices --------------------------------------------------------

    /// Vertex `id` of the current graph, or `None` if it does not exist
    pub async fn get_vertex(&self, id: impl Into<ElementId>) -> GraphResult<Option<Vertex>> {
        self.get_element(VERTICES, &id.into()).await
    }

    /// Add `vertex` to the current graph and return it as stored
    pub async fn add_vertex(&self, vertex: &Vertex) -> GraphResult<Vertex> {
        let url = self.element_url(VERTICES, None)?;
        self.write_element(&url, vertex.create_payload(), false, "Error adding vertex")
            .await
    }

    /// Replace the properties of an existing vertex; label and id are immutable.
    pub async fn update_vertex(&self, vertex: &Vertex) -> GraphResult<Vertex> {
        let id = vertex
            .id
            .as_ref()
            .ok_or_else(|| GraphError::invalid("vertex parameter does not contain the id property"))?;
        let url = self.element_url(VERTICES, Some(id))?;
        self.write_element(&url, Self::update_payload(&vertex.properties), true, "Error updating vertex")
            .await
    }

    /// Remove vertex `id`; `true` if the service removed it
    pub async fn delete_vertex(&self, id: impl Into<ElementId>) -> GraphResult<bool> {
        self.delete_element(VERTICES, &id.into()).await
    }

    // -- edges -----------------------------------------------------------

    /// Edge `id` of the current graph, or `None` if it does not exist
    pub async fn get_edge(&self, id: impl Into<ElementId>) -> GraphResult<Option<Edge>> {
        self.get_element(EDGES, &id.into()).await
    }

    /// Add `edge` to the current graph and return it as stored
    pub async fn add_edge(&self, edge: &Edge) -> GraphResult<Edge> {
        if edge.label.trim().is_empty() {
            return Err(GraphError::invalid("edge parameter does not contain a label"));
        }
        let url = self.element_url(EDGES, None)?;
        self.write_element(&url, edge.create_payload(), false, "Error adding edge")
            .await
    }

    /// Replace the properties of an existing edge; label and incident vertices are immutable.
    pub async fn update_edge(&self, edge: &Edge) -> GraphResult<Edge> {
        let id = edge
            .id
            .as_ref()
            .ok_or_else(|| GraphError::invalid("edge parameter does not contain the id property"))?;
        let url = self.element_url(EDGES, Some(id))?;
        self.write_element(&url, Self::update_payload(&edge.properties), true, "Error updating edge")
            .await
    }

    /// Remove edge `id`; `true` if the service removed it
    pub async fn delete_edge(&self, id: impl Into<ElementId>) -> GraphResult<bool> {
        self.delete_element(EDGES, &id.into()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_segment() {
        assert_eq!(id_segment(&ElementId::Number(4232)).unwrap(), "4232");
        assert_eq!(id_segment(&ElementId::from(" e-1 ")).unwrap(), "e-1");
        assert!(id_segment(&ElementId::from("  ")).is_err());
    }
}
