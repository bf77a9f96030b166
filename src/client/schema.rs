//! Schema and index operations on the current graph

use tracing::{debug, info};

use super::{path_segment, required, IbmGraphClient};
use crate::error::GraphResult;
use crate::schema::Schema;

impl IbmGraphClient {
    /// Schema of the current graph
    pub async fn get_schema(&self) -> GraphResult<Schema> {
        let url = format!("{}/schema", self.api_url());
        let response = self.get(&url).await?;
        if !response.http_status().is_success() {
            return Err(response.service_error("The schema could not be fetched"));
        }

        let rs = response.result_set();
        if !rs.has_results() {
            return Err(response.unexpected("The schema could not be fetched"));
        }
        rs.result_as(0)
    }

    /// Add the elements of `schema` to the current graph and return the
    /// resulting schema.
    ///
    /// The service applies schemas additively: `schema` may hold only new
    /// elements that refer to keys and labels already defined on the service.
    /// Elements that already exist are ignored, even if their definition
    /// differs.
    pub async fn save_schema(&self, schema: &Schema) -> GraphResult<Schema> {
        schema.check()?;
        let url = format!("{}/schema", self.api_url());
        let payload = serde_json::to_value(schema)?;

        let response = self.post(&url, Some(payload)).await?;
        let status = response.http_status();
        if status.is_client_error() {
            return Err(response.service_error("The schema could not be saved"));
        }
        if !status.is_success() {
            return Err(response.unexpected("The schema could not be saved"));
        }

        let rs = response.result_set();
        if !rs.has_results() {
            return Err(response.unexpected("The schema could not be saved"));
        }
        info!("Saved schema of graph {}", self.graph_id);
        rs.result_as(0)
    }

    /// Delete the index `index_name` of the current graph.
    ///
    /// Returns the service's verdict on whether the index was removed.
    pub async fn delete_index(&self, index_name: &str) -> GraphResult<bool> {
        let index_name = required("indexName", index_name)?;
        let url = format!("{}/index/{}", self.api_url(), path_segment(index_name));

        let response = self.delete(&url).await?;
        if !response.http_status().is_success() {
            return Err(response.unexpected("The index could not be deleted"));
        }

        let rs = response.result_set();
        if !rs.has_results() {
            return Err(response.unexpected("The index deletion returned no result"));
        }
        let removed = rs.result_as_bool(0)?;
        debug!("Index {} removed: {}", index_name, removed);
        Ok(removed)
    }
}
