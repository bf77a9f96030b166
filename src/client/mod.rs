//! IbmGraphClient: network client for an IBM Graph service instance
//!
//! Operations are grouped by resource:
//!
//! - graphs (`_graphs`): [`graphs`]
//! - schema and indexes: [`schema`]
//! - vertices and edges: [`elements`]
//! - Gremlin traversals and GraphSON bulk loading: [`gremlin`]
//!
//! Every request goes through the dispatcher in [`dispatch`], which attaches
//! the session token and captures the raw reply.

pub mod dispatch;
pub mod elements;
pub mod graphs;
pub mod gremlin;
pub mod schema;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{GraphError, GraphResult};
use crate::session::Session;

/// Characters escaped when an id or name is used as one URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Encode `value` as a single URL path segment
pub(crate) fn path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// Trimmed, non-empty parameter or [`GraphError::InvalidArgument`]
pub(crate) fn required<'a>(name: &str, value: &'a str) -> GraphResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GraphError::invalid(format!("Parameter {} is null or empty", name)));
    }
    Ok(trimmed)
}

/// Client bound to one service instance and, at any time, one current graph.
///
/// Graph-scoped operations (schema, vertices, edges, indexes, Gremlin, bulk
/// load) act on the current graph, which starts as the graph named by the
/// configured API URL and can be changed with
/// [`set_graph`](IbmGraphClient::set_graph).
///
/// # Example
/// ```no_run
/// # use ibm_graph_client::{ClientConfig, IbmGraphClient, Vertex};
/// # async fn run() -> ibm_graph_client::GraphResult<()> {
/// let client = IbmGraphClient::new(ClientConfig::new(
///     "https://ibmgraph-alpha.ng.bluemix.net/7a3c1ae0/g",
///     "user",
///     "password",
/// ))?;
/// let alice = client.add_vertex(&Vertex::new("person").with_property("name", "Alice")).await?;
/// println!("created {:?}", alice.id);
/// # Ok(())
/// # }
/// ```
pub struct IbmGraphClient {
    http: Client,
    session: Session,
    base_url: String,
    graph_id: String,
}

impl IbmGraphClient {
    pub fn new(config: ClientConfig) -> GraphResult<Self> {
        config.validate()?;
        let endpoint = config.endpoint()?;

        // No idle connections are kept: every request opens its own connection.
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| GraphError::Config(e.to_string()))?;

        debug!(
            "Client configured for {} (graph {})",
            endpoint.base_url, endpoint.graph_id
        );

        Ok(Self {
            http,
            session: Session::new(config.username, config.password),
            base_url: endpoint.base_url,
            graph_id: endpoint.graph_id,
        })
    }

    /// Create a client from an API URL and credentials
    pub fn connect(api_url: &str, username: &str, password: &str) -> GraphResult<Self> {
        Self::new(ClientConfig::new(api_url, username, password))
    }

    /// Create a client from `VCAP_SERVICES` or the `IBM_GRAPH_*` variables
    pub fn from_env() -> GraphResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Id of the graph this client currently operates on
    pub fn graph_id(&self) -> &str {
        &self.graph_id
    }

    /// Service instance URL (API URL without the graph id)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Graph-scoped API URL of the current graph
    pub fn api_url(&self) -> String {
        format!("{}/{}", self.base_url, path_segment(&self.graph_id))
    }

    /// Whether a session token is currently held
    pub async fn has_session(&self) -> bool {
        self.session.has_token().await
    }

    /// Drop the session token; the next request authenticates again.
    pub async fn reset_session(&self) {
        self.session.clear().await;
    }
}

impl std::fmt::Debug for IbmGraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IbmGraphClient")
            .field("base_url", &self.base_url)
            .field("graph_id", &self.graph_id)
            .field("session", &self.session)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_segment_escapes_separators() {
        assert_eq!(path_segment("4232"), "4232");
        assert_eq!(path_segment("odxqw-3bs-2dx-6e0"), "odxqw-3bs-2dx-6e0");
        assert_eq!(path_segment("a/b c?"), "a%2Fb%20c%3F");
    }

    #[test]
    fn test_required() {
        assert_eq!(required("graphId", "  g1 ").unwrap(), "g1");
        assert!(matches!(required("graphId", "  "), Err(GraphError::InvalidArgument(_))));
    }

    #[test]
    fn test_new_splits_api_url() {
        let client = IbmGraphClient::connect("https://host/instance/g", "u", "p").unwrap();
        assert_eq!(client.base_url(), "https://host/instance");
        assert_eq!(client.graph_id(), "g");
        assert_eq!(client.api_url(), "https://host/instance/g");
    }

    #[test]
    fn test_new_rejects_incomplete_config() {
        assert!(matches!(
            IbmGraphClient::connect("https://host/instance/g", "", "p"),
            Err(GraphError::Config(_))
        ));
        assert!(IbmGraphClient::connect("https://host", "u", "p").is_err());
    }
}
