//! IBM Graph client: typed access to an IBM Graph service instance
//!
//! The service exposes graphs, schemas, vertices, edges, indexes and Gremlin
//! traversals over HTTP/JSON. This crate wraps that API:
//!
//! - **Session**: one basic-auth handshake against `/_session` yields a
//!   token that authenticates every later request.
//! - **Response normalization**: every reply, whatever its JSON shape, is
//!   folded into a [`ResultSet`] with a status code, a status message and
//!   indexed results; missing elements are reported as `None`, not as errors.
//! - **Domain operations**: [`IbmGraphClient`] methods for graphs, schema,
//!   indexes, vertices, edges, Gremlin and GraphSON bulk loading.
//!
//! All graph storage and traversal execution happens on the service.
//!
//! # Quick Start
//!
//! ```no_run
//! use ibm_graph_client::{Edge, IbmGraphClient, Vertex};
//!
//! #[tokio::main]
//! async fn main() -> ibm_graph_client::GraphResult<()> {
//!     // Reads VCAP_SERVICES or IBM_GRAPH_API_URL / _USERNAME / _PASSWORD
//!     let client = IbmGraphClient::from_env()?;
//!
//!     let alice = client.add_vertex(&Vertex::new("person").with_property("name", "Alice")).await?;
//!     let bob = client.add_vertex(&Vertex::new("person").with_property("name", "Bob")).await?;
//!     if let (Some(a), Some(b)) = (alice.id, bob.id) {
//!         client.add_edge(&Edge::new("knows", a, b)).await?;
//!     }
//!
//!     let rs = client.execute_gremlin("g.V().hasLabel('person').count()", None).await?;
//!     println!("{} people", rs.result_as_string(0)?);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod response;
pub mod schema;
pub mod session;

pub use client::IbmGraphClient;
pub use config::{ClientConfig, Endpoint};
pub use error::{GraphError, GraphResult};
pub use http::{GraphResponse, HttpStatusInfo};
pub use model::{Edge, ElementId, PropertyMap, Vertex};
pub use response::{GraphStatus, ResultSet};
pub use schema::{
    Cardinality, DataType, EdgeLabel, Index, Multiplicity, PropertyKey, Schema, VertexLabel,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(version(), "0.1.0");
    }
}
