//! Error types for the IBM Graph client

use thiserror::Error;

use crate::http::HttpStatusInfo;
use crate::response::GraphStatus;

/// Errors that can occur when talking to an IBM Graph service instance
#[derive(Error, Debug)]
pub enum GraphError {
    /// A parameter was missing, empty or out of range. No request was issued.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The client could not be configured
    #[error("Configuration error: {0}")]
    Config(String),

    /// The basic-auth session handshake failed
    #[error("Session error: {0}")]
    Session(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The service processed the request and reported an error
    #[error("{context}: service responded with {http_status} ({graph_status})")]
    Service {
        context: String,
        http_status: HttpStatusInfo,
        graph_status: GraphStatus,
    },

    /// The service reply could not be interpreted
    #[error("{context}: response with HTTP code {status} and body {body:?} cannot be processed")]
    UnexpectedResponse {
        context: String,
        status: u16,
        body: String,
    },

    /// An item could not be extracted from a result set
    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),

    /// The requested graph is not defined in the service instance
    #[error("No graph with name {0} is defined")]
    GraphNotFound(String),
}

impl GraphError {
    /// Shorthand for [`GraphError::InvalidArgument`]
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        GraphError::InvalidArgument(msg.into())
    }

    /// HTTP status code of the failed call, if the error came from a reply
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GraphError::Service { http_status, .. } => Some(http_status.code()),
            GraphError::UnexpectedResponse { status, .. } => Some(*status),
            GraphError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type GraphResult<T> = Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_display() {
        let err = GraphError::Service {
            context: "Error getting list of graphs".to_string(),
            http_status: HttpStatusInfo::new(403, "Forbidden").unwrap(),
            graph_status: GraphStatus {
                code: Some("ForbiddenError".to_string()),
                message: Some("not allowed".to_string()),
                ..Default::default()
            },
        };
        let text = err.to_string();
        assert!(text.starts_with("Error getting list of graphs"));
        assert!(text.contains("403 Forbidden"));
        assert!(text.contains("ForbiddenError"));
        assert_eq!(err.status_code(), Some(403));
    }

    #[test]
    fn test_status_code_absent_for_local_errors() {
        assert_eq!(GraphError::invalid("id parameter is missing").status_code(), None);
        assert_eq!(GraphError::GraphNotFound("g".into()).status_code(), None);
    }
}
