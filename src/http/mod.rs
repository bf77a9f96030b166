//! HTTP status information and raw service replies

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};
use crate::response::{GraphStatus, ResultSet};

/// Status line of an HTTP reply: code and reason phrase
///
/// For replies received by the client the reason is the canonical phrase for
/// the code, not the text the server sent: reqwest does not expose the
/// server's own reason phrase. Codes without a canonical phrase get an empty
/// reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpStatusInfo {
    code: u16,
    reason: String,
}

impl HttpStatusInfo {
    /// Create a status; codes below 100 are not valid HTTP status codes.
    pub fn new(code: u16, reason: impl Into<String>) -> GraphResult<Self> {
        if code < 100 {
            return Err(GraphError::invalid(format!(
                "{} is not a valid HTTP status code",
                code
            )));
        }
        Ok(Self {
            code,
            reason: reason.into(),
        })
    }

    pub(crate) fn from_status(status: reqwest::StatusCode) -> Self {
        Self {
            code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn is_informational(&self) -> bool {
        self.code < 200
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.code)
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.code)
    }

    pub fn is_server_error(&self) -> bool {
        self.code >= 500
    }
}

impl fmt::Display for HttpStatusInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reason.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} {}", self.code, self.reason)
        }
    }
}

/// A reply exactly as received from the service: status line plus body text.
#[derive(Debug, Clone)]
pub struct GraphResponse {
    http_status: HttpStatusInfo,
    body: String,
}

impl GraphResponse {
    pub fn new(http_status: HttpStatusInfo, body: impl Into<String>) -> Self {
        Self {
            http_status,
            body: body.into(),
        }
    }

    pub fn http_status(&self) -> &HttpStatusInfo {
        &self.http_status
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Service-level status carried in the body, if any
    pub fn graph_status(&self) -> GraphStatus {
        GraphStatus::from_body(&self.body)
    }

    /// Normalize the body into a [`ResultSet`]
    pub fn result_set(&self) -> ResultSet {
        ResultSet::from_response(self)
    }

    /// Build a [`GraphError::Service`] describing this reply
    pub(crate) fn service_error(&self, context: impl Into<String>) -> GraphError {
        GraphError::Service {
            context: context.into(),
            http_status: self.http_status.clone(),
            graph_status: self.graph_status(),
        }
    }

    /// Build a [`GraphError::UnexpectedResponse`] describing this reply
    pub(crate) fn unexpected(&self, context: impl Into<String>) -> GraphError {
        GraphError::UnexpectedResponse {
            context: context.into(),
            status: self.http_status.code,
            body: self.body.clone(),
        }
    }
}
