//! Session handshake
//!
//! The service accepts basic auth only on `GET /_session`, which answers
//! `{"gds-token": "<token>"}`. Every other endpoint expects the header
//! `Authorization: gds-token <token>`. The token is fetched on first use and
//! kept for the lifetime of the session.

use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::error::{GraphError, GraphResult};

/// Scheme prefix of the authorization header built from a session token
pub const TOKEN_SCHEME: &str = "gds-token";

pub struct Session {
    username: String,
    password: String,
    authorization: Mutex<Option<String>>,
}

impl Session {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            authorization: Mutex::new(None),
        }
    }

    /// Authorization header value, performing the handshake if no token is held.
    ///
    /// Concurrent callers wait on the session lock, so at most one handshake
    /// is in flight.
    pub async fn authorization(&self, http: &Client, base_url: &str) -> GraphResult<String> {
        let mut guard = self.authorization.lock().await;
        if let Some(header) = guard.as_ref() {
            return Ok(header.clone());
        }

        let token = self.handshake(http, base_url).await.map_err(|e| {
            error!("Cannot establish a session with {}: {}", base_url, e);
            e
        })?;
        let header = format!("{} {}", TOKEN_SCHEME, token);
        *guard = Some(header.clone());
        Ok(header)
    }

    async fn handshake(&self, http: &Client, base_url: &str) -> GraphResult<String> {
        let url = format!("{}/_session", base_url);
        debug!("Requesting session token from {}", url);

        let response = http
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| GraphError::Session(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GraphError::Session(format!("cannot read session response: {}", e)))?;

        if !status.is_success() {
            return Err(GraphError::Session(format!(
                "service responded with HTTP code {} and body {:?}",
                status.as_u16(),
                body
            )));
        }

        let json: Value = serde_json::from_str(&body)
            .map_err(|e| GraphError::Session(format!("session response is not JSON: {}", e)))?;
        match json.get(TOKEN_SCHEME).and_then(Value::as_str) {
            Some(token) if !token.is_empty() => {
                debug!("Session established with {}", base_url);
                Ok(token.to_string())
            }
            _ => Err(GraphError::Session(format!(
                "session response carries no {} field",
                TOKEN_SCHEME
            ))),
        }
    }

    pub async fn has_token(&self) -> bool {
        self.authorization.lock().await.is_some()
    }

    /// Forget the token; the next request performs a fresh handshake.
    pub async fn clear(&self) {
        *self.authorization.lock().await = None;
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // "admin:secret"
    const BASIC: &str = "Basic YWRtaW46c2VjcmV0";

    async fn mount_session(server: &MockServer, template: ResponseTemplate, expected: u64) {
        Mock::given(method("GET"))
            .and(path("/svc/_session"))
            .and(header("authorization", BASIC))
            .respond_with(template)
            .expect(expected)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_handshake_runs_once() {
        let server = MockServer::start().await;
        mount_session(
            &server,
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"gds-token": "tok123"})),
            1,
        )
        .await;

        let session = Session::new("admin", "secret");
        let base = format!("{}/svc", server.uri());
        let http = Client::new();
        assert!(!session.has_token().await);
        assert_eq!(session.authorization(&http, &base).await.unwrap(), "gds-token tok123");
        assert_eq!(session.authorization(&http, &base).await.unwrap(), "gds-token tok123");
        assert!(session.has_token().await);
    }

    #[tokio::test]
    async fn test_clear_forces_new_handshake() {
        let server = MockServer::start().await;
        mount_session(
            &server,
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"gds-token": "t"})),
            2,
        )
        .await;

        let session = Session::new("admin", "secret");
        let base = format!("{}/svc", server.uri());
        let http = Client::new();
        session.authorization(&http, &base).await.unwrap();
        session.clear().await;
        assert!(!session.has_token().await);
        session.authorization(&http, &base).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_credentials() {
        let server = MockServer::start().await;
        mount_session(&server, ResponseTemplate::new(401).set_body_string("Unauthorized"), 1).await;

        let session = Session::new("admin", "secret");
        let err = session
            .authorization(&Client::new(), &format!("{}/svc", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::Session(_)));
        assert!(err.to_string().contains("401"));
        assert!(!session.has_token().await);
    }

    #[tokio::test]
    async fn test_missing_token_field() {
        let server = MockServer::start().await;
        mount_session(
            &server,
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "x"})),
            1,
        )
        .await;

        let session = Session::new("admin", "secret");
        let err = session
            .authorization(&Client::new(), &format!("{}/svc", server.uri()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("gds-token"));
    }

    #[test]
    fn test_debug_hides_password() {
        let text = format!("{:?}", Session::new("admin", "secret"));
        assert!(!text.contains("secret"));
    }
}
