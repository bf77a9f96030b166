//! Request dispatcher
//!
//! Attaches `Authorization: gds-token <token>` and `Accept: application/json`
//! to every call, sends it, and captures status line and body as a
//! [`GraphResponse`]. Interpretation is left to the caller.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use super::IbmGraphClient;
use crate::error::GraphResult;
use crate::http::{GraphResponse, HttpStatusInfo};

const APPLICATION_JSON: &str = "application/json";

/// Body of an outgoing request
pub(crate) enum Payload {
    Empty,
    Json(Value),
    Multipart(Form),
}

impl IbmGraphClient {
    pub(crate) async fn get(&self, url: &str) -> GraphResult<GraphResponse> {
        self.dispatch(Method::GET, url, Payload::Empty).await
    }

    pub(crate) async fn post(&self, url: &str, payload: Option<Value>) -> GraphResult<GraphResponse> {
        let payload = payload.map(Payload::Json).unwrap_or(Payload::Empty);
        self.dispatch(Method::POST, url, payload).await
    }

    pub(crate) async fn post_multipart(&self, url: &str, form: Form) -> GraphResult<GraphResponse> {
        self.dispatch(Method::POST, url, Payload::Multipart(form)).await
    }

    pub(crate) async fn put(&self, url: &str, payload: Value) -> GraphResult<GraphResponse> {
        self.dispatch(Method::PUT, url, Payload::Json(payload)).await
    }

    pub(crate) async fn delete(&self, url: &str) -> GraphResult<GraphResponse> {
        self.dispatch(Method::DELETE, url, Payload::Empty).await
    }

    async fn dispatch(&self, method: Method, url: &str, payload: Payload) -> GraphResult<GraphResponse> {
        let authorization = self.session.authorization(&self.http, &self.base_url).await?;

        let mut request = self
            .http
            .request(method.clone(), url)
            .header(AUTHORIZATION, authorization)
            .header(ACCEPT, APPLICATION_JSON);

        request = match payload {
            Payload::Empty if method == Method::POST || method == Method::PUT => {
                debug!("Making HTTP {} request to {}; payload=", method, url);
                request.header(CONTENT_TYPE, APPLICATION_JSON).body("")
            }
            Payload::Empty => {
                debug!("Making HTTP {} request to {}", method, url);
                request
            }
            Payload::Json(value) => {
                debug!("Making HTTP {} request to {}; payload={}", method, url, value);
                request.json(&value)
            }
            Payload::Multipart(form) => {
                debug!("Making HTTP {} multipart request to {}", method, url);
                request.multipart(form)
            }
        };

        let response = request.send().await?;
        let status = HttpStatusInfo::from_status(response.status());
        let body = response.text().await?;
        debug!("Response received from {} = {} {}", url, status, body);

        Ok(GraphResponse::new(status, body))
    }
}
