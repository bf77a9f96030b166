//! Response normalization
//!
//! The service answers with several JSON shapes depending on the endpoint:
//!
//! - the CRUD/Gremlin envelope:
//!   `{"requestId": "..", "status": {"code": 200, "message": ".."}, "result": {"data": [..], "meta": {..}}}`
//! - service errors: `{"code": "NotFoundError", "message": ".."}`
//! - plain data wrappers: `{"data": {..}}`
//! - bare objects: `{"graphs": [..]}`, `{"graphId": ".."}`, `{"gds-token": ".."}`
//!
//! [`ResultSet`] folds all of them into a status code, a status message and an
//! indexed list of result items.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{GraphError, GraphResult};
use crate::http::{GraphResponse, HttpStatusInfo};
use crate::model::{Edge, Vertex};

/// Status code the service uses for missing elements
pub const NOT_FOUND_ERROR: &str = "NotFoundError";

/// Service-level status reported inside a reply body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStatus {
    pub code: Option<String>,
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,
}

impl GraphStatus {
    /// Extract the status from a reply body. Bodies without one yield the default.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(obj)) => Self::from_object(&obj).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    fn from_object(obj: &Map<String, Value>) -> Option<Self> {
        if let Some(Value::Object(status)) = obj.get("status") {
            return Some(Self {
                code: status.get("code").and_then(render_code),
                message: status.get("message").and_then(render_message),
                attributes: status.get("attributes").cloned(),
            });
        }
        match obj.get("code") {
            Some(Value::String(code)) if !obj.contains_key("result") => Some(Self {
                code: Some(code.clone()),
                message: obj.get("message").and_then(render_message),
                attributes: None,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for GraphStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code, &self.message) {
            (Some(code), Some(msg)) if !msg.is_empty() => write!(f, "code: {}, message: {}", code, msg),
            (Some(code), _) => write!(f, "code: {}", code),
            (None, Some(msg)) => write!(f, "message: {}", msg),
            (None, None) => write!(f, "no service status"),
        }
    }
}

fn render_code(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn render_message(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Flatten a `data` member into result items
fn data_items(data: Option<&Value>) -> Vec<Value> {
    match data {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => vec![other.clone()],
    }
}

/// Normalized view of a service reply
#[derive(Debug, Clone)]
pub struct ResultSet {
    status_code: String,
    status_message: String,
    results: Vec<Value>,
    meta: Option<Value>,
    http_status: HttpStatusInfo,
}

impl ResultSet {
    pub fn from_response(response: &GraphResponse) -> Self {
        let http_status = response.http_status().clone();
        let mut rs = Self {
            status_code: http_status.code().to_string(),
            status_message: http_status.reason().to_string(),
            results: Vec::new(),
            meta: None,
            http_status,
        };

        let parsed: Value = match serde_json::from_str(response.body()) {
            Ok(v) => v,
            Err(_) => return rs,
        };

        match parsed {
            Value::Object(obj) => rs.absorb_object(obj),
            Value::Array(items) => rs.results = items,
            Value::Null => {}
            scalar => rs.results = vec![scalar],
        }
        rs
    }

    fn absorb_object(&mut self, obj: Map<String, Value>) {
        let has_envelope = obj.contains_key("result") || matches!(obj.get("status"), Some(Value::Object(_)));
        if has_envelope {
            if let Some(status) = GraphStatus::from_object(&obj) {
                self.apply_status(status);
            }
            if let Some(Value::Object(result)) = obj.get("result") {
                self.results = data_items(result.get("data"));
                self.meta = result.get("meta").cloned();
            } else {
                self.results = data_items(obj.get("result"));
            }
            return;
        }

        if matches!(obj.get("code"), Some(Value::String(_))) {
            if let Some(status) = GraphStatus::from_object(&obj) {
                self.apply_status(status);
            }
            return;
        }

        if obj.contains_key("data") {
            self.results = data_items(obj.get("data"));
            return;
        }

        self.results = vec![Value::Object(obj)];
    }

    fn apply_status(&mut self, status: GraphStatus) {
        if let Some(code) = status.code {
            self.status_code = code;
        }
        if let Some(message) = status.message {
            self.status_message = message;
        }
    }

    /// Service status code: the envelope's `status.code`, the error `code`
    /// (e.g. `NotFoundError`), or the HTTP status code.
    pub fn status_code(&self) -> &str {
        &self.status_code
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn http_status(&self) -> &HttpStatusInfo {
        &self.http_status
    }

    /// `result.meta` of the envelope, if present
    pub fn meta(&self) -> Option<&Value> {
        self.meta.as_ref()
    }

    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Whether the reply reports a missing element
    pub fn is_not_found(&self) -> bool {
        self.status_code.eq_ignore_ascii_case(NOT_FOUND_ERROR) || self.http_status.code() == 404
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.results.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.results.iter()
    }

    pub fn into_results(self) -> Vec<Value> {
        self.results
    }

    fn item(&self, index: usize) -> GraphResult<&Value> {
        self.results.get(index).ok_or_else(|| {
            GraphError::UnexpectedResult(format!(
                "result index {} out of range ({} results)",
                index,
                self.results.len()
            ))
        })
    }

    /// Deserialize result `index` into `T`
    pub fn result_as<T: DeserializeOwned>(&self, index: usize) -> GraphResult<T> {
        let item = self.item(index)?;
        serde_json::from_value(item.clone()).map_err(|e| {
            GraphError::UnexpectedResult(format!("result {} cannot be decoded: {}", index, e))
        })
    }

    pub fn result_as_object(&self, index: usize) -> GraphResult<&Map<String, Value>> {
        match self.item(index)? {
            Value::Object(obj) => Ok(obj),
            other => Err(GraphError::UnexpectedResult(format!(
                "result {} is not an object: {}",
                index, other
            ))),
        }
    }

    /// Result `index` as text; non-string values are rendered as JSON.
    pub fn result_as_string(&self, index: usize) -> GraphResult<String> {
        Ok(match self.item(index)? {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Result `index` as a boolean; accepts JSON booleans and "true"/"false".
    pub fn result_as_bool(&self, index: usize) -> GraphResult<bool> {
        match self.item(index)? {
            Value::Bool(b) => Ok(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            other => Err(GraphError::UnexpectedResult(format!(
                "result {} is not a boolean: {}",
                index, other
            ))),
        }
    }

    pub fn result_as_vertex(&self, index: usize) -> GraphResult<Vertex> {
        self.result_as(index)
    }

    pub fn result_as_edge(&self, index: usize) -> GraphResult<Edge> {
        self.result_as(index)
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status code: {}, status message: {}, results: {}",
            self.status_code,
            self.status_message,
            self.results.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rs(code: u16, reason: &str, body: &str) -> ResultSet {
        GraphResponse::new(HttpStatusInfo::new(code, reason).unwrap(), body).result_set()
    }

    #[test]
    fn test_envelope_with_data_array() {
        let body = json!({
            "requestId": "9f4c",
            "status": {"message": "", "code": 200, "attributes": {}},
            "result": {"data": [1, 2, 3], "meta": {"count": 3}}
        });
        let r = rs(200, "OK", &body.to_string());
        assert_eq!(r.status_code(), "200");
        assert_eq!(r.len(), 3);
        assert_eq!(r.get(2), Some(&json!(3)));
        assert_eq!(r.meta(), Some(&json!({"count": 3})));
        assert!(!r.is_not_found());
    }

    #[test]
    fn test_envelope_with_single_data_value() {
        let body = json!({"status": {"code": 200}, "result": {"data": true}});
        let r = rs(200, "OK", &body.to_string());
        assert_eq!(r.len(), 1);
        assert!(r.result_as_bool(0).unwrap());
    }

    #[test]
    fn test_envelope_with_null_data_has_no_results() {
        let body = json!({"status": {"code": 200, "message": ""}, "result": {"data": null}});
        let r = rs(200, "OK", &body.to_string());
        assert!(!r.has_results());
        assert_eq!(r.status_message(), "");
    }

    #[test]
    fn test_error_shape_not_found() {
        let body = json!({"code": "NotFoundError", "message": "Vertex 99 not found", "requestId": "x"});
        let r = rs(404, "Not Found", &body.to_string());
        assert!(!r.has_results());
        assert_eq!(r.status_code(), "NotFoundError");
        assert_eq!(r.status_message(), "Vertex 99 not found");
        assert!(r.is_not_found());
    }

    #[test]
    fn test_not_found_code_is_case_insensitive() {
        let r = rs(200, "OK", r#"{"code":"notfounderror","message":"gone"}"#);
        assert!(r.is_not_found());
    }

    #[test]
    fn test_other_error_is_not_not_found() {
        let r = rs(400, "Bad Request", r#"{"code":"BadRequestError","message":"bad label"}"#);
        assert!(!r.is_not_found());
        assert_eq!(r.status_code(), "BadRequestError");
    }

    #[test]
    fn test_data_wrapper() {
        let r = rs(200, "OK", r#"{"data":{}}"#);
        assert_eq!(r.len(), 1);
        assert!(r.result_as_object(0).unwrap().is_empty());
        assert_eq!(r.status_code(), "200");
    }

    #[test]
    fn test_bare_object_becomes_single_result() {
        let r = rs(200, "OK", r#"{"graphs":["g","zzz"]}"#);
        assert_eq!(r.len(), 1);
        let obj = r.result_as_object(0).unwrap();
        assert_eq!(obj["graphs"], json!(["g", "zzz"]));
    }

    #[test]
    fn test_array_body() {
        let r = rs(200, "OK", r#"[{"a":1},{"a":2}]"#);
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn test_non_json_body() {
        let r = rs(502, "Bad Gateway", "<html>upstream down</html>");
        assert!(!r.has_results());
        assert_eq!(r.status_code(), "502");
        assert_eq!(r.status_message(), "Bad Gateway");
    }

    #[test]
    fn test_empty_body() {
        let r = rs(204, "No Content", "");
        assert!(r.is_empty());
        assert_eq!(r.status_code(), "204");
    }

    #[test]
    fn test_string_status_code_in_envelope() {
        let body = json!({"status": {"code": "200", "message": "ok"}, "result": {"data": ["x"]}});
        let r = rs(200, "OK", &body.to_string());
        assert_eq!(r.status_code(), "200");
        assert_eq!(r.result_as_string(0).unwrap(), "x");
    }

    #[test]
    fn test_typed_accessors() {
        let body = json!({"result": {"data": [true, "false", 7, {"k": "v"}]}});
        let r = rs(200, "OK", &body.to_string());
        assert!(r.result_as_bool(0).unwrap());
        assert!(!r.result_as_bool(1).unwrap());
        assert!(r.result_as_bool(2).is_err());
        assert_eq!(r.result_as_string(0).unwrap(), "true");
        assert_eq!(r.result_as::<i64>(2).unwrap(), 7);
        assert!(r.result_as_object(3).is_ok());
        assert!(matches!(r.result_as_object(9), Err(GraphError::UnexpectedResult(_))));
    }

    #[test]
    fn test_vertex_extraction() {
        let body = json!({
            "status": {"code": 200},
            "result": {"data": [{
                "id": 4232,
                "label": "person",
                "type": "vertex",
                "properties": {"name": [{"id": "1l9-39k-sl", "value": "Alice"}]}
            }]}
        });
        let r = rs(200, "OK", &body.to_string());
        let v = r.result_as_vertex(0).unwrap();
        assert_eq!(v.label.as_deref(), Some("person"));
        assert_eq!(v.properties["name"], json!("Alice"));
    }

    #[test]
    fn test_graph_status_from_bodies() {
        let s = GraphStatus::from_body(r#"{"status":{"code":500,"message":"oops"}}"#);
        assert_eq!(s.code.as_deref(), Some("500"));
        assert_eq!(s.message.as_deref(), Some("oops"));
        assert_eq!(s.to_string(), "code: 500, message: oops");

        let s = GraphStatus::from_body(r#"{"code":"ForbiddenError","message":"no"}"#);
        assert_eq!(s.code.as_deref(), Some("ForbiddenError"));

        let s = GraphStatus::from_body("not json");
        assert_eq!(s, GraphStatus::default());
        assert_eq!(s.to_string(), "no service status");
    }
}
