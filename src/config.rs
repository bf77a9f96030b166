//! Client configuration
//!
//! A client needs the API URL of a service instance plus the credentials of
//! that instance. The API URL names the graph the client starts on:
//! `https://host/service/<instance>/<graph-id>`.
//!
//! Configuration can be given explicitly, read from a JSON/YAML file, taken
//! from a Cloud Foundry `VCAP_SERVICES` binding, or read from
//! `IBM_GRAPH_API_URL` / `IBM_GRAPH_USERNAME` / `IBM_GRAPH_PASSWORD`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

use crate::error::{GraphError, GraphResult};

/// Name of the service entry inside `VCAP_SERVICES`
pub const VCAP_SERVICE_NAME: &str = "IBM Graph";

pub const ENV_VCAP_SERVICES: &str = "VCAP_SERVICES";
pub const ENV_API_URL: &str = "IBM_GRAPH_API_URL";
pub const ENV_USERNAME: &str = "IBM_GRAPH_USERNAME";
pub const ENV_PASSWORD: &str = "IBM_GRAPH_PASSWORD";

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Connection settings for one service instance
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Instance API URL, ending in the id of the initial graph
    #[serde(alias = "apiURL")]
    pub api_url: String,
    pub username: String,
    pub password: String,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Service base URL and graph id derived from an API URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub base_url: String,
    pub graph_id: String,
}

impl Endpoint {
    /// URL of the graph-scoped API for `graph_id`
    pub fn api_url(&self) -> String {
        format!("{}/{}", self.base_url, self.graph_id)
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            username: username.into(),
            password: password.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Read credentials from a Cloud Foundry `VCAP_SERVICES` document.
    ///
    /// The first entry of the `"IBM Graph"` service array is used.
    pub fn from_vcap_services(vcap: &str) -> GraphResult<Self> {
        let services: Value = serde_json::from_str(vcap).map_err(|e| {
            GraphError::Config(format!("{} is invalid: {}", ENV_VCAP_SERVICES, e))
        })?;

        let creds = services
            .get(VCAP_SERVICE_NAME)
            .ok_or_else(|| {
                GraphError::Config(format!(
                    "no {} service is bound in {}",
                    VCAP_SERVICE_NAME, ENV_VCAP_SERVICES
                ))
            })?
            .get(0)
            .and_then(|entry| entry.get("credentials"))
            .ok_or_else(|| {
                GraphError::Config(format!(
                    "{} entry in {} has no credentials",
                    VCAP_SERVICE_NAME, ENV_VCAP_SERVICES
                ))
            })?;

        let field = |name: &str| -> GraphResult<String> {
            creds
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    GraphError::Config(format!(
                        "{} credentials lack field {}",
                        VCAP_SERVICE_NAME, name
                    ))
                })
        };

        let config = Self::new(field("apiURL")?, field("username")?, field("password")?);
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from the process environment
    pub fn from_env() -> GraphResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// `VCAP_SERVICES` wins over the individual `IBM_GRAPH_*` variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> GraphResult<Self> {
        if let Some(vcap) = lookup(ENV_VCAP_SERVICES) {
            return Self::from_vcap_services(&vcap);
        }

        match (lookup(ENV_API_URL), lookup(ENV_USERNAME), lookup(ENV_PASSWORD)) {
            (Some(url), Some(user), Some(pass)) => {
                let config = Self::new(url, user, pass);
                config.validate()?;
                Ok(config)
            }
            _ => Err(GraphError::Config(format!(
                "{} is not defined and {}, {} and {} are not all set",
                ENV_VCAP_SERVICES, ENV_API_URL, ENV_USERNAME, ENV_PASSWORD
            ))),
        }
    }

    /// Load a configuration file; `.yaml`/`.yml` files are read as YAML, anything else as JSON.
    pub fn from_file(path: impl AsRef<Path>) -> GraphResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let config: Self = if is_yaml {
            serde_yaml::from_str(&text)
                .map_err(|e| GraphError::Config(format!("{}: {}", path.display(), e)))?
        } else {
            serde_json::from_str(&text)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that all settings are present and the API URL names a graph
    pub fn validate(&self) -> GraphResult<()> {
        let missing: Vec<&str> = [
            ("apiURL", &self.api_url),
            ("username", &self.username),
            ("password", &self.password),
        ]
        .iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| *k)
        .collect();
        if !missing.is_empty() {
            return Err(GraphError::Config(format!(
                "client cannot be initialized, missing {}",
                missing.join(", ")
            )));
        }
        if self.timeout_secs == 0 {
            return Err(GraphError::Config("timeout must be at least one second".to_string()));
        }
        self.endpoint().map(|_| ())
    }

    /// Split the API URL at its last path segment into base URL and graph id
    pub fn endpoint(&self) -> GraphResult<Endpoint> {
        let url = reqwest::Url::parse(self.api_url.trim())
            .map_err(|e| GraphError::Config(format!("invalid apiURL {}: {}", self.api_url, e)))?;
        if url.cannot_be_a_base() {
            return Err(GraphError::Config(format!("invalid apiURL {}", self.api_url)));
        }

        let trimmed = self.api_url.trim().trim_end_matches('/');
        let split = trimmed
            .rfind('/')
            .filter(|&i| i > 0 && !trimmed[..i].ends_with('/'))
            .ok_or_else(|| {
                GraphError::Config(format!("apiURL {} does not name a graph", self.api_url))
            })?;

        let (base_url, graph_id) = (&trimmed[..split], &trimmed[split + 1..]);
        if graph_id.is_empty() {
            return Err(GraphError::Config(format!("apiURL {} does not name a graph", self.api_url)));
        }
        Ok(Endpoint {
            base_url: base_url.to_string(),
            graph_id: graph_id.to_string(),
        })
    }
}
