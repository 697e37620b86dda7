//! Client configuration: endpoint, credentials, and request timeout.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CtrlError, Result};

/// Endpoint used when the caller does not name one.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000";

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Connection settings for one `TransactionContext`.
///
/// The default credentials are the lab placeholder `root`/`root`; deployments
/// override them through `from_env` or by deserializing their own settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClientConfig {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    /// Whole-exchange timeout in milliseconds. `None` waits indefinitely.
    pub timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            username: "root".to_string(),
            password: "root".to_string(),
            timeout_ms: Some(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl ClientConfig {
    /// Defaults with `endpoint` substituted when given.
    pub fn with_endpoint(endpoint: Option<&str>) -> Self {
        let mut config = Self::default();
        if let Some(endpoint) = endpoint {
            config.endpoint = endpoint.to_string();
        }
        config
    }

    /// Defaults overlaid with `KEA_CTRL_ENDPOINT`, `KEA_CTRL_USERNAME`,
    /// `KEA_CTRL_PASSWORD` and `KEA_CTRL_TIMEOUT_MS` (0 disables the timeout).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(endpoint) = lookup("KEA_CTRL_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Some(username) = lookup("KEA_CTRL_USERNAME") {
            config.username = username;
        }
        if let Some(password) = lookup("KEA_CTRL_PASSWORD") {
            config.password = password;
        }
        if let Some(raw) = lookup("KEA_CTRL_TIMEOUT_MS") {
            let ms: u64 = raw
                .trim()
                .parse()
                .map_err(|_| CtrlError::Init(format!("invalid KEA_CTRL_TIMEOUT_MS: {raw}")))?;
            config.timeout_ms = (ms > 0).then_some(ms);
        }
        Ok(config)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(credentials))
    }

    /// The endpoint as a validated `http`/`https` URL.
    pub fn endpoint_url(&self) -> Result<Url> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| CtrlError::Init(format!("invalid endpoint '{}': {e}", self.endpoint)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(CtrlError::Init(format!(
                "unsupported endpoint scheme '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_target_the_local_agent() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, "http://127.0.0.1:8000");
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn authorization_is_basic_base64() {
        let config = ClientConfig::default();
        assert_eq!(config.authorization(), "Basic cm9vdDpyb290");
    }

    #[test]
    fn env_overrides_apply() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("KEA_CTRL_ENDPOINT", "http://10.0.0.1:8080"),
            ("KEA_CTRL_USERNAME", "admin"),
            ("KEA_CTRL_PASSWORD", "secret"),
            ("KEA_CTRL_TIMEOUT_MS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint, "http://10.0.0.1:8080");
        assert_eq!(config.username, "admin");
        assert_eq!(config.password, "secret");
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn bad_timeout_is_an_init_error() {
        let err = ClientConfig::from_lookup(lookup(&[("KEA_CTRL_TIMEOUT_MS", "soon")])).unwrap_err();
        assert!(matches!(err, CtrlError::Init(_)));
    }

    #[test]
    fn endpoint_must_be_http() {
        assert!(ClientConfig::with_endpoint(Some("ftp://host")).endpoint_url().is_err());
        assert!(ClientConfig::with_endpoint(Some("not a url")).endpoint_url().is_err());
        assert!(ClientConfig::with_endpoint(None).endpoint_url().is_ok());
    }

    #[test]
    fn deserializes_partial_documents() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"endpoint":"http://agent:8000","timeout-ms":null}"#).unwrap();
        assert_eq!(config.endpoint, "http://agent:8000");
        assert_eq!(config.username, "root");
        assert_eq!(config.timeout_ms, None);
    }
}
