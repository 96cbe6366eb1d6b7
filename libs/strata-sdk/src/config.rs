//! SDK configuration.
//!
//! Values are layered with `figment`: built-in defaults, then an optional
//! YAML file, then `STRATA_*` environment variables.
//!
//! ```yaml
//! base_url: https://bi.example.com/StrataLibrary
//! project_id: B7CA92F04B9FAE8D941C3E9B7E0CD754
//! request_timeout: 45s
//! verbose: true
//! ```

use crate::error::SdkError;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use strata_http::{DEFAULT_MAX_BODY_SIZE, HttpClientConfig, TransportSecurity};

/// Prefix of the environment variables read by [`SdkConfig::load`].
pub const ENV_PREFIX: &str = "STRATA_";

/// Connection settings for a Strata server.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    /// Server root, e.g. `https://bi.example.com/StrataLibrary`.
    pub base_url: String,

    /// Default project sent as `X-Project-ID`.
    pub project_id: Option<String>,

    /// Session token sent as `X-Auth-Token`. Never serialized back out.
    #[serde(skip_serializing)]
    pub auth_token: Option<SecretString>,

    /// Per-request timeout, written as a humantime string (`30s`, `2m`).
    #[serde(with = "duration_str")]
    pub request_timeout: Duration,

    /// Overrides the default user agent.
    pub user_agent: Option<String>,

    /// Maximum decompressed response body size in bytes.
    pub max_body_size: usize,

    /// Permit plain `http://` base URLs.
    pub allow_insecure_http: bool,

    /// Log successful writes at info level.
    pub verbose: bool,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            project_id: None,
            auth_token: None,
            request_timeout: Duration::from_secs(30),
            user_agent: None,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            allow_insecure_http: false,
            verbose: true,
        }
    }
}

impl SdkConfig {
    /// Config pointing at `base_url` with every other value defaulted.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the session token.
    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(SecretString::from(token.into()));
        self
    }

    /// Set the default project.
    #[must_use]
    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Base figment: defaults, optional YAML file, then `STRATA_*` env vars.
    #[must_use]
    pub fn figment(yaml_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = yaml_path {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load and validate the layered configuration.
    ///
    /// # Errors
    /// Returns `SdkError::Config` if a layer cannot be parsed or the result
    /// fails [`validate`](Self::validate).
    pub fn load(yaml_path: Option<&Path>) -> Result<Self, SdkError> {
        let config: Self = Self::figment(yaml_path).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that every connection needs.
    ///
    /// # Errors
    /// Returns `SdkError::Config` for an empty or unparsable base URL, a zero
    /// timeout, or a zero body limit.
    pub fn validate(&self) -> Result<(), SdkError> {
        if self.base_url.trim().is_empty() {
            return Err(SdkError::config("base_url must be set"));
        }
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| SdkError::config(format!("invalid base_url '{}': {e}", self.base_url)))?;
        if url.scheme() == "http" && !self.allow_insecure_http {
            return Err(SdkError::config(
                "base_url uses http:// but allow_insecure_http is false",
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(SdkError::config("request_timeout must be greater than zero"));
        }
        if self.max_body_size == 0 {
            return Err(SdkError::config("max_body_size must be greater than zero"));
        }
        Ok(())
    }

    /// Settings for the underlying HTTP client.
    #[must_use]
    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut config = HttpClientConfig {
            request_timeout: self.request_timeout,
            max_body_size: self.max_body_size,
            ..HttpClientConfig::default()
        };
        if let Some(user_agent) = &self.user_agent {
            config.user_agent.clone_from(user_agent);
        }
        if self.allow_insecure_http {
            config.transport = TransportSecurity::AllowInsecureHttp;
        }
        config
    }
}

/// `Duration` as a humantime string.
mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        humantime::parse_duration(&raw).map_err(de::Error::custom)
    }
}
