//! Request/response seam between the SDK and the wire.
//!
//! Entities build [`ApiRequest`]s with a path relative to the server root and
//! hand them to a [`Transport`]. [`HttpTransport`] is the production
//! implementation; tests plug in an in-memory one.

use crate::config::SdkConfig;
use crate::error::SdkError;
use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use strata_http::{HttpClient, HttpClientBuilder};

pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";
pub const PROJECT_ID_HEADER: &str = "X-Project-ID";
pub const CHANGESET_ID_HEADER: &str = "X-Changeset-ID";

/// A REST call, independent of the HTTP client executing it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the server root, starting with `/api/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_owned(), value.to_string()));
        self
    }

    /// Append a query parameter when `value` is present.
    #[must_use]
    pub fn query_opt(self, name: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(name, value),
            None => self,
        }
    }

    /// Set a header, replacing an earlier value with the same name.
    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_owned(), value.into()));
        self
    }

    /// Set the `X-Changeset-ID` header when a changeset is given.
    #[must_use]
    pub fn changeset(self, changeset_id: Option<&str>) -> Self {
        match changeset_id {
            Some(id) => self.header(CHANGESET_ID_HEADER, id),
            None => self,
        }
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    /// Returns `SdkError::Json` if `body` cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, SdkError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach an already-built JSON body.
    #[must_use]
    pub fn json_value(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of a header, matched case-insensitively.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Value of a query parameter.
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw server answer. Any status is a valid response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: u16,
    body: Bytes,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// `true` for 2xx statuses.
    #[must_use]
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Parse the body as JSON. An empty body parses as `null`.
    ///
    /// # Errors
    /// Returns `SdkError::Json` if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, SdkError> {
        if self.body.is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Turn a non-2xx response into `SdkError::Api`.
    ///
    /// The server error body `{"code": ..., "message": ...}` is parsed when
    /// present; otherwise the raw body becomes the message.
    ///
    /// # Errors
    /// Returns `SdkError::Api` for any non-2xx status.
    pub fn error_for_status(self) -> Result<Self, SdkError> {
        if self.ok() {
            return Ok(self);
        }
        let parsed: Option<Value> = serde_json::from_slice(&self.body).ok();
        let field = |name: &str| {
            parsed
                .as_ref()
                .and_then(|v| v.get(name))
                .and_then(Value::as_str)
                .map(str::to_owned)
        };
        let code = field("code");
        let message = field("message")
            .unwrap_or_else(|| String::from_utf8_lossy(&self.body).into_owned());
        Err(SdkError::Api {
            status: self.status,
            code,
            message,
        })
    }
}

/// Executes [`ApiRequest`]s.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return the raw response.
    ///
    /// # Errors
    /// Returns an error only when no response was received; non-2xx answers
    /// are returned as `Ok`.
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, SdkError>;
}

/// [`Transport`] over [`strata_http::HttpClient`].
pub struct HttpTransport {
    client: HttpClient,
    base_url: url::Url,
    auth_token: Option<SecretString>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.auth_token.is_some())
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Build the HTTP client described by `config`.
    ///
    /// # Errors
    /// Returns `SdkError::Config` if the config is invalid and `SdkError::Http`
    /// if the client cannot be built.
    pub fn from_config(config: &SdkConfig) -> Result<Self, SdkError> {
        config.validate()?;
        let client = HttpClientBuilder::with_config(config.http_client_config()).build()?;
        let base_url = parse_base_url(&config.base_url)?;
        Ok(Self {
            client,
            base_url,
            auth_token: config.auth_token.clone(),
        })
    }

    /// Wrap an existing client.
    ///
    /// # Errors
    /// Returns `SdkError::Config` if `base_url` is not an absolute URL.
    pub fn with_client(
        client: HttpClient,
        base_url: &str,
        auth_token: Option<SecretString>,
    ) -> Result<Self, SdkError> {
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
            auth_token,
        })
    }

    fn url_for(&self, request: &ApiRequest) -> url::Url {
        let mut url = self.base_url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            request.path.trim_start_matches('/')
        );
        url.set_path(&joined);
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &request.query {
                pairs.append_pair(name, value);
            }
        }
        url
    }
}

fn parse_base_url(base_url: &str) -> Result<url::Url, SdkError> {
    url::Url::parse(base_url)
        .map_err(|e| SdkError::config(format!("invalid base_url '{base_url}': {e}")))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, SdkError> {
        let url = self.url_for(&request);
        tracing::debug!(method = %request.method, path = %request.path, "dispatching request");

        let mut builder = self
            .client
            .request(request.method.clone(), url.as_str())
            .header("accept", "application/json");
        if let Some(token) = &self.auth_token {
            builder = builder.sensitive_header(AUTH_TOKEN_HEADER, token.expose_secret());
        }
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body)?;
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(ApiResponse::new(status, body))
    }
}
