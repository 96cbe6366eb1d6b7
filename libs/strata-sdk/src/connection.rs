use crate::config::SdkConfig;
use crate::error::SdkError;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, PROJECT_ID_HEADER, Transport};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Handle to one Strata server and project.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct Connection {
    transport: Arc<dyn Transport>,
    project_id: Option<String>,
    verbose: bool,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("project_id", &self.project_id)
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Connect over HTTP using `config`.
    ///
    /// # Errors
    /// Returns `SdkError::Config` for invalid settings and `SdkError::Http`
    /// if the HTTP client cannot be created.
    pub fn from_config(config: &SdkConfig) -> Result<Self, SdkError> {
        let transport = HttpTransport::from_config(config)?;
        Ok(Self {
            transport: Arc::new(transport),
            project_id: config.project_id.clone(),
            verbose: config.verbose,
        })
    }

    /// Connection over an arbitrary transport.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            project_id: None,
            verbose: true,
        }
    }

    /// Same transport, different project.
    #[must_use]
    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[must_use]
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    /// Project id, required by project-scoped routes.
    ///
    /// # Errors
    /// Returns `SdkError::InvalidInput` if no project was selected.
    pub fn require_project(&self) -> Result<&str, SdkError> {
        self.project_id
            .as_deref()
            .ok_or_else(|| SdkError::invalid_input("a project must be selected on the connection"))
    }

    /// Whether successful writes are logged at info level.
    #[must_use]
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Send a request, adding the project header. Any status is returned.
    ///
    /// # Errors
    /// Propagates transport failures.
    pub async fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse, SdkError> {
        if let Some(project_id) = &self.project_id
            && request.header_value(PROJECT_ID_HEADER).is_none()
        {
            request = request.header(PROJECT_ID_HEADER, project_id.clone());
        }
        self.transport.execute(request).await
    }

    /// Send a request and fail on non-2xx.
    ///
    /// # Errors
    /// Propagates transport failures; returns `SdkError::Api` for non-2xx.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, SdkError> {
        self.execute(request).await?.error_for_status()
    }

    /// Send a request, fail on non-2xx, and parse the JSON body.
    ///
    /// # Errors
    /// As [`send`](Self::send), plus `SdkError::Json` for unexpected bodies.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, SdkError> {
        self.send(request).await?.json()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use http::Method;
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_project_header_added() {
        let mock = MockTransport::new();
        mock.ok(Method::GET, "/api/subscriptions/S1", &json!({"id": "S1"}));
        let conn = Connection::with_transport(mock.clone()).with_project("P1");

        let body: Value = conn
            .send_json(ApiRequest::get("/api/subscriptions/S1"))
            .await
            .unwrap();

        assert_eq!(body["id"], "S1");
        let sent = mock.requests();
        assert_eq!(sent[0].header_value(PROJECT_ID_HEADER), Some("P1"));
    }

    #[tokio::test]
    async fn test_send_rejects_non_2xx() {
        let mock = MockTransport::new();
        let conn = Connection::with_transport(mock.clone());

        let err = conn
            .send(ApiRequest::delete("/api/subscriptions/nope"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_require_project() {
        let conn = Connection::with_transport(MockTransport::new());
        assert!(matches!(conn.require_project(), Err(SdkError::InvalidInput(_))));
        assert_eq!(conn.with_project("P").require_project().unwrap(), "P");
    }
}
