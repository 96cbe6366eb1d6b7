use crate::builder::{ClientService, HttpClientBuilder};
use crate::config::TransportSecurity;
use crate::request::RequestBuilder;

/// HTTP client over a tower middleware stack (timeout, user agent,
/// decompression)
///
/// `HttpClient` is `Clone + Send + Sync`; clones share the connection pool.
///
/// URLs passed to the request methods must be absolute (scheme and host).
/// Query parameters are encoded by the caller, e.g. via `url::Url`.
#[derive(Clone)]
pub struct HttpClient {
    pub(crate) service: ClientService,
    pub(crate) max_body_size: usize,
    pub(crate) transport_security: TransportSecurity,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("max_body_size", &self.max_body_size)
            .field("transport_security", &self.transport_security)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Start a request. `url` must be absolute.
    pub fn request(&self, method: http::Method, url: &str) -> RequestBuilder {
        RequestBuilder::new(
            self.service.clone(),
            self.max_body_size,
            method,
            url.to_owned(),
            self.transport_security,
        )
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::HttpClientConfig;
    use crate::error::HttpError;
    use httpmock::prelude::*;
    use serde_json::{Value, json};
    use std::time::Duration;

    fn client_with(config: HttpClientConfig) -> HttpClient {
        HttpClientBuilder::with_config(config).build().unwrap()
    }

    fn test_client() -> HttpClient {
        client_with(HttpClientConfig::for_testing())
    }

    #[tokio::test]
    async fn test_get_returns_status_and_body() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(Method::GET).path("/api/subscriptions");
            then.status(200).json_body(json!({"subscriptions": []}));
        });

        let url = format!("{}/api/subscriptions", server.base_url());
        let resp = test_client().request(http::Method::GET, &url).send().await.unwrap();

        assert_eq!(resp.status(), http::StatusCode::OK);
        let body: Value = serde_json::from_slice(&resp.bytes().await.unwrap()).unwrap();
        assert_eq!(body["subscriptions"], json!([]));
    }

    #[tokio::test]
    async fn test_patch_sends_json_body() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(Method::PATCH)
                .path("/api/model/attributes/8D67")
                .header("content-type", "application/json")
                .json_body(json!({"information": {"name": "Region"}}));
            then.status(200).json_body(json!({"id": "8D67"}));
        });

        let url = format!("{}/api/model/attributes/8D67", server.base_url());
        let resp = test_client()
            .request(http::Method::PATCH, &url)
            .json(&json!({"information": {"name": "Region"}}))
            .unwrap()
            .send()
            .await
            .unwrap();

        m.assert();
        assert_eq!(resp.status(), http::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_error_status_is_not_an_error() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(Method::GET).path("/api/objects/missing");
            then.status(404).body(r#"{"code":"ERR004","message":"not found"}"#);
        });

        let url = format!("{}/api/objects/missing", server.base_url());
        let resp = test_client().request(http::Method::GET, &url).send().await.unwrap();

        assert_eq!(resp.status(), http::StatusCode::NOT_FOUND);
        let body = resp.bytes().await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("ERR004"));
    }

    #[tokio::test]
    async fn test_body_size_limit() {
        let server = MockServer::start();
        let large_body = "x".repeat(64 * 1024);
        let _m = server.mock(|when, then| {
            when.method(Method::GET).path("/large");
            then.status(200).body(&large_body);
        });

        let client = client_with(HttpClientConfig {
            max_body_size: 1024,
            ..HttpClientConfig::for_testing()
        });
        let url = format!("{}/large", server.base_url());
        let result = client.request(http::Method::GET, &url).send().await.unwrap().bytes().await;

        assert!(matches!(result, Err(HttpError::BodyTooLarge { .. })));
    }

    #[tokio::test]
    async fn test_custom_user_agent() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(Method::GET).path("/ua").header("user-agent", "custom/1.0");
            then.status(200);
        });

        let client = client_with(HttpClientConfig {
            user_agent: "custom/1.0".to_owned(),
            ..HttpClientConfig::for_testing()
        });
        let url = format!("{}/ua", server.base_url());
        client.request(http::Method::GET, &url).send().await.unwrap();
        m.assert();
    }

    #[tokio::test]
    async fn test_gzip_response_is_decompressed() {
        use flate2::Compression;
        use flate2::write::GzEncoder;
        use std::io::Write;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(br#"{"compressed":true}"#).unwrap();
        let gzipped = encoder.finish().unwrap();

        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(Method::GET).path("/gz");
            then.status(200)
                .header("content-encoding", "gzip")
                .header("content-type", "application/json")
                .body(gzipped.clone());
        });

        let url = format!("{}/gz", server.base_url());
        let bytes = test_client()
            .request(http::Method::GET, &url)
            .send()
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["compressed"], true);
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(Method::GET).path("/slow");
            then.status(200).delay(Duration::from_millis(500));
        });

        let client = client_with(HttpClientConfig {
            request_timeout: Duration::from_millis(50),
            ..HttpClientConfig::for_testing()
        });
        let url = format!("{}/slow", server.base_url());
        let result = client.request(http::Method::GET, &url).send().await;
        assert!(matches!(result, Err(HttpError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_client_is_clone_send_sync() {
        fn assert_send_sync<T: Send + Sync>(_: &T) {}
        let client = test_client();
        let cloned = client.clone();
        assert_send_sync(&cloned);
    }
}
