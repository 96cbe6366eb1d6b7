//! In-memory [`Transport`] for tests.
//!
//! Responses are scripted per `method + path` (query string ignored). Each
//! route serves its responses in order and keeps repeating the last one.
//! Every request is recorded for later assertions.

use crate::error::SdkError;
use crate::transport::{ApiRequest, ApiResponse, Transport};
use async_trait::async_trait;
use http::Method;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

type RouteKey = (Method, String);

#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<RouteKey, VecDeque<ApiResponse>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Script a JSON response for `method path`.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: &Value) -> &Self {
        let bytes = if body.is_null() {
            Vec::new()
        } else {
            body.to_string().into_bytes()
        };
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((method, path.to_owned()))
            .or_default()
            .push_back(ApiResponse::new(status, bytes));
        self
    }

    /// Script a `200` JSON response.
    pub fn ok(&self, method: Method, path: &str, body: &Value) -> &Self {
        self.respond(method, path, 200, body)
    }

    /// All recorded requests, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recorded requests for one route.
    #[must_use]
    pub fn requests_to(&self, method: &Method, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| &r.method == method && r.path == path)
            .collect()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, SdkError> {
        let key = (request.method.clone(), request.path.clone());
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        let response = match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or_else(|| {
            let body = json!({
                "code": "MOCK404",
                "message": format!("no scripted response for {} {}", key.0, key.1),
            });
            ApiResponse::new(404, body.to_string().into_bytes())
        }))
    }
}
