//! HTTP transport abstraction.
//!
//! A single-operation trait between the client and the network so the
//! dispatcher and token store can be exercised against a recording mock in
//! tests.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::Error;

/// A fully described outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub bearer: Option<String>,
    pub basic_auth: Option<(String, String)>,
    pub body: Option<RequestBody>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            bearer: None,
            basic_auth: None,
            body: None,
            timeout: None,
        }
    }
}

/// Request payloads the provider understands.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

/// Status and raw body of a completed exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// Returns true if status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true if status is 401.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_str(&self.body).map_err(|e| Error::Protocol(e.to_string()))
    }
}

/// Trait for issuing HTTP requests.
///
/// Only network-level failures are `Err`; any HTTP status, success or not,
/// comes back as a response for the caller to interpret.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, Error>;
}

/// Production HTTP client using reqwest.
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        let mut builder = self.inner.request(request.method, &request.url);

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some((username, password)) = &request.basic_auth {
            builder = builder.basic_auth(username, Some(password));
        }
        match &request.body {
            Some(RequestBody::Json(value)) => builder = builder.json(value),
            Some(RequestBody::Form(fields)) => builder = builder.form(fields),
            None => {}
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, RwLock};

    /// Mock HTTP client replaying scripted responses.
    ///
    /// Responses are keyed by method and URL. Configuring the same pair more
    /// than once queues the responses in order; the last one configured keeps
    /// replaying once the queue drains to it.
    #[derive(Debug, Clone, Default)]
    pub struct MockHttpClient {
        responses: Arc<RwLock<HashMap<(String, String), VecDeque<MockResponse>>>>,
        requests: Arc<RwLock<Vec<HttpRequest>>>,
    }

    #[derive(Debug, Clone)]
    struct MockResponse {
        status: u16,
        body: String,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues a response for a method/URL pair.
        pub fn on(self, method: Method, url: &str, status: u16, body: impl Into<String>) -> Self {
            self.responses
                .write()
                .unwrap()
                .entry((method.to_string(), url.to_string()))
                .or_default()
                .push_back(MockResponse {
                    status,
                    body: body.into(),
                });
            self
        }

        /// Queues a 200 response with the payload wrapped in the data envelope.
        pub fn on_data<T: serde::Serialize>(self, method: Method, url: &str, data: &T) -> Self {
            let body = serde_json::json!({ "data": data }).to_string();
            self.on(method, url, 200, body)
        }

        /// All requests sent through this client, in order.
        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.read().unwrap().clone()
        }

        /// Number of requests made.
        pub fn request_count(&self) -> usize {
            self.requests.read().unwrap().len()
        }

        /// Requests whose URL matches exactly.
        pub fn requests_to(&self, url: &str) -> Vec<HttpRequest> {
            self.requests
                .read()
                .unwrap()
                .iter()
                .filter(|r| r.url == url)
                .cloned()
                .collect()
        }
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
            self.requests.write().unwrap().push(request.clone());

            let key = (request.method.to_string(), request.url.clone());
            let mut responses = self.responses.write().unwrap();
            let queue = responses.get_mut(&key).ok_or_else(|| {
                Error::Protocol(format!(
                    "no mock response configured for {} {}",
                    request.method, request.url
                ))
            })?;

            let response = if queue.len() > 1 {
                queue.pop_front().ok_or_else(|| {
                    Error::Protocol(format!("mock response queue drained for {}", request.url))
                })?
            } else {
                queue
                    .front()
                    .cloned()
                    .ok_or_else(|| {
                        Error::Protocol(format!("mock response queue drained for {}", request.url))
                    })?
            };

            Ok(HttpResponse {
                status: response.status,
                body: response.body,
            })
        }
    }
}
