//! Mock transport for testing.
//!
//! Requests are matched against scripted expectations and recorded for
//! later inspection.

use async_trait::async_trait;
use reqwest::{header::HeaderMap, Method};
use serde_json::Value;
use std::sync::{Arc, Mutex};

use cblite_common::{Error, Result};

use super::{Response, Transport};

/// A request observed by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
    pub headers: HeaderMap,
}

impl RecordedRequest {
    /// Value of a header, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Debug)]
struct Expectation {
    method: Method,
    url: String,
    body: Option<Value>,
    status: u16,
    response: Value,
}

impl Expectation {
    fn matches(&self, method: &Method, url: &str, body: Option<&Value>) -> bool {
        if &self.method != method || self.url != url {
            return false;
        }
        match &self.body {
            Some(expected) => body == Some(expected),
            None => true,
        }
    }
}

#[derive(Debug, Default)]
struct MockTransportInner {
    expectations: Vec<Expectation>,
    requests: Vec<RecordedRequest>,
}

/// Scripted transport.
///
/// Each expectation answers exactly one matching request. Unmatched
/// requests fail with [`Error::Network`].
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start scripting an expected request.
    pub fn expect(&self, method: Method, url: impl Into<String>) -> ExpectationBuilder<'_> {
        ExpectationBuilder {
            mock: self,
            method,
            url: url.into(),
            body: None,
        }
    }

    /// Get all requests that were issued.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    /// Get the last request that was issued.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.inner.lock().unwrap().requests.last().cloned()
    }

    /// Number of expectations not consumed yet.
    pub fn outstanding_expectations(&self) -> usize {
        self.inner.lock().unwrap().expectations.len()
    }

    /// Panic if any scripted expectation was never requested.
    pub fn verify_no_outstanding_expectation(&self) {
        let inner = self.inner.lock().unwrap();
        assert!(
            inner.expectations.is_empty(),
            "outstanding expectations: {:?}",
            inner
                .expectations
                .iter()
                .map(|e| format!("{} {}", e.method, e.url))
                .collect::<Vec<_>>()
        );
    }

    fn handle(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        headers: &HeaderMap,
    ) -> Result<Response> {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.push(RecordedRequest {
            method: method.clone(),
            url: url.to_string(),
            body: body.cloned(),
            headers: headers.clone(),
        });

        let position = inner
            .expectations
            .iter()
            .position(|e| e.matches(&method, url, body))
            .ok_or_else(|| Error::Network(format!("Unexpected request: {} {}", method, url)))?;
        let expectation = inner.expectations.remove(position);

        if (200..300).contains(&expectation.status) {
            Ok(Response {
                status: expectation.status,
                body: expectation.response,
            })
        } else {
            Err(Error::Remote {
                status: expectation.status,
                body: expectation.response,
            })
        }
    }
}

/// Builder returned by [`MockTransport::expect`].
pub struct ExpectationBuilder<'a> {
    mock: &'a MockTransport,
    method: Method,
    url: String,
    body: Option<Value>,
}

impl ExpectationBuilder<'_> {
    /// Only match requests carrying exactly this JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Register the expectation with its scripted answer.
    pub fn respond(self, status: u16, response: Value) {
        self.mock.inner.lock().unwrap().expectations.push(Expectation {
            method: self.method,
            url: self.url,
            body: self.body,
            status,
            response,
        });
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<Response> {
        self.handle(Method::GET, url, None, headers)
    }

    async fn put(&self, url: &str, body: Option<&Value>, headers: &HeaderMap) -> Result<Response> {
        self.handle(Method::PUT, url, body, headers)
    }

    async fn post(&self, url: &str, body: &Value, headers: &HeaderMap) -> Result<Response> {
        self.handle(Method::POST, url, Some(body), headers)
    }
}
