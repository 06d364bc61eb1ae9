//! Transport abstraction for talking to the database server.
//!
//! The transport owns the HTTP machinery. Everything above it builds URLs,
//! bodies and headers, and interprets the returned JSON.
//!
//! # Contract
//! - Headers are applied exactly as given (notably `Authorization`).
//! - A 2xx answer resolves with the parsed body.
//! - Any other status rejects with [`Error::Remote`] carrying the status and
//!   the body untouched.
//!
//! [`Error::Remote`]: cblite_common::Error::Remote

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::{ExpectationBuilder, MockTransport, RecordedRequest};

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;

use cblite_common::Result;

/// A settled 2xx response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body (`Null` when the body was empty).
    pub body: Value,
}

/// Promise-style HTTP transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET request.
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<Response>;

    /// Issue a PUT request. `None` sends no body.
    async fn put(&self, url: &str, body: Option<&Value>, headers: &HeaderMap) -> Result<Response>;

    /// Issue a POST request with a JSON body.
    async fn post(&self, url: &str, body: &Value, headers: &HeaderMap) -> Result<Response>;
}
