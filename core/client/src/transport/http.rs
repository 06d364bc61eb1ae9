//! `reqwest`-backed transport.

use async_trait::async_trait;
use reqwest::{header::HeaderMap, Client, Method};
use serde_json::Value;
use tracing::{debug, warn};

use cblite_common::{Error, Result};

use super::{Response, Transport};
use crate::config::ClientConfig;

/// HTTP transport using a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    /// Create a transport with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(&ClientConfig::default())
    }

    /// Create a transport from a configuration.
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http })
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        headers: &HeaderMap,
    ) -> Result<Response> {
        debug!(%method, url, "Sending request");

        let mut request = self.http.request(method.clone(), url).headers(headers.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(format!("{} {} failed: {}", method, url, e)))?;

        handle_response(response).await
    }
}

/// Read the body and classify the response by status.
async fn handle_response(response: reqwest::Response) -> Result<Response> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| Error::Network(format!("Failed to read response: {}", e)))?;

    let body = parse_body(text);

    if status.is_success() {
        Ok(Response {
            status: status.as_u16(),
            body,
        })
    } else {
        warn!(status = status.as_u16(), %body, "Server returned an error");
        Err(Error::Remote {
            status: status.as_u16(),
            body,
        })
    }
}

/// Parse a body as JSON, keeping non-JSON text as a string value.
fn parse_body(text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<Response> {
        self.send(Method::GET, url, None, headers).await
    }

    async fn put(&self, url: &str, body: Option<&Value>, headers: &HeaderMap) -> Result<Response> {
        self.send(Method::PUT, url, body, headers).await
    }

    async fn post(&self, url: &str, body: &Value, headers: &HeaderMap) -> Result<Response> {
        self.send(Method::POST, url, Some(body), headers).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_body() {
        let body = parse_body(r#"{"ok":true}"#.to_string());
        assert_eq!(body, json!({"ok": true}));
    }

    #[test]
    fn test_parse_empty_body() {
        assert_eq!(parse_body("  ".to_string()), Value::Null);
    }

    #[test]
    fn test_parse_text_body() {
        let body = parse_body("Bad Gateway".to_string());
        assert_eq!(body, Value::String("Bad Gateway".to_string()));
    }

    #[test]
    fn test_transport_creation() {
        let config = ClientConfig::default().with_user_agent("cblite-test");
        assert!(HttpTransport::with_config(&config).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let transport = HttpTransport::new().unwrap();
        // Port 9 (discard) on localhost is not expected to serve HTTP.
        let result = transport.get("http://127.0.0.1:9/", &HeaderMap::new()).await;
        assert!(matches!(result, Err(Error::Network(_))));
    }
}
