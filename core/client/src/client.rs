//! Client entry point.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

use cblite_common::{DatabaseName, Error, Result};

use crate::database::Database;
use crate::server::{ServerHandle, ServerLocator};
use crate::transport::Transport;

/// Server welcome and version metadata (`GET /`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub couchdb: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub vendor: Option<Value>,
    /// Any other fields reported by the server.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

struct Shared {
    transport: Arc<dyn Transport>,
    locator: Arc<dyn ServerLocator>,
    server: OnceCell<Arc<ServerHandle>>,
}

/// Client for a document-database REST server.
///
/// The server location is resolved by [`Client::initialize`]. Until then
/// every operation fails with [`Error::NotReady`]. Cloning is cheap and
/// clones share the resolved server.
#[derive(Clone)]
pub struct Client {
    shared: Arc<Shared>,
}

impl Client {
    /// Create a client that is not ready yet.
    pub fn new(
        transport: impl Transport + 'static,
        locator: impl ServerLocator + 'static,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                transport: Arc::new(transport),
                locator: Arc::new(locator),
                server: OnceCell::new(),
            }),
        }
    }

    /// Create a client and wait for the server location.
    pub async fn connect(
        transport: impl Transport + 'static,
        locator: impl ServerLocator + 'static,
    ) -> Result<Self> {
        let client = Self::new(transport, locator);
        client.initialize().await?;
        Ok(client)
    }

    /// Resolve the server location.
    ///
    /// Once resolved, later calls are no-ops: credentials never change for
    /// the lifetime of the client. A failed resolution can be retried.
    pub async fn initialize(&self) -> Result<()> {
        let locator = self.shared.locator.clone();
        self.shared
            .server
            .get_or_try_init(|| async move {
                let location = locator.locate().await?;
                let handle = ServerHandle::from_url(&location)?;
                info!(base_url = %handle.base_url(), "Server location resolved");
                Ok::<_, Error>(Arc::new(handle))
            })
            .await?;
        Ok(())
    }

    /// Whether the server location has been resolved.
    pub fn is_ready(&self) -> bool {
        self.shared.server.initialized()
    }

    pub(crate) fn server(&self) -> Result<Arc<ServerHandle>> {
        self.shared.server.get().cloned().ok_or(Error::NotReady)
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.shared.transport.as_ref()
    }

    /// Query server metadata.
    pub async fn info(&self) -> Result<ServerInfo> {
        let server = self.server()?;
        let response = self
            .transport()
            .get(&server.paths().server_root(), server.headers())
            .await?;
        Ok(serde_json::from_value(response.body)?)
    }

    /// Get a handle to a named database.
    ///
    /// No request is made; the handle holds only the name.
    ///
    /// # Errors
    /// - Name is empty
    pub fn database(&self, name: impl Into<String>) -> Result<Database> {
        Ok(Database::new(self.clone(), DatabaseName::new(name)?))
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("server", &self.shared.server.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::StaticLocator;
    use crate::transport::MockTransport;
    use async_trait::async_trait;
    use reqwest::Method;
    use serde_json::json;

    struct FailingLocator;

    #[async_trait]
    impl ServerLocator for FailingLocator {
        async fn locate(&self) -> Result<String> {
            Err(Error::Network("locator unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_not_ready_before_initialize() {
        let client = Client::new(MockTransport::new(), StaticLocator::new("http://u:p@host/"));
        assert!(!client.is_ready());
        assert!(matches!(client.info().await, Err(Error::NotReady)));
    }

    #[tokio::test]
    async fn test_initialize_resolves_once() {
        let client = Client::new(MockTransport::new(), StaticLocator::new("http://u:p@host/"));
        client.initialize().await.unwrap();
        client.initialize().await.unwrap();
        assert!(client.is_ready());
        assert_eq!(client.server().unwrap().base_url(), "http://host");
    }

    #[tokio::test]
    async fn test_failed_locator_leaves_client_not_ready() {
        let client = Client::new(MockTransport::new(), FailingLocator);
        assert!(client.initialize().await.is_err());
        assert!(!client.is_ready());
    }

    #[tokio::test]
    async fn test_info() {
        let mock = MockTransport::new();
        mock.expect(Method::GET, "http://host").respond(
            200,
            json!({"couchdb": "Welcome", "CouchbaseLite": "Welcome", "version": "1.485"}),
        );

        let client = Client::connect(mock.clone(), StaticLocator::new("http://u:p@host/"))
            .await
            .unwrap();
        let info = client.info().await.unwrap();

        assert_eq!(info.couchdb.as_deref(), Some("Welcome"));
        assert_eq!(info.version.as_deref(), Some("1.485"));
        assert_eq!(info.extra["CouchbaseLite"], "Welcome");
        mock.verify_no_outstanding_expectation();
    }

    #[test]
    fn test_database_rejects_empty_name() {
        let client = Client::new(MockTransport::new(), StaticLocator::new("http://u:p@host/"));
        assert!(matches!(client.database(""), Err(Error::InvalidInput(_))));
    }
}
