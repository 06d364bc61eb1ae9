//! Database operations: info, existence and creation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use cblite_common::{DatabaseName, DocumentId, Result};

use crate::client::Client;
use crate::document::DocumentHandle;

/// Database metadata (`GET /{db}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    #[serde(default)]
    pub db_name: Option<String>,
    #[serde(default)]
    pub doc_count: Option<u64>,
    /// Sequence number or token, depending on the server.
    #[serde(default)]
    pub update_seq: Option<Value>,
    #[serde(default)]
    pub disk_size: Option<u64>,
    #[serde(default)]
    pub db_uuid: Option<String>,
    /// Any other fields reported by the server.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Answer to a database creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Handle to a named database.
///
/// Stateless beyond the name: nothing about the database is cached.
#[derive(Debug, Clone)]
pub struct Database {
    client: Client,
    name: DatabaseName,
}

impl Database {
    pub(crate) fn new(client: Client, name: DatabaseName) -> Self {
        Self { client, name }
    }

    /// Get the database name.
    pub fn name(&self) -> &DatabaseName {
        &self.name
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    /// Query database metadata.
    ///
    /// # Errors
    /// - `Remote` with the server body on any non-2xx answer (404 `not_found`)
    /// - `NotReady` before the client is initialized
    pub async fn info(&self) -> Result<DatabaseInfo> {
        let server = self.client.server()?;
        let url = server.paths().database(&self.name);
        let response = self.client.transport().get(&url, server.headers()).await?;
        Ok(serde_json::from_value(response.body)?)
    }

    /// Whether the database exists.
    ///
    /// True iff [`Database::info`] succeeds. Never fails.
    pub async fn exists(&self) -> bool {
        match self.info().await {
            Ok(_) => true,
            Err(err) => {
                debug!(database = %self.name, error = %err, "Database info failed, reporting absent");
                false
            }
        }
    }

    /// Create the database.
    ///
    /// # Errors
    /// - `Remote` with the server body, e.g. 412 `file_exists`
    pub async fn create(&self) -> Result<CreateResponse> {
        let server = self.client.server()?;
        let url = server.paths().database(&self.name);
        let response = self
            .client
            .transport()
            .put(&url, None, server.headers())
            .await?;
        Ok(serde_json::from_value(response.body)?)
    }

    /// Handle to a document whose id is not known yet.
    pub fn document(&self) -> DocumentHandle {
        DocumentHandle::new(self.clone(), None)
    }

    /// Handle to a document with a known id.
    ///
    /// # Errors
    /// - Id is empty
    pub fn document_with_id(&self, id: impl Into<String>) -> Result<DocumentHandle> {
        Ok(DocumentHandle::new(self.clone(), Some(DocumentId::new(id)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::StaticLocator;
    use crate::transport::MockTransport;
    use cblite_common::Error;
    use reqwest::Method;
    use serde_json::json;

    const DB_URL: &str = "http://host/my-database";

    async fn setup() -> (MockTransport, Database) {
        let mock = MockTransport::new();
        let client = Client::connect(mock.clone(), StaticLocator::new("http://u:p@host/"))
            .await
            .unwrap();
        let db = client.database("my-database").unwrap();
        (mock, db)
    }

    #[tokio::test]
    async fn test_info_parses_metadata() {
        let (mock, db) = setup().await;
        mock.expect(Method::GET, DB_URL).respond(
            200,
            json!({"db_name": "my-database", "doc_count": 5048, "update_seq": 25800, "purge_seq": 0}),
        );

        let info = db.info().await.unwrap();
        assert_eq!(info.db_name.as_deref(), Some("my-database"));
        assert_eq!(info.doc_count, Some(5048));
        assert_eq!(info.update_seq, Some(json!(25800)));
        assert_eq!(info.extra["purge_seq"], 0);
    }

    #[tokio::test]
    async fn test_exists_false_on_server_error() {
        let (mock, db) = setup().await;
        mock.expect(Method::GET, DB_URL)
            .respond(500, json!({"status": 500, "error": "internal"}));

        assert!(!db.exists().await);
    }

    #[tokio::test]
    async fn test_exists_false_when_not_ready() {
        let client = Client::new(MockTransport::new(), StaticLocator::new("http://u:p@host/"));
        let db = client.database("my-database").unwrap();
        assert!(!db.exists().await);
    }

    #[tokio::test]
    async fn test_create_sends_no_body() {
        let (mock, db) = setup().await;
        mock.expect(Method::PUT, DB_URL).respond(201, json!({"ok": true}));

        let result = db.create().await.unwrap();
        assert!(result.ok);
        assert_eq!(mock.last_request().unwrap().body, None);
    }

    #[tokio::test]
    async fn test_create_not_ready() {
        let client = Client::new(MockTransport::new(), StaticLocator::new("http://u:p@host/"));
        let db = client.database("my-database").unwrap();
        assert!(matches!(db.create().await, Err(Error::NotReady)));
    }

    #[test]
    fn test_document_with_empty_id_fails() {
        let client = Client::new(MockTransport::new(), StaticLocator::new("http://u:p@host/"));
        let db = client.database("db").unwrap();
        assert!(db.document_with_id("").is_err());
    }
}
