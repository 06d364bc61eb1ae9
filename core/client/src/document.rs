//! Document operations.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use cblite_common::{DocumentId, Result};

use crate::database::Database;
use crate::identity::{resolve_save_target, validate_payload, Binding, SaveMethod};

/// Answer to a document save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub id: String,
    pub rev: String,
    #[serde(default)]
    pub ok: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Pending save, returned once the payload has been validated.
pub type SaveFuture = BoxFuture<'static, Result<SaveResponse>>;

/// Handle to a document, possibly without an id yet.
///
/// Clones share the identity binding. Saves through one handle (and its
/// clones) run one at a time, so the first save's outcome decides the id
/// before the next save picks PUT or POST.
#[derive(Debug, Clone)]
pub struct DocumentHandle {
    database: Database,
    binding: Arc<Mutex<Binding>>,
}

impl DocumentHandle {
    pub(crate) fn new(database: Database, id: Option<DocumentId>) -> Self {
        let binding = match id {
            Some(id) => Binding::Bound(id),
            None => Binding::Unbound,
        };
        Self {
            database,
            binding: Arc::new(Mutex::new(binding)),
        }
    }

    /// The owning database.
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// The id this handle is bound to, if any.
    ///
    /// Waits for an in-flight save on this handle to finish.
    pub async fn id(&self) -> Option<DocumentId> {
        self.binding.lock().await.id().cloned()
    }

    /// Save a document.
    ///
    /// The payload is checked immediately: anything that does not serialize
    /// to a JSON object is rejected here, before any request is built.
    /// Awaiting the returned future performs the PUT or POST.
    ///
    /// # Errors
    /// - `InvalidPayloadKind` (synchronously) for non-object payloads
    /// - `Remote` with the server body on a non-2xx answer
    ///
    /// # Example
    /// ```ignore
    /// let saved = db.document().save(&json!({"foo": "bar"}))?.await?;
    /// ```
    pub fn save<T: Serialize + ?Sized>(&self, document: &T) -> Result<SaveFuture> {
        let value = serde_json::to_value(document)?;
        self.save_json(Some(value))
    }

    /// Save a raw JSON payload. `None` is a missing document.
    pub fn save_json(&self, document: Option<Value>) -> Result<SaveFuture> {
        let body = validate_payload(document)?;
        let database = self.database.clone();
        let state = self.binding.clone();

        Ok(Box::pin(async move {
            let mut binding = state.lock().await;
            let target = resolve_save_target(&mut binding, &body);

            let client = database.client();
            let server = client.server()?;
            let paths = server.paths();
            let body = Value::Object(body);

            let response = match (target.method, &target.id) {
                (SaveMethod::Put, Some(id)) => {
                    let url = paths.document(database.name(), id);
                    debug!(url = %url, "Saving document with known id");
                    client.transport().put(&url, Some(&body), server.headers()).await?
                }
                _ => {
                    let url = paths.database(database.name());
                    debug!(url = %url, "Saving document without id");
                    client.transport().post(&url, &body, server.headers()).await?
                }
            };

            // A 2xx answer means the document exists: bind even when the rest
            // of the body does not parse.
            if binding.id().is_none() {
                let assigned = response.body.get("id").and_then(Value::as_str);
                match assigned.map(DocumentId::new) {
                    Some(Ok(id)) => {
                        info!(database = %database.name(), id = %id, "Document bound to server-assigned id");
                        binding.bind(id);
                    }
                    _ => warn!(database = %database.name(), "Save answer carries no usable id"),
                }
            }

            let saved: SaveResponse = serde_json::from_value(response.body)?;
            Ok(saved)
        }))
    }
}
