//! One-directional replication between a local and a remote database.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, warn};

use cblite_common::{DatabaseName, Result};

use crate::database::Database;
use crate::paths::remote_database;

/// Replication direction, seen from the local database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Local to remote.
    To,
    /// Remote to local.
    From,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::To => write!(f, "local->remote"),
            Direction::From => write!(f, "remote->local"),
        }
    }
}

/// Remote endpoint of a replication, with its options.
///
/// Converts from a bare URL, which replicates one-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    url: String,
    continuous: bool,
}

impl Remote {
    /// One-off replication against `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            continuous: false,
        }
    }

    /// Keep replicating as changes arrive.
    pub fn continuous(mut self, continuous: bool) -> Self {
        self.continuous = continuous;
        self
    }

    /// Remote server URL, without the database name.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether the replication keeps running after catching up.
    pub fn is_continuous(&self) -> bool {
        self.continuous
    }
}

impl From<&str> for Remote {
    fn from(url: &str) -> Self {
        Remote::new(url)
    }
}

impl From<String> for Remote {
    fn from(url: String) -> Self {
        Remote::new(url)
    }
}

impl From<&String> for Remote {
    fn from(url: &String) -> Self {
        Remote::new(url.as_str())
    }
}

/// Body of `POST /_replicate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationRequest {
    pub source: String,
    pub target: String,
    pub continuous: bool,
}

impl ReplicationRequest {
    /// Build the request for one direction.
    ///
    /// The local side is the bare database name; the remote side is the
    /// remote URL with the database name appended.
    pub fn new(local: &DatabaseName, direction: Direction, remote: &Remote) -> Self {
        let local_name = local.as_str().to_string();
        let remote_db = remote_database(remote.url(), local);
        let (source, target) = match direction {
            Direction::To => (local_name, remote_db),
            Direction::From => (remote_db, local_name),
        };
        Self {
            source,
            target,
            continuous: remote.is_continuous(),
        }
    }
}

/// Answer to a replication request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationResponse {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub ok: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Database {
    /// Start a replication in one direction.
    ///
    /// The HTTP status decides success; an `ok: false` inside a 2xx body is
    /// still a success, and a non-2xx answer is an error whatever its body.
    pub async fn replicate(
        &self,
        direction: Direction,
        remote: impl Into<Remote>,
    ) -> Result<ReplicationResponse> {
        let remote = remote.into();
        let server = self.client().server()?;
        let request = ReplicationRequest::new(self.name(), direction, &remote);

        debug!(
            %direction,
            source = %request.source,
            target = %request.target,
            continuous = request.continuous,
            "Starting replication"
        );

        let body = serde_json::to_value(&request)?;
        let response = self
            .client()
            .transport()
            .post(&server.paths().replicate(), &body, server.headers())
            .await
            .inspect_err(|err| warn!(%direction, error = %err, "Replication request failed"))?;

        Ok(serde_json::from_value(response.body)?)
    }

    /// Replicate this database to the remote.
    pub async fn replicate_to(&self, remote: impl Into<Remote>) -> Result<ReplicationResponse> {
        self.replicate(Direction::To, remote).await
    }

    /// Replicate the remote into this database.
    pub async fn replicate_from(&self, remote: impl Into<Remote>) -> Result<ReplicationResponse> {
        self.replicate(Direction::From, remote).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Client;
    use crate::server::StaticLocator;
    use crate::transport::MockTransport;
    use reqwest::Method;
    use serde_json::json;

    fn db_name() -> DatabaseName {
        DatabaseName::new("my-database").unwrap()
    }

    #[test]
    fn test_request_to_remote() {
        let request = ReplicationRequest::new(&db_name(), Direction::To, &"http://my.sync.gateway".into());
        assert_eq!(request.source, "my-database");
        assert_eq!(request.target, "http://my.sync.gateway/my-database");
        assert!(!request.continuous);
    }

    #[test]
    fn test_request_from_remote_continuous() {
        let remote = Remote::new("http://my.sync.gateway/").continuous(true);
        let request = ReplicationRequest::new(&db_name(), Direction::From, &remote);
        assert_eq!(request.source, "http://my.sync.gateway/my-database");
        assert_eq!(request.target, "my-database");
        assert!(request.continuous);
    }

    #[test]
    fn test_request_wire_format() {
        let request = ReplicationRequest::new(&db_name(), Direction::To, &"http://gw".into());
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"source": "my-database", "target": "http://gw/my-database", "continuous": false})
        );
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::To.to_string(), "local->remote");
        assert_eq!(Direction::From.to_string(), "remote->local");
    }

    #[tokio::test]
    async fn test_ok_false_with_success_status_is_success() {
        let mock = MockTransport::new();
        mock.expect(Method::POST, "http://host/_replicate")
            .respond(200, json!({"session_id": "repl001", "ok": false}));

        let client = Client::connect(mock.clone(), StaticLocator::new("http://u:p@host/"))
            .await
            .unwrap();
        let result = client
            .database("my-database")
            .unwrap()
            .replicate_to("http://gw")
            .await
            .unwrap();

        assert_eq!(result.session_id.as_deref(), Some("repl001"));
        assert!(!result.ok);
    }
}
