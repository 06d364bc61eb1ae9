//! Client for a document-database REST server.
//!
//! This crate builds and issues the REST calls for:
//! - Server and database metadata, existence checks and creation
//! - Document saves, with lazy binding of server-assigned ids
//! - One-off and continuous replication in either direction
//! - Bidirectional sync with independently tracked outcomes
//!
//! # Design Principles
//! - Transport isolation: HTTP lives behind the [`Transport`] trait
//! - Explicit dependencies: the server location comes from an injected
//!   [`ServerLocator`], never from ambient state
//! - Errors pass through: remote failures keep their status and body

pub mod client;
pub mod config;
pub mod credentials;
pub mod database;
pub mod document;
pub mod identity;
pub mod paths;
pub mod replication;
pub mod server;
pub mod sync;
pub mod transport;

pub use cblite_common::{DatabaseName, DocumentId, Error, Result};
pub use client::{Client, ServerInfo};
pub use config::ClientConfig;
pub use credentials::Credentials;
pub use database::{CreateResponse, Database, DatabaseInfo};
pub use document::{DocumentHandle, SaveFuture, SaveResponse};
pub use identity::{Binding, SaveMethod, SaveTarget};
pub use paths::ResourcePaths;
pub use replication::{Direction, Remote, ReplicationRequest, ReplicationResponse};
pub use server::{ServerHandle, ServerLocator, StaticLocator};
pub use sync::{SyncFailure, SyncResult};
pub use transport::{HttpTransport, MockTransport, Response, Transport};
