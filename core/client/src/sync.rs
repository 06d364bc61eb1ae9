//! Bidirectional sync: two replications run concurrently, outcomes kept apart.

use futures::future::join;
use thiserror::Error;
use tracing::{info, warn};

use cblite_common::{Error, Result};

use crate::database::Database;
use crate::replication::{Direction, Remote, ReplicationResponse};

/// Both directions succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncResult {
    pub local_to_remote: ReplicationResponse,
    pub remote_to_local: ReplicationResponse,
}

/// At least one direction failed.
///
/// Each slot holds what its own replication produced, success or error.
#[derive(Debug, Error)]
#[error(
    "sync failed: local->remote {}, remote->local {}",
    outcome(.local_to_remote),
    outcome(.remote_to_local)
)]
pub struct SyncFailure {
    pub local_to_remote: Result<ReplicationResponse>,
    pub remote_to_local: Result<ReplicationResponse>,
}

fn outcome(result: &Result<ReplicationResponse>) -> String {
    match result {
        Ok(_) => "ok".to_string(),
        Err(err) => format!("failed ({})", err),
    }
}

impl SyncFailure {
    /// Directions whose replication failed.
    pub fn failed_directions(&self) -> Vec<Direction> {
        let mut failed = Vec::new();
        if self.local_to_remote.is_err() {
            failed.push(Direction::To);
        }
        if self.remote_to_local.is_err() {
            failed.push(Direction::From);
        }
        failed
    }

    /// The error for one direction, if it failed.
    pub fn error(&self, direction: Direction) -> Option<&Error> {
        let slot = match direction {
            Direction::To => &self.local_to_remote,
            Direction::From => &self.remote_to_local,
        };
        slot.as_ref().err()
    }
}

impl Database {
    /// Replicate in both directions with the same options.
    ///
    /// Both requests are in flight together and each settles on its own; a
    /// failure in one never cancels or hides the other.
    pub async fn sync_with(
        &self,
        remote: impl Into<Remote>,
    ) -> std::result::Result<SyncResult, SyncFailure> {
        let remote = remote.into();

        let (local_to_remote, remote_to_local) = join(
            self.replicate(Direction::To, remote.clone()),
            self.replicate(Direction::From, remote),
        )
        .await;

        match (local_to_remote, remote_to_local) {
            (Ok(local_to_remote), Ok(remote_to_local)) => {
                info!(database = %self.name(), "Sync started in both directions");
                Ok(SyncResult {
                    local_to_remote,
                    remote_to_local,
                })
            }
            (local_to_remote, remote_to_local) => {
                let failure = SyncFailure {
                    local_to_remote,
                    remote_to_local,
                };
                warn!(
                    database = %self.name(),
                    failed = ?failure.failed_directions(),
                    "Sync partially or fully failed"
                );
                Err(failure)
            }
        }
    }
}
