//! Combined close handle

use std::sync::Arc;

use futures::future::join_all;
use parking_lot::Mutex;

use crate::logging::SharedLogger;
use crate::sources::SourceConnection;
use crate::{log_info, log_warn};

use super::error::{CloseError, ToolsError, ToolsResult};

type Retained = Vec<(String, Arc<dyn SourceConnection>)>;

/// Closes every connection opened by one `activate_all` call
///
/// Cheap to clone; all clones share a single one-shot state, so only the
/// first `close()` across them does any work.
#[derive(Clone)]
pub struct CloseHandle {
    connections: Arc<Mutex<Option<Retained>>>,
    logger: SharedLogger,
}

impl CloseHandle {
    pub(crate) fn new(connections: Retained, logger: SharedLogger) -> Self {
        Self {
            connections: Arc::new(Mutex::new(Some(connections))),
            logger,
        }
    }

    /// Ids of connections still waiting to be closed
    pub fn pending(&self) -> Vec<String> {
        self.connections
            .lock()
            .as_ref()
            .map(|c| c.iter().map(|(id, _)| id.clone()).collect())
            .unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        self.connections.lock().is_none()
    }

    /// Close all retained connections concurrently and wait for every one
    ///
    /// A failing close does not stop the others; failures are collected into
    /// `ToolsError::CloseFailed`. With nothing retained this is a no-op.
    /// A second call returns `ToolsError::AlreadyClosed`.
    pub async fn close(&self) -> ToolsResult<()> {
        let connections = self
            .connections
            .lock()
            .take()
            .ok_or(ToolsError::AlreadyClosed)?;

        if connections.is_empty() {
            return Ok(());
        }

        log_info!(self.logger, "[ToolsManager] Closing {} connection(s)", connections.len());

        let results = join_all(
            connections
                .iter()
                .map(|(id, connection)| async move { (id, connection.close().await) }),
        )
        .await;

        let failures: Vec<CloseError> = results
            .into_iter()
            .filter_map(|(id, result)| result.err().map(|e| (id, e)))
            .map(|(id, e)| {
                log_warn!(self.logger, "[ToolsManager] Failed to close {}: {}", id, e);
                CloseError {
                    source_id: id.clone(),
                    message: e.to_string(),
                }
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ToolsError::CloseFailed(failures))
        }
    }
}

impl std::fmt::Debug for CloseHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloseHandle")
            .field("pending", &self.pending())
            .field("closed", &self.is_closed())
            .finish()
    }
}
