use crate::cell::ValueCell;
use crate::connection::ConnectionRegistry;
use crate::session::StreamSession;
use log::*;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Hands out stream sessions bound to one shared value cell.
pub struct Manager<V> {
    cell: Arc<ValueCell<V>>,
    registry: Arc<ConnectionRegistry>,
    shutdown: CancellationToken,
}

impl<V> Manager<V> {
    /// Sessions opened by this manager end when `shutdown` is cancelled.
    pub fn new(cell: Arc<ValueCell<V>>, shutdown: CancellationToken) -> Self {
        Self {
            cell,
            registry: Arc::new(ConnectionRegistry::new()),
            shutdown,
        }
    }

    pub fn cell(&self) -> &Arc<ValueCell<V>> {
        &self.cell
    }

    /// Register a new session on the shared cell
    pub fn open_session(&self) -> StreamSession<V> {
        let registration = self.registry.register();
        info!(
            "Opened stream session {} ({} open)",
            registration.connection_id().as_str(),
            self.registry.len()
        );
        StreamSession::new(&self.cell, registration, self.shutdown.child_token())
    }

    pub fn open_sessions(&self) -> usize {
        self.registry.len()
    }
}
