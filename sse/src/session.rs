use crate::cell::{Slot, Snapshot, ValueCell};
use crate::connection::{ConnectionId, Registration};
use async_stream::stream;
use futures::Stream;
use log::*;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Per-client state: the last snapshot pushed and a watcher on the cell.
///
/// The session alternates between checking the cell and sleeping until the
/// cell reports a change. Every observed change is pushed exactly once, in
/// observation order; an unchanged value is never pushed twice.
pub struct StreamSession<V> {
    registration: Registration,
    watcher: watch::Receiver<Slot<V>>,
    shutdown: CancellationToken,
    last_sent: Option<Arc<Snapshot<V>>>,
}

impl<V> StreamSession<V> {
    pub(crate) fn new(
        cell: &ValueCell<V>,
        registration: Registration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            registration,
            watcher: cell.subscribe(),
            shutdown,
            last_sent: None,
        }
    }

    pub fn connection_id(&self) -> &ConnectionId {
        self.registration.connection_id()
    }

    pub fn last_sent(&self) -> Option<&Arc<Snapshot<V>>> {
        self.last_sent.as_ref()
    }

    /// Reads the cell and returns the snapshot to publish, if it differs from
    /// the last one sent. Marks the returned snapshot as sent.
    pub fn check(&mut self) -> Option<Arc<Snapshot<V>>> {
        // Marking the watcher as seen before comparing means a `set` racing
        // with this check still wakes the next idle-wait.
        let current = self.watcher.borrow_and_update().clone()?;

        if let Some(last) = &self.last_sent {
            if last.same_as(&current) {
                return None;
            }
        }

        self.last_sent = Some(Arc::clone(&current));
        Some(current)
    }

    /// Suspends until the cell changes. Returns `false` once the session
    /// should stop (process shutdown).
    async fn idle_wait(&mut self) -> bool {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => false,
            changed = self.watcher.changed() => changed.is_ok(),
        }
    }
}

impl<V: Send + Sync + 'static> StreamSession<V> {
    /// Turns the session into the stream of snapshots to push to its client.
    ///
    /// The stream ends on process shutdown. When the client goes away the
    /// HTTP layer drops the stream, which closes the session.
    pub fn into_stream(self) -> impl Stream<Item = Arc<Snapshot<V>>> + Send + 'static {
        let mut session = self;

        stream! {
            debug!("Stream session {} streaming", session.connection_id().as_str());

            loop {
                if let Some(snapshot) = session.check() {
                    trace!(
                        "Stream session {} publishing {}",
                        session.connection_id().as_str(),
                        snapshot.data()
                    );
                    yield snapshot;
                    continue;
                }

                if !session.idle_wait().await {
                    break;
                }
            }

            debug!(
                "Stream session {} stopped by shutdown",
                session.connection_id().as_str()
            );
        }
    }
}
