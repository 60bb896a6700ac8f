use dashmap::DashMap;
use log::*;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Unique identifier for a stream session (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub connected_at: Instant,
}

/// Live stream sessions, keyed by connection id.
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, ConnectionInfo>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Registers a session. It stays listed until the returned guard is dropped.
    pub fn register(self: &Arc<Self>) -> Registration {
        let connection_id = ConnectionId::new();
        self.connections.insert(
            connection_id.clone(),
            ConnectionInfo {
                connected_at: Instant::now(),
            },
        );

        Registration {
            connection_id,
            registry: Arc::clone(self),
        }
    }

    /// Returns how long the connection was open, if it was still registered.
    fn unregister(&self, connection_id: &ConnectionId) -> Option<Duration> {
        self.connections
            .remove(connection_id)
            .map(|(_, info)| info.connected_at.elapsed())
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.connections.contains_key(connection_id)
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps a session listed in its registry for as long as it lives.
pub struct Registration {
    connection_id: ConnectionId,
    registry: Arc<ConnectionRegistry>,
}

impl Registration {
    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Some(open_for) = self.registry.unregister(&self.connection_id) {
            info!(
                "Stream session {} closed after {:?} ({} still open)",
                self.connection_id.as_str(),
                open_for,
                self.registry.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_ids_are_unique() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }

    #[test]
    fn test_registration_is_removed_on_drop() {
        let registry = Arc::new(ConnectionRegistry::new());

        let first = registry.register();
        let second = registry.register();
        assert_eq!(registry.len(), 2);

        let first_id = first.connection_id().clone();
        drop(first);

        assert!(!registry.contains(&first_id));
        assert!(registry.contains(second.connection_id()));
        assert_eq!(registry.len(), 1);

        drop(second);
        assert!(registry.is_empty());
    }
}
