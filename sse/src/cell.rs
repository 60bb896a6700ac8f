use crate::error::Result;
use log::*;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

/// A published value together with the exact text pushed to clients.
#[derive(Debug)]
pub struct Snapshot<V> {
    value: V,
    data: String,
}

impl<V: Serialize> Snapshot<V> {
    pub fn new(value: V) -> Result<Self> {
        let data = serde_json::to_string(&value)?;
        Ok(Self { value, data })
    }
}

impl<V> Snapshot<V> {
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Serialized form. Two snapshots are "the same value" iff these match.
    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn same_as(&self, other: &Snapshot<V>) -> bool {
        self.data == other.data
    }
}

pub(crate) type Slot<V> = Option<Arc<Snapshot<V>>>;

/// Single-writer, many-reader register holding the latest published value.
///
/// Snapshots are replaced whole behind an `Arc`, so a reader sees either the
/// previous snapshot or the new one. The cell also notifies watchers on
/// every change, which lets sessions sleep instead of polling.
pub struct ValueCell<V> {
    slot: watch::Sender<Slot<V>>,
}

impl<V: Serialize> ValueCell<V> {
    /// An empty cell. Sessions opened on it stay silent until the first `set`.
    pub fn new() -> Self {
        let (slot, _) = watch::channel(None);
        Self { slot }
    }

    pub fn with_value(value: V) -> Result<Self> {
        let snapshot = Snapshot::new(value)?;
        let (slot, _) = watch::channel(Some(Arc::new(snapshot)));
        Ok(Self { slot })
    }

    /// Installs `value`, returning whether the published text changed.
    ///
    /// A value that serializes to the current text leaves the cell untouched
    /// and does not wake any watcher.
    pub fn set(&self, value: V) -> Result<bool> {
        let snapshot = Arc::new(Snapshot::new(value)?);

        let changed = self.slot.send_if_modified(|slot| {
            if slot
                .as_ref()
                .is_some_and(|current| current.same_as(&snapshot))
            {
                return false;
            }
            *slot = Some(snapshot);
            true
        });

        if !changed {
            trace!("Value unchanged, nothing to publish");
        }
        Ok(changed)
    }
}

impl<V> ValueCell<V> {
    pub fn get(&self) -> Option<Arc<Snapshot<V>>> {
        self.slot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Slot<V>> {
        self.slot.subscribe()
    }
}

impl<V: Serialize> Default for ValueCell<V> {
    fn default() -> Self {
        Self::new()
    }
}
