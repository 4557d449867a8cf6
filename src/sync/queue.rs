use thiserror::Error;

use super::operation::{ListId, QueuedOperation, TempId};
use crate::storage::{KeyValueStore, StoreError};

/// Prefix shared by every list's queue key.
pub const QUEUE_KEY_PREFIX: &str = "offline_queue_list_";

/// Storage key of the offline queue for a list.
pub fn queue_key(list_id: ListId) -> String {
    format!("{QUEUE_KEY_PREFIX}{list_id}")
}

/// Inverse of [`queue_key`].
pub fn list_id_from_queue_key(key: &str) -> Option<ListId> {
    key.strip_prefix(QUEUE_KEY_PREFIX)?.parse().ok()
}

/// Storage key of the last-sync watermark for a list.
pub fn last_sync_key(list_id: ListId) -> String {
    format!("last_sync_list_{list_id}")
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to encode offline queue: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Pending mutations for one list, in the order they were queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfflineQueue {
    list_id: ListId,
    operations: Vec<QueuedOperation>,
}

impl OfflineQueue {
    pub fn new(list_id: ListId) -> Self {
        Self {
            list_id,
            operations: Vec::new(),
        }
    }

    /// Load the persisted queue for `list_id`.
    ///
    /// A missing, unreadable, or malformed entry yields an empty queue. The
    /// loss is logged rather than propagated so the list stays usable.
    pub async fn load<S: KeyValueStore + ?Sized>(store: &S, list_id: ListId) -> Self {
        let key = queue_key(list_id);
        let raw = match store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::new(list_id),
            Err(e) => {
                tracing::error!(list_id, error = %e, "Failed to read offline queue, starting empty");
                return Self::new(list_id);
            }
        };

        match serde_json::from_str::<Vec<QueuedOperation>>(&raw) {
            Ok(operations) => {
                tracing::debug!(list_id, pending = operations.len(), "Loaded offline queue");
                Self {
                    list_id,
                    operations,
                }
            }
            Err(e) => {
                tracing::error!(list_id, error = %e, "Failed to parse offline queue, discarding it");
                Self::new(list_id)
            }
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.operations)
    }

    pub async fn persist<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<(), PersistError> {
        let json = self.to_json()?;
        store.set(&queue_key(self.list_id), &json).await?;
        Ok(())
    }

    pub fn list_id(&self) -> ListId {
        self.list_id
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn operations(&self) -> &[QueuedOperation] {
        &self.operations
    }

    pub fn push(&mut self, op: QueuedOperation) {
        self.operations.push(op);
    }

    /// Drop the queued Add that created `temp_id`. Returns whether one was found.
    pub fn cancel_add(&mut self, temp_id: &TempId) -> bool {
        let before = self.operations.len();
        self.operations.retain(|op| !op.is_add_for(temp_id));
        self.operations.len() != before
    }

    /// Remove and return every operation, ordered by timestamp.
    ///
    /// The sort is stable: operations with equal timestamps keep queue order.
    pub fn take_sorted(&mut self) -> Vec<QueuedOperation> {
        let mut ops = std::mem::take(&mut self.operations);
        ops.sort_by_key(QueuedOperation::timestamp);
        ops
    }

    pub fn replace(&mut self, operations: Vec<QueuedOperation>) {
        self.operations = operations;
    }
}

/// Read the last-sync watermark. Unparseable values are treated as absent.
pub async fn load_last_sync<S: KeyValueStore + ?Sized>(store: &S, list_id: ListId) -> Option<i64> {
    match store.get(&last_sync_key(list_id)).await {
        Ok(Some(raw)) => match raw.trim().parse::<i64>() {
            Ok(ts) => Some(ts),
            Err(e) => {
                tracing::warn!(list_id, value = %raw, error = %e, "Ignoring malformed last-sync timestamp");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::error!(list_id, error = %e, "Failed to read last-sync timestamp");
            None
        }
    }
}

pub async fn store_last_sync<S: KeyValueStore + ?Sized>(
    store: &S,
    list_id: ListId,
    timestamp: i64,
) -> Result<(), StoreError> {
    store
        .set(&last_sync_key(list_id), &timestamp.to_string())
        .await
}
