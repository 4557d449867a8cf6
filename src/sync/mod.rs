//! Offline-first synchronization of shopping list edits.
//!
//! Adds and deletes are always queued locally first, persisted per list, and
//! replayed against the list server when connectivity allows:
//!
//! - [`operation`] - queued operation records and their stored JSON form
//! - [`queue`] - the per-list queue and last-sync watermark persistence
//! - [`connectivity`] - online/offline signal source and subscriptions
//! - [`remote`] - the server contract and its HTTP implementation
//! - [`view`] - hooks the manager calls to update whatever displays the list
//! - [`manager`] - the state machine tying it together
//!
//! # Example
//!
//! ```ignore
//! let connectivity = Connectivity::new(false);
//! let mut manager =
//!     SyncManager::open(list_id, user_id, store, remote, view, connectivity.subscribe()).await;
//!
//! let temp_id = manager.add_item("Milk").await; // queued, shown as pending
//! connectivity.set_online(true);
//! manager.handle_connectivity_change(true).await; // replays the queue
//! ```

pub mod connectivity;
pub mod manager;
pub mod operation;
pub mod queue;
pub mod remote;
pub mod view;

pub use connectivity::{Connectivity, ConnectivitySignal};
pub use manager::{now_ms, Clock, SkipReason, SyncManager, SyncManagerBuilder, SyncOutcome, UpdatesOutcome};
pub use operation::{AddPayload, DeletePayload, ItemRef, ListId, QueuedOperation, TempId, UserId};
pub use queue::{
    last_sync_key, list_id_from_queue_key, load_last_sync, queue_key, store_last_sync,
    OfflineQueue, PersistError, QUEUE_KEY_PREFIX,
};
pub use remote::{HttpRemote, RemoteApi, RemoteError, RemoteItem, Updates};
pub use view::{PendingItem, Severity, SyncStatus, ViewAdapter};
