use super::connectivity::ConnectivitySignal;
use super::operation::{
    AddPayload, DeletePayload, ItemRef, ListId, QueuedOperation, TempId, UserId,
};
use super::queue::{load_last_sync, store_last_sync, OfflineQueue};
use super::remote::{RemoteApi, RemoteError, Updates};
use super::view::{PendingItem, Severity, SyncStatus, ViewAdapter};
use crate::categorize::Categorizer;
use crate::storage::KeyValueStore;

/// Source of "now" in epoch milliseconds.
pub type Clock = Box<dyn Fn() -> i64 + Send + Sync>;

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Offline,
    EmptyQueue,
}

/// Result of one sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Nothing was attempted.
    Skipped(SkipReason),
    /// Every queued operation was applied; the queue is now empty.
    Completed { synced: usize },
    /// Some operations remain queued. `deferred` counts operations never
    /// issued because connectivity dropped during the pass.
    Incomplete {
        synced: usize,
        failed: usize,
        deferred: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdatesOutcome {
    Skipped,
    Fetched(Updates),
    /// The fetch failed; queue and watermark are untouched.
    Failed,
}

/// Configures and opens a [`SyncManager`].
pub struct SyncManagerBuilder {
    list_id: ListId,
    user_id: UserId,
    categorizer: Categorizer,
    clock: Clock,
}

impl SyncManagerBuilder {
    pub fn new(list_id: ListId, user_id: UserId) -> Self {
        Self {
            list_id,
            user_id,
            categorizer: Categorizer::default(),
            clock: Box::new(now_ms),
        }
    }

    pub fn categorizer(mut self, categorizer: Categorizer) -> Self {
        self.categorizer = categorizer;
        self
    }

    pub fn clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Load persisted state for the list and subscribe to `signal`.
    pub async fn open<S, R, V>(
        self,
        store: S,
        remote: R,
        view: V,
        signal: ConnectivitySignal,
    ) -> SyncManager<S, R, V>
    where
        S: KeyValueStore,
        R: RemoteApi,
        V: ViewAdapter,
    {
        let queue = OfflineQueue::load(&store, self.list_id).await;
        let last_sync = match load_last_sync(&store, self.list_id).await {
            Some(ts) => ts,
            None => (self.clock)(),
        };
        let online = signal.is_online();

        tracing::info!(
            list_id = self.list_id,
            pending = queue.len(),
            online,
            "Offline sync manager ready"
        );

        let mut manager = SyncManager {
            list_id: self.list_id,
            user_id: self.user_id,
            store,
            remote,
            view,
            categorizer: self.categorizer,
            signal,
            online,
            queue,
            last_sync,
            clock: self.clock,
        };
        manager.publish_status();
        manager
    }
}

/// Offline-first mutation queue for one shopping list.
///
/// Every add/delete is queued and persisted first. Sync passes replay the
/// queue in timestamp order against the [`RemoteApi`], one call at a time,
/// keeping exactly the operations that failed.
pub struct SyncManager<S, R, V> {
    list_id: ListId,
    user_id: UserId,
    store: S,
    remote: R,
    view: V,
    categorizer: Categorizer,
    signal: ConnectivitySignal,
    /// Connectivity as of the last handled transition.
    online: bool,
    queue: OfflineQueue,
    last_sync: i64,
    clock: Clock,
}

impl<S, R, V> SyncManager<S, R, V>
where
    S: KeyValueStore,
    R: RemoteApi,
    V: ViewAdapter,
{
    /// Open with the built-in categorizer and the system clock.
    pub async fn open(
        list_id: ListId,
        user_id: UserId,
        store: S,
        remote: R,
        view: V,
        signal: ConnectivitySignal,
    ) -> Self {
        SyncManagerBuilder::new(list_id, user_id)
            .open(store, remote, view, signal)
            .await
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn list_id(&self) -> ListId {
        self.list_id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    pub fn pending(&self) -> &[QueuedOperation] {
        self.queue.operations()
    }

    pub fn last_sync_timestamp(&self) -> i64 {
        self.last_sync
    }

    pub fn categorizer(&self) -> &Categorizer {
        &self.categorizer
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    // ========================================================================
    // Queue Operations
    // ========================================================================

    /// Queue an Add and show it as pending. Returns the item's temporary id.
    pub async fn queue_add(&mut self, item_name: &str, category: &str) -> TempId {
        let timestamp = (self.clock)();
        let temp_id = TempId::generate(timestamp);

        self.queue.push(QueuedOperation::Add(AddPayload {
            item_name: item_name.to_string(),
            category: category.to_string(),
            list_id: self.list_id,
            added_by_id: self.user_id,
            temp_id: temp_id.clone(),
            timestamp,
        }));
        self.save_queue().await;
        self.publish_status();

        self.view.render_pending_item(&PendingItem {
            temp_id: temp_id.clone(),
            item_name: item_name.to_string(),
            category: category.to_string(),
        });

        tracing::debug!(list_id = self.list_id, temp_id = %temp_id, "Queued add");
        temp_id
    }

    /// Categorize `item_name` and queue it.
    pub async fn add_item(&mut self, item_name: &str) -> TempId {
        let category = self.categorizer.categorize(item_name);
        self.queue_add(item_name, category.as_str()).await
    }

    /// Queue a delete.
    ///
    /// For a temporary item the pending Add is cancelled instead: the server
    /// never saw it, so nothing is sent.
    pub async fn queue_delete(&mut self, item: ItemRef) {
        match item {
            ItemRef::Temporary(temp_id) => {
                if !self.queue.cancel_add(&temp_id) {
                    tracing::debug!(temp_id = %temp_id, "No queued add for temporary item");
                }
                self.save_queue().await;
                self.publish_status();
                self.view.remove_pending_item(&temp_id);
            }
            ItemRef::Server(item_id) => {
                self.queue.push(QueuedOperation::Delete(DeletePayload {
                    item_id,
                    list_id: self.list_id,
                    timestamp: (self.clock)(),
                }));
                self.save_queue().await;
                self.publish_status();
                tracing::debug!(list_id = self.list_id, item_id, "Queued delete");
            }
        }
    }

    // ========================================================================
    // Sync
    // ========================================================================

    /// Replay the queue against the server.
    ///
    /// Operations run strictly in timestamp order and one at a time. A failed
    /// operation is kept and the pass moves on. The connectivity signal is
    /// re-read before each call; once it drops, nothing further is issued.
    pub async fn sync_offline_changes(&mut self) -> SyncOutcome {
        // A drop not yet delivered through `run` still counts
        if self.online && !self.signal.is_online() {
            self.mark_offline();
        }
        if !self.is_online() {
            return SyncOutcome::Skipped(SkipReason::Offline);
        }
        if self.queue.is_empty() {
            return SyncOutcome::Skipped(SkipReason::EmptyQueue);
        }

        let total = self.queue.len();
        self.view
            .notify(Severity::Info, &format!("Syncing {total} changes..."));
        tracing::info!(list_id = self.list_id, pending = total, "Starting sync pass");

        let operations = self.queue.take_sorted();
        let mut retained = Vec::new();
        let mut synced = 0;
        let mut failed = 0;
        let mut deferred = 0;

        let mut remaining = operations.into_iter();
        while let Some(op) = remaining.next() {
            if !self.signal.is_online() {
                retained.push(op);
                retained.extend(remaining.by_ref());
                deferred = retained.len() - failed;
                tracing::warn!(
                    list_id = self.list_id,
                    deferred,
                    "Connection lost during sync, stopping pass"
                );
                break;
            }

            match self.apply(&op).await {
                Ok(()) => synced += 1,
                Err(e) => {
                    tracing::warn!(
                        list_id = self.list_id,
                        kind = op.kind(),
                        timestamp = op.timestamp(),
                        error = %e,
                        "Failed to sync queued operation"
                    );
                    failed += 1;
                    retained.push(op);
                }
            }
        }

        self.queue.replace(retained);
        self.save_queue().await;
        self.publish_status();

        if failed == 0 && deferred == 0 {
            self.view
                .notify(Severity::Success, "All changes synced successfully!");
            self.advance_last_sync().await;
            self.view.refresh_view();
            tracing::info!(list_id = self.list_id, synced, "Sync pass complete");
            return SyncOutcome::Completed { synced };
        }

        if failed > 0 {
            self.view.notify(
                Severity::Error,
                &format!("Failed to sync {failed} changes. Will retry later."),
            );
        } else {
            self.view.notify(
                Severity::Warning,
                &format!("Connection lost during sync. {deferred} changes remain queued."),
            );
        }
        tracing::info!(
            list_id = self.list_id,
            synced,
            failed,
            deferred,
            "Sync pass incomplete"
        );
        SyncOutcome::Incomplete {
            synced,
            failed,
            deferred,
        }
    }

    /// Ask the server for changes made since the last sync.
    ///
    /// Best effort: failures are logged and leave all state untouched.
    pub async fn request_updates_since_last_sync(&mut self) -> UpdatesOutcome {
        if !self.is_online() {
            return UpdatesOutcome::Skipped;
        }

        let since = load_last_sync(&self.store, self.list_id)
            .await
            .unwrap_or(self.last_sync);

        match self.remote.fetch_updates(self.list_id, since).await {
            Ok(updates) => {
                let count = updates.changes.len();
                if count > 0 {
                    self.view.notify(
                        Severity::Info,
                        &format!("Received {count} updates since your last sync."),
                    );
                    self.view.refresh_view();
                }
                self.advance_last_sync().await;
                tracing::debug!(list_id = self.list_id, since, changes = count, "Fetched updates");
                UpdatesOutcome::Fetched(updates)
            }
            Err(e) => {
                tracing::warn!(list_id = self.list_id, since, error = %e, "Failed to get updates");
                UpdatesOutcome::Failed
            }
        }
    }

    // ========================================================================
    // Connectivity
    // ========================================================================

    /// Apply a connectivity transition. Reporting the current state again is
    /// a no-op. Going online runs a sync pass and returns its outcome.
    pub async fn handle_connectivity_change(&mut self, online: bool) -> Option<SyncOutcome> {
        if online == self.online {
            return None;
        }
        if !online {
            self.mark_offline();
            return None;
        }
        self.online = true;
        self.publish_status();

        tracing::info!(list_id = self.list_id, pending = self.queue.len(), "Connection restored");
        if !self.queue.is_empty() {
            self.view
                .notify(Severity::Info, "You are back online. Syncing changes...");
        }
        Some(self.sync_offline_changes().await)
    }

    /// Handle connectivity changes until every [`Connectivity`] handle is
    /// dropped.
    ///
    /// [`Connectivity`]: super::Connectivity
    pub async fn run(&mut self) {
        while let Some(online) = self.signal.changed().await {
            self.handle_connectivity_change(online).await;
        }
        tracing::debug!(list_id = self.list_id, "Connectivity source closed");
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn apply(&mut self, op: &QueuedOperation) -> Result<(), RemoteError> {
        match op {
            QueuedOperation::Add(add) => {
                self.remote
                    .create_item(add.list_id, &add.item_name, &add.category)
                    .await?;
                self.view.remove_pending_item(&add.temp_id);
                Ok(())
            }
            QueuedOperation::Delete(delete) => self.remote.delete_item(delete.item_id).await,
        }
    }

    fn mark_offline(&mut self) {
        self.online = false;
        self.publish_status();
        tracing::info!(list_id = self.list_id, "Connection lost");
        self.view.notify(
            Severity::Warning,
            "You are offline. Changes will be saved locally and synced when you reconnect.",
        );
    }

    async fn save_queue(&self) {
        if let Err(e) = self.queue.persist(&self.store).await {
            tracing::error!(list_id = self.list_id, error = %e, "Failed to persist offline queue");
        }
    }

    async fn advance_last_sync(&mut self) {
        self.last_sync = (self.clock)();
        if let Err(e) = store_last_sync(&self.store, self.list_id, self.last_sync).await {
            tracing::error!(list_id = self.list_id, error = %e, "Failed to persist last-sync timestamp");
        }
    }

    fn publish_status(&mut self) {
        let status = SyncStatus {
            online: self.is_online(),
            pending: self.queue.len(),
        };
        self.view.update_status(status);
    }
}
