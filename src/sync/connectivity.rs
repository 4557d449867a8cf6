use std::sync::Arc;
use tokio::sync::watch;

/// Source of connectivity events, the counterpart of the browser's
/// `online`/`offline` events.
///
/// Owners call [`set_online`](Self::set_online) when the transport reports a
/// change; each sync manager holds a [`ConnectivitySignal`] obtained from
/// [`subscribe`](Self::subscribe).
#[derive(Debug, Clone)]
pub struct Connectivity {
    tx: Arc<watch::Sender<bool>>,
}

impl Connectivity {
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Self { tx: Arc::new(tx) }
    }

    /// Report the current connectivity. Repeated reports of the same state
    /// do not wake subscribers.
    pub fn set_online(&self, online: bool) {
        self.tx.send_if_modified(|current| {
            if *current == online {
                return false;
            }
            *current = online;
            true
        });
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> ConnectivitySignal {
        ConnectivitySignal {
            rx: self.tx.subscribe(),
        }
    }
}

/// A subscription to connectivity changes. Dropping it unsubscribes.
#[derive(Debug, Clone)]
pub struct ConnectivitySignal {
    rx: watch::Receiver<bool>,
}

impl ConnectivitySignal {
    /// Latest reported state, including changes not yet consumed by
    /// [`changed`](Self::changed).
    pub fn is_online(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for the next change and return the new state.
    ///
    /// Returns `None` once every [`Connectivity`] handle has been dropped.
    pub async fn changed(&mut self) -> Option<bool> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initial_state() {
        let connectivity = Connectivity::new(false);
        let signal = connectivity.subscribe();
        assert!(!signal.is_online());
        assert!(!connectivity.is_online());
    }

    #[tokio::test]
    async fn test_changed_reports_new_state() {
        let connectivity = Connectivity::new(false);
        let mut signal = connectivity.subscribe();
        connectivity.set_online(true);
        assert_eq!(signal.changed().await, Some(true));
        assert!(signal.is_online());
    }

    #[tokio::test]
    async fn test_same_state_does_not_notify() {
        let connectivity = Connectivity::new(true);
        let mut signal = connectivity.subscribe();
        connectivity.set_online(true);

        let waited =
            tokio::time::timeout(std::time::Duration::from_millis(20), signal.changed()).await;
        assert!(waited.is_err(), "no change should have been delivered");
    }

    #[tokio::test]
    async fn test_closed_when_source_dropped() {
        let connectivity = Connectivity::new(true);
        let mut signal = connectivity.subscribe();
        drop(connectivity);
        assert_eq!(signal.changed().await, None);
    }
}
