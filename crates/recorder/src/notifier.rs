//! State notification for UI consumers.
//!
//! Backed by a `watch` channel: the notifier holds the last known
//! snapshot, any number of consumers can subscribe, and notifying with no
//! subscribers is a silent no-op.

use tokio::sync::watch;

use crate::session::StateSnapshot;

pub struct StateNotifier {
    tx: watch::Sender<StateSnapshot>,
}

impl StateNotifier {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StateSnapshot::idle());
        Self { tx }
    }

    /// Publish a new snapshot. Safe with no subscribers.
    pub fn notify(&self, snapshot: StateSnapshot) {
        self.tx.send_replace(snapshot);
    }

    /// Subscribe to state changes. The receiver immediately holds the last
    /// known snapshot.
    pub fn subscribe(&self) -> watch::Receiver<StateSnapshot> {
        self.tx.subscribe()
    }

    /// The last snapshot published.
    pub fn latest(&self) -> StateSnapshot {
        *self.tx.borrow()
    }
}

impl Default for StateNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_without_subscribers_is_a_no_op() {
        let notifier = StateNotifier::new();
        notifier.notify(StateSnapshot {
            is_recording: true,
            is_paused: false,
            duration_seconds: 3,
        });
        assert_eq!(notifier.latest().duration_seconds, 3);
    }

    #[tokio::test]
    async fn subscribers_observe_the_latest_snapshot() {
        let notifier = StateNotifier::new();
        let mut first = notifier.subscribe();
        let mut second = notifier.subscribe();

        let snapshot = StateSnapshot {
            is_recording: true,
            is_paused: false,
            duration_seconds: 1,
        };
        notifier.notify(snapshot);

        first.changed().await.unwrap();
        second.changed().await.unwrap();
        assert_eq!(*first.borrow(), snapshot);
        assert_eq!(*second.borrow(), snapshot);
    }
}
