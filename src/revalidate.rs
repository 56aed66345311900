//! Revalidation signal.
//!
//! Every successful mutation bumps a monotonic revision and publishes which
//! views went stale. In-process clients subscribe to the channel; remote
//! clients poll `/api/revision` and re-fetch when the number moves. Reading
//! never changes the bus, so any number of pollers see the same value.

use std::collections::HashSet;
use tokio::sync::watch;

/// Categories of mutations that make cached views stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// A task was created, updated, deleted, restored, or cloned.
    TaskChanged,
    /// A label was created.
    LabelChanged,
    /// Soft-deleted tasks were purged by the retention sweep.
    TasksPurged,
}

impl MutationKind {
    /// Views that must be re-fetched after this kind of mutation.
    pub fn affected_paths(&self) -> &'static [&'static str] {
        match self {
            MutationKind::TaskChanged => &["/", "/api/tasks", "/api/labels"],
            MutationKind::LabelChanged => &["/api/labels"],
            MutationKind::TasksPurged => &["/api/labels"],
        }
    }
}

/// Snapshot delivered to watchers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Revalidation {
    pub revision: u64,
    pub paths: Vec<String>,
}

/// Broadcasts revalidation events. Cheap to share behind an `Arc`.
pub struct RevalidationBus {
    tx: watch::Sender<Revalidation>,
}

impl RevalidationBus {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Revalidation::default());
        Self { tx }
    }

    /// Record a mutation and wake watchers.
    pub fn notify(&self, kinds: &[MutationKind]) {
        let mut paths: Vec<String> = kinds
            .iter()
            .flat_map(|k| k.affected_paths().iter().map(|p| (*p).to_string()))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        paths.sort();

        self.tx.send_modify(|current| {
            current.revision += 1;
            current.paths = paths;
        });
        tracing::debug!(revision = self.revision(), ?kinds, "Revalidation requested");
    }

    /// Current revision. Starts at zero.
    pub fn revision(&self) -> u64 {
        self.tx.borrow().revision
    }

    /// Subscribe to revalidation events.
    pub fn subscribe(&self) -> watch::Receiver<Revalidation> {
        self.tx.subscribe()
    }

    /// Most recent event: current revision and the paths its mutation touched.
    pub fn latest(&self) -> Revalidation {
        self.tx.borrow().clone()
    }
}

impl Default for RevalidationBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_bumps_revision() {
        let bus = RevalidationBus::new();
        assert_eq!(bus.revision(), 0);
        bus.notify(&[MutationKind::TaskChanged]);
        bus.notify(&[MutationKind::LabelChanged]);
        assert_eq!(bus.revision(), 2);
    }

    #[test]
    fn test_paths_are_deduplicated_and_reads_do_not_consume() {
        let bus = RevalidationBus::new();
        bus.notify(&[MutationKind::TaskChanged, MutationKind::LabelChanged]);
        let first = bus.latest();
        assert_eq!(first.paths, vec!["/", "/api/labels", "/api/tasks"]);
        assert_eq!(bus.latest(), first);
        assert_eq!(bus.revision(), 1);
    }

    #[tokio::test]
    async fn test_subscriber_sees_change() {
        let bus = RevalidationBus::new();
        let mut rx = bus.subscribe();
        bus.notify(&[MutationKind::LabelChanged]);
        rx.changed().await.unwrap();
        let event = rx.borrow().clone();
        assert_eq!(event.revision, 1);
        assert_eq!(event.paths, vec!["/api/labels"]);
    }
}
