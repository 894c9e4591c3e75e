//! Cross-component store events
//!
//! Components that share no direct call path coordinate through a typed
//! broadcast channel instead of ad hoc global signals. Publishing never
//! blocks; subscribers that lag simply miss events (the store's state is
//! always re-readable, so missed invalidations are recoverable by a manual
//! refresh).

use tokio::sync::broadcast;

use crate::store::activity::{ActivityKind, RecentActivity};

/// Events flowing between the data store and its observers.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// The schedule changed somewhere; the store reacts with a full
    /// refresh of every top-level collection.
    ScheduleChanged,

    /// Request to append an entry to the recent-activity log.
    ActivityAdded {
        message: String,
        kind: ActivityKind,
    },

    /// An entry was persisted to the recent-activity log.
    ActivityRecorded { activity: RecentActivity },
}

/// Broadcast channel for [`StoreEvent`]s.
///
/// Cloning the bus is cheap; all clones publish into the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    /// Creates a bus retaining up to `capacity` undelivered events per
    /// subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to all events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    /// Publishes an event to every current subscriber. Publishing with no
    /// subscribers is not an error; the event is dropped.
    pub fn publish(&self, event: StoreEvent) {
        match self.sender.send(event) {
            Ok(delivered) => tracing::debug!("Store event delivered to {} subscribers", delivered),
            Err(_) => tracing::debug!("Store event dropped, no subscribers"),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(32)
    }
}
