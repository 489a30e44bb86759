//! Change notifications
//!
//! Every committed mutation emits one event describing exactly what
//! changed, for external observers (indexers, UIs). Events are published
//! in commit order; subscribers that disconnect are dropped from the
//! fan-out on the next publish.

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::store::OwnerId;

/// A committed change to some namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreEvent {
    /// A key was written for the first time
    ValueStored {
        owner: OwnerId,
        key: String,
        value: String,
    },

    /// An existing key was overwritten
    ValueUpdated {
        owner: OwnerId,
        key: String,
        old_value: String,
        new_value: String,
    },

    /// A key was removed
    ValueDeleted {
        owner: OwnerId,
        key: String,
        value: String,
    },
}

impl StoreEvent {
    /// The namespace the event belongs to
    pub fn owner(&self) -> &OwnerId {
        match self {
            StoreEvent::ValueStored { owner, .. }
            | StoreEvent::ValueUpdated { owner, .. }
            | StoreEvent::ValueDeleted { owner, .. } => owner,
        }
    }

    /// The key the event concerns
    pub fn key(&self) -> &str {
        match self {
            StoreEvent::ValueStored { key, .. }
            | StoreEvent::ValueUpdated { key, .. }
            | StoreEvent::ValueDeleted { key, .. } => key,
        }
    }
}

/// Fan-out of store events to any number of subscribers
#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Sender<StoreEvent>>>,
}

impl EventBus {
    /// Create an event bus with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber and hand back its receiving end
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        let (tx, rx) = channel::unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Deliver an event to every live subscriber
    ///
    /// Senders whose receiver has gone away are pruned here.
    pub fn publish(&self, event: StoreEvent) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Number of live subscribers (as of the last publish)
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
