//! Match change events and the in-process EventBus
//!
//! Every persisted write emits one event carrying the full document, so a
//! subscriber can always replace its copy wholesale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::model::{Match, MatchCode};

/// Default broadcast buffer size
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MatchEvent {
    /// A match document was created at version 1
    MatchCreated {
        code: MatchCode,
        version: u64,
        document: Box<Match>,
        timestamp: DateTime<Utc>,
    },

    /// A match document was replaced
    MatchUpdated {
        code: MatchCode,
        version: u64,
        document: Box<Match>,
        timestamp: DateTime<Utc>,
    },
}

impl MatchEvent {
    pub fn event_type(&self) -> &str {
        match self {
            MatchEvent::MatchCreated { .. } => "MatchCreated",
            MatchEvent::MatchUpdated { .. } => "MatchUpdated",
        }
    }

    pub fn code(&self) -> &MatchCode {
        match self {
            MatchEvent::MatchCreated { code, .. } | MatchEvent::MatchUpdated { code, .. } => code,
        }
    }

    pub fn version(&self) -> u64 {
        match self {
            MatchEvent::MatchCreated { version, .. } | MatchEvent::MatchUpdated { version, .. } => {
                *version
            }
        }
    }

    /// Consume the event, keeping only the version and document
    pub fn into_state(self) -> (u64, Match) {
        match self {
            MatchEvent::MatchCreated {
                version, document, ..
            }
            | MatchEvent::MatchUpdated {
                version, document, ..
            } => (version, *document),
        }
    }
}

/// Broadcast channel for match events
///
/// Cloning shares the same channel. Events emitted before a receiver
/// subscribes are not delivered to it.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<MatchEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per receiver
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx, capacity }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MatchEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: MatchEvent,
    ) -> Result<usize, broadcast::error::SendError<MatchEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: MatchEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
