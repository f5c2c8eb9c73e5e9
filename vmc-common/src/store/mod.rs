//! Document store abstraction
//!
//! A store keeps one whole JSON document per match code, each with a
//! monotonically increasing version. Writes are version-checked: a
//! `persist` carrying a stale version fails with `Conflict` instead of
//! overwriting a newer document.

mod memory;
#[cfg(feature = "sqlx")]
mod sqlite;

pub use memory::MemoryStore;
#[cfg(feature = "sqlx")]
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

use crate::events::{EventBus, MatchEvent};
use crate::model::{Match, MatchCode};
use crate::Result;

/// A document together with the version it was read at
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMatch {
    pub version: u64,
    pub document: Match,
}

#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Current document, or `NotFound`
    async fn fetch(&self, code: &MatchCode) -> Result<StoredMatch>;

    /// Store a new document at version 1 under its own game code
    ///
    /// Fails with `Conflict` when the code is taken.
    async fn create(&self, document: &Match) -> Result<StoredMatch>;

    /// Replace the document if the stored version still equals
    /// `expected_version`; returns the new version
    async fn persist(&self, code: &MatchCode, document: &Match, expected_version: u64)
        -> Result<u64>;

    /// Bus carrying every successful create and persist
    fn events(&self) -> &EventBus;

    /// Follow one match: the current state first, then every update
    async fn subscribe(&self, code: &MatchCode) -> Result<MatchSubscription> {
        // Receiver first, so nothing persisted after the fetch is missed
        let rx = self.events().subscribe();
        let current = match self.fetch(code).await {
            Ok(stored) => Some(stored),
            Err(crate::Error::NotFound(_)) => None,
            Err(e) => return Err(e),
        };
        Ok(MatchSubscription::new(code.clone(), current, rx))
    }
}

/// Live view of one match
///
/// Yields the state at subscription time (`None` if the match does not
/// exist), then each newer state. Dropping it unsubscribes.
pub struct MatchSubscription {
    code: MatchCode,
    initial: Option<Option<StoredMatch>>,
    last_version: u64,
    rx: broadcast::Receiver<MatchEvent>,
}

impl MatchSubscription {
    pub fn new(
        code: MatchCode,
        current: Option<StoredMatch>,
        rx: broadcast::Receiver<MatchEvent>,
    ) -> Self {
        let last_version = current.as_ref().map_or(0, |stored| stored.version);
        Self {
            code,
            initial: Some(current),
            last_version,
            rx,
        }
    }

    pub fn code(&self) -> &MatchCode {
        &self.code
    }

    /// Next state of the match
    ///
    /// The first call returns the initial state, `Some(None)` when the match
    /// is absent. Returns `None` once the store's bus is closed.
    pub async fn next(&mut self) -> Option<Option<StoredMatch>> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }

        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    if event.code() != &self.code || event.version() <= self.last_version {
                        continue;
                    }
                    let (version, document) = event.into_state();
                    self.last_version = version;
                    return Some(Some(StoredMatch { version, document }));
                }
                Err(RecvError::Lagged(skipped)) => {
                    // Every event is a full document, so the next one is enough
                    warn!(
                        "Subscriber for match {} lagged, skipped {} events",
                        self.code, skipped
                    );
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MatchFormat;
    use chrono::Utc;

    fn event(code: &str, version: u64) -> MatchEvent {
        let code = MatchCode::parse(code).unwrap();
        MatchEvent::MatchUpdated {
            document: Box::new(Match::new(code.clone(), MatchFormat::BestOf3, 6, Utc::now())),
            code,
            version,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_subscription_filters_code_and_stale_versions() {
        let bus = EventBus::new(16);
        let code = MatchCode::parse("SUB001").unwrap();
        let initial = StoredMatch {
            version: 2,
            document: Match::new(code.clone(), MatchFormat::BestOf3, 6, Utc::now()),
        };
        let mut sub = MatchSubscription::new(code.clone(), Some(initial), bus.subscribe());

        bus.emit_lossy(event("SUB001", 2));
        bus.emit_lossy(event("OTHER1", 7));
        bus.emit_lossy(event("SUB001", 3));

        assert_eq!(sub.next().await.unwrap().unwrap().version, 2);
        assert_eq!(sub.next().await.unwrap().unwrap().version, 3);
    }

    #[tokio::test]
    async fn test_lagged_subscription_skips_to_newest() {
        let bus = EventBus::new(2);
        let code = MatchCode::parse("LAG001").unwrap();
        let mut sub = MatchSubscription::new(code, None, bus.subscribe());

        for version in 1..=5 {
            bus.emit_lossy(event("LAG001", version));
        }

        assert_eq!(sub.next().await, Some(None));
        let next = sub.next().await.unwrap().unwrap();
        assert!(next.version >= 4);
    }

    #[tokio::test]
    async fn test_closed_bus_ends_subscription() {
        let bus = EventBus::new(2);
        let code = MatchCode::parse("END001").unwrap();
        let mut sub = MatchSubscription::new(code, None, bus.subscribe());
        drop(bus);

        assert_eq!(sub.next().await, Some(None));
        assert_eq!(sub.next().await, None);
    }
}
