//! In-process store, used by tests and `--in-memory` runs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::warn;

use super::{MatchStore, StoredMatch};
use crate::events::{EventBus, MatchEvent};
use crate::model::{Match, MatchCode};
use crate::{Error, Result};

pub struct MemoryStore {
    matches: RwLock<HashMap<MatchCode, StoredMatch>>,
    events: EventBus,
}

impl MemoryStore {
    pub fn new(events: EventBus) -> Self {
        Self {
            matches: RwLock::new(HashMap::new()),
            events,
        }
    }

    pub async fn len(&self) -> usize {
        self.matches.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.matches.read().await.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(EventBus::default())
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn fetch(&self, code: &MatchCode) -> Result<StoredMatch> {
        self.matches
            .read()
            .await
            .get(code)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Match {} not found", code)))
    }

    async fn create(&self, document: &Match) -> Result<StoredMatch> {
        let code = document.game_code.clone();
        let stored = StoredMatch {
            version: 1,
            document: document.clone(),
        };

        {
            let mut matches = self.matches.write().await;
            if matches.contains_key(&code) {
                return Err(Error::Conflict(format!("Match {} already exists", code)));
            }
            matches.insert(code.clone(), stored.clone());
        }

        self.events.emit_lossy(MatchEvent::MatchCreated {
            code,
            version: 1,
            document: Box::new(document.clone()),
            timestamp: Utc::now(),
        });
        Ok(stored)
    }

    async fn persist(
        &self,
        code: &MatchCode,
        document: &Match,
        expected_version: u64,
    ) -> Result<u64> {
        let mut matches = self.matches.write().await;
        let stored = matches
            .get_mut(code)
            .ok_or_else(|| Error::NotFound(format!("Match {} not found", code)))?;
        if stored.version != expected_version {
            warn!(
                "Stale write to match {}: expected version {}, stored {}",
                code, expected_version, stored.version
            );
            return Err(Error::Conflict(format!(
                "Match {} was modified (version {} is no longer current)",
                code, expected_version
            )));
        }
        stored.version += 1;
        stored.document = document.clone();
        let version = stored.version;

        // Sent under the write lock so subscribers see versions in order
        self.events.emit_lossy(MatchEvent::MatchUpdated {
            code: code.clone(),
            version,
            document: Box::new(document.clone()),
            timestamp: Utc::now(),
        });
        Ok(version)
    }

    fn events(&self) -> &EventBus {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MatchFormat;

    fn doc(code: &str) -> Match {
        Match::new(MatchCode::parse(code).unwrap(), MatchFormat::BestOf3, 6, Utc::now())
    }

    #[tokio::test]
    async fn test_create_fetch_persist() {
        let store = MemoryStore::default();
        let mut document = doc("MEM001");

        let created = store.create(&document).await.unwrap();
        assert_eq!(created.version, 1);

        document.swapped = true;
        let version = store.persist(&document.game_code, &document, 1).await.unwrap();
        assert_eq!(version, 2);

        let fetched = store.fetch(&document.game_code).await.unwrap();
        assert_eq!(fetched.version, 2);
        assert_eq!(fetched.document, document);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let store = MemoryStore::default();
        store.create(&doc("MEM002")).await.unwrap();
        assert!(matches!(store.create(&doc("MEM002")).await, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn test_stale_persist_conflicts() {
        let store = MemoryStore::default();
        let document = doc("MEM003");
        store.create(&document).await.unwrap();
        store.persist(&document.game_code, &document, 1).await.unwrap();

        let stale = store.persist(&document.game_code, &document, 1).await;
        assert!(matches!(stale, Err(Error::Conflict(_))));
        assert_eq!(store.fetch(&document.game_code).await.unwrap().version, 2);
    }

    #[tokio::test]
    async fn test_missing_match() {
        let store = MemoryStore::default();
        let code = MatchCode::parse("NOPE01").unwrap();
        assert!(matches!(store.fetch(&code).await, Err(Error::NotFound(_))));
        assert!(matches!(
            store.persist(&code, &doc("NOPE01"), 1).await,
            Err(Error::NotFound(_))
        ));
    }
}
