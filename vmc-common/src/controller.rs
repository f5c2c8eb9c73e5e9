//! Read-modify-write controller
//!
//! Each referee action is one cycle: fetch the document and its version,
//! apply the rules to a copy, and persist the copy only if the stored
//! version is unchanged. A stale write surfaces as `Conflict`; the
//! controller never retries on its own.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, info};

use crate::model::{Jersey, Lineup, Match, MatchCode, MatchSetup, Officials, PerSide, Side};
use crate::rules::{self, MatchAction, Outcome, SanctionPayload};
use crate::store::{MatchStore, MatchSubscription, StoredMatch};
use crate::time;
use crate::{Error, Result};

/// Result of one controller call
#[derive(Debug, Clone, Serialize)]
pub struct ActionReport {
    pub outcome: Outcome,
    /// Version of `document` in the store
    pub version: u64,
    pub document: Match,
}

#[derive(Clone)]
pub struct MatchController {
    store: Arc<dyn MatchStore>,
    in_flight: Arc<Mutex<HashSet<MatchCode>>>,
}

/// Marks a match as busy until dropped
struct InFlight {
    code: MatchCode,
    set: Arc<Mutex<HashSet<MatchCode>>>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        lock(&self.set).remove(&self.code);
    }
}

/// The set holds plain codes, so a poisoned lock is still consistent
fn lock(set: &Mutex<HashSet<MatchCode>>) -> MutexGuard<'_, HashSet<MatchCode>> {
    set.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MatchController {
    pub fn new(store: Arc<dyn MatchStore>) -> Self {
        Self {
            store,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn store(&self) -> &Arc<dyn MatchStore> {
        &self.store
    }

    pub fn is_in_flight(&self, code: &MatchCode) -> bool {
        lock(&self.in_flight).contains(code)
    }

    fn begin(&self, code: &MatchCode) -> Result<InFlight> {
        if !lock(&self.in_flight).insert(code.clone()) {
            return Err(Error::Busy(format!(
                "An update for match {} is already in progress",
                code
            )));
        }
        Ok(InFlight {
            code: code.clone(),
            set: Arc::clone(&self.in_flight),
        })
    }

    /// Validate a setup form and store the new match at version 1
    pub async fn create_match(&self, setup: MatchSetup) -> Result<StoredMatch> {
        let document = setup.build(time::now())?;
        let stored = self.store.create(&document).await?;
        info!(
            "Created match {} ({} vs {}, best of {})",
            document.game_code,
            document.teams.a.name,
            document.teams.b.name,
            document.format.sets()
        );
        Ok(stored)
    }

    pub async fn fetch(&self, code: &MatchCode) -> Result<StoredMatch> {
        self.store.fetch(code).await
    }

    pub async fn subscribe(&self, code: &MatchCode) -> Result<MatchSubscription> {
        self.store.subscribe(code).await
    }

    /// Run one action through fetch, apply and version-checked persist
    pub async fn execute(&self, code: &MatchCode, action: MatchAction) -> Result<ActionReport> {
        let _guard = self.begin(code)?;

        let stored = self.store.fetch(code).await?;
        let mut document = stored.document.clone();
        let now = time::now();

        rules::prepare(&mut document, &action, now);
        let outcome = rules::apply(&mut document, &action, now)?;

        if !outcome.changes_document() {
            debug!("Match {}: {} left document unchanged", code, action.name());
            return Ok(ActionReport {
                outcome,
                version: stored.version,
                document: stored.document,
            });
        }

        document.updated_at = now;
        let version = self.store.persist(code, &document, stored.version).await?;
        debug!(
            "Match {}: applied {} (version {} -> {})",
            code,
            action.name(),
            stored.version,
            version
        );

        Ok(ActionReport {
            outcome,
            version,
            document,
        })
    }

    pub async fn add_point(&self, code: &MatchCode, team: Side, increment: i32) -> Result<ActionReport> {
        self.execute(code, MatchAction::Score { team, increment }).await
    }

    pub async fn undo_last_point(&self, code: &MatchCode) -> Result<ActionReport> {
        self.execute(code, MatchAction::Undo).await
    }

    pub async fn complete_set(&self, code: &MatchCode, winner: Option<Side>) -> Result<ActionReport> {
        self.execute(code, MatchAction::CompleteSet { winner }).await
    }

    pub async fn call_timeout(&self, code: &MatchCode, team: Side) -> Result<ActionReport> {
        self.execute(code, MatchAction::Timeout { team }).await
    }

    pub async fn substitute(
        &self,
        code: &MatchCode,
        team: Side,
        player_out: Jersey,
        player_in: Jersey,
    ) -> Result<ActionReport> {
        self.execute(
            code,
            MatchAction::Substitution {
                team,
                player_out,
                player_in,
            },
        )
        .await
    }

    pub async fn replace_with_libero(
        &self,
        code: &MatchCode,
        team: Side,
        position_index: usize,
        libero: Jersey,
    ) -> Result<ActionReport> {
        self.execute(
            code,
            MatchAction::Libero {
                team,
                position_index,
                libero,
            },
        )
        .await
    }

    pub async fn apply_sanction(
        &self,
        code: &MatchCode,
        team: Side,
        sanction: SanctionPayload,
    ) -> Result<ActionReport> {
        self.execute(code, MatchAction::Sanction { team, sanction }).await
    }

    pub async fn rotate_lineup(&self, code: &MatchCode, team: Side) -> Result<ActionReport> {
        self.execute(code, MatchAction::Rotate { team }).await
    }

    pub async fn toggle_swap(&self, code: &MatchCode) -> Result<ActionReport> {
        self.execute(code, MatchAction::Swap).await
    }

    pub async fn finish_match(&self, code: &MatchCode) -> Result<ActionReport> {
        self.execute(code, MatchAction::FinishMatch).await
    }

    pub async fn set_lineup(&self, code: &MatchCode, team: Side, lineup: Lineup) -> Result<ActionReport> {
        self.execute(code, MatchAction::SetLineup { team, lineup }).await
    }

    pub async fn save_officials(
        &self,
        code: &MatchCode,
        officials: Officials,
        team_names: PerSide<Option<String>>,
    ) -> Result<ActionReport> {
        self.execute(
            code,
            MatchAction::SaveOfficials {
                officials,
                team_names,
            },
        )
        .await
    }
}
