//! SQLite-backed store: one row per match, document as JSON text

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::{debug, warn};

use super::{MatchStore, StoredMatch};
use crate::events::{EventBus, MatchEvent};
use crate::model::{Match, MatchCode};
use crate::{Error, Result};

pub struct SqliteStore {
    pool: SqlitePool,
    events: EventBus,
}

impl SqliteStore {
    /// Wrap a pool prepared by [`crate::db::init_database`]
    pub fn new(pool: SqlitePool, events: EventBus) -> Self {
        Self { pool, events }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn stored_version(&self, code: &MatchCode) -> Result<Option<u64>> {
        let version: Option<i64> = sqlx::query_scalar("SELECT version FROM matches WHERE code = ?")
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(version.map(|v| v as u64))
    }
}

fn version_param(version: u64) -> Result<i64> {
    i64::try_from(version)
        .map_err(|_| Error::InvalidArgument(format!("Version out of range: {}", version)))
}

#[async_trait]
impl MatchStore for SqliteStore {
    async fn fetch(&self, code: &MatchCode) -> Result<StoredMatch> {
        let row = sqlx::query("SELECT version, document FROM matches WHERE code = ?")
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Match {} not found", code)))?;

        let version: i64 = row.get("version");
        let json: String = row.get("document");
        let document: Match = serde_json::from_str(&json)?;

        Ok(StoredMatch {
            version: version as u64,
            document,
        })
    }

    async fn create(&self, document: &Match) -> Result<StoredMatch> {
        let code = &document.game_code;
        let json = serde_json::to_string(document)?;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO matches (code, version, document, created_at, updated_at)
            VALUES (?, 1, ?, ?, ?)
            "#,
        )
        .bind(code.as_str())
        .bind(&json)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(Error::Conflict(format!("Match {} already exists", code)));
            }
            Err(e) => return Err(e.into()),
        }

        debug!("Stored new match {}", code);
        self.events.emit_lossy(MatchEvent::MatchCreated {
            code: code.clone(),
            version: 1,
            document: Box::new(document.clone()),
            timestamp: now,
        });

        Ok(StoredMatch {
            version: 1,
            document: document.clone(),
        })
    }

    async fn persist(
        &self,
        code: &MatchCode,
        document: &Match,
        expected_version: u64,
    ) -> Result<u64> {
        let json = serde_json::to_string(document)?;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE matches
            SET version = version + 1, document = ?, updated_at = ?
            WHERE code = ? AND version = ?
            "#,
        )
        .bind(&json)
        .bind(now)
        .bind(code.as_str())
        .bind(version_param(expected_version)?)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.stored_version(code).await? {
                None => Err(Error::NotFound(format!("Match {} not found", code))),
                Some(stored) => {
                    warn!(
                        "Stale write to match {}: expected version {}, stored {}",
                        code, expected_version, stored
                    );
                    Err(Error::Conflict(format!(
                        "Match {} was modified (version {} is no longer current)",
                        code, expected_version
                    )))
                }
            };
        }

        let version = expected_version + 1;
        self.events.emit_lossy(MatchEvent::MatchUpdated {
            code: code.clone(),
            version,
            document: Box::new(document.clone()),
            timestamp: now,
        });
        Ok(version)
    }

    fn events(&self) -> &EventBus {
        &self.events
    }
}
