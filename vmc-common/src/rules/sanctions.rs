//! Misconduct and delay sanctions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Effect, Outcome};
use crate::model::{
    DelayRecord, DelayType, Match, MisconductRecord, MisconductType, SanctionedPerson, Side,
};
use crate::Result;

/// Sanction as entered on the sanction panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "module", rename_all = "lowercase")]
pub enum SanctionPayload {
    Misconduct {
        #[serde(rename = "type")]
        kind: MisconductType,
        #[serde(default)]
        person: Option<SanctionedPerson>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
    Delay {
        #[serde(rename = "type")]
        kind: DelayType,
    },
}

impl SanctionPayload {
    pub fn awards_point(&self) -> bool {
        match self {
            SanctionPayload::Misconduct { kind, .. } => kind.awards_point(),
            SanctionPayload::Delay { kind } => kind.awards_point(),
        }
    }
}

/// Record a sanction against `team`, awarding a point to the opponent for
/// penalty-grade sanctions
///
/// The record carries the score from before the penalty point. Only the
/// opponent's score changes; `serving` is left alone.
pub fn apply_sanction(
    doc: &mut Match,
    team: Side,
    payload: &SanctionPayload,
    now: DateTime<Utc>,
) -> Result<Outcome> {
    let set_number = doc.current_set;
    let set = doc.require_current_set()?;
    let score = set.score;

    let point_awarded_to = payload.awards_point().then(|| team.opponent());
    if let Some(opponent) = point_awarded_to {
        set.score[opponent] += 1;
    }

    let sanctions = &mut doc.sanction_system;
    match payload {
        SanctionPayload::Misconduct {
            kind,
            person,
            reason,
            notes,
        } => sanctions.misconduct[team].push(MisconductRecord {
            set: set_number,
            time: now,
            kind: *kind,
            person_type: person.map(SanctionedPerson::person_type),
            person: *person,
            reason: reason.clone().filter(|r| !r.trim().is_empty()),
            notes: notes.clone().filter(|n| !n.trim().is_empty()),
            score,
        }),
        SanctionPayload::Delay { kind } => {
            let delay = &mut sanctions.delay[team];
            delay.count += 1;
            delay.log.push(DelayRecord {
                set: set_number,
                time: now,
                kind: *kind,
                score,
            });
        }
    }

    debug!(
        "Match {}: sanction on Team {}, point to {:?}",
        doc.game_code, team, point_awarded_to
    );

    Ok(Outcome::Applied(Effect::SanctionRecorded {
        team,
        point_awarded_to,
    }))
}
