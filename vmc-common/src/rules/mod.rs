//! Match rules engine
//!
//! One pure transition per referee action. Every transition takes the
//! document by `&mut`, validates, and either:
//! - returns `Ok(Outcome::Applied(effect))` with the document updated,
//! - returns `Ok(Outcome::Rejected(reason))` for an expected rule rejection
//!   (the caller shows the reason and may retry with other inputs), or
//! - returns `Err(Error)` for an invalid state or argument.
//!
//! Callers work on a copy of the stored document and only persist it after
//! `Applied`, so a rejected or failed action never leaves a partial write.

mod bench;
mod lineup;
mod officials;
mod sanctions;
mod scoring;

pub use bench::{call_timeout, replace_with_libero, substitute};
pub use lineup::{rotate_lineup, set_lineup, toggle_swap};
pub use officials::save_officials;
pub use sanctions::{apply_sanction, SanctionPayload};
pub use scoring::{add_point, complete_set, finish_match, undo_last_point};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{Jersey, Lineup, Match, Officials, PerSide, Score, Side};
use crate::{Error, Result};

fn default_increment() -> i32 {
    1
}

/// A referee action, as sent by the referee client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchAction {
    /// Add `increment` (usually +1, -1 to correct) to a team's score
    Score {
        team: Side,
        #[serde(default = "default_increment")]
        increment: i32,
    },
    /// Take back the serving team's last point
    Undo,
    /// End the current set; the winner defaults to the side ahead on points
    CompleteSet {
        #[serde(default)]
        winner: Option<Side>,
    },
    Timeout {
        team: Side,
    },
    Substitution {
        team: Side,
        player_out: Jersey,
        player_in: Jersey,
    },
    /// Put a libero into a court slot (0-based index)
    Libero {
        team: Side,
        position_index: usize,
        libero: Jersey,
    },
    Sanction {
        team: Side,
        sanction: SanctionPayload,
    },
    Rotate {
        team: Side,
    },
    Swap,
    FinishMatch,
    SetLineup {
        team: Side,
        lineup: Lineup,
    },
    SaveOfficials {
        officials: Officials,
        #[serde(default)]
        team_names: PerSide<Option<String>>,
    },
}

impl MatchAction {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            MatchAction::Score { .. } => "score",
            MatchAction::Undo => "undo",
            MatchAction::CompleteSet { .. } => "complete_set",
            MatchAction::Timeout { .. } => "timeout",
            MatchAction::Substitution { .. } => "substitution",
            MatchAction::Libero { .. } => "libero",
            MatchAction::Sanction { .. } => "sanction",
            MatchAction::Rotate { .. } => "rotate",
            MatchAction::Swap => "swap",
            MatchAction::FinishMatch => "finish_match",
            MatchAction::SetLineup { .. } => "set_lineup",
            MatchAction::SaveOfficials { .. } => "save_officials",
        }
    }

    /// Actions that create the current set on first touch
    fn initializes_set(&self) -> bool {
        matches!(
            self,
            MatchAction::Score { .. }
                | MatchAction::Timeout { .. }
                | MatchAction::Substitution { .. }
                | MatchAction::Sanction { .. }
        )
    }
}

/// Why an action was refused by a volleyball rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleRejection {
    TimeoutLimitReached { team: Side, limit: usize },
    SubstitutionLimitReached { team: Side, limit: u32 },
    PlayerNotOnCourt { team: Side, jersey: Jersey },
}

impl fmt::Display for RuleRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleRejection::TimeoutLimitReached { team, limit } => {
                write!(f, "Team {} has already used {} timeouts this set", team, limit)
            }
            RuleRejection::SubstitutionLimitReached { team, limit } => {
                write!(f, "Maximum {} substitutions reached for Team {} this set", limit, team)
            }
            RuleRejection::PlayerNotOnCourt { team, jersey } => {
                write!(f, "Player #{} is not on court for Team {}", jersey, team)
            }
        }
    }
}

/// What an applied action changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    ScoreChanged { team: Side, score: Score, serving: Side },
    PointUndone { team: Side, score: Score },
    /// Nothing to do; the document is not written
    Unchanged { reason: String },
    SetCompleted { set_number: u32, winner: Side, match_finished: bool },
    TimeoutRecorded { team: Side, used: usize },
    Substituted { team: Side, position: u8, used: usize },
    LiberoReplaced { team: Side, position: u8 },
    SanctionRecorded { team: Side, point_awarded_to: Option<Side> },
    Rotated { team: Side, lineup: Lineup },
    SwapToggled { swapped: bool },
    MatchFinished,
    LineupUpdated { team: Side },
    OfficialsSaved,
}

impl Effect {
    pub fn changes_document(&self) -> bool {
        !matches!(self, Effect::Unchanged { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Applied(Effect),
    Rejected(RuleRejection),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    /// True when the document must be persisted
    pub fn changes_document(&self) -> bool {
        match self {
            Outcome::Applied(effect) => effect.changes_document(),
            Outcome::Rejected(_) => false,
        }
    }
}

/// Lazy set initialization, run by the controller before `apply`
///
/// Creates `sets[current_set - 1]` for actions that need a live set.
/// Finished matches are left untouched so `apply` can refuse them.
pub fn prepare(doc: &mut Match, action: &MatchAction, now: DateTime<Utc>) {
    if !doc.is_finished() && action.initializes_set() {
        doc.ensure_current_set(now);
    }
}

/// Apply one action to the document
pub fn apply(doc: &mut Match, action: &MatchAction, now: DateTime<Utc>) -> Result<Outcome> {
    if doc.is_finished() {
        return Err(Error::InvalidState(format!(
            "Match {} is finished",
            doc.game_code
        )));
    }

    match action {
        MatchAction::Score { team, increment } => add_point(doc, *team, *increment),
        MatchAction::Undo => undo_last_point(doc),
        MatchAction::CompleteSet { winner } => complete_set(doc, *winner, now),
        MatchAction::Timeout { team } => call_timeout(doc, *team, now),
        MatchAction::Substitution {
            team,
            player_out,
            player_in,
        } => substitute(doc, *team, *player_out, *player_in, now),
        MatchAction::Libero {
            team,
            position_index,
            libero,
        } => replace_with_libero(doc, *team, *position_index, *libero),
        MatchAction::Sanction { team, sanction } => apply_sanction(doc, *team, sanction, now),
        MatchAction::Rotate { team } => rotate_lineup(doc, *team),
        MatchAction::Swap => toggle_swap(doc),
        MatchAction::FinishMatch => finish_match(doc, now),
        MatchAction::SetLineup { team, lineup } => set_lineup(doc, *team, *lineup),
        MatchAction::SaveOfficials {
            officials,
            team_names,
        } => save_officials(doc, officials, team_names, now),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;

    use crate::model::{Jersey, Lineup, Match, MatchCode, MatchFormat, Player, PlayerRole, Team};

    pub fn jersey(n: u8) -> Jersey {
        Jersey::new(n).unwrap()
    }

    pub fn team(name: &str, first: u8) -> Team {
        let players = (first..first + 8)
            .map(|n| Player {
                jersey: jersey(n),
                name: format!("Player {}", n),
                role: if n == first + 7 {
                    PlayerRole::Libero1
                } else {
                    PlayerRole::Player
                },
            })
            .collect();
        Team {
            name: name.to_string(),
            players,
            lineup: Lineup::from_slots((first..first + 6).map(|n| Some(jersey(n)))),
            ..Team::default()
        }
    }

    /// Live best-of-`format` match with set 1 initialized, A on 1..=6, B on 11..=16
    pub fn live_match(format: MatchFormat) -> Match {
        let now = Utc::now();
        let mut doc = Match::new(MatchCode::parse("TEST01").unwrap(), format, 6, now);
        doc.teams.a = team("Warriors", 1);
        doc.teams.b = team("Eagles", 11);
        doc.ensure_current_set(now);
        doc
    }
}
