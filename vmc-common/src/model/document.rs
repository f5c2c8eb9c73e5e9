//! The match document: one match's complete, authoritative state
//!
//! The document is read and written whole. Every field that was added after
//! the first stored documents has a serde default so historical documents
//! still load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::code::MatchCode;
use super::roster::{Jersey, Lineup, Team};
use super::sanction::SanctionSystem;
use super::side::{PerSide, Side};
use crate::{Error, Result};

/// Points per team
pub type Score = PerSide<u32>;

/// Timeouts allowed per team per set
pub const TIMEOUTS_PER_SET: usize = 2;

/// Substitution limits a match may be configured with
pub const ALLOWED_SUB_LIMITS: [u32; 2] = [6, 8];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchStatus {
    #[default]
    Live,
    Finished,
}

/// Best-of-N format, stored as the integer N
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MatchFormat {
    #[default]
    BestOf3,
    BestOf5,
}

impl MatchFormat {
    pub fn sets(self) -> u32 {
        match self {
            MatchFormat::BestOf3 => 3,
            MatchFormat::BestOf5 => 5,
        }
    }

    /// `ceil(format / 2)`
    pub fn sets_to_win(self) -> u32 {
        self.sets().div_ceil(2)
    }
}

impl TryFrom<u8> for MatchFormat {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            3 => Ok(MatchFormat::BestOf3),
            5 => Ok(MatchFormat::BestOf5),
            other => Err(Error::InvalidArgument(format!(
                "Match format must be best of 3 or 5 (got {})",
                other
            ))),
        }
    }
}

impl From<MatchFormat> for u8 {
    fn from(format: MatchFormat) -> Self {
        format.sets() as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutRecord {
    pub time: DateTime<Utc>,
    pub score: Score,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstitutionRecord {
    pub time: DateTime<Utc>,
    pub score: Score,
    pub player_out: Jersey,
    pub player_in: Jersey,
    /// Court position P1..P6
    pub position: u8,
}

/// Injury replacement outside the normal substitution count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionalSubstitutionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub score: Score,
    pub player_out: Jersey,
    pub player_in: Jersey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

/// One set of the match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRecord {
    pub set_number: u32,
    #[serde(default)]
    pub score: Score,
    #[serde(default)]
    pub serving: Side,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Side>,
    #[serde(default)]
    pub timeouts: PerSide<Vec<TimeoutRecord>>,
    #[serde(default)]
    pub substitutions: PerSide<Vec<SubstitutionRecord>>,
    #[serde(default)]
    pub exceptional_substitutions: PerSide<Vec<ExceptionalSubstitutionRecord>>,
    #[serde(default)]
    pub starting_lineup: PerSide<Lineup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl SetRecord {
    /// A fresh set at 0:0
    pub fn new(set_number: u32, serving: Side, starting_lineup: PerSide<Lineup>, now: DateTime<Utc>) -> Self {
        Self {
            set_number,
            score: Score::default(),
            serving,
            winner: None,
            timeouts: PerSide::default(),
            substitutions: PerSide::default(),
            exceptional_substitutions: PerSide::default(),
            starting_lineup,
            start_time: Some(now),
            end_time: None,
        }
    }

    /// Side ahead on points, `None` on a tie
    pub fn leader(&self) -> Option<Side> {
        use std::cmp::Ordering;
        match self.score.a.cmp(&self.score.b) {
            Ordering::Greater => Some(Side::A),
            Ordering::Less => Some(Side::B),
            Ordering::Equal => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub competition: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub match_number: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub venue: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub city: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub country_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub division: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pool: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub match_date: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub match_time: String,
}

/// Referees, scorers, team staff and collected signatures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Officials {
    pub ref1: String,
    pub ref2: String,
    pub scorer: String,
    pub assist_scorer: String,
    pub coach_a: String,
    pub asst_coach_a: String,
    pub medical_a: String,
    pub trainer_a: String,
    pub coach_b: String,
    pub asst_coach_b: String,
    pub medical_b: String,
    pub trainer_b: String,
    /// Signature key (e.g. `firstRefSign`) to image data URL
    pub signatures: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinTossChoice {
    Serve,
    Receive,
    Side,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinToss {
    /// Team that won the toss
    pub winner: Side,
    pub choice: CoinTossChoice,
    pub first_server: Side,
}

impl CoinToss {
    /// Serve goes to the toss winner when it chose to serve, to the other
    /// team when it chose to receive, and defaults to A when it chose a side
    pub fn new(winner: Side, choice: CoinTossChoice) -> Self {
        let first_server = match choice {
            CoinTossChoice::Serve => winner,
            CoinTossChoice::Receive => winner.opponent(),
            CoinTossChoice::Side => Side::A,
        };
        Self {
            winner,
            choice,
            first_server,
        }
    }
}

fn default_sub_limit() -> u32 {
    6
}

fn default_current_set() -> u32 {
    1
}

/// Root aggregate for one match, keyed by its code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub game_code: MatchCode,
    #[serde(default)]
    pub status: MatchStatus,
    #[serde(default)]
    pub format: MatchFormat,
    #[serde(default = "default_sub_limit")]
    pub sub_limit: u32,
    #[serde(default = "default_current_set")]
    pub current_set: u32,
    #[serde(default)]
    pub sets_won: PerSide<u32>,
    #[serde(default)]
    pub teams: PerSide<Team>,
    /// Index 0 is set 1; slots past the current set may be null
    #[serde(default)]
    pub sets: Vec<Option<SetRecord>>,
    #[serde(default)]
    pub sanction_system: SanctionSystem,
    #[serde(default)]
    pub officials: Officials,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub officials_saved_at: Option<DateTime<Utc>>,
    /// Display orientation only; never changes which data belongs to A or B
    #[serde(default)]
    pub swapped: bool,
    #[serde(default)]
    pub info: MatchInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coin_toss: Option<CoinToss>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Match {
    /// Bare live match with no set initialized yet
    pub fn new(game_code: MatchCode, format: MatchFormat, sub_limit: u32, now: DateTime<Utc>) -> Self {
        Self {
            game_code,
            status: MatchStatus::Live,
            format,
            sub_limit,
            current_set: 1,
            sets_won: PerSide::default(),
            teams: PerSide::default(),
            sets: Vec::new(),
            sanction_system: SanctionSystem::default(),
            officials: Officials::default(),
            officials_saved_at: None,
            swapped: false,
            info: MatchInfo::default(),
            coin_toss: None,
            created_at: now,
            updated_at: now,
            finished_at: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }

    pub fn sets_to_win(&self) -> u32 {
        self.format.sets_to_win()
    }

    fn current_index(&self) -> usize {
        self.current_set.max(1) as usize - 1
    }

    pub fn current_set(&self) -> Option<&SetRecord> {
        self.sets.get(self.current_index()).and_then(Option::as_ref)
    }

    pub fn current_set_mut(&mut self) -> Option<&mut SetRecord> {
        let index = self.current_index();
        self.sets.get_mut(index).and_then(Option::as_mut)
    }

    /// Current set or `InvalidState` when it has not been created
    pub fn require_current_set(&mut self) -> Result<&mut SetRecord> {
        let number = self.current_set;
        self.current_set_mut()
            .ok_or_else(|| Error::InvalidState(format!("No set data found for set {}", number)))
    }

    /// Serve for a set created without an explicit server: the loser of the
    /// previous set if it was decided, else the coin-toss first server, else A
    fn carried_over_serving(&self, index: usize) -> Side {
        let previous = index
            .checked_sub(1)
            .and_then(|i| self.sets.get(i))
            .and_then(Option::as_ref);
        match previous {
            Some(set) => match set.winner {
                Some(winner) => winner.opponent(),
                None => set.serving,
            },
            None => self
                .coin_toss
                .as_ref()
                .map(|toss| toss.first_server)
                .unwrap_or_default(),
        }
    }

    /// Set factory: make sure `sets[current_set - 1]` exists, creating it at
    /// 0:0 with the carried-over server when absent
    pub fn ensure_current_set(&mut self, now: DateTime<Utc>) -> &mut SetRecord {
        let index = self.current_index();
        if self.sets.len() <= index {
            self.sets.resize(index + 1, None);
        }
        let serving = self.carried_over_serving(index);
        let lineup = self.teams.map(|team| team.lineup);
        self.sets[index].get_or_insert_with(|| SetRecord::new(index as u32 + 1, serving, lineup, now))
    }

    /// Score snapshot of the current set, 0:0 when it does not exist
    pub fn current_score(&self) -> Score {
        self.current_set().map(|set| set.score).unwrap_or_default()
    }

    /// Number of decided sets won by `side`
    pub fn decided_sets(&self, side: Side) -> u32 {
        self.sets
            .iter()
            .flatten()
            .filter(|set| set.winner == Some(side))
            .count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code() -> MatchCode {
        MatchCode::parse("ABC123").unwrap()
    }

    #[test]
    fn test_sets_to_win() {
        assert_eq!(MatchFormat::BestOf3.sets_to_win(), 2);
        assert_eq!(MatchFormat::BestOf5.sets_to_win(), 3);
    }

    #[test]
    fn test_format_wire_value() {
        assert_eq!(serde_json::to_string(&MatchFormat::BestOf5).unwrap(), "5");
        assert!(serde_json::from_str::<MatchFormat>("4").is_err());
    }

    #[test]
    fn test_coin_toss_first_server() {
        assert_eq!(CoinToss::new(Side::B, CoinTossChoice::Serve).first_server, Side::B);
        assert_eq!(CoinToss::new(Side::B, CoinTossChoice::Receive).first_server, Side::A);
        assert_eq!(CoinToss::new(Side::B, CoinTossChoice::Side).first_server, Side::A);
    }

    #[test]
    fn test_ensure_current_set_creates_lazily() {
        let now = Utc::now();
        let mut doc = Match::new(code(), MatchFormat::BestOf3, 6, now);
        assert!(doc.current_set().is_none());

        let set = doc.ensure_current_set(now);
        assert_eq!(set.set_number, 1);
        assert_eq!(set.score, Score::default());
        assert_eq!(set.serving, Side::A);
        assert_eq!(doc.sets.len(), 1);
    }

    #[test]
    fn test_ensure_current_set_pads_and_carries_serve() {
        let now = Utc::now();
        let mut doc = Match::new(code(), MatchFormat::BestOf5, 6, now);
        let mut first = SetRecord::new(1, Side::A, PerSide::default(), now);
        first.winner = Some(Side::A);
        doc.sets.push(Some(first));
        doc.current_set = 3;

        let set = doc.ensure_current_set(now);
        assert_eq!(set.set_number, 3);
        assert_eq!(doc.sets.len(), 3);
        // Set 2 slot stays null, so serve falls back to the coin-toss default
        assert!(doc.sets[1].is_none());
        assert_eq!(doc.current_set().map(|s| s.serving), Some(Side::A));
    }

    #[test]
    fn test_ensure_current_set_uses_loser_of_previous() {
        let now = Utc::now();
        let mut doc = Match::new(code(), MatchFormat::BestOf3, 6, now);
        let mut first = SetRecord::new(1, Side::A, PerSide::default(), now);
        first.winner = Some(Side::A);
        doc.sets.push(Some(first));
        doc.current_set = 2;

        assert_eq!(doc.ensure_current_set(now).serving, Side::B);
    }

    #[test]
    fn test_minimal_historical_document_loads() {
        let json = serde_json::json!({
            "gameCode": "OLD001",
            "createdAt": "2025-05-01T10:00:00Z",
            "updatedAt": "2025-05-01T10:00:00Z",
            "sets": [{"setNumber": 1, "score": {"A": 3, "B": 1}, "serving": "A"}],
            "teams": {"A": {"players": [], "lineup": []}, "B": {"players": [], "lineup": []}}
        });
        let doc: Match = serde_json::from_value(json).unwrap();
        assert_eq!(doc.sub_limit, 6);
        assert_eq!(doc.current_set, 1);
        assert_eq!(doc.format, MatchFormat::BestOf3);
        assert_eq!(doc.current_score(), PerSide::new(3, 1));
        assert!(doc.sanction_system.misconduct.a.is_empty());
        assert!(doc.teams.a.lineup.is_empty());
    }

    #[test]
    fn test_exceptional_substitutions_load() {
        let json = serde_json::json!({
            "setNumber": 2,
            "exceptionalSubstitutions": {
                "A": [{"score": {"A": 10, "B": 12}, "playerOut": "4", "playerIn": 9}]
            }
        });
        let set: SetRecord = serde_json::from_value(json).unwrap();
        let record = &set.exceptional_substitutions.a[0];
        assert_eq!(record.player_in, Jersey::new(9).unwrap());
        assert_eq!(record.remark, None);
        assert!(set.exceptional_substitutions.b.is_empty());
    }

    #[test]
    fn test_leader() {
        let now = Utc::now();
        let mut set = SetRecord::new(1, Side::A, PerSide::default(), now);
        assert_eq!(set.leader(), None);
        set.score = PerSide::new(25, 20);
        assert_eq!(set.leader(), Some(Side::A));
    }
}
