//! Game setup: validating team sheets and building the initial document

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::code::MatchCode;
use super::document::{CoinToss, CoinTossChoice, Match, MatchFormat, MatchInfo, Officials, ALLOWED_SUB_LIMITS};
use super::roster::{validate_lineup, validate_roster, Team};
use super::side::{PerSide, Side};
use crate::{Error, Result};

fn default_format() -> u8 {
    3
}

fn default_sub_limit() -> u32 {
    6
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinTossSetup {
    pub winner: Side,
    pub choice: CoinTossChoice,
}

/// Everything the setup form collects before a match goes live
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSetup {
    pub game_code: String,
    #[serde(default = "default_format")]
    pub format: u8,
    #[serde(default = "default_sub_limit")]
    pub sub_limit: u32,
    #[serde(default)]
    pub info: MatchInfo,
    #[serde(default)]
    pub officials: Officials,
    #[serde(default)]
    pub teams: PerSide<Team>,
    #[serde(default)]
    pub coin_toss: Option<CoinTossSetup>,
}

impl MatchSetup {
    /// Validate the setup and build a live document with set 1 pre-populated
    ///
    /// All team-sheet problems are reported together in one `InvalidArgument`.
    pub fn build(self, now: DateTime<Utc>) -> Result<Match> {
        let code = MatchCode::parse(&self.game_code)?;
        let format = MatchFormat::try_from(self.format)?;
        if !ALLOWED_SUB_LIMITS.contains(&self.sub_limit) {
            return Err(Error::InvalidArgument(format!(
                "Substitution limit must be 6 or 8 (got {})",
                self.sub_limit
            )));
        }

        let mut problems = Vec::new();
        for (side, team) in self.teams.iter() {
            for violation in validate_roster(&team.players)
                .into_iter()
                .chain(validate_lineup(&team.lineup, &team.players))
            {
                problems.push(format!("Team {}: {}", side, violation));
            }
        }
        if !problems.is_empty() {
            return Err(Error::InvalidArgument(problems.join(" ")));
        }

        let mut doc = Match::new(code, format, self.sub_limit, now);
        doc.info = self.info;
        doc.officials = self.officials;
        doc.coin_toss = self
            .coin_toss
            .map(|toss| CoinToss::new(toss.winner, toss.choice));
        doc.teams = self.teams;
        for side in Side::BOTH {
            if doc.teams[side].name.trim().is_empty() {
                doc.teams[side].name = format!("Team {}", side);
            }
        }
        doc.ensure_current_set(now);
        Ok(doc)
    }
}
