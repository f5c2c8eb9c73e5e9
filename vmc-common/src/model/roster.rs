//! Rosters, players, jerseys and the 6-slot court lineup

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

use crate::{Error, Result};

/// Maximum number of players on a team sheet
pub const MAX_ROSTER_SIZE: usize = 14;

/// Court positions P1..P6
pub const LINEUP_SLOTS: usize = 6;

/// A shirt number in 1..=99
///
/// Stored documents carry jerseys as strings; numbers are accepted on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Jersey(u8);

impl Jersey {
    pub fn new(number: u8) -> Result<Self> {
        if (1..=99).contains(&number) {
            Ok(Self(number))
        } else {
            Err(Error::InvalidArgument(format!(
                "Jersey must be a number between 1 and 99 (got {})",
                number
            )))
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let number: u8 = trimmed.parse().map_err(|_| {
            Error::InvalidArgument(format!(
                "Jersey must be a number between 1 and 99 (got \"{}\")",
                trimmed
            ))
        })?;
        Self::new(number)
    }

    pub fn number(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Jersey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Jersey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Raw jersey as found in documents: `"7"` or `7`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawJersey {
    Number(u64),
    Text(String),
}

impl RawJersey {
    /// `Ok(None)` for an empty string, which older documents use for an empty slot
    fn into_jersey(self) -> Result<Option<Jersey>> {
        match self {
            RawJersey::Number(n) => {
                let n = u8::try_from(n).map_err(|_| {
                    Error::InvalidArgument(format!("Jersey out of range: {}", n))
                })?;
                Jersey::new(n).map(Some)
            }
            RawJersey::Text(s) if s.trim().is_empty() => Ok(None),
            RawJersey::Text(s) => Jersey::parse(&s).map(Some),
        }
    }
}

impl<'de> Deserialize<'de> for Jersey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        RawJersey::deserialize(deserializer)?
            .into_jersey()
            .map_err(de::Error::custom)?
            .ok_or_else(|| de::Error::custom("empty jersey"))
    }
}

/// Team-sheet role of a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerRole {
    #[default]
    Player,
    Captain,
    Libero1,
    Libero2,
    Liberocaptain,
}

impl PlayerRole {
    pub fn is_libero(self) -> bool {
        matches!(
            self,
            PlayerRole::Libero1 | PlayerRole::Libero2 | PlayerRole::Liberocaptain
        )
    }

    pub fn is_captain(self) -> bool {
        matches!(self, PlayerRole::Captain | PlayerRole::Liberocaptain)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub jersey: Jersey,
    pub name: String,
    #[serde(default)]
    pub role: PlayerRole,
}

/// Six court slots, index = position minus one
///
/// Stored arrays of any length are padded with empty slots (or truncated) to
/// exactly six on read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lineup(pub [Option<Jersey>; LINEUP_SLOTS]);

impl Lineup {
    pub fn from_slots<I>(slots: I) -> Self
    where
        I: IntoIterator<Item = Option<Jersey>>,
    {
        let mut lineup = [None; LINEUP_SLOTS];
        for (slot, jersey) in lineup.iter_mut().zip(slots) {
            *slot = jersey;
        }
        Self(lineup)
    }

    pub fn slots(&self) -> &[Option<Jersey>; LINEUP_SLOTS] {
        &self.0
    }

    /// Zero-based index of the slot holding `jersey`
    pub fn position_of(&self, jersey: Jersey) -> Option<usize> {
        self.0.iter().position(|slot| *slot == Some(jersey))
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    pub fn on_court(&self) -> impl Iterator<Item = Jersey> + '_ {
        self.0.iter().flatten().copied()
    }
}

impl Serialize for Lineup {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Lineup {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw: Vec<Option<RawJersey>> = Vec::deserialize(deserializer)?;
        let mut slots = Vec::with_capacity(raw.len());
        for entry in raw {
            let jersey = match entry {
                Some(raw) => raw.into_jersey().map_err(de::Error::custom)?,
                None => None,
            };
            slots.push(jersey);
        }
        Ok(Lineup::from_slots(slots))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub lineup: Lineup,
    #[serde(default)]
    pub libero_can_serve: bool,
}

impl Team {
    pub fn captain(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.role.is_captain())
    }
}

/// A single broken team-sheet rule
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterViolation {
    #[error("At most {max} players allowed (got {count}).")]
    TooManyPlayers { count: usize, max: usize },
    #[error("Duplicate jersey #{0}.")]
    DuplicateJersey(Jersey),
    #[error("Only one Captain allowed.")]
    MultipleCaptains,
    #[error("Only one Libero + Captain allowed.")]
    MultipleLiberoCaptains,
    #[error("Cannot have both Captain and Libero + Captain. Choose one only.")]
    CaptainAndLiberoCaptain,
    #[error("Only one Libero 1 allowed.")]
    MultipleLibero1,
    #[error("Only one Libero 2 allowed.")]
    MultipleLibero2,
    #[error("Maximum 2 liberos (Libero 1, Libero 2, Libero+Captain).")]
    TooManyLiberos,
    #[error("Jersey #{0} in lineup is not in roster.")]
    LineupNotInRoster(Jersey),
    #[error("Duplicate jersey #{0} in starting lineup (each position must be unique).")]
    LineupDuplicate(Jersey),
}

/// Check the team-sheet invariants; an empty result means the roster is valid
pub fn validate_roster(players: &[Player]) -> Vec<RosterViolation> {
    let mut violations = Vec::new();

    if players.len() > MAX_ROSTER_SIZE {
        violations.push(RosterViolation::TooManyPlayers {
            count: players.len(),
            max: MAX_ROSTER_SIZE,
        });
    }

    let mut seen = Vec::with_capacity(players.len());
    for player in players {
        if seen.contains(&player.jersey) {
            violations.push(RosterViolation::DuplicateJersey(player.jersey));
        }
        seen.push(player.jersey);
    }

    let count = |role: PlayerRole| players.iter().filter(|p| p.role == role).count();
    let captains = count(PlayerRole::Captain);
    let libero_captains = count(PlayerRole::Liberocaptain);
    let libero1 = count(PlayerRole::Libero1);
    let libero2 = count(PlayerRole::Libero2);

    if captains > 1 {
        violations.push(RosterViolation::MultipleCaptains);
    }
    if libero_captains > 1 {
        violations.push(RosterViolation::MultipleLiberoCaptains);
    }
    if captains >= 1 && libero_captains >= 1 {
        violations.push(RosterViolation::CaptainAndLiberoCaptain);
    }
    if libero1 > 1 {
        violations.push(RosterViolation::MultipleLibero1);
    }
    if libero2 > 1 {
        violations.push(RosterViolation::MultipleLibero2);
    }
    if players.iter().filter(|p| p.role.is_libero()).count() > 2 {
        violations.push(RosterViolation::TooManyLiberos);
    }

    violations
}

/// Check a starting lineup against its roster
pub fn validate_lineup(lineup: &Lineup, players: &[Player]) -> Vec<RosterViolation> {
    let mut violations = Vec::new();
    let mut seen = Vec::with_capacity(LINEUP_SLOTS);
    for jersey in lineup.on_court() {
        if !players.iter().any(|p| p.jersey == jersey) {
            violations.push(RosterViolation::LineupNotInRoster(jersey));
        }
        if seen.contains(&jersey) {
            violations.push(RosterViolation::LineupDuplicate(jersey));
        }
        seen.push(jersey);
    }
    violations
}
