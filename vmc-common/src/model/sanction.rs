//! Sanction bookkeeping: misconduct (player/coach) and delay (team)

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::roster::Jersey;
use super::side::PerSide;
use super::Score;

/// Misconduct severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MisconductType {
    /// Warning (yellow card), no point
    W,
    /// Penalty (red card), point to the opponent
    P,
    /// Expulsion for the rest of the set
    #[serde(rename = "EXP")]
    Exp,
    /// Disqualification for the rest of the match
    #[serde(rename = "DISQ")]
    Disq,
}

impl MisconductType {
    pub fn awards_point(self) -> bool {
        !matches!(self, MisconductType::W)
    }
}

/// Delay sanction severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DelayType {
    /// Delay warning, no point
    DW,
    /// Delay penalty, point to the opponent
    DP,
}

impl DelayType {
    pub fn awards_point(self) -> bool {
        matches!(self, DelayType::DP)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonType {
    Player,
    Coach,
}

/// Who received a misconduct sanction
///
/// Serialized as the jersey string or the literal `"coach"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanctionedPerson {
    Player(Jersey),
    Coach,
}

impl SanctionedPerson {
    pub fn person_type(self) -> PersonType {
        match self {
            SanctionedPerson::Player(_) => PersonType::Player,
            SanctionedPerson::Coach => PersonType::Coach,
        }
    }
}

impl Serialize for SanctionedPerson {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SanctionedPerson::Player(jersey) => jersey.serialize(serializer),
            SanctionedPerson::Coach => serializer.serialize_str("coach"),
        }
    }
}

impl<'de> Deserialize<'de> for SanctionedPerson {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        match &value {
            serde_json::Value::String(s) if s.eq_ignore_ascii_case("coach") => {
                Ok(SanctionedPerson::Coach)
            }
            _ => Jersey::deserialize(value)
                .map(SanctionedPerson::Player)
                .map_err(de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MisconductRecord {
    pub set: u32,
    pub time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: MisconductType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_type: Option<PersonType>,
    /// Absent when the sanction panel did not name anyone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<SanctionedPerson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub score: Score,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRecord {
    pub set: u32,
    pub time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: DelayType,
    pub score: Score,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayLog {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub log: Vec<DelayRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanctionSystem {
    #[serde(default)]
    pub misconduct: PerSide<Vec<MisconductRecord>>,
    #[serde(default)]
    pub delay: PerSide<DelayLog>,
}
