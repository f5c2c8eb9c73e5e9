//! Match report projection
//!
//! A read-only summary of a match document for the printed/exported
//! scoresheet. Missing pieces of older documents show up as zeros, blanks
//! or `None` rather than failing.

use serde::Serialize;

use crate::model::{Match, MatchStatus, PerSide, Side, TIMEOUTS_PER_SET};

/// Signature slots shown on the report, in display order
pub const SIGNATURE_SLOTS: [(&str, &str); 6] = [
    ("captainSignA1", "Captain A"),
    ("coachSignA", "Coach A"),
    ("captainSignB1", "Captain B"),
    ("coachSignB", "Coach B"),
    ("firstRefSign", "1st Referee"),
    ("scorerSign", "Scorer"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptainLine {
    pub jersey: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRow {
    pub set_number: u32,
    pub score: PerSide<u32>,
    pub winner: Option<Side>,
    /// Whole minutes between start and end, when both are known
    pub duration_minutes: Option<i64>,
    pub timeouts: PerSide<usize>,
    pub substitutions: PerSide<usize>,
    pub exceptional_substitutions: PerSide<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SanctionCounts {
    pub misconduct: usize,
    pub delay: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    pub game_code: String,
    pub competition: String,
    pub venue: String,
    pub match_date: String,
    pub match_time: String,
    pub team_names: PerSide<String>,
    pub captains: PerSide<Option<CaptainLine>>,
    pub status: MatchStatus,
    pub best_of: u32,
    pub sub_limit: u32,
    pub sets_won: PerSide<u32>,
    /// Name of the team that won the match, once finished
    pub winner: Option<String>,
    pub sets: Vec<SetRow>,
    pub timeouts_per_set: usize,
    pub sanctions: PerSide<SanctionCounts>,
    pub referees: Vec<(String, String)>,
    /// Labels of the signature slots that have been signed
    pub signed_by: Vec<String>,
}

fn or_default_name(name: &str, side: Side) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        format!("Team {}", side)
    } else {
        trimmed.to_string()
    }
}

impl MatchReport {
    pub fn from_match(doc: &Match) -> Self {
        let team_names = PerSide::new(
            or_default_name(&doc.teams.a.name, Side::A),
            or_default_name(&doc.teams.b.name, Side::B),
        );

        let captains = doc.teams.map(|team| {
            team.captain().map(|p| CaptainLine {
                jersey: p.jersey.to_string(),
                name: p.name.clone(),
            })
        });

        let sets = doc
            .sets
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                slot.as_ref().map(|set| SetRow {
                    set_number: if set.set_number == 0 {
                        index as u32 + 1
                    } else {
                        set.set_number
                    },
                    score: set.score,
                    winner: set.winner,
                    duration_minutes: crate::time::elapsed(set.start_time, set.end_time)
                        .map(|d| d.num_minutes()),
                    timeouts: PerSide::new(set.timeouts.a.len(), set.timeouts.b.len()),
                    substitutions: PerSide::new(
                        set.substitutions.a.len(),
                        set.substitutions.b.len(),
                    ),
                    exceptional_substitutions: PerSide::new(
                        set.exceptional_substitutions.a.len(),
                        set.exceptional_substitutions.b.len(),
                    ),
                })
            })
            .collect();

        let sanctions = PerSide::new(
            SanctionCounts {
                misconduct: doc.sanction_system.misconduct.a.len(),
                delay: doc.sanction_system.delay.a.log.len(),
            },
            SanctionCounts {
                misconduct: doc.sanction_system.misconduct.b.len(),
                delay: doc.sanction_system.delay.b.log.len(),
            },
        );

        let winner = if doc.is_finished() {
            match doc.sets_won.a.cmp(&doc.sets_won.b) {
                std::cmp::Ordering::Greater => Some(team_names.a.clone()),
                std::cmp::Ordering::Less => Some(team_names.b.clone()),
                std::cmp::Ordering::Equal => None,
            }
        } else {
            None
        };

        let officials = &doc.officials;
        let referees = [
            ("1st Referee", &officials.ref1),
            ("2nd Referee", &officials.ref2),
            ("Scorer", &officials.scorer),
            ("Asst. Scorer", &officials.assist_scorer),
            ("Team A - Coach", &officials.coach_a),
            ("Team B - Coach", &officials.coach_b),
        ]
        .into_iter()
        .map(|(role, name)| {
            let name = if name.trim().is_empty() { "-" } else { name.trim() };
            (role.to_string(), name.to_string())
        })
        .collect();

        let signed_by = SIGNATURE_SLOTS
            .iter()
            .filter(|(key, _)| {
                officials
                    .signatures
                    .get(*key)
                    .is_some_and(|data| !data.is_empty())
            })
            .map(|(_, label)| label.to_string())
            .collect();

        Self {
            game_code: doc.game_code.to_string(),
            competition: doc.info.competition.clone(),
            venue: doc.info.venue.clone(),
            match_date: doc.info.match_date.clone(),
            match_time: doc.info.match_time.clone(),
            team_names,
            captains,
            status: doc.status,
            best_of: doc.format.sets(),
            sub_limit: doc.sub_limit,
            sets_won: doc.sets_won,
            winner,
            sets,
            timeouts_per_set: TIMEOUTS_PER_SET,
            sanctions,
            referees,
            signed_by,
        }
    }
}
