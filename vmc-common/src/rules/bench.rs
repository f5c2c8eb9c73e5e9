//! Timeouts, substitutions and libero replacements

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{Effect, Outcome, RuleRejection};
use crate::model::{Jersey, Match, Side, SubstitutionRecord, TimeoutRecord, LINEUP_SLOTS, TIMEOUTS_PER_SET};
use crate::{Error, Result};

/// Record a timeout for `team`; at most two per team per set
pub fn call_timeout(doc: &mut Match, team: Side, now: DateTime<Utc>) -> Result<Outcome> {
    let set = doc.require_current_set()?;
    let used = set.timeouts[team].len();
    if used >= TIMEOUTS_PER_SET {
        return Ok(Outcome::Rejected(RuleRejection::TimeoutLimitReached {
            team,
            limit: TIMEOUTS_PER_SET,
        }));
    }

    let score = set.score;
    set.timeouts[team].push(TimeoutRecord { time: now, score });

    Ok(Outcome::Applied(Effect::TimeoutRecorded {
        team,
        used: used + 1,
    }))
}

/// Swap `player_out` for `player_in` in the slot `player_out` occupies
///
/// Bench eligibility of `player_in` is not checked; the referee client only
/// offers players that are on the roster and off court.
pub fn substitute(
    doc: &mut Match,
    team: Side,
    player_out: Jersey,
    player_in: Jersey,
    now: DateTime<Utc>,
) -> Result<Outcome> {
    let limit = doc.sub_limit;
    let slot = doc.teams[team].lineup.position_of(player_out);
    let set = doc.require_current_set()?;

    let used = set.substitutions[team].len();
    if used as u64 >= u64::from(limit) {
        return Ok(Outcome::Rejected(RuleRejection::SubstitutionLimitReached { team, limit }));
    }
    let Some(index) = slot else {
        return Ok(Outcome::Rejected(RuleRejection::PlayerNotOnCourt {
            team,
            jersey: player_out,
        }));
    };

    let position = index as u8 + 1;
    let score = set.score;
    set.substitutions[team].push(SubstitutionRecord {
        time: now,
        score,
        player_out,
        player_in,
        position,
    });
    doc.teams[team].lineup.0[index] = Some(player_in);

    debug!(
        "Match {}: Team {} #{} out, #{} in at P{}",
        doc.game_code, team, player_out, player_in, position
    );

    Ok(Outcome::Applied(Effect::Substituted {
        team,
        position,
        used: used + 1,
    }))
}

/// Put `libero` into court slot `position_index` (0-based)
///
/// Libero replacements are unlimited and leave no substitution record.
pub fn replace_with_libero(
    doc: &mut Match,
    team: Side,
    position_index: usize,
    libero: Jersey,
) -> Result<Outcome> {
    if position_index >= LINEUP_SLOTS {
        return Err(Error::InvalidArgument(format!(
            "Position index must be 0-{} (got {})",
            LINEUP_SLOTS - 1,
            position_index
        )));
    }

    doc.teams[team].lineup.0[position_index] = Some(libero);

    Ok(Outcome::Applied(Effect::LiberoReplaced {
        team,
        position: position_index as u8 + 1,
    }))
}
