//! Scoring, undo and set/match completion

use chrono::{DateTime, Utc};
use tracing::info;

use super::{Effect, Outcome};
use crate::model::{Match, MatchStatus, Side};
use crate::{Error, Result};

/// Add `increment` to `team`'s score; the scoring team serves next
pub fn add_point(doc: &mut Match, team: Side, increment: i32) -> Result<Outcome> {
    let set = doc.require_current_set()?;

    let next = i64::from(set.score[team]) + i64::from(increment);
    if next < 0 {
        return Err(Error::InvalidState("Score cannot be negative".to_string()));
    }
    set.score[team] = u32::try_from(next)
        .map_err(|_| Error::InvalidArgument(format!("Score increment too large: {}", increment)))?;
    set.serving = team;

    Ok(Outcome::Applied(Effect::ScoreChanged {
        team,
        score: set.score,
        serving: set.serving,
    }))
}

/// Take one point back from the serving team and hand the serve over
///
/// There is no action history: this assumes the serving team scored last,
/// which does not hold after a sanction point or a manual correction.
pub fn undo_last_point(doc: &mut Match) -> Result<Outcome> {
    let set = doc.require_current_set()?;
    let serving = set.serving;

    if set.score[serving] == 0 {
        return Ok(Outcome::Applied(Effect::Unchanged {
            reason: format!("Team {} has no points to undo", serving),
        }));
    }

    set.score[serving] -= 1;
    set.serving = serving.opponent();

    Ok(Outcome::Applied(Effect::PointUndone {
        team: serving,
        score: set.score,
    }))
}

/// Close the current set and either start the next one or finish the match
///
/// `winner` defaults to the side ahead on points.
pub fn complete_set(doc: &mut Match, winner: Option<Side>, now: DateTime<Utc>) -> Result<Outcome> {
    let sets_to_win = doc.sets_to_win();
    let set = doc.require_current_set()?;
    let set_number = set.set_number;

    if let Some(existing) = set.winner {
        return Err(Error::InvalidState(format!(
            "Set {} was already won by Team {}",
            set_number, existing
        )));
    }
    let leader = set
        .leader()
        .ok_or_else(|| Error::InvalidState("Cannot end set with tied score".to_string()))?;
    let winner = winner.unwrap_or(leader);

    set.winner = Some(winner);
    set.end_time = Some(now);

    doc.sets_won[winner] += 1;
    let match_finished = doc.sets_won[winner] >= sets_to_win;

    if match_finished {
        doc.status = MatchStatus::Finished;
        doc.finished_at = Some(now);
        info!(
            "Match {} finished: Team {} wins {}-{}",
            doc.game_code,
            winner,
            doc.sets_won[winner],
            doc.sets_won[winner.opponent()]
        );
    } else {
        doc.current_set += 1;
        // Loser of the set just ended serves first in the next one
        doc.ensure_current_set(now);
        info!(
            "Match {}: set {} won by Team {}, starting set {}",
            doc.game_code, set_number, winner, doc.current_set
        );
    }

    Ok(Outcome::Applied(Effect::SetCompleted {
        set_number,
        winner,
        match_finished,
    }))
}

/// Referee ends the match outside of normal set completion
pub fn finish_match(doc: &mut Match, now: DateTime<Utc>) -> Result<Outcome> {
    doc.status = MatchStatus::Finished;
    doc.finished_at = Some(now);
    info!("Match {} marked finished by referee", doc.game_code);
    Ok(Outcome::Applied(Effect::MatchFinished))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MatchFormat, PerSide};
    use crate::rules::test_support::live_match;

    fn set_score(doc: &mut Match, a: u32, b: u32) {
        doc.current_set_mut().unwrap().score = PerSide::new(a, b);
    }

    #[test]
    fn test_point_moves_serve_to_scorer() {
        let mut doc = live_match(MatchFormat::BestOf3);
        let outcome = add_point(&mut doc, Side::B, 1).unwrap();

        assert!(outcome.is_applied());
        let set = doc.current_set().unwrap();
        assert_eq!(set.score, PerSide::new(0, 1));
        assert_eq!(set.serving, Side::B);
    }

    #[test]
    fn test_negative_score_rejected_without_change() {
        let mut doc = live_match(MatchFormat::BestOf3);
        let before = doc.clone();

        let result = add_point(&mut doc, Side::A, -1);
        assert!(matches!(result, Err(Error::InvalidState(_))));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_scores_never_negative_over_sequence() {
        let mut doc = live_match(MatchFormat::BestOf3);
        for (team, inc) in [(Side::A, 1), (Side::A, -1), (Side::A, -1), (Side::B, 2), (Side::B, -3)] {
            let _ = add_point(&mut doc, team, inc);
            let score = doc.current_score();
            assert!(score.a <= 1 && score.b <= 2);
        }
        assert_eq!(doc.current_score(), PerSide::new(0, 2));
    }

    #[test]
    fn test_undo_reverses_serving_team_point() {
        let mut doc = live_match(MatchFormat::BestOf3);
        add_point(&mut doc, Side::A, 1).unwrap();
        add_point(&mut doc, Side::B, 1).unwrap();

        let outcome = undo_last_point(&mut doc).unwrap();
        assert_eq!(
            outcome,
            Outcome::Applied(Effect::PointUndone {
                team: Side::B,
                score: PerSide::new(1, 0)
            })
        );
        assert_eq!(doc.current_set().unwrap().serving, Side::A);
    }

    #[test]
    fn test_undo_at_zero_is_noop() {
        let mut doc = live_match(MatchFormat::BestOf3);
        let before = doc.clone();
        let outcome = undo_last_point(&mut doc).unwrap();
        assert!(!outcome.changes_document());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_tied_set_cannot_complete() {
        let mut doc = live_match(MatchFormat::BestOf3);
        set_score(&mut doc, 21, 21);
        let before = doc.clone();

        let err = complete_set(&mut doc, Some(Side::A), Utc::now()).unwrap_err();
        assert!(err.to_string().contains("tied score"));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_set_win_increments_sets_won() {
        let mut doc = live_match(MatchFormat::BestOf3);
        set_score(&mut doc, 25, 20);

        complete_set(&mut doc, Some(Side::A), Utc::now()).unwrap();

        assert_eq!(doc.sets_won, PerSide::new(1, 0));
        assert_eq!(doc.sets[0].as_ref().unwrap().winner, Some(Side::A));
        assert!(doc.sets[0].as_ref().unwrap().end_time.is_some());
        assert_eq!(doc.current_set, 2);
        let next = doc.current_set().unwrap();
        assert_eq!(next.serving, Side::B);
        assert_eq!(next.score, PerSide::new(0, 0));
        assert_eq!(doc.sets_won.a, doc.decided_sets(Side::A));
    }

    #[test]
    fn test_winner_defaults_to_leader() {
        let mut doc = live_match(MatchFormat::BestOf3);
        set_score(&mut doc, 18, 25);
        let outcome = complete_set(&mut doc, None, Utc::now()).unwrap();
        assert!(matches!(
            outcome,
            Outcome::Applied(Effect::SetCompleted { winner: Side::B, set_number: 1, match_finished: false })
        ));
    }

    #[test]
    fn test_best_of_three_finishes_after_two_sets() {
        let mut doc = live_match(MatchFormat::BestOf3);
        set_score(&mut doc, 25, 20);
        complete_set(&mut doc, Some(Side::A), Utc::now()).unwrap();
        set_score(&mut doc, 25, 23);
        let outcome = complete_set(&mut doc, Some(Side::A), Utc::now()).unwrap();

        assert!(matches!(
            outcome,
            Outcome::Applied(Effect::SetCompleted { match_finished: true, .. })
        ));
        assert_eq!(doc.status, MatchStatus::Finished);
        assert_eq!(doc.current_set, 2);
        assert_eq!(doc.sets.len(), 2);
        assert!(doc.finished_at.is_some());
    }

    #[test]
    fn test_best_of_five_advances_to_fourth_set() {
        let mut doc = live_match(MatchFormat::BestOf5);
        for (a, b, winner) in [(25, 20, Side::A), (20, 25, Side::B), (25, 22, Side::A)] {
            set_score(&mut doc, a, b);
            complete_set(&mut doc, Some(winner), Utc::now()).unwrap();
        }

        assert_eq!(doc.sets_won, PerSide::new(2, 1));
        assert_eq!(doc.status, MatchStatus::Live);
        assert_eq!(doc.current_set, 4);
        assert_eq!(doc.current_set().unwrap().serving, Side::B);
    }

    #[test]
    fn test_set_cannot_be_won_twice() {
        let mut doc = live_match(MatchFormat::BestOf5);
        set_score(&mut doc, 25, 20);
        doc.current_set_mut().unwrap().winner = Some(Side::A);
        assert!(matches!(
            complete_set(&mut doc, Some(Side::A), Utc::now()),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_finish_match() {
        let mut doc = live_match(MatchFormat::BestOf3);
        finish_match(&mut doc, Utc::now()).unwrap();
        assert!(doc.is_finished());
    }
}
