//! Court lineup corrections, rotation and display orientation

use std::collections::HashSet;

use super::{Effect, Outcome};
use crate::model::{Lineup, Match, Side};
use crate::{Error, Result};

/// Rotate clockwise: P2 moves to serve, the server moves to P6
pub fn rotate_lineup(doc: &mut Match, team: Side) -> Result<Outcome> {
    let lineup = &mut doc.teams[team].lineup;
    if lineup.is_empty() {
        return Err(Error::InvalidState(format!(
            "Team {} has no lineup to rotate",
            team
        )));
    }
    lineup.0.rotate_left(1);

    Ok(Outcome::Applied(Effect::Rotated {
        team,
        lineup: *lineup,
    }))
}

/// Flip which team is displayed on the left
pub fn toggle_swap(doc: &mut Match) -> Result<Outcome> {
    doc.swapped = !doc.swapped;
    Ok(Outcome::Applied(Effect::SwapToggled {
        swapped: doc.swapped,
    }))
}

/// Replace a team's lineup wholesale
///
/// Jerseys must be unique and, when the team has a roster, on it.
pub fn set_lineup(doc: &mut Match, team: Side, lineup: Lineup) -> Result<Outcome> {
    let roster = &doc.teams[team].players;
    let mut seen = HashSet::new();
    for jersey in lineup.on_court() {
        if !seen.insert(jersey) {
            return Err(Error::InvalidArgument(format!(
                "Duplicate jersey #{} in lineup",
                jersey
            )));
        }
        if !roster.is_empty() && !roster.iter().any(|p| p.jersey == jersey) {
            return Err(Error::InvalidArgument(format!(
                "Jersey #{} is not on Team {}'s roster",
                jersey, team
            )));
        }
    }

    doc.teams[team].lineup = lineup;
    Ok(Outcome::Applied(Effect::LineupUpdated { team }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Jersey, MatchFormat};
    use crate::rules::test_support::{jersey, live_match};

    fn slots(lineup: &Lineup) -> Vec<u8> {
        lineup.on_court().map(Jersey::number).collect()
    }

    #[test]
    fn test_rotate_moves_first_slot_to_end() {
        let mut doc = live_match(MatchFormat::BestOf3);
        rotate_lineup(&mut doc, Side::A).unwrap();
        assert_eq!(slots(&doc.teams.a.lineup), vec![2, 3, 4, 5, 6, 1]);
        assert_eq!(slots(&doc.teams.b.lineup), vec![11, 12, 13, 14, 15, 16]);
    }

    #[test]
    fn test_six_rotations_restore_lineup() {
        let mut doc = live_match(MatchFormat::BestOf3);
        let original = doc.teams.b.lineup;
        for _ in 0..6 {
            rotate_lineup(&mut doc, Side::B).unwrap();
        }
        assert_eq!(doc.teams.b.lineup, original);
    }

    #[test]
    fn test_rotate_empty_lineup_fails() {
        let mut doc = live_match(MatchFormat::BestOf3);
        doc.teams.a.lineup = Lineup::default();
        assert!(matches!(rotate_lineup(&mut doc, Side::A), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_swap_changes_orientation_only() {
        let mut doc = live_match(MatchFormat::BestOf3);
        let before = doc.clone();

        toggle_swap(&mut doc).unwrap();
        assert!(doc.swapped);
        assert_eq!(doc.teams, before.teams);
        assert_eq!(doc.sets, before.sets);

        toggle_swap(&mut doc).unwrap();
        assert_eq!(doc, before);
    }

    #[test]
    fn test_set_lineup_validates_roster() {
        let mut doc = live_match(MatchFormat::BestOf3);

        let from_bench = Lineup::from_slots([7, 2, 3, 4, 5, 6].map(|n| Some(jersey(n))));
        set_lineup(&mut doc, Side::A, from_bench).unwrap();
        assert_eq!(doc.teams.a.lineup, from_bench);

        let stranger = Lineup::from_slots([Some(jersey(40))]);
        assert!(set_lineup(&mut doc, Side::A, stranger).is_err());

        let duplicate = Lineup::from_slots([Some(jersey(2)), Some(jersey(2))]);
        assert!(set_lineup(&mut doc, Side::A, duplicate).is_err());
        assert_eq!(doc.teams.a.lineup, from_bench);
    }
}
