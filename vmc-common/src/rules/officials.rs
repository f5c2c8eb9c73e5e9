use chrono::{DateTime, Utc};

use super::{Effect, Outcome};
use crate::model::{Match, Officials, PerSide, Side};
use crate::Result;

/// Store the officials sheet and optionally rename the teams
///
/// Blank team names are ignored so a half-filled form cannot erase them.
pub fn save_officials(
    doc: &mut Match,
    officials: &Officials,
    team_names: &PerSide<Option<String>>,
    now: DateTime<Utc>,
) -> Result<Outcome> {
    doc.officials = officials.clone();
    for side in Side::BOTH {
        if let Some(name) = team_names[side].as_deref().map(str::trim) {
            if !name.is_empty() {
                doc.teams[side].name = name.to_string();
            }
        }
    }
    doc.officials_saved_at = Some(now);
    Ok(Outcome::Applied(Effect::OfficialsSaved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MatchFormat;
    use crate::rules::test_support::live_match;

    #[test]
    fn test_save_officials_and_rename() {
        let mut doc = live_match(MatchFormat::BestOf3);
        let mut officials = Officials {
            ref1: "J. Moreau".to_string(),
            coach_b: "K. Tanaka".to_string(),
            ..Officials::default()
        };
        officials
            .signatures
            .insert("firstRefSign".to_string(), "data:image/png;base64,AAAA".to_string());

        let names = PerSide::new(Some("  Lions ".to_string()), Some("   ".to_string()));
        save_officials(&mut doc, &officials, &names, Utc::now()).unwrap();

        assert_eq!(doc.officials, officials);
        assert_eq!(doc.teams.a.name, "Lions");
        assert_eq!(doc.teams.b.name, "Eagles");
        assert!(doc.officials_saved_at.is_some());
    }
}
