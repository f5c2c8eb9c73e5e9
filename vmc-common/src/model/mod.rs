//! Match document model
//!
//! The schema of one match's state as it is stored and pushed to displays.

mod code;
mod document;
mod roster;
mod sanction;
mod setup;
mod side;

pub use code::{MatchCode, MATCH_CODE_LEN};
pub use document::{
    CoinToss, CoinTossChoice, ExceptionalSubstitutionRecord, Match, MatchFormat, MatchInfo, MatchStatus, Officials, Score,
    SetRecord, SubstitutionRecord, TimeoutRecord, ALLOWED_SUB_LIMITS, TIMEOUTS_PER_SET,
};
pub use roster::{
    validate_lineup, validate_roster, Jersey, Lineup, Player, PlayerRole, RosterViolation, Team,
    LINEUP_SLOTS, MAX_ROSTER_SIZE,
};
pub use sanction::{
    DelayLog, DelayRecord, DelayType, MisconductRecord, MisconductType, PersonType,
    SanctionSystem, SanctionedPerson,
};
pub use setup::{CoinTossSetup, MatchSetup};
pub use side::{PerSide, Side};
