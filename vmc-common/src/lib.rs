//! # VMC Common Library
//!
//! Shared code for the volleyball match-control service and its displays:
//! - Match document model (teams, sets, sanctions)
//! - Rules engine: one pure mutator per referee action
//! - Document store abstraction with version-checked persistence
//! - Read-modify-write controller
//! - Event types (MatchEvent) and SSE helpers
//! - Configuration loading
//! - Report projection

pub mod config;
pub mod controller;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod events;
pub mod model;
pub mod report;
pub mod rules;
pub mod sse;
pub mod store;
pub mod time;

pub use controller::{ActionReport, MatchController};
pub use error::{Error, Result};
pub use model::{Match, MatchCode, Side};
pub use rules::{MatchAction, Outcome, RuleRejection};
