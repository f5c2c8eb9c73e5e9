//! HTTP API handlers for vmc-rc

pub mod actions;
pub mod buildinfo;
pub mod health;
pub mod matches;
pub mod sse;

pub use actions::post_action;
pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use matches::{create_match, get_match, get_report};
pub use sse::match_events;

use vmc_common::MatchCode;

use crate::error::ApiResult;

/// Match code from a URL path segment (case-insensitive)
pub(crate) fn parse_code(raw: &str) -> ApiResult<MatchCode> {
    Ok(MatchCode::parse(raw)?)
}
