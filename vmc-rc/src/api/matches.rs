//! Match setup, state and report endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use vmc_common::model::{Match, MatchSetup};
use vmc_common::report::MatchReport;
use vmc_common::store::StoredMatch;

use super::parse_code;
use crate::error::ApiResult;
use crate::AppState;

/// A match document with its store version
#[derive(Debug, Serialize)]
pub struct MatchStateResponse {
    pub version: u64,
    pub document: Match,
}

impl From<StoredMatch> for MatchStateResponse {
    fn from(stored: StoredMatch) -> Self {
        Self {
            version: stored.version,
            document: stored.document,
        }
    }
}

/// POST /api/matches
///
/// Validates the setup form and creates the match with set 1 ready.
pub async fn create_match(
    State(state): State<AppState>,
    payload: Result<Json<MatchSetup>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MatchStateResponse>)> {
    let Json(setup) = payload?;
    let stored = state.controller.create_match(setup).await?;
    Ok((StatusCode::CREATED, Json(stored.into())))
}

/// GET /api/matches/:code
pub async fn get_match(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<MatchStateResponse>> {
    let code = parse_code(&code)?;
    let stored = state.controller.fetch(&code).await?;
    Ok(Json(stored.into()))
}

/// GET /api/matches/:code/report
pub async fn get_report(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<MatchReport>> {
    let code = parse_code(&code)?;
    let stored = state.controller.fetch(&code).await?;
    Ok(Json(MatchReport::from_match(&stored.document)))
}
