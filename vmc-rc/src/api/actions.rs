//! Referee action endpoint
//!
//! Rule rejections (timeout or substitution limit, player not on court) are
//! normal answers: HTTP 200 with `ok: false` and a message for the referee.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;
use vmc_common::rules::{Effect, MatchAction, Outcome, RuleRejection};

use super::parse_code;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<Effect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<RuleRejection>,
    pub version: u64,
}

/// POST /api/matches/:code/actions
pub async fn post_action(
    State(state): State<AppState>,
    Path(code): Path<String>,
    payload: Result<Json<MatchAction>, JsonRejection>,
) -> ApiResult<Json<ActionResponse>> {
    let code = parse_code(&code)?;
    let Json(action) = payload?;
    let name = action.name();

    let report = state.controller.execute(&code, action).await?;

    let response = match report.outcome {
        Outcome::Applied(effect) => ActionResponse {
            ok: true,
            message: None,
            effect: Some(effect),
            rejection: None,
            version: report.version,
        },
        Outcome::Rejected(rejection) => {
            info!("Match {}: {} rejected: {}", code, name, rejection);
            ActionResponse {
                ok: false,
                message: Some(rejection.to_string()),
                effect: None,
                rejection: Some(rejection),
                version: report.version,
            }
        }
    };

    Ok(Json(response))
}
