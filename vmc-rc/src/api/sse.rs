//! Live match feed for displays

use axum::{
    extract::{Path, State},
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

use super::parse_code;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/matches/:code/events
///
/// Streams:
/// - `match`: full `{version, document}` on connect and after every write
/// - `removed`: the match does not exist
pub async fn match_events(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let code = parse_code(&code)?;
    let subscription = state.controller.subscribe(&code).await?;
    Ok(vmc_common::sse::create_match_sse_stream(subscription))
}
