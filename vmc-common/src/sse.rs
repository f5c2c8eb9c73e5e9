//! Server-Sent Events (SSE) utilities
//!
//! Displays (scoreboard, referee panel, lineup screen) follow one match over
//! SSE. Each event carries the full document, so clients simply replace
//! their copy.

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::store::{MatchSubscription, StoredMatch};

/// SSE event name for a full match state
pub const MATCH_EVENT: &str = "match";

/// SSE event name sent when the match does not exist
pub const REMOVED_EVENT: &str = "removed";

/// Build the SSE payload for one subscription item
pub fn match_event(state: Option<&StoredMatch>) -> Event {
    match state {
        Some(stored) => {
            let payload = json!({
                "version": stored.version,
                "document": stored.document,
            });
            Event::default().event(MATCH_EVENT).data(payload.to_string())
        }
        None => Event::default().event(REMOVED_EVENT).data("null"),
    }
}

/// Stream a match subscription to one SSE client
///
/// Ends when the store's event bus shuts down.
pub fn create_match_sse_stream(
    mut subscription: MatchSubscription,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let code = subscription.code().clone();
    info!("New SSE client following match {}", code);

    let stream = async_stream::stream! {
        while let Some(state) = subscription.next().await {
            if let Some(stored) = &state {
                debug!("SSE: match {} version {}", code, stored.version);
            }
            yield Ok(match_event(state.as_ref()));
        }
        warn!("SSE: event bus closed, ending stream for match {}", code);
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}
