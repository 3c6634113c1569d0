//! Server-sent event stream of `CourierEvent`s.
//!
//! Each event is sent with its variant name as the SSE event type and the
//! JSON-serialized event as data. A slow client that falls behind the bus
//! receives a `lagged` event with the number of dropped notifications.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio::sync::broadcast;
use tokio_stream::Stream;

use courier_types::event::CourierEvent;

use crate::state::AppState;

fn event_name(event: &CourierEvent) -> String {
    serde_json::to_value(event)
        .ok()
        .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_string))
        .unwrap_or_else(|| "event".to_string())
}

/// GET /api/v1/events
pub async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.events.subscribe();
    tracing::debug!(subscribers = state.events.receiver_count(), "event stream opened");

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let data = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
                    yield Ok::<_, Infallible>(Event::default().event(event_name(&event)).data(data));
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "event stream lagged");
                    let data = serde_json::json!({ "skipped": n });
                    yield Ok(Event::default().event("lagged").data(data.to_string()));
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
