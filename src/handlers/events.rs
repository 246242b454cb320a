use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use serde::Deserialize;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::models::SimulationEvent;
use crate::state::AppState;

// GET /api/events (SSE)
#[derive(Deserialize)]
pub struct EventsQuery {
    pub run_id: Option<String>,
}

pub async fn events_stream(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.events_tx.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(event) if matches_run(&event, query.run_id.as_deref()) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().data(data).event(event_name(&event))))
        }
        Ok(_) => None,
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::debug!(skipped, "event subscriber lagged");
            None
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("keepalive"),
    )
}

fn matches_run(event: &SimulationEvent, run_id: Option<&str>) -> bool {
    let Some(wanted) = run_id else {
        return true;
    };
    match event {
        SimulationEvent::VendorUpdated { run_id, .. }
        | SimulationEvent::OutreachFinished { run_id, .. } => run_id == wanted,
        SimulationEvent::BookingLog { .. } => false,
    }
}

fn event_name(event: &SimulationEvent) -> &'static str {
    match event {
        SimulationEvent::VendorUpdated { .. } => "vendor_updated",
        SimulationEvent::OutreachFinished { .. } => "outreach_finished",
        SimulationEvent::BookingLog { .. } => "booking_log",
    }
}
