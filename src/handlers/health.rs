use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::db::queries;
use crate::models::BookingStatus;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthStatus {
    status: &'static str,
    version: &'static str,
    speech: bool,
    places: bool,
    text_model: bool,
    fast_demo: bool,
    /// Stored bookings per status.
    bookings: BTreeMap<&'static str, i64>,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    let mut bookings = BTreeMap::new();
    {
        let db = state.db.lock().unwrap();
        for status in BookingStatus::ALL {
            match queries::count_bookings_by_status(&db, status.as_str()) {
                Ok(count) => {
                    bookings.insert(status.as_str(), count);
                }
                Err(e) => {
                    tracing::warn!(error = %e, status = status.as_str(), "failed to count bookings");
                }
            }
        }
    }

    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        speech: state.speech.is_some(),
        places: state.places.is_some(),
        text_model: state.text_model.is_some(),
        fast_demo: state.config.fast_demo,
        bookings,
    })
}
