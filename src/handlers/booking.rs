use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{BookingRecord, BookingResult, ProblemSummary, SimulationEvent, VendorData};
use crate::state::AppState;

// POST /api/booking
#[derive(Deserialize)]
pub struct BookingRequest {
    pub vendor: VendorData,
    pub problem: ProblemSummary,
}

#[derive(Serialize)]
pub struct BookingResponse {
    pub booking_id: String,
    pub result: BookingResult,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BookingRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let BookingRequest { vendor, problem } = payload;

    if vendor.eta.is_none() {
        return Err(AppError::BadRequest(
            "vendor has no ETA yet; wait for outreach to complete".to_string(),
        ));
    }

    let simulator = state.booking_simulator();
    let vendor_id = vendor.id.clone();
    let result = simulator
        .run(
            &vendor,
            &problem,
            |channel| tracing::debug!(vendor = %vendor_id, channel = channel.as_str(), "booking attempt"),
            |entry| {
                // No subscribers is fine.
                let _ = state.events_tx.send(SimulationEvent::BookingLog {
                    vendor_id: vendor_id.clone(),
                    entry: entry.clone(),
                });
            },
        )
        .await;

    let record = BookingRecord {
        id: uuid::Uuid::new_v4().to_string(),
        vendor,
        problem,
        result,
        created_at: state.clock.now(),
    };

    {
        let db = state.db.lock().unwrap();
        queries::save_booking(&db, &record).map_err(|e| AppError::Internal(e.to_string()))?;
    }

    tracing::info!(
        booking_id = %record.id,
        status = record.result.status.as_str(),
        channel = record.result.channel.as_str(),
        "booking finished"
    );

    Ok(Json(BookingResponse {
        booking_id: record.id,
        result: record.result,
    }))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BookingRecord>, AppError> {
    load_booking(&state, &id).map(Json)
}

pub(crate) fn load_booking(state: &AppState, id: &str) -> Result<BookingRecord, AppError> {
    let db = state.db.lock().unwrap();
    match queries::get_booking(&db, id) {
        Ok(Some(record)) => Ok(record),
        Ok(None) => Err(AppError::NotFound(format!("booking {id}"))),
        Err(e) => {
            tracing::error!(error = %e, booking_id = id, "failed to load booking");
            Err(AppError::Internal(e.to_string()))
        }
    }
}
