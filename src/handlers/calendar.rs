use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::errors::AppError;
use crate::services::calendar::{generate_ics, generate_receipt};
use crate::state::AppState;

use super::booking::load_booking;

// GET /api/bookings/:id/calendar.ics
pub async fn download_ics(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let record = load_booking(&state, &id)?;

    let ics = generate_ics(&record.result, &record.vendor, &record.problem)
        .ok_or_else(|| AppError::NotFound(format!("booking {id} has no scheduled time")))?;
    let filename = format!("gaspar-booking-{id}.ics");

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        ics,
    )
        .into_response())
}

// GET /api/bookings/:id/receipt
pub async fn download_receipt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let record = load_booking(&state, &id)?;
    let receipt = generate_receipt(&record.result, &record.vendor, &record.problem);

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        receipt,
    )
        .into_response())
}
