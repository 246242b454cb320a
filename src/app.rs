use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::errors::AppError;
use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/transcribe", post(handlers::analysis::transcribe))
        .route("/analyze", post(handlers::analysis::analyze))
        .route("/recommend-term", post(handlers::analysis::recommend))
        .route("/zip/:zip", get(handlers::vendors::zip_lookup))
        .route("/vendors", post(handlers::vendors::find_vendors))
        .route("/outreach", post(handlers::outreach::start_outreach))
        .route("/outreach/:run_id", get(handlers::outreach::get_run))
        .route(
            "/outreach/:run_id/cancel",
            post(handlers::outreach::cancel_run),
        )
        .route("/events", get(handlers::events::events_stream))
        .route("/booking", post(handlers::booking::create_booking))
        .route("/bookings/:id", get(handlers::booking::get_booking))
        .route(
            "/bookings/:id/calendar.ics",
            get(handlers::calendar::download_ics),
        )
        .route(
            "/bookings/:id/receipt",
            get(handlers::calendar::download_receipt),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/api", api)
        .with_state(state)
}

async fn rate_limit(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let client = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "anonymous".to_string());

    if let Err(limit) = state.limiter.check_and_increment(&client) {
        tracing::warn!(client = %client, "rate limit exceeded");
        return AppError::RateLimited(limit).into_response();
    }

    next.run(request).await
}
