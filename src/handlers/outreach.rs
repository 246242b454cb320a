use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{ProblemSummary, SimulationEvent, VendorData};
use crate::state::{AppState, OutreachRun};

const MAX_VENDORS_PER_RUN: usize = 25;

// POST /api/outreach
#[derive(Deserialize)]
pub struct OutreachRequest {
    pub problem: ProblemSummary,
    pub vendors: Vec<VendorData>,
}

#[derive(Serialize)]
pub struct OutreachStarted {
    pub run_id: String,
    pub vendor_count: usize,
}

pub async fn start_outreach(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<OutreachRequest>,
) -> Result<Json<OutreachStarted>, AppError> {
    if payload.vendors.is_empty() {
        return Err(AppError::BadRequest("at least one vendor is required".to_string()));
    }
    if payload.vendors.len() > MAX_VENDORS_PER_RUN {
        return Err(AppError::BadRequest(format!(
            "at most {MAX_VENDORS_PER_RUN} vendors per outreach run"
        )));
    }

    let run_id = uuid::Uuid::new_v4().to_string();
    let cancel = Arc::new(AtomicBool::new(false));
    let vendor_count = payload.vendors.len();

    let pruned = state.prune_runs();
    if pruned > 0 {
        tracing::debug!(pruned, "pruned finished outreach runs");
    }

    state.runs.lock().unwrap().insert(
        run_id.clone(),
        OutreachRun::new(cancel.clone(), payload.vendors.clone()),
    );

    tracing::info!(run_id = %run_id, vendor_count, "starting outreach");

    let problem = Arc::new(payload.problem);
    for vendor in payload.vendors {
        let state = state.clone();
        let run_id = run_id.clone();
        let cancel = cancel.clone();
        let problem = problem.clone();

        // Not awaited: each vendor proceeds on its own.
        tokio::spawn(async move {
            let vendor_id = vendor.id.clone();
            let simulator = state.outreach_simulator();
            let done = simulator
                .run(vendor, &problem, &cancel, |snapshot| {
                    publish_snapshot(&state, &run_id, snapshot)
                })
                .await;

            tracing::info!(
                run_id = %run_id,
                vendor = %vendor_id,
                status = ?done.outreach_status,
                "outreach finished"
            );
            if let Some(run) = state.runs.lock().unwrap().get_mut(&run_id) {
                run.finish_vendor(state.clock.now());
            }
            // No subscribers is fine.
            let _ = state
                .events_tx
                .send(SimulationEvent::OutreachFinished { run_id, vendor_id });
        });
    }

    Ok(Json(OutreachStarted {
        run_id,
        vendor_count,
    }))
}

fn publish_snapshot(state: &AppState, run_id: &str, snapshot: &VendorData) {
    if let Ok(mut runs) = state.runs.lock() {
        if let Some(run) = runs.get_mut(run_id) {
            run.merge(snapshot);
        }
    }
    // No subscribers is fine.
    let _ = state.events_tx.send(SimulationEvent::VendorUpdated {
        run_id: run_id.to_string(),
        vendor: snapshot.clone(),
    });
}

// GET /api/outreach/:run_id
#[derive(Serialize)]
pub struct RunStatus {
    pub run_id: String,
    pub cancelled: bool,
    pub finished: bool,
    pub vendors: Vec<VendorData>,
}

pub async fn get_run(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<String>,
) -> Result<Json<RunStatus>, AppError> {
    let runs = state.runs.lock().unwrap();
    let run = runs
        .get(&run_id)
        .ok_or_else(|| AppError::NotFound(format!("outreach run {run_id}")))?;

    Ok(Json(RunStatus {
        cancelled: run.cancel.load(Ordering::SeqCst),
        finished: run.finished_at.is_some(),
        vendors: run.vendors.clone(),
        run_id,
    }))
}

// POST /api/outreach/:run_id/cancel
pub async fn cancel_run(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let runs = state.runs.lock().unwrap();
    let run = runs
        .get(&run_id)
        .ok_or_else(|| AppError::NotFound(format!("outreach run {run_id}")))?;

    run.cancel.store(true, Ordering::SeqCst);
    tracing::info!(run_id = %run_id, "outreach cancelled");

    Ok(Json(serde_json::json!({"ok": true})))
}
