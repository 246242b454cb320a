use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{Category, ZipLocation};
use crate::services::vendors::{acquire_vendors, VendorAcquisition, VendorSources};
use crate::services::zip::{is_valid_zip_format, lookup_zip};
use crate::state::AppState;

// GET /api/zip/:zip
pub async fn zip_lookup(Path(zip): Path<String>) -> Result<Json<ZipLocation>, AppError> {
    lookup_zip(&zip).map(Json)
}

// POST /api/vendors
#[derive(Deserialize)]
pub struct VendorsRequest {
    pub category: String,
    pub zip: String,
    pub problem_text: Option<String>,
}

pub async fn find_vendors(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VendorsRequest>,
) -> Result<Json<VendorAcquisition>, AppError> {
    let zip = payload.zip.trim();
    if !is_valid_zip_format(zip) {
        return Err(AppError::InvalidZip(zip.to_string()));
    }

    let category = Category::parse(&payload.category);
    let sources = VendorSources {
        places: state.places.as_deref(),
        text_model: state.text_model.as_deref(),
    };

    let acquisition = acquire_vendors(
        sources,
        state.dice.as_ref(),
        category,
        zip,
        payload.problem_text.as_deref(),
    )
    .await;

    if let Some(error) = &acquisition.error {
        tracing::warn!(zip, category = category.as_str(), %error, "vendor acquisition fell back");
    }

    Ok(Json(acquisition))
}
