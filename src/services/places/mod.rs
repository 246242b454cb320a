pub mod google;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::ZipLocation;

/// One text-search hit as returned by the places service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaceRecord {
    pub name: String,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    pub place_id: String,
    #[serde(default)]
    pub website: Option<String>,
}

#[async_trait]
pub trait PlacesProvider: Send + Sync {
    async fn text_search(
        &self,
        query: &str,
        near: &ZipLocation,
    ) -> anyhow::Result<Vec<PlaceRecord>>;

    async fn geocode_zip(&self, zip: &str) -> anyhow::Result<Option<ZipLocation>>;
}
