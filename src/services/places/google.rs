use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use super::{PlaceRecord, PlacesProvider};
use crate::models::ZipLocation;

pub const GOOGLE_MAPS_BASE_URL: &str = "https://maps.googleapis.com";

const SEARCH_RADIUS_METERS: &str = "16000";

pub struct GoogleMapsProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GoogleMapsProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, GOOGLE_MAPS_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceRecord>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Deserialize)]
struct GeocodeResult {
    address_components: Vec<AddressComponent>,
    geometry: Geometry,
}

#[derive(Deserialize)]
struct AddressComponent {
    long_name: String,
    short_name: String,
    types: Vec<String>,
}

#[derive(Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[async_trait]
impl PlacesProvider for GoogleMapsProvider {
    async fn text_search(
        &self,
        query: &str,
        near: &ZipLocation,
    ) -> anyhow::Result<Vec<PlaceRecord>> {
        let location = format!("{},{}", near.lat, near.lng);
        let data: TextSearchResponse = self
            .client
            .get(format!("{}/maps/api/place/textsearch/json", self.base_url))
            .query(&[
                ("query", format!("{query} near {}", near.zip).as_str()),
                ("location", location.as_str()),
                ("radius", SEARCH_RADIUS_METERS),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .context("failed to call Places text search")?
            .error_for_status()
            .context("Places text search returned error")?
            .json()
            .await
            .context("failed to parse Places response")?;

        match data.status.as_str() {
            "OK" => Ok(data.results),
            "ZERO_RESULTS" => Ok(Vec::new()),
            other => anyhow::bail!(
                "Places search failed ({other}): {}",
                data.error_message.unwrap_or_default()
            ),
        }
    }

    async fn geocode_zip(&self, zip: &str) -> anyhow::Result<Option<ZipLocation>> {
        let data: GeocodeResponse = self
            .client
            .get(format!("{}/maps/api/geocode/json", self.base_url))
            .query(&[
                ("address", zip),
                ("components", "country:US"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .context("failed to call Geocoding API")?
            .error_for_status()
            .context("Geocoding API returned error")?
            .json()
            .await
            .context("failed to parse Geocoding response")?;

        if data.status == "ZERO_RESULTS" {
            return Ok(None);
        }
        if data.status != "OK" {
            anyhow::bail!("Geocoding failed ({})", data.status);
        }

        let Some(result) = data.results.into_iter().next() else {
            return Ok(None);
        };

        let component = |kind: &str, short: bool| {
            result
                .address_components
                .iter()
                .find(|c| c.types.iter().any(|t| t == kind))
                .map(|c| if short { c.short_name.clone() } else { c.long_name.clone() })
                .unwrap_or_default()
        };

        Ok(Some(ZipLocation {
            zip: zip.to_string(),
            city: component("locality", false),
            state: component("administrative_area_level_1", true),
            lat: result.geometry.location.lat,
            lng: result.geometry.location.lng,
        }))
    }
}
