use serde::Serialize;

use crate::models::{Category, VendorData, VendorSource, ZipLocation};
use crate::services::ai::terms::{default_term, recommend_term};
use crate::services::ai::TextModel;
use crate::services::places::{PlaceRecord, PlacesProvider};
use crate::services::random::Dice;
use crate::services::zip::lookup_zip;

const MIN_DISTANCE_MILES: f64 = 0.3;
const MAX_DISTANCE_MILES: f64 = 12.0;
const WHATSAPP_SHARE: f64 = 0.4;

const SAMPLE_PROFILES: &[(&str, f32, u32, bool, bool)] = &[
    // (name template, rating, reviews, web chat, whatsapp)
    ("{label} Pros", 4.8, 212, true, false),
    ("Reliable {label} Co.", 4.6, 148, false, true),
    ("{label} Express", 4.5, 96, false, false),
    ("Neighborhood {label} Services", 4.3, 57, true, true),
];

const DIRECTORY_NAMES: &[&str] = &[
    "{label} Referral Network",
    "Local {label} Guild",
    "Community {label} Co-op",
];

/// External collaborators vendor acquisition may use. Both are optional.
#[derive(Clone, Copy, Default)]
pub struct VendorSources<'a> {
    pub places: Option<&'a dyn PlacesProvider>,
    pub text_model: Option<&'a dyn TextModel>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VendorAcquisition {
    pub vendors: Vec<VendorData>,
    pub location: Option<ZipLocation>,
    pub search_term: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Builds the vendor list for a category near a ZIP code.
///
/// Never fails: when live search is unavailable or errors, sample vendors
/// are returned and `error` carries a message for display.
pub async fn acquire_vendors(
    sources: VendorSources<'_>,
    dice: &dyn Dice,
    category: Category,
    zip: &str,
    problem_text: Option<&str>,
) -> VendorAcquisition {
    let location = resolve_location(sources.places, zip).await;
    let fallback_term = default_term(category).to_string();

    let Some(places) = sources.places else {
        return fallback(
            dice,
            category,
            zip,
            location,
            fallback_term,
            "Maps API key not configured; showing sample vendors".to_string(),
        );
    };

    let Some(near) = location.clone() else {
        return fallback(
            dice,
            category,
            zip,
            None,
            fallback_term,
            format!("Invalid ZIP code: {zip}"),
        );
    };

    let search_term = match (sources.text_model, problem_text) {
        (Some(model), Some(text)) if !text.trim().is_empty() => {
            match recommend_term(model, text).await {
                Ok(term) => term,
                Err(e) => {
                    tracing::debug!(error = %e, "term refinement failed, using category term");
                    fallback_term.clone()
                }
            }
        }
        _ => fallback_term.clone(),
    };

    match places.text_search(&search_term, &near).await {
        Ok(records) => {
            tracing::info!(
                zip,
                term = %search_term,
                results = records.len(),
                "places search complete"
            );
            let mut vendors: Vec<VendorData> = records
                .into_iter()
                .map(|record| vendor_from_place(record, dice))
                .collect();
            vendors.extend(directory_vendors(dice, category, zip));

            VendorAcquisition {
                vendors,
                location,
                search_term,
                error: None,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, zip, "places search failed, using sample vendors");
            fallback(dice, category, zip, location, search_term, e.to_string())
        }
    }
}

async fn resolve_location(places: Option<&dyn PlacesProvider>, zip: &str) -> Option<ZipLocation> {
    if let Ok(location) = lookup_zip(zip) {
        return Some(location);
    }

    let places = places?;
    match places.geocode_zip(zip).await {
        Ok(location) => location,
        Err(e) => {
            tracing::warn!(error = %e, zip, "geocoding failed");
            None
        }
    }
}

fn fallback(
    dice: &dyn Dice,
    category: Category,
    zip: &str,
    location: Option<ZipLocation>,
    search_term: String,
    error: String,
) -> VendorAcquisition {
    let mut vendors = sample_vendors(dice, category);
    vendors.extend(directory_vendors(dice, category, zip));

    VendorAcquisition {
        vendors,
        location,
        search_term,
        error: Some(error),
    }
}

pub fn vendor_from_place(record: PlaceRecord, dice: &dyn Dice) -> VendorData {
    let mut vendor = VendorData::new(record.place_id, record.name, VendorSource::Places);
    vendor.rating = record.rating.unwrap_or(0.0);
    vendor.review_count = record.user_ratings_total.unwrap_or(0);
    vendor.address = record.formatted_address;
    vendor.has_web_chat = record.website.is_some();
    vendor.website = record.website;
    vendor.has_whatsapp = dice.roll() < WHATSAPP_SHARE;
    vendor.has_sms = true;
    vendor.distance_miles = random_distance(dice);
    vendor
}

pub fn sample_vendors(dice: &dyn Dice, category: Category) -> Vec<VendorData> {
    SAMPLE_PROFILES
        .iter()
        .enumerate()
        .map(|(i, (template, rating, reviews, web_chat, whatsapp))| {
            let n = i + 1;
            let mut vendor = VendorData::new(
                format!("sample-{}-{n}", category.as_str()),
                template.replace("{label}", category.label()),
                VendorSource::Sample,
            );
            vendor.rating = *rating;
            vendor.review_count = *reviews;
            vendor.phone = Some(format!("(555) 010-{:04}", 100 + n));
            if *web_chat {
                vendor.website = Some(format!(
                    "https://{}-{n}.example.com",
                    slug(category.label())
                ));
            }
            vendor.has_web_chat = *web_chat;
            vendor.has_whatsapp = *whatsapp;
            vendor.has_sms = true;
            vendor.distance_miles = random_distance(dice);
            vendor
        })
        .collect()
}

/// Directory listings appended to every result. Ids depend only on ZIP and
/// category.
pub fn directory_vendors(dice: &dyn Dice, category: Category, zip: &str) -> Vec<VendorData> {
    let label_slug = slug(category.label());

    DIRECTORY_NAMES
        .iter()
        .enumerate()
        .map(|(i, template)| {
            let n = i + 1;
            let mut vendor = VendorData::new(
                format!("dir-{zip}-{label_slug}-{n}"),
                template.replace("{label}", category.label()),
                VendorSource::Directory,
            );
            vendor.rating = 4.0 + 0.2 * n as f32;
            vendor.review_count = 30 * n as u32;
            vendor.phone = Some(format!("(555) 020-{:04}", 200 + n));
            vendor.has_sms = true;
            vendor.distance_miles = random_distance(dice);
            vendor
        })
        .collect()
}

fn random_distance(dice: &dyn Dice) -> f64 {
    let miles = dice.between(MIN_DISTANCE_MILES, MAX_DISTANCE_MILES);
    (miles * 10.0).round() / 10.0
}

fn slug(label: &str) -> String {
    label
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::models::OutreachStatus;
    use crate::services::random::{ScriptedDice, ThreadDice};

    struct FakePlaces {
        fail: bool,
        searches: AtomicUsize,
        last_query: std::sync::Mutex<String>,
    }

    impl FakePlaces {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                searches: AtomicUsize::new(0),
                last_query: std::sync::Mutex::new(String::new()),
            }
        }
    }

    #[async_trait]
    impl PlacesProvider for FakePlaces {
        async fn text_search(
            &self,
            query: &str,
            _near: &ZipLocation,
        ) -> anyhow::Result<Vec<PlaceRecord>> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            *self.last_query.lock().unwrap() = query.to_string();
            if self.fail {
                anyhow::bail!("REQUEST_DENIED");
            }
            Ok(vec![
                PlaceRecord {
                    name: "Golden Gate HVAC".to_string(),
                    rating: Some(4.7),
                    user_ratings_total: Some(310),
                    formatted_address: Some("1 Market St, San Francisco, CA".to_string()),
                    place_id: "place-1".to_string(),
                    website: Some("https://gghvac.example".to_string()),
                },
                PlaceRecord {
                    name: "Fog City Air".to_string(),
                    rating: None,
                    user_ratings_total: None,
                    formatted_address: None,
                    place_id: "place-2".to_string(),
                    website: None,
                },
            ])
        }

        async fn geocode_zip(&self, _zip: &str) -> anyhow::Result<Option<ZipLocation>> {
            Ok(None)
        }
    }

    struct FixedModel(&'static str);

    #[async_trait]
    impl TextModel for FixedModel {
        async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
            if self.0.is_empty() {
                anyhow::bail!("model offline");
            }
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_places_results_mapped_and_directory_appended() {
        let places = FakePlaces::new(false);
        let sources = VendorSources {
            places: Some(&places),
            text_model: None,
        };

        let result =
            acquire_vendors(sources, &ThreadDice, Category::Hvac, "94102", None).await;

        assert!(result.error.is_none());
        assert_eq!(result.search_term, "hvac repair");
        assert_eq!(result.vendors.len(), 5);
        assert_eq!(result.location.unwrap().city, "San Francisco");

        let first = &result.vendors[0];
        assert_eq!(first.id, "place-1");
        assert_eq!(first.source, VendorSource::Places);
        assert_eq!(first.review_count, 310);
        assert!(first.has_web_chat);
        assert!(!result.vendors[1].has_web_chat);

        for vendor in &result.vendors {
            assert!((0.3..=12.0).contains(&vendor.distance_miles));
            assert_eq!(vendor.outreach_status, OutreachStatus::Pending);
            assert!(vendor.outreach_log.is_empty());
            let tenths = vendor.distance_miles * 10.0;
            assert!((tenths - tenths.round()).abs() < 1e-9);
        }

        let ids: Vec<_> = result.vendors[2..].iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["dir-94102-hvac-1", "dir-94102-hvac-2", "dir-94102-hvac-3"]);
    }

    #[tokio::test]
    async fn test_term_refinement_used_when_available() {
        let places = FakePlaces::new(false);
        let model = FixedModel(r#"{"term": "AC leak repair"}"#);
        let sources = VendorSources {
            places: Some(&places),
            text_model: Some(&model),
        };

        let result = acquire_vendors(
            sources,
            &ThreadDice,
            Category::Hvac,
            "94102",
            Some("My AC is leaking"),
        )
        .await;

        assert_eq!(result.search_term, "ac leak repair");
        assert_eq!(*places.last_query.lock().unwrap(), "ac leak repair");
    }

    #[tokio::test]
    async fn test_term_refinement_failure_ignored() {
        let places = FakePlaces::new(false);
        let model = FixedModel("");
        let sources = VendorSources {
            places: Some(&places),
            text_model: Some(&model),
        };

        let result = acquire_vendors(
            sources,
            &ThreadDice,
            Category::Plumber,
            "10001",
            Some("Toilet overflowing"),
        )
        .await;

        assert!(result.error.is_none());
        assert_eq!(result.search_term, "plumber");
    }

    #[tokio::test]
    async fn test_no_provider_falls_back_to_samples() {
        let result = acquire_vendors(
            VendorSources::default(),
            &ScriptedDice::always_fail(),
            Category::Plumber,
            "94102",
            None,
        )
        .await;

        assert!(result.error.unwrap().contains("not configured"));
        assert_eq!(result.vendors.len(), SAMPLE_PROFILES.len() + 3);
        assert!(result.vendors[..4]
            .iter()
            .all(|v| v.source == VendorSource::Sample && v.phone.is_some()));
        assert_eq!(result.vendors[4].id, "dir-94102-plumbing-1");
        assert_eq!(result.vendors[0].distance_miles, MIN_DISTANCE_MILES);
    }

    #[tokio::test]
    async fn test_search_failure_falls_back() {
        let places = FakePlaces::new(true);
        let sources = VendorSources {
            places: Some(&places),
            text_model: None,
        };

        let result =
            acquire_vendors(sources, &ThreadDice, Category::Pest, "98101", None).await;

        assert!(result.error.unwrap().contains("REQUEST_DENIED"));
        assert_eq!(places.searches.load(Ordering::SeqCst), 1);
        assert!(result.vendors.iter().all(|v| v.source != VendorSource::Places));
        assert_eq!(
            result.vendors.last().unwrap().id,
            "dir-98101-pest-control-3"
        );
    }

    #[tokio::test]
    async fn test_unknown_zip_without_geocode_falls_back() {
        let places = FakePlaces::new(false);
        let sources = VendorSources {
            places: Some(&places),
            text_model: None,
        };

        let result =
            acquire_vendors(sources, &ThreadDice, Category::Roofer, "00000", None).await;

        assert!(result.error.unwrap().starts_with("Invalid ZIP code"));
        assert!(result.location.is_none());
        assert_eq!(places.searches.load(Ordering::SeqCst), 0);
    }
}
