use crate::errors::AppError;
use crate::models::ZipLocation;

const ZIP_TABLE: &[(&str, &str, &str, f64, f64)] = &[
    ("94102", "San Francisco", "CA", 37.7793, -122.4193),
    ("94110", "San Francisco", "CA", 37.7487, -122.4158),
    ("94301", "Palo Alto", "CA", 37.4443, -122.1598),
    ("90210", "Beverly Hills", "CA", 34.0901, -118.4065),
    ("90012", "Los Angeles", "CA", 34.0614, -118.2385),
    ("10001", "New York", "NY", 40.7506, -73.9972),
    ("02108", "Boston", "MA", 42.3576, -71.0649),
    ("60601", "Chicago", "IL", 41.8858, -87.6181),
    ("98101", "Seattle", "WA", 47.6101, -122.3344),
    ("78701", "Austin", "TX", 30.2711, -97.7437),
    ("30303", "Atlanta", "GA", 33.7525, -84.3888),
    ("80202", "Denver", "CO", 39.7528, -104.9992),
    ("33131", "Miami", "FL", 25.7663, -80.1917),
];

pub fn is_valid_zip_format(zip: &str) -> bool {
    zip.len() == 5 && zip.chars().all(|c| c.is_ascii_digit())
}

/// Resolves a ZIP code through the built-in table.
pub fn lookup_zip(zip: &str) -> Result<ZipLocation, AppError> {
    let zip = zip.trim();
    if !is_valid_zip_format(zip) {
        return Err(AppError::InvalidZip(zip.to_string()));
    }

    ZIP_TABLE
        .iter()
        .find(|(code, ..)| *code == zip)
        .map(|(code, city, state, lat, lng)| ZipLocation {
            zip: code.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            lat: *lat,
            lng: *lng,
        })
        .ok_or_else(|| AppError::InvalidZip(zip.to_string()))
}
