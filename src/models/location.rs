use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZipLocation {
    pub zip: String,
    pub city: String,
    pub state: String,
    pub lat: f64,
    pub lng: f64,
}
