use crate::osm::error::ApiError;
use crate::osm::{retry, RETRY_BACKOFF, RETRY_DELAY, RETRY_TRIES};

use log::info;
use serde::Deserialize;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search.php";
/// Nominatim rejects unidentified clients.
const USER_AGENT: &str = "Mozilla/5.0";
/// Offset turning a located place's OSM id into an Overpass area id.
const AREA_ID_OFFSET: u64 = 3_600_000_000;

/// One geocoding candidate, best match first in the response order.
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimItem {
    pub place_id: u64,
    #[serde(default)]
    pub licence: String,
    pub osm_id: u64,
    pub lat: String,
    pub lon: String,
    pub display_name: String,
    #[serde(default)]
    pub boundingbox: Vec<String>,
}

impl NominatimItem {
    /// The id an Overpass `area(...)` filter accepts for this place.
    pub fn area_id(&self) -> u64 {
        self.osm_id + AREA_ID_OFFSET
    }
}

/// Blocking client for the Nominatim geocoder, sharing the Overpass
/// retry policy.
pub struct NominatimApi {
    url: String,
    client: reqwest::blocking::Client,
}

impl Default for NominatimApi {
    fn default() -> Self {
        Self::with_url(NOMINATIM_URL)
    }
}

impl NominatimApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// All candidates for a free-form place query.
    pub fn search(&self, place: &str, limit: usize) -> Result<Vec<NominatimItem>, ApiError> {
        info!("Locating '{place}'");

        let body = retry(RETRY_TRIES, RETRY_DELAY, RETRY_BACKOFF, || {
            self.fetch(place, limit)
        })?;

        serde_json::from_str(&body)
            .map_err(|error| ApiError::Malformed(format!("nominatim payload: {error}")))
    }

    /// The best candidate for a place query.
    pub fn locate(&self, place: &str) -> Result<NominatimItem, ApiError> {
        self.search(place, 1)?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Malformed(format!("no result found for '{place}'")))
    }

    fn fetch(&self, place: &str, limit: usize) -> Result<String, ApiError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("q", place),
                ("format", "jsonv2"),
                ("limit", &limit.to_string()),
            ])
            .header("User-Agent", USER_AGENT)
            .send()
            .map_err(|error| ApiError::Unavailable(format!("nominatim: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Unavailable(format!(
                "nominatim answered {status}"
            )));
        }

        response
            .text()
            .map_err(|error| ApiError::Unavailable(format!("nominatim: {error}")))
    }
}
