use crate::osm::element::OverpassPayload;
use crate::osm::error::ApiError;
use crate::osm::{retry, RETRY_BACKOFF, RETRY_DELAY, RETRY_TRIES};

use log::info;

const OVERPASS_URL: &str = "https://www.overpass-api.de/api/interpreter";
const QUERY_PREFIX: &str = "[out:json];";

/// Blocking client for the Overpass interpreter. Transport failures and
/// non-200 statuses are retried on the shared backoff policy; a decoded
/// payload or `ApiError` comes back once the budget is spent.
pub struct OverpassApi {
    url: String,
    client: reqwest::blocking::Client,
}

impl Default for OverpassApi {
    fn default() -> Self {
        Self::with_url(OVERPASS_URL)
    }
}

impl OverpassApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Run a query (without its `[out:json];` prefix, which is added
    /// here) and decode the element payload.
    pub fn query(&self, query: &str) -> Result<OverpassPayload, ApiError> {
        let data = format!("{QUERY_PREFIX}{query}");
        info!("Execute the query");

        let body = retry(RETRY_TRIES, RETRY_DELAY, RETRY_BACKOFF, || {
            self.fetch(&data)
        })?;

        serde_json::from_str(&body)
            .map_err(|error| ApiError::Malformed(format!("overpass payload: {error}")))
    }

    fn fetch(&self, data: &str) -> Result<String, ApiError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("data", data)])
            .send()
            .map_err(|error| ApiError::Unavailable(format!("overpass: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Unavailable(format!(
                "overpass answered {status}"
            )));
        }

        response
            .text()
            .map_err(|error| ApiError::Unavailable(format!("overpass: {error}")))
    }
}
