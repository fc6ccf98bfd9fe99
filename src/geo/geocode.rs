use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::geo::GeoPoint;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("no match")]
    NoMatch,

    #[error("geocoding service did not answer: {0}")]
    Timeout(String),
}

/// Free-text address resolution. Seam for tests and for swapping providers.
#[async_trait]
pub trait Geocode: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<GeoPoint, GeocodeError>;
}

/// Nominatim-style search endpoint: `GET {base}?q=...&format=json&limit=1`.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("delivery-hub/0.1")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    // Nominatim serializes coordinates as strings.
    lat: String,
    lon: String,
}

fn first_hit(hits: &[SearchHit]) -> Result<GeoPoint, GeocodeError> {
    let hit = hits.first().ok_or(GeocodeError::NoMatch)?;

    let lat = hit
        .lat
        .parse::<f64>()
        .map_err(|err| GeocodeError::Timeout(format!("malformed latitude: {err}")))?;
    let lng = hit
        .lon
        .parse::<f64>()
        .map_err(|err| GeocodeError::Timeout(format!("malformed longitude: {err}")))?;

    Ok(GeoPoint { lat, lng })
}

#[async_trait]
impl Geocode for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeoPoint, GeocodeError> {
        let hits = self
            .client
            .get(&self.base_url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|err| GeocodeError::Timeout(err.to_string()))?
            .error_for_status()
            .map_err(|err| GeocodeError::Timeout(err.to_string()))?
            .json::<Vec<SearchHit>>()
            .await
            .map_err(|err| GeocodeError::Timeout(err.to_string()))?;

        first_hit(&hits)
    }
}
