use std::env;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub route_queue_size: usize,
    pub event_buffer_size: usize,
    /// OSM name of the administrative area the street graph covers.
    pub area: String,
    pub geocoder_url: String,
    pub geocode_timeout_secs: u64,
    pub overpass_url: String,
    pub graph_fetch_timeout_secs: u64,
    /// Periodic graph rebuild interval; 0 disables the refresh loop.
    pub graph_refresh_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            route_queue_size: parse_or_default("ROUTE_QUEUE_SIZE", 1024)?,
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            area: env::var("AREA_NAME").unwrap_or_else(|_| "Караганда".to_string()),
            geocoder_url: env::var("GEOCODER_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org/search".to_string()),
            geocode_timeout_secs: parse_or_default("GEOCODE_TIMEOUT_SECS", 5)?,
            overpass_url: env::var("OVERPASS_URL")
                .unwrap_or_else(|_| "https://overpass-api.de/api/interpreter".to_string()),
            graph_fetch_timeout_secs: parse_or_default("GRAPH_FETCH_TIMEOUT_SECS", 180)?,
            graph_refresh_secs: parse_or_default("GRAPH_REFRESH_SECS", 0)?,
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
