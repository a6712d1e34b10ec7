//! Nominatim-compatible geocoding client.
//!
//! Used by the device and gateway location editors to show the address of
//! the current coordinates and to jump to a searched address. Each lookup is
//! a single request; failures are reported, never retried.

use std::env;
use std::time::Duration;

use reqwest::{Client, Url, header};
use serde::Deserialize;
use simctl_types::lenient;
use thiserror::Error;
use tracing::{debug, warn};

pub const GEOCODER_BASE_ENV: &str = "SIMCTL_GEOCODER_BASE";
pub const DEFAULT_GEOCODER_BASE: &str = "https://nominatim.openstreetmap.org";

/// Shown when the service answers but knows no address for the coordinates.
pub const ADDRESS_NOT_FOUND: &str = "Address not found";
/// Shown when the lookup itself fails.
pub const ADDRESS_LOOKUP_FAILED: &str = "Address lookup failed";

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("invalid geocoder base URL '{0}'")]
    InvalidBase(String),
    #[error("geocoder request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("geocoder returned HTTP {0}")]
    Status(u16),
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default, deserialize_with = "lenient::optional_f64")]
    lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_f64")]
    lon: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct GeocodingClient {
    base_url: Url,
    http: Client,
    user_agent: String,
}

impl GeocodingClient {
    /// Build a client against `SIMCTL_GEOCODER_BASE` or the public Nominatim.
    pub fn new_from_env() -> Result<Self, GeocodeError> {
        let base = env::var(GEOCODER_BASE_ENV).unwrap_or_else(|_| DEFAULT_GEOCODER_BASE.to_string());
        Self::with_base(&base)
    }

    pub fn with_base(base: &str) -> Result<Self, GeocodeError> {
        let trimmed = base.trim_end_matches('/');
        let base_url = Url::parse(&format!("{trimmed}/")).map_err(|_| GeocodeError::InvalidBase(base.to_string()))?;
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            base_url,
            http,
            user_agent: format!("simctl/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    /// Display name of the place at the given coordinates, if the service knows one.
    pub async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Option<String>, GeocodeError> {
        let url = self.endpoint("reverse")?;
        debug!(%url, latitude, longitude, "reverse geocoding");
        let (lat, lon) = (latitude.to_string(), longitude.to_string());
        let response = self
            .http
            .get(url)
            .header(header::USER_AGENT, &self.user_agent)
            .query(&[("format", "json"), ("lat", lat.as_str()), ("lon", lon.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status().as_u16()));
        }
        let body: ReverseResponse = response.json().await?;
        Ok(body.display_name.filter(|name| !name.trim().is_empty()))
    }

    /// Coordinates of the first match for a free-text address.
    pub async fn search(&self, query: &str) -> Result<Option<(f64, f64)>, GeocodeError> {
        let url = self.endpoint("search")?;
        debug!(%url, query, "searching address");
        let response = self
            .http
            .get(url)
            .header(header::USER_AGENT, &self.user_agent)
            .query(&[("format", "json"), ("q", query)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status().as_u16()));
        }
        let hits: Vec<SearchHit> = response.json().await?;
        Ok(hits.into_iter().next().and_then(|hit| hit.lat.zip(hit.lon)))
    }

    /// Address text for display: the resolved name, or the matching fallback.
    pub async fn describe(&self, latitude: f64, longitude: f64) -> String {
        match self.reverse(latitude, longitude).await {
            Ok(Some(name)) => name,
            Ok(None) => ADDRESS_NOT_FOUND.to_string(),
            Err(error) => {
                warn!(%error, "reverse geocoding failed");
                ADDRESS_LOOKUP_FAILED.to_string()
            }
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, GeocodeError> {
        self.base_url
            .join(path)
            .map_err(|_| GeocodeError::InvalidBase(self.base_url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::Query, routing::get};
    use serde_json::{Value, json};
    use std::collections::HashMap;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{address}")
    }

    async fn reverse(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        if params.get("lat").map(String::as_str) == Some("45.5") {
            Json(json!({"display_name": "Montreal, Quebec, Canada"}))
        } else {
            Json(json!({"error": "Unable to geocode"}))
        }
    }

    async fn search(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        match params.get("q").map(String::as_str) {
            Some("Lome") => Json(json!([{"lat": "6.1375", "lon": "1.2123"}, {"lat": "0", "lon": "0"}])),
            _ => Json(json!([])),
        }
    }

    #[tokio::test]
    async fn describe_resolves_or_falls_back() {
        let base = serve(Router::new().route("/reverse", get(reverse))).await;
        let client = GeocodingClient::with_base(&base).unwrap();
        assert_eq!(client.describe(45.5, -73.6).await, "Montreal, Quebec, Canada");
        assert_eq!(client.describe(0.5, 0.5).await, ADDRESS_NOT_FOUND);
    }

    #[tokio::test]
    async fn describe_reports_lookup_failure() {
        let base = serve(Router::new()).await;
        let client = GeocodingClient::with_base(&base).unwrap();
        assert_eq!(client.describe(45.5, -73.6).await, ADDRESS_LOOKUP_FAILED);
    }

    #[tokio::test]
    async fn search_takes_the_first_hit() {
        let base = serve(Router::new().route("/search", get(search))).await;
        let client = GeocodingClient::with_base(&format!("{base}/")).unwrap();
        assert_eq!(client.search("Lome").await.unwrap(), Some((6.1375, 1.2123)));
        assert_eq!(client.search("nowhere").await.unwrap(), None);
    }
}
