//! Forward geocoding and IP-based location detection.
//!
//! Addresses go through the Google geocoding response shape; auto-detect
//! without coordinates falls back to an IP lookup.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use skycast_core::{GeocodingConfig, ReqwestErrorExt, UpstreamError};

use crate::types::Coordinates;

const GEOCODER: &str = "geocoder";
const IP_LOCATOR: &str = "ip locator";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "Skycast/0.1.0";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Where the current network connection appears to be.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IpLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub city: Option<String>,
    /// State or region name
    #[serde(default)]
    pub region: Option<String>,
}

impl IpLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.latitude,
            lon: self.longitude,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Arc<Client>,
    base_url: String,
    ip_locate_url: String,
    api_key: Option<String>,
}

impl Geocoder {
    /// # Errors
    /// Returns `UpstreamError` if the HTTP client cannot be built.
    pub fn new(config: &GeocodingConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| e.into_upstream_error(GEOCODER))?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.clone(),
            ip_locate_url: config.ip_locate_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Resolve a free-text address to coordinates.
    ///
    /// # Errors
    /// Returns `UpstreamError::Geocoding` with the provider status when the
    /// address cannot be resolved, or a transport-level `UpstreamError`.
    #[instrument(skip(self), level = "info")]
    pub async fn geocode(&self, address: &str) -> Result<Coordinates, UpstreamError> {
        let mut query = vec![("address", address.to_string())];
        if let Some(key) = &self.api_key {
            query.push(("key", key.clone()));
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| e.into_upstream_error(GEOCODER))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Provider {
                provider: GEOCODER.to_string(),
                status: status.as_u16(),
                detail,
            });
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| e.into_upstream_error(GEOCODER))?;

        if body.status != "OK" {
            tracing::warn!(
                "Geocoding returned {}: {}",
                body.status,
                body.error_message.as_deref().unwrap_or("no detail")
            );
            return Err(UpstreamError::Geocoding(body.status));
        }

        let first = body
            .results
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::Geocoding("ZERO_RESULTS".to_string()))?;

        let coordinates = Coordinates {
            lat: first.geometry.location.lat,
            lon: first.geometry.location.lng,
        };
        tracing::info!("Geocoded to {},{}", coordinates.lat, coordinates.lon);
        Ok(coordinates)
    }

    /// Approximate location of this machine by public IP.
    ///
    /// # Errors
    /// Returns `UpstreamError` on transport failure, non-2xx status or an
    /// unparseable body.
    #[instrument(skip(self), level = "info")]
    pub async fn locate_by_ip(&self) -> Result<IpLocation, UpstreamError> {
        let response = self
            .client
            .get(&self.ip_locate_url)
            .send()
            .await
            .map_err(|e| e.into_upstream_error(IP_LOCATOR))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Provider {
                provider: IP_LOCATOR.to_string(),
                status: status.as_u16(),
                detail,
            });
        }

        let location: IpLocation = response
            .json()
            .await
            .map_err(|e| e.into_upstream_error(IP_LOCATOR))?;

        if !location.coordinates().is_valid() {
            return Err(UpstreamError::InvalidResponse {
                provider: IP_LOCATOR.to_string(),
                message: format!("coordinates out of range: {:?}", location.coordinates()),
            });
        }

        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn geocoder_for(server: &MockServer) -> Geocoder {
        Geocoder::new(&GeocodingConfig {
            base_url: format!("{}/geocode/json", server.uri()),
            ip_locate_url: format!("{}/json/", server.uri()),
            api_key: Some("geo-key".to_string()),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_geocode_returns_first_result() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geocode/json"))
            .and(query_param("address", "100 Congress Ave, Austin, Texas, USA"))
            .and(query_param("key", "geo-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "OK",
                "results": [
                    { "geometry": { "location": { "lat": 30.2672, "lng": -97.7431 } } },
                    { "geometry": { "location": { "lat": 0.0, "lng": 0.0 } } }
                ]
            })))
            .mount(&server)
            .await;

        let coords = geocoder_for(&server)
            .geocode("100 Congress Ave, Austin, Texas, USA")
            .await
            .unwrap();
        assert_eq!(coords.lat, 30.2672);
        assert_eq!(coords.lon, -97.7431);
    }

    #[tokio::test]
    async fn test_geocode_status_becomes_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geocode/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ZERO_RESULTS",
                "results": []
            })))
            .mount(&server)
            .await;

        let err = geocoder_for(&server).geocode("nowhere").await.unwrap_err();
        assert_eq!(err, UpstreamError::Geocoding("ZERO_RESULTS".to_string()));
    }

    #[tokio::test]
    async fn test_locate_by_ip() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "latitude": 34.0522,
                "longitude": -118.2437,
                "city": "Los Angeles",
                "region": "California"
            })))
            .mount(&server)
            .await;

        let location = geocoder_for(&server).locate_by_ip().await.unwrap();
        assert_eq!(location.city.as_deref(), Some("Los Angeles"));
        assert_eq!(location.region.as_deref(), Some("California"));
    }

    #[tokio::test]
    async fn test_locate_by_ip_rejects_bad_coordinates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "latitude": 500.0,
                "longitude": 0.0
            })))
            .mount(&server)
            .await;

        let err = geocoder_for(&server).locate_by_ip().await.unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidResponse { .. }));
    }
}
