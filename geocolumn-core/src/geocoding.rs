use crate::credentials::ApiKey;
use crate::error::RequestFailed;
use crate::GeocodeConfig;
use anyhow::{Context, Result};
use serde::Deserialize;

/// One result entry returned by the geocoding service
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub formatted_address: String,
    pub lat: f64,
    pub lon: f64,
}

/// Forward and reverse geocoding behind one call signature
///
/// An empty `Vec` means the service answered but found nothing; that is not a
/// failure. Implementations must not retry or cache.
pub trait Geocoder: Send + Sync {
    fn forward_geocode(&self, text: &str) -> Result<Vec<Candidate>, RequestFailed>;

    fn reverse_geocode(&self, lat: f64, lon: f64) -> Result<Vec<Candidate>, RequestFailed>;
}

/// Google Maps Geocoding API response structure
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    formatted_address: String,
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

/// Geocoder backed by the Google Maps Geocoding web service
pub struct GoogleMapsClient {
    client: reqwest::blocking::Client,
    api_key: ApiKey,
    endpoint: String,
}

impl GoogleMapsClient {
    /// Build the HTTP session once; it is reused for every request of a run
    pub fn new(api_key: ApiKey, config: &GeocodeConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!("{}/maps/api/geocode/json", config.api_base_url.trim_end_matches('/')),
        })
    }

    fn request(&self, query: &[(&str, String)]) -> Result<Vec<Candidate>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            // The URL carries the API key; keep it out of error text
            .map_err(|e| e.without_url())
            .context("Failed to send geocoding request")?;

        if !response.status().is_success() {
            anyhow::bail!("Geocoding API returned status: {}", response.status());
        }

        let body = response
            .text()
            .map_err(|e| e.without_url())
            .context("Failed to read geocoding response")?;

        parse_response(&body)
    }
}

impl Geocoder for GoogleMapsClient {
    fn forward_geocode(&self, text: &str) -> Result<Vec<Candidate>, RequestFailed> {
        log::debug!("Geocoding '{}'", text);
        Ok(self.request(&[("address", text.to_string())])?)
    }

    fn reverse_geocode(&self, lat: f64, lon: f64) -> Result<Vec<Candidate>, RequestFailed> {
        log::debug!("Reverse geocoding {},{}", lat, lon);
        Ok(self.request(&[("latlng", format!("{},{}", lat, lon))])?)
    }
}

/// Decode a Geocoding API payload into candidates, in service order
fn parse_response(body: &str) -> Result<Vec<Candidate>> {
    let data: GeocodeResponse =
        serde_json::from_str(body).context("Failed to parse geocoding response")?;

    match data.status.as_str() {
        "OK" => Ok(data
            .results
            .into_iter()
            .map(|r| Candidate {
                formatted_address: r.formatted_address,
                lat: r.geometry.location.lat,
                lon: r.geometry.location.lng,
            })
            .collect()),
        "ZERO_RESULTS" => Ok(Vec::new()),
        // REQUEST_DENIED, OVER_QUERY_LIMIT, INVALID_REQUEST, UNKNOWN_ERROR, ...
        status => match data.error_message {
            Some(message) => anyhow::bail!("{} ({})", status, message),
            None => anyhow::bail!("{}", status),
        },
    }
}
