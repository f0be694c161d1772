//! Forward geocoding of place addresses through the Mapbox Places API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use common::{AppError, AppResult, GeocoderConfig};
use domain::Location;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const NO_LOCATION: &str = "Could not find location for the specified address.";

/// Resolves a free-form address into coordinates.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Fails with `AppError::Geocode` when the address has no match.
    async fn geocode(&self, address: &str) -> AppResult<Location>;
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    /// `[longitude, latitude]`
    center: Vec<f64>,
}

/// Mapbox-backed geocoder.
pub struct MapboxGeocoder {
    client: reqwest::Client,
    config: GeocoderConfig,
}

impl MapboxGeocoder {
    pub fn new(config: GeocoderConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn lookup_url(&self, address: &str) -> AppResult<Url> {
        let mut url = Url::parse(&self.config.api_base)
            .map_err(|e| AppError::internal(format!("Invalid geocoder base URL: {}", e)))?;

        let query = format!("{}.json", address);
        url.path_segments_mut()
            .map_err(|_| AppError::internal("Geocoder base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(["geocoding", "v5", "mapbox.places", query.as_str()]);

        url.query_pairs_mut()
            .append_pair("types", "poi")
            .append_pair("limit", "1")
            .append_pair("access_token", &self.config.access_token);

        Ok(url)
    }
}

/// First feature wins; its `center` is `[longitude, latitude]`.
fn first_location(collection: FeatureCollection) -> AppResult<Location> {
    let feature = collection
        .features
        .into_iter()
        .next()
        .ok_or_else(|| AppError::geocode(NO_LOCATION))?;

    match feature.center.as_slice() {
        [longitude, latitude, ..] => Ok(Location::new(*longitude, *latitude)),
        _ => Err(AppError::geocode(NO_LOCATION)),
    }
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    #[tracing::instrument(skip(self))]
    async fn geocode(&self, address: &str) -> AppResult<Location> {
        let url = self.lookup_url(address)?;

        let res = self.client.get(url).send().await.map_err(|e| {
            tracing::warn!(error = %e, "Geocoding request failed");
            AppError::service_unavailable("geocoder")
        })?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(AppError::geocode(NO_LOCATION));
        } else if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Geocoder returned an error status");
            return Err(AppError::service_unavailable("geocoder"));
        }

        let collection: FeatureCollection = res.json().await.map_err(|e| {
            tracing::warn!(error = %e, "Geocoder returned an unreadable body");
            AppError::service_unavailable("geocoder")
        })?;

        first_location(collection)
    }
}
