//! Address → coordinate lookups.
//!
//! Both geocoders return `Ok(None)` when the service answers but knows no
//! such address; errors are reserved for failed calls.

use dokoiko_core::Coordinate;
use reqwest::Url;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::google::{self, response::GeocodeResponse};
use crate::http::{endpoint, parse_base_url, HttpSettings, ProviderHttp};

/// Google Geocoding API client.
pub struct GoogleGeocoder {
    http: ProviderHttp,
    api_key: String,
    geocode_url: Url,
}

impl GoogleGeocoder {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, settings: &HttpSettings) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, settings, google::DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// See [`GoogleGeocoder::new`]; also [`ProviderError::InvalidBaseUrl`].
    pub fn with_base_url(
        api_key: &str,
        settings: &HttpSettings,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        let base = parse_base_url(base_url)?;
        Ok(Self {
            http: ProviderHttp::new(google::PROVIDER, settings)?,
            api_key: api_key.to_owned(),
            geocode_url: endpoint(&base, "geocode/json")?,
        })
    }

    /// First match for `address`, or `None` on `ZERO_RESULTS`.
    ///
    /// # Errors
    ///
    /// Transport failures and non-OK envelope statuses other than
    /// `ZERO_RESULTS`.
    pub async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, ProviderError> {
        let mut url = self.geocode_url.clone();
        url.query_pairs_mut()
            .append_pair("address", address)
            .append_pair("key", &self.api_key)
            .append_pair("language", "ja");

        let url = &url;
        let response: GeocodeResponse = self
            .http
            .retry(|| async move {
                let body: GeocodeResponse = self.http.fetch_json(url, "geocode").await?;
                google::check_status(
                    google::PROVIDER,
                    &body.status,
                    body.error_message.as_deref(),
                )?;
                Ok(body)
            })
            .await?;

        let coordinate = response
            .results
            .first()
            .and_then(|r| Coordinate::new(r.geometry.location.lat, r.geometry.location.lng));
        tracing::debug!(found = coordinate.is_some(), "google geocode finished");
        Ok(coordinate)
    }
}

#[derive(Debug, Deserialize)]
struct GsiFeature {
    geometry: GsiGeometry,
}

#[derive(Debug, Deserialize)]
struct GsiGeometry {
    /// GeoJSON order: `[lng, lat]`.
    coordinates: [f64; 2],
}

/// Geospatial Information Authority of Japan address search. Needs no key.
pub struct GsiGeocoder {
    http: ProviderHttp,
    search_url: Url,
}

impl GsiGeocoder {
    pub(crate) const DEFAULT_BASE_URL: &'static str = "https://msearch.gsi.go.jp/";

    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(settings: &HttpSettings) -> Result<Self, ProviderError> {
        Self::with_base_url(settings, Self::DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// See [`GsiGeocoder::new`]; also [`ProviderError::InvalidBaseUrl`].
    pub fn with_base_url(settings: &HttpSettings, base_url: &str) -> Result<Self, ProviderError> {
        let base = parse_base_url(base_url)?;
        Ok(Self {
            http: ProviderHttp::new("gsi", settings)?,
            search_url: endpoint(&base, "address-search/AddressSearch")?,
        })
    }

    /// First match for `address`, or `None` when the result array is empty.
    ///
    /// # Errors
    ///
    /// Transport failures and malformed bodies.
    pub async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, ProviderError> {
        let mut url = self.search_url.clone();
        url.query_pairs_mut().append_pair("q", address);

        let features: Vec<GsiFeature> = self.http.get_json(&url, "gsi address search").await?;
        let coordinate = features.first().and_then(|f| {
            let [lng, lat] = f.geometry.coordinates;
            Coordinate::new(lat, lng)
        });
        tracing::debug!(found = coordinate.is_some(), "gsi geocode finished");
        Ok(coordinate)
    }
}
