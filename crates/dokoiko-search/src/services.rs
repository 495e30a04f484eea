//! The adapters a controller needs, wired once and shared by every session.

use std::sync::Arc;
use std::time::Duration;

use dokoiko_core::{AppConfig, CategoryMapping, GeocoderKind};
use dokoiko_providers::{
    GoogleGeocoder, GooglePlacesClient, GsiGeocoder, HttpSettings, ProviderError,
    YahooLocalClient,
};

use crate::geocode::GeocodingAdapter;
use crate::local::LocalAdapter;
use crate::nearby::NearbyAdapter;
use crate::ports::{Geocoder, LocalSearchProvider, NearbySearchProvider};

pub struct SearchServices {
    pub geocoder: GeocodingAdapter,
    pub nearby: NearbyAdapter,
    pub local: LocalAdapter,
    pub categories: Arc<CategoryMapping>,
    /// Upper bound on each provider call in a round.
    pub round_timeout: Duration,
}

impl SearchServices {
    #[must_use]
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        nearby: Arc<dyn NearbySearchProvider>,
        local: Arc<dyn LocalSearchProvider>,
        categories: Arc<CategoryMapping>,
        round_timeout: Duration,
    ) -> Self {
        Self {
            geocoder: GeocodingAdapter::new(geocoder),
            nearby: NearbyAdapter::new(nearby),
            local: LocalAdapter::new(local, Arc::clone(&categories)),
            categories,
            round_timeout,
        }
    }

    /// Builds the production HTTP clients from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if any HTTP client cannot be constructed.
    pub fn from_config(
        config: &AppConfig,
        categories: Arc<CategoryMapping>,
    ) -> Result<Self, ProviderError> {
        let settings = HttpSettings::from_config(config);

        let geocoder: Arc<dyn Geocoder> = match config.geocoder {
            GeocoderKind::Google => Arc::new(GoogleGeocoder::new(&config.google_api_key, &settings)?),
            GeocoderKind::Gsi => Arc::new(GsiGeocoder::new(&settings)?),
        };
        let nearby = Arc::new(GooglePlacesClient::new(&config.google_api_key, &settings)?);
        let local = Arc::new(YahooLocalClient::new(&config.yahoo_app_id, &settings)?);

        tracing::debug!(geocoder = %config.geocoder, "search services constructed");

        Ok(Self::new(
            geocoder,
            nearby,
            local,
            categories,
            Duration::from_secs(config.round_timeout_secs),
        ))
    }
}
