//! Seams between the search core and the provider HTTP clients.
//!
//! The production implementations live on the `dokoiko-providers` clients;
//! tests substitute in-memory fakes.

use async_trait::async_trait;
use dokoiko_core::Coordinate;
use dokoiko_providers::{
    GoogleGeocoder, GooglePlacesClient, GsiGeocoder, LocalPage, LocalQuery, NearbyPage,
    NearbyQuery, ProviderError, YahooLocalClient,
};

/// Resolves a free-text address. `Ok(None)` means "no such address".
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn lookup(&self, address: &str) -> Result<Option<Coordinate>, ProviderError>;
}

/// Token-paginated nearby search (provider A).
#[async_trait]
pub trait NearbySearchProvider: Send + Sync {
    async fn nearby_page(&self, query: &NearbyQuery) -> Result<NearbyPage, ProviderError>;
}

/// Offset-paginated local search (provider B).
#[async_trait]
pub trait LocalSearchProvider: Send + Sync {
    async fn local_page(&self, query: &LocalQuery) -> Result<LocalPage, ProviderError>;
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn lookup(&self, address: &str) -> Result<Option<Coordinate>, ProviderError> {
        self.geocode(address).await
    }
}

#[async_trait]
impl Geocoder for GsiGeocoder {
    async fn lookup(&self, address: &str) -> Result<Option<Coordinate>, ProviderError> {
        self.geocode(address).await
    }
}

#[async_trait]
impl NearbySearchProvider for GooglePlacesClient {
    async fn nearby_page(&self, query: &NearbyQuery) -> Result<NearbyPage, ProviderError> {
        self.nearby_search(query).await
    }
}

#[async_trait]
impl LocalSearchProvider for YahooLocalClient {
    async fn local_page(&self, query: &LocalQuery) -> Result<LocalPage, ProviderError> {
        self.local_search(query).await
    }
}
