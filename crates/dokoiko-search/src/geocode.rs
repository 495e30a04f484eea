//! Fail-closed geocoding with the literal `lat,lng` fast path.

use std::sync::Arc;

use dokoiko_core::{parse_lat_lng, Coordinate, LatLngLiteral};

use crate::ports::Geocoder;

#[derive(Clone)]
pub struct GeocodingAdapter {
    geocoder: Arc<dyn Geocoder>,
}

impl GeocodingAdapter {
    #[must_use]
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// Resolves `address` to a coordinate, or `None`.
    ///
    /// A literal `lat,lng` pair is parsed locally and never reaches the
    /// network; if its numbers are out of range the answer is `None`.
    /// Upstream errors are logged and read as `None`.
    pub async fn geocode(&self, address: &str) -> Option<Coordinate> {
        match parse_lat_lng(address) {
            LatLngLiteral::Parsed(coordinate) => return Some(coordinate),
            LatLngLiteral::Invalid => {
                tracing::info!(address, "lat,lng literal out of range");
                return None;
            }
            LatLngLiteral::NotLiteral => {}
        }

        match self.geocoder.lookup(address).await {
            Ok(Some(coordinate)) => Some(coordinate),
            Ok(None) => {
                tracing::info!(address, "address not found");
                None
            }
            Err(e) => {
                tracing::warn!(address, error = %e, "geocoding failed");
                None
            }
        }
    }
}
