//! HTTP clients for the external services dokoiko aggregates: address
//! geocoding, Google Places nearby search, Yahoo! Local Search and the
//! Google Places photo endpoint.

pub mod error;
pub mod geocode;
pub mod google;
mod http;
pub mod photo;
mod retry;
pub mod yahoo;

pub use error::ProviderError;
pub use geocode::{GoogleGeocoder, GsiGeocoder};
pub use google::{GooglePlacesClient, NearbyPage, NearbyQuery};
pub use http::HttpSettings;
pub use photo::{GooglePhotoClient, PhotoData};
pub use yahoo::{LocalPage, LocalQuery, YahooLocalClient};
