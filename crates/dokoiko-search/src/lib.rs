//! Search orchestration: geocoding, the two provider adapters, result
//! aggregation and the pagination controller that drives them.

pub mod aggregate;
pub mod controller;
pub mod error;
pub mod geocode;
pub mod local;
pub mod nearby;
pub mod ports;
pub mod services;

pub use aggregate::{merge, AggregateSearchState, OffsetCursor, TokenCursor};
pub use controller::{ControllerPhase, ProviderOutcome, RoundStatus, SearchController, SearchView};
pub use error::{LoadMoreError, SearchError};
pub use geocode::GeocodingAdapter;
pub use local::{LocalAdapter, LocalBatch};
pub use nearby::{NearbyAdapter, NearbyBatch};
pub use ports::{Geocoder, LocalSearchProvider, NearbySearchProvider};
pub use services::SearchServices;
