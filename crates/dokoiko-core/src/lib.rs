//! Domain model shared by the dokoiko search stack: coordinates, normalized
//! provider results, category mapping, filter reconciliation, request
//! validation, favorites and application configuration.

pub mod app_config;
pub mod categories;
pub mod config;
pub mod favorites;
pub mod filters;
pub mod geo;
pub mod request;
pub mod results;

pub use app_config::{AppConfig, Environment, GeocoderKind};
pub use categories::{load_categories, place_type_label, CategoryEntry, CategoryMapping};
pub use config::{load_app_config, load_app_config_from_env};
pub use favorites::{favorite_id, FavoriteItem, FavoriteList, FAVORITES_COOKIE_KEY};
pub use filters::{reconcile_filters, FilterState, ReconcileOutcome, MAX_FILTER_SELECTIONS};
pub use geo::{parse_lat_lng, should_offer_research, Coordinate, LatLngLiteral, Position};
pub use request::{
    FieldError, SearchRequest, ValidationErrors, DEFAULT_RADIUS_M, MAX_RADIUS_M, MIN_RADIUS_M,
};
pub use results::{
    markers_for, GenreTag, MarkerData, NormalizedSearchResult, ProviderTypeSelection,
    SourceProvider, UnifiedSearchResult,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read categories file {path}: {source}")]
    CategoriesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse categories file: {0}")]
    CategoriesFileParse(#[from] serde_yaml::Error),

    #[error("categories validation failed: {0}")]
    Validation(String),
}
