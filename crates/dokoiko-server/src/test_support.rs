//! Fixtures shared by the route and session tests.

use std::sync::Arc;
use std::time::Duration;

use dokoiko_core::CategoryMapping;
use dokoiko_providers::{
    GoogleGeocoder, GooglePhotoClient, GooglePlacesClient, HttpSettings, YahooLocalClient,
};
use dokoiko_search::SearchServices;

use crate::api::AppState;
use crate::sessions::SessionStore;

/// Nothing listens here; used where a test must not reach any provider.
pub(crate) const UNREACHABLE_BASE_URL: &str = "http://127.0.0.1:9";

pub(crate) fn services(base_url: &str) -> Arc<SearchServices> {
    let settings = HttpSettings::for_tests();
    let google = format!("{base_url}/maps/api");
    let yahoo = format!("{base_url}/yahoo");

    Arc::new(SearchServices::new(
        Arc::new(GoogleGeocoder::with_base_url("test-key", &settings, &google).expect("geocoder")),
        Arc::new(
            GooglePlacesClient::with_base_url("test-key", &settings, &google).expect("places"),
        ),
        Arc::new(YahooLocalClient::with_base_url("test-app", &settings, &yahoo).expect("yahoo")),
        Arc::new(CategoryMapping::builtin()),
        Duration::from_secs(5),
    ))
}

pub(crate) fn app_state(base_url: &str) -> AppState {
    let services = services(base_url);
    let photos = GooglePhotoClient::with_base_url(
        "test-key",
        &HttpSettings::for_tests(),
        &format!("{base_url}/maps/api"),
    )
    .expect("photo client");

    AppState {
        categories: Arc::clone(&services.categories),
        sessions: SessionStore::new(services, Duration::from_secs(60)),
        photos: Arc::new(photos),
    }
}
