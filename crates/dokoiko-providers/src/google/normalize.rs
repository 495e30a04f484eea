//! Google place → [`NormalizedSearchResult`].

use dokoiko_core::{NormalizedSearchResult, SourceProvider};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::response::PlaceResult;

const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Maps one nearby-search place into the shared result shape.
///
/// `selection` is the type filter that produced the place; `fetched_at` is
/// the single timestamp taken for the whole adapter call.
#[must_use]
pub fn normalize_place(place: PlaceResult, selection: &str, fetched_at: i64) -> NormalizedSearchResult {
    let location = place.geometry.as_ref().map(|g| g.location);
    let (latitude, longitude) = location.map_or((None, None), |l| (Some(l.lat), Some(l.lng)));

    let url = place
        .website
        .filter(|u| !u.is_empty())
        .or(place.url.filter(|u| !u.is_empty()))
        .or_else(|| maps_search_url(place.name.as_deref(), latitude, longitude));

    let mut result = NormalizedSearchResult::new(SourceProvider::Google, fetched_at);
    result.name = place.name;
    result.address = place.vicinity;
    result.url = url;
    result.image = place.photos.into_iter().next().map(|p| p.photo_reference);
    result.latitude = latitude;
    result.longitude = longitude;
    result.selection_type = Some(selection.to_owned());
    result.type_tags = place.types;
    result
}

/// Google Maps search link for a place without its own website.
///
/// The query is the place name, or `lat,lng` when the name is missing.
/// Returns `None` without coordinates.
#[must_use]
pub fn maps_search_url(name: Option<&str>, latitude: Option<f64>, longitude: Option<f64>) -> Option<String> {
    let (lat, lng) = (latitude?, longitude?);
    let query = match name.filter(|n| !n.is_empty()) {
        Some(n) => utf8_percent_encode(n, COMPONENT).to_string(),
        None => format!("{lat},{lng}"),
    };
    Some(format!(
        "https://www.google.com/maps/search/{query}/@{lat},{lng},17z"
    ))
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
