//! Yahoo feature → [`NormalizedSearchResult`].

use dokoiko_core::{GenreTag, NormalizedSearchResult, SourceProvider};

use super::response::Feature;

/// Maps one local-search feature into the shared result shape.
#[must_use]
pub fn normalize_feature(feature: Feature, fetched_at: i64) -> NormalizedSearchResult {
    let (latitude, longitude) = feature
        .geometry
        .as_ref()
        .and_then(|g| parse_coordinates(&g.coordinates))
        .map_or((None, None), |(lat, lng)| (Some(lat), Some(lng)));

    let detail = feature.property.detail.unwrap_or_default();
    let image = detail.first_image().map(str::to_owned);
    let url = detail
        .pc_url1
        .filter(|u| !u.is_empty())
        .or(detail.mobile_url1.filter(|u| !u.is_empty()));

    let mut result = NormalizedSearchResult::new(SourceProvider::Yahoo, fetched_at);
    result.name = feature.name;
    result.address = feature.property.address;
    result.url = url;
    result.image = image;
    result.latitude = latitude;
    result.longitude = longitude;
    result.genre_tags = feature
        .property
        .genre
        .into_iter()
        .map(|g| GenreTag {
            code: g.code,
            name: g.name,
        })
        .collect();
    result
}

/// Parses Yahoo's `"lng,lat"` string into `(lat, lng)`.
#[must_use]
pub fn parse_coordinates(raw: &str) -> Option<(f64, f64)> {
    let (lng, lat) = raw.split_once(',')?;
    let lng: f64 = lng.trim().parse().ok()?;
    let lat: f64 = lat.trim().parse().ok()?;
    (lat.is_finite() && lng.is_finite()).then_some((lat, lng))
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
