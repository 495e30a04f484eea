//! Normalized result shapes shared by every provider adapter.

use serde::{Deserialize, Serialize};

use crate::geo::{Coordinate, Position};

/// Which external place-search service produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceProvider {
    /// Token-paginated nearby search (Google Places).
    Google,
    /// Offset-paginated local search (Yahoo! Local Search).
    Yahoo,
}

impl std::fmt::Display for SourceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceProvider::Google => write!(f, "google"),
            SourceProvider::Yahoo => write!(f, "yahoo"),
        }
    }
}

/// A provider-A type filter together with its continuation token.
///
/// `page_token` is only valid for the same `name` on the next request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderTypeSelection {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

impl ProviderTypeSelection {
    /// Type name meaning "no type filter".
    pub const ALL: &'static str = "all";

    #[must_use]
    pub fn first_page(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            page_token: None,
        }
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        self.name == Self::ALL
    }
}

/// Hierarchical provider-B genre tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreTag {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSearchResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Photo reference (Google) or direct image URL (Yahoo).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub source_provider: SourceProvider,
    /// One timestamp per adapter call; the merge sort key.
    pub fetched_at_epoch_millis: i64,
    /// Type filter that produced a Google result (`"all"` when unfiltered).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genre_tags: Vec<GenreTag>,
}

impl NormalizedSearchResult {
    /// Empty result stamped with its origin; adapters fill in the rest.
    #[must_use]
    pub fn new(source_provider: SourceProvider, fetched_at_epoch_millis: i64) -> Self {
        Self {
            name: None,
            address: None,
            url: None,
            image: None,
            latitude: None,
            longitude: None,
            source_provider,
            fetched_at_epoch_millis,
            selection_type: None,
            type_tags: Vec::new(),
            genre_tags: Vec::new(),
        }
    }

    /// Both coordinates, or nothing. A result with only one is unlocated.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some([lat, lng]),
            _ => None,
        }
    }

    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.position().and_then(|[lat, lng]| Coordinate::new(lat, lng))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedSearchResult {
    #[serde(flatten)]
    pub result: NormalizedSearchResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl From<NormalizedSearchResult> for UnifiedSearchResult {
    fn from(result: NormalizedSearchResult) -> Self {
        let position = result.position();
        Self { result, position }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerData {
    pub position: Position,
    pub popup_text: String,
}

/// Derives one marker per located result, in list order.
#[must_use]
pub fn markers_for(results: &[UnifiedSearchResult]) -> Vec<MarkerData> {
    results
        .iter()
        .filter_map(|item| {
            let position = item.position?;
            let popup_text = item
                .result
                .name
                .clone()
                .or_else(|| item.result.address.clone())
                .unwrap_or_default();
            Some(MarkerData {
                position,
                popup_text,
            })
        })
        .collect()
}
