//! Per-session accumulators and the merge that derives the visible list.

use dokoiko_core::{
    markers_for, Coordinate, MarkerData, NormalizedSearchResult, ProviderTypeSelection,
    SearchRequest, UnifiedSearchResult,
};
use serde::Serialize;

/// Concatenates provider A then provider B results and stable-sorts them
/// ascending by batch timestamp.
///
/// Pure: the same accumulators always produce the same list.
#[must_use]
pub fn merge(
    a_results: &[NormalizedSearchResult],
    b_results: &[NormalizedSearchResult],
) -> Vec<UnifiedSearchResult> {
    let mut merged: Vec<UnifiedSearchResult> = a_results
        .iter()
        .chain(b_results)
        .cloned()
        .map(UnifiedSearchResult::from)
        .collect();
    merged.sort_by_key(|item| item.result.fetched_at_epoch_millis);
    merged
}

/// Provider A continuation: the selections that still hold a page token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCursor {
    pub selections: Vec<ProviderTypeSelection>,
}

impl TokenCursor {
    #[must_use]
    pub fn has_more(&self) -> bool {
        !self.selections.is_empty()
    }
}

/// Provider B continuation: last fetched page and the reported total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetCursor {
    pub page: u32,
    pub total_known: u32,
    pub has_next_page: bool,
}

impl OffsetCursor {
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.has_next_page
    }
}

/// Everything one search session accumulates.
///
/// The request is frozen at search time; load-more never re-reads filters.
#[derive(Debug, Clone)]
pub struct AggregateSearchState {
    pub origin: Coordinate,
    pub request: SearchRequest,
    pub results_a: Vec<NormalizedSearchResult>,
    pub results_b: Vec<NormalizedSearchResult>,
    pub cursor_a: TokenCursor,
    pub cursor_b: OffsetCursor,
}

impl AggregateSearchState {
    #[must_use]
    pub fn new(origin: Coordinate, request: SearchRequest) -> Self {
        Self {
            origin,
            request,
            results_a: Vec::new(),
            results_b: Vec::new(),
            cursor_a: TokenCursor::default(),
            cursor_b: OffsetCursor::default(),
        }
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.cursor_b.has_more() || self.cursor_a.has_more()
    }

    #[must_use]
    pub fn unified(&self) -> Vec<UnifiedSearchResult> {
        merge(&self.results_a, &self.results_b)
    }

    #[must_use]
    pub fn markers(&self) -> Vec<MarkerData> {
        markers_for(&self.unified())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results_a.len() + self.results_b.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
