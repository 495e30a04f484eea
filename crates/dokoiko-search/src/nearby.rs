//! Provider A batching: one sequential request per type selection.

use std::sync::Arc;

use chrono::Utc;
use dokoiko_core::{Coordinate, NormalizedSearchResult, ProviderTypeSelection};
use dokoiko_providers::google::normalize_place;
use dokoiko_providers::{NearbyQuery, ProviderError};

use crate::ports::NearbySearchProvider;

/// Results of one `search_nearby` call plus the selections to continue with.
#[derive(Debug, Clone, Default)]
pub struct NearbyBatch {
    pub results: Vec<NormalizedSearchResult>,
    /// One entry per selection whose page came back with a next-page token.
    pub next_selections: Vec<ProviderTypeSelection>,
}

#[derive(Clone)]
pub struct NearbyAdapter {
    provider: Arc<dyn NearbySearchProvider>,
}

impl NearbyAdapter {
    #[must_use]
    pub fn new(provider: Arc<dyn NearbySearchProvider>) -> Self {
        Self { provider }
    }

    /// Fetches one page per selection, in order, stamping every result with
    /// a single timestamp taken before the first request.
    ///
    /// An empty `selections` list searches once without a type filter.
    ///
    /// # Errors
    ///
    /// The first failing sub-request aborts the batch; no partial results
    /// are returned.
    pub async fn search_nearby(
        &self,
        origin: Coordinate,
        selections: &[ProviderTypeSelection],
        radius_m: u32,
        keyword: Option<&str>,
    ) -> Result<NearbyBatch, ProviderError> {
        let fetched_at = Utc::now().timestamp_millis();

        let unfiltered = [ProviderTypeSelection::first_page(ProviderTypeSelection::ALL)];
        let selections = if selections.is_empty() {
            &unfiltered[..]
        } else {
            selections
        };

        let mut batch = NearbyBatch::default();
        for selection in selections {
            let query = NearbyQuery {
                location: origin,
                radius_m,
                place_type: (!selection.is_all()).then(|| selection.name.clone()),
                page_token: selection.page_token.clone(),
                keyword: keyword.map(str::to_owned),
            };

            let page = self.provider.nearby_page(&query).await.inspect_err(|e| {
                tracing::warn!(
                    place_type = %selection.name,
                    error = %e,
                    "nearby search sub-request failed, dropping batch"
                );
            })?;

            batch.results.extend(
                page.places
                    .into_iter()
                    .map(|place| normalize_place(place, &selection.name, fetched_at)),
            );
            if let Some(token) = page.next_page_token {
                batch.next_selections.push(ProviderTypeSelection {
                    name: selection.name.clone(),
                    page_token: Some(token),
                });
            }
        }

        Ok(batch)
    }
}
