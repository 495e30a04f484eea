//! Provider B paging: genre resolution and offset bookkeeping.

use std::sync::Arc;

use chrono::Utc;
use dokoiko_core::{CategoryMapping, Coordinate, NormalizedSearchResult};
use dokoiko_providers::yahoo::{has_next_page, normalize_feature, offset_for_page};
use dokoiko_providers::{LocalQuery, ProviderError};

use crate::ports::LocalSearchProvider;

#[derive(Debug, Clone, Default)]
pub struct LocalBatch {
    pub results: Vec<NormalizedSearchResult>,
    pub has_next_page: bool,
    /// Total match count reported by the provider.
    pub total: u32,
}

#[derive(Clone)]
pub struct LocalAdapter {
    provider: Arc<dyn LocalSearchProvider>,
    categories: Arc<CategoryMapping>,
}

impl LocalAdapter {
    #[must_use]
    pub fn new(provider: Arc<dyn LocalSearchProvider>, categories: Arc<CategoryMapping>) -> Self {
        Self {
            provider,
            categories,
        }
    }

    /// Fetches `page` (1-based) of local results around `origin`.
    ///
    /// Genre codes come from `selections` when any are given, otherwise from
    /// the category mapping for `category`.
    ///
    /// # Errors
    ///
    /// Propagates the provider failure; callers fold it into an empty page.
    pub async fn search_local(
        &self,
        origin: Coordinate,
        category: &str,
        page: u32,
        selections: &[String],
        radius_m: u32,
        keyword: Option<&str>,
    ) -> Result<LocalBatch, ProviderError> {
        let fetched_at = Utc::now().timestamp_millis();
        let genre_codes = if selections.is_empty() {
            self.categories.provider_b_genres(category).to_vec()
        } else {
            selections.to_vec()
        };
        let offset = offset_for_page(page);

        let response = self
            .provider
            .local_page(&LocalQuery {
                location: origin,
                genre_codes,
                start: offset,
                radius_m,
                keyword: keyword.map(str::to_owned),
            })
            .await
            .inspect_err(|e| tracing::warn!(page, error = %e, "local search failed"))?;

        let returned = u32::try_from(response.features.len()).unwrap_or(u32::MAX);
        Ok(LocalBatch {
            has_next_page: has_next_page(offset, returned, response.total),
            total: response.total,
            results: response
                .features
                .into_iter()
                .map(|feature| normalize_feature(feature, fetched_at))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use dokoiko_providers::yahoo::Feature;
    use dokoiko_providers::LocalPage;
    use tokio::sync::Mutex;

    use super::*;

    struct FixedLocal {
        returned: usize,
        total: u32,
        seen: Mutex<Vec<LocalQuery>>,
    }

    #[async_trait]
    impl LocalSearchProvider for FixedLocal {
        async fn local_page(&self, query: &LocalQuery) -> Result<LocalPage, ProviderError> {
            self.seen.lock().await.push(query.clone());
            Ok(LocalPage {
                features: vec![Feature::default(); self.returned],
                count: u32::try_from(self.returned).unwrap_or(0),
                total: self.total,
                start: query.start,
            })
        }
    }

    fn adapter(returned: usize, total: u32) -> (LocalAdapter, Arc<FixedLocal>) {
        let fake = Arc::new(FixedLocal {
            returned,
            total,
            seen: Mutex::default(),
        });
        (
            LocalAdapter::new(fake.clone(), Arc::new(CategoryMapping::builtin())),
            fake,
        )
    }

    fn origin() -> Coordinate {
        Coordinate::new(34.7025, 135.4959).expect("valid")
    }

    #[tokio::test]
    async fn category_codes_used_without_selections() {
        let (adapter, fake) = adapter(20, 45);
        let batch = adapter
            .search_local(origin(), "グルメ・レストラン", 1, &[], 3000, None)
            .await
            .expect("batch");

        let seen = fake.seen.lock().await;
        assert_eq!(seen[0].genre_codes, ["01"]);
        assert_eq!(seen[0].start, 1);
        assert!(batch.has_next_page);
        assert_eq!(batch.total, 45);
        assert_eq!(batch.results.len(), 20);
    }

    #[tokio::test]
    async fn selections_override_category() {
        let (adapter, fake) = adapter(5, 5);
        adapter
            .search_local(origin(), "グルメ・レストラン", 1, &["0110".to_owned()], 3000, None)
            .await
            .expect("batch");
        assert_eq!(fake.seen.lock().await[0].genre_codes, ["0110"]);
    }

    #[tokio::test]
    async fn last_page_has_no_successor() {
        let (adapter, fake) = adapter(5, 45);
        let batch = adapter
            .search_local(origin(), "", 3, &[], 3000, Some("そば"))
            .await
            .expect("batch");
        let seen = fake.seen.lock().await;
        assert_eq!(seen[0].start, 41);
        assert!(seen[0].genre_codes.is_empty());
        assert_eq!(seen[0].keyword.as_deref(), Some("そば"));
        assert!(!batch.has_next_page);
    }

    #[tokio::test]
    async fn results_share_one_timestamp() {
        let (adapter, _) = adapter(3, 3);
        let batch = adapter
            .search_local(origin(), "", 1, &[], 3000, None)
            .await
            .expect("batch");
        let stamp = batch.results[0].fetched_at_epoch_millis;
        assert!(batch.results.iter().all(|r| r.fetched_at_epoch_millis == stamp));
    }
}
