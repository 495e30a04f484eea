//! Yahoo! Local Search.
//!
//! Offset-paginated: pages are requested by 1-based `start` offset and
//! the response reports the total match count.

pub mod normalize;
pub mod response;

use dokoiko_core::Coordinate;
use reqwest::Url;

use crate::error::ProviderError;
use crate::http::{endpoint, parse_base_url, HttpSettings, ProviderHttp};

pub use normalize::{normalize_feature, parse_coordinates};
pub use response::{Feature, LocalSearchResponse};

const DEFAULT_BASE_URL: &str = "https://map.yahooapis.jp/";
const PROVIDER: &str = "yahoo";

/// Results requested per page.
pub const PAGE_SIZE: u32 = 20;

/// 1-based offset of the first result on `page` (pages start at 1).
#[must_use]
pub fn offset_for_page(page: u32) -> u32 {
    page.max(1).saturating_sub(1).saturating_mul(PAGE_SIZE) + 1
}

/// Whether results remain past this page.
///
/// An empty page never has a successor, whatever the reported total.
#[must_use]
pub fn has_next_page(offset: u32, returned: u32, total: u32) -> bool {
    returned > 0 && offset + returned - 1 < total
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalQuery {
    pub location: Coordinate,
    /// Genre codes joined into `gc`; empty means no genre filter.
    pub genre_codes: Vec<String>,
    /// 1-based offset.
    pub start: u32,
    pub radius_m: u32,
    pub keyword: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LocalPage {
    pub features: Vec<Feature>,
    pub count: u32,
    pub total: u32,
    pub start: u32,
}

pub struct YahooLocalClient {
    http: ProviderHttp,
    app_id: String,
    search_url: Url,
}

impl YahooLocalClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(app_id: &str, settings: &HttpSettings) -> Result<Self, ProviderError> {
        Self::with_base_url(app_id, settings, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// See [`YahooLocalClient::new`]; also [`ProviderError::InvalidBaseUrl`].
    pub fn with_base_url(
        app_id: &str,
        settings: &HttpSettings,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        let base = parse_base_url(base_url)?;
        Ok(Self {
            http: ProviderHttp::new(PROVIDER, settings)?,
            app_id: app_id.to_owned(),
            search_url: endpoint(&base, "search/local/V1/localSearch")?,
        })
    }

    /// Fetches one page of up to [`PAGE_SIZE`] features.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::RateLimited`] on HTTP 429.
    /// - [`ProviderError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`ProviderError::Http`] on transport failure.
    /// - [`ProviderError::Deserialize`] if the body is malformed.
    pub async fn local_search(&self, query: &LocalQuery) -> Result<LocalPage, ProviderError> {
        let url = self.build_url(query);
        let response: LocalSearchResponse = self
            .http
            .get_json(&url, &format!("localSearch(start={})", query.start))
            .await?;

        let info = response.result_info;
        tracing::debug!(
            start = query.start,
            count = info.count,
            total = info.total,
            genres = query.genre_codes.len(),
            "yahoo local search page fetched"
        );

        Ok(LocalPage {
            count: info.count,
            total: info.total,
            start: info.start,
            features: response.feature,
        })
    }

    fn build_url(&self, query: &LocalQuery) -> Url {
        let mut url = self.search_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("appid", &self.app_id);
            pairs.append_pair("lat", &query.location.lat.to_string());
            pairs.append_pair("lon", &query.location.lng.to_string());
            pairs.append_pair("output", "json");
            if !query.genre_codes.is_empty() {
                pairs.append_pair("gc", &query.genre_codes.join(","));
            }
            pairs.append_pair("results", &PAGE_SIZE.to_string());
            pairs.append_pair("start", &query.start.to_string());
            pairs.append_pair("sort", "hybrid");
            pairs.append_pair("detail", "full");
            pairs.append_pair("dist", &(f64::from(query.radius_m) / 1000.0).to_string());
            if let Some(keyword) = &query.keyword {
                pairs.append_pair("query", keyword);
            }
        }
        url
    }
}
