//! Google Places nearby search.
//!
//! Token-paginated: a response may carry `next_page_token`, valid only for
//! the same query on the next request. Use [`GooglePlacesClient::new`] for
//! production or [`GooglePlacesClient::with_base_url`] to point at a mock
//! server in tests.

pub mod normalize;
pub mod response;

use dokoiko_core::Coordinate;
use reqwest::Url;

use crate::error::ProviderError;
use crate::http::{endpoint, parse_base_url, HttpSettings, ProviderHttp};

pub use normalize::{maps_search_url, normalize_place};
pub use response::{NearbySearchResponse, PlaceResult};

pub(crate) const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/";
pub(crate) const PROVIDER: &str = "google";
const LANGUAGE: &str = "ja";

/// Parameters for one nearby-search page.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    pub location: Coordinate,
    pub radius_m: u32,
    /// `None` searches every type.
    pub place_type: Option<String>,
    pub page_token: Option<String>,
    pub keyword: Option<String>,
}

/// One page of places plus the token for the next page, if any.
#[derive(Debug, Clone, Default)]
pub struct NearbyPage {
    pub places: Vec<PlaceResult>,
    pub next_page_token: Option<String>,
}

pub struct GooglePlacesClient {
    http: ProviderHttp,
    api_key: String,
    nearby_url: Url,
}

impl GooglePlacesClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, settings: &HttpSettings) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, settings, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ProviderError::InvalidBaseUrl`] for an unparseable URL.
    pub fn with_base_url(
        api_key: &str,
        settings: &HttpSettings,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        let base = parse_base_url(base_url)?;
        Ok(Self {
            http: ProviderHttp::new(PROVIDER, settings)?,
            api_key: api_key.to_owned(),
            nearby_url: endpoint(&base, "place/nearbysearch/json")?,
        })
    }

    /// Fetches one page of places around `query.location`.
    ///
    /// `ZERO_RESULTS` is an empty page, not an error.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::RateLimited`] on `OVER_QUERY_LIMIT` or HTTP 429.
    /// - [`ProviderError::Api`] for any other non-OK envelope status.
    /// - [`ProviderError::Http`] / [`ProviderError::UnexpectedStatus`] on
    ///   transport failure.
    /// - [`ProviderError::Deserialize`] if the body is malformed.
    pub async fn nearby_search(&self, query: &NearbyQuery) -> Result<NearbyPage, ProviderError> {
        let url = self.build_nearby_url(query);
        let context = format!(
            "nearbysearch(type={})",
            query.place_type.as_deref().unwrap_or("all")
        );

        let (url, context) = (&url, context.as_str());
        let response: NearbySearchResponse = self
            .http
            .retry(|| async move {
                let body: NearbySearchResponse = self.http.fetch_json(url, context).await?;
                check_status(
                    self.http.provider(),
                    &body.status,
                    body.error_message.as_deref(),
                )?;
                Ok(body)
            })
            .await?;

        tracing::debug!(
            place_type = query.place_type.as_deref().unwrap_or("all"),
            paged = query.page_token.is_some(),
            count = response.results.len(),
            has_next = response.next_page_token.is_some(),
            "google nearby search page fetched"
        );

        Ok(NearbyPage {
            places: response.results,
            next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    fn build_nearby_url(&self, query: &NearbyQuery) -> Url {
        let mut url = self.nearby_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("location", &query.location.to_query());
            pairs.append_pair("radius", &query.radius_m.to_string());
            pairs.append_pair("language", LANGUAGE);
            pairs.append_pair("key", &self.api_key);
            if let Some(place_type) = &query.place_type {
                pairs.append_pair("type", place_type);
            }
            if let Some(token) = &query.page_token {
                pairs.append_pair("pagetoken", token);
            }
            if let Some(keyword) = &query.keyword {
                pairs.append_pair("keyword", keyword);
            }
        }
        url
    }
}

/// Maps a Google envelope status to a result.
pub(crate) fn check_status(
    provider: &'static str,
    status: &str,
    message: Option<&str>,
) -> Result<(), ProviderError> {
    match status {
        response::STATUS_OK | response::STATUS_ZERO_RESULTS => Ok(()),
        response::STATUS_OVER_QUERY_LIMIT => Err(ProviderError::RateLimited { provider }),
        other => Err(ProviderError::Api {
            provider,
            status: other.to_owned(),
            message: message.unwrap_or("no error message").to_owned(),
        }),
    }
}
