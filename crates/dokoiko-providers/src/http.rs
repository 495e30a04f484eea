//! Shared HTTP plumbing: client construction, base-URL handling and JSON GETs.

use std::future::Future;
use std::time::Duration;

use dokoiko_core::AppConfig;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::ProviderError;
use crate::retry::retry_with_backoff;

/// Transport settings common to every provider client.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: "dokoiko/0.1 (place-search)".to_owned(),
            max_retries: 2,
            retry_backoff_ms: 500,
        }
    }
}

impl HttpSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.provider_request_timeout_secs,
            user_agent: config.provider_user_agent.clone(),
            max_retries: config.provider_max_retries,
            retry_backoff_ms: config.provider_retry_backoff_ms,
        }
    }

    /// Settings for wiremock-backed tests: short timeout, no back-off.
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            timeout_secs: 5,
            user_agent: "dokoiko-test/0.1".to_owned(),
            max_retries: 0,
            retry_backoff_ms: 0,
        }
    }
}

/// A configured `reqwest::Client` plus the retry policy it runs under.
#[derive(Debug, Clone)]
pub(crate) struct ProviderHttp {
    client: Client,
    provider: &'static str,
    max_retries: u32,
    retry_backoff_ms: u64,
}

impl ProviderHttp {
    pub(crate) fn new(provider: &'static str, settings: &HttpSettings) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.timeout_secs.min(10)))
            .user_agent(settings.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            provider,
            max_retries: settings.max_retries,
            retry_backoff_ms: settings.retry_backoff_ms,
        })
    }

    pub(crate) fn provider(&self) -> &'static str {
        self.provider
    }

    /// Runs `operation` under this client's retry policy.
    pub(crate) async fn retry<T, F, Fut>(&self, operation: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        retry_with_backoff(self.max_retries, self.retry_backoff_ms, operation).await
    }

    /// One GET of `url`, deserialized as `T`. No retry.
    pub(crate) async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, ProviderError> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }

    /// GETs `url` with retries and deserializes the body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, ProviderError> {
        self.retry(|| self.fetch_json(url, context)).await
    }

    /// GETs `url` with retries and returns the raw body with its `Content-Type`.
    pub(crate) async fn get_bytes(
        &self,
        url: &Url,
    ) -> Result<(Vec<u8>, Option<String>), ProviderError> {
        self.retry(|| async move {
            let response = self.send(url).await?;
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let bytes = response.bytes().await?;
            Ok((bytes.to_vec(), content_type))
        })
        .await
    }

    async fn get_text(&self, url: &Url) -> Result<String, ProviderError> {
        Ok(self.send(url).await?.text().await?)
    }

    async fn send(&self, url: &Url) -> Result<reqwest::Response, ProviderError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                provider: self.provider,
            });
        }
        if !status.is_success() {
            return Err(ProviderError::UnexpectedStatus {
                provider: self.provider,
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

/// Parses `base_url` so that relative endpoint paths join beneath it rather
/// than replacing its last segment.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, ProviderError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| ProviderError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })
}

pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url, ProviderError> {
    base.join(path).map_err(|e| ProviderError::InvalidBaseUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_below_base_path() {
        let base = parse_base_url("http://127.0.0.1:9000/maps/api").expect("valid");
        let url = endpoint(&base, "place/nearbysearch/json").expect("join");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9000/maps/api/place/nearbysearch/json"
        );
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let err = parse_base_url("not a url").unwrap_err();
        assert!(matches!(err, ProviderError::InvalidBaseUrl { .. }));
    }
}
