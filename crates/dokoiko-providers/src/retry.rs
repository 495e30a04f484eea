//! Retry with exponential back-off and jitter for provider requests.

use std::future::Future;
use std::time::Duration;

use crate::error::ProviderError;

/// Google envelope status that the API documents as safe to retry.
const GOOGLE_UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";

/// Returns `true` for errors worth retrying after a back-off delay.
///
/// Network timeouts and connection failures, 5xx responses, 429s and
/// Google's `UNKNOWN_ERROR` are transient. Everything else (bad keys,
/// malformed bodies, invalid requests) fails the same way on every attempt.
pub(crate) fn is_retriable(err: &ProviderError) -> bool {
    match err {
        ProviderError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ProviderError::UnexpectedStatus { status, .. } => *status >= 500,
        ProviderError::RateLimited { .. } => true,
        ProviderError::Api { status, .. } => status == GOOGLE_UNKNOWN_ERROR,
        ProviderError::Deserialize { .. } | ProviderError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient
/// errors. The delay doubles per attempt from `backoff_base_ms`, is capped at
/// 10 s and jittered by ±25 %.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    const MAX_DELAY_MS: u64 = 10_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "provider request failed, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn api_err(status: &str) -> ProviderError {
        ProviderError::Api {
            provider: "google",
            status: status.to_owned(),
            message: String::new(),
        }
    }

    #[test]
    fn request_denied_is_not_retriable() {
        assert!(!is_retriable(&api_err("REQUEST_DENIED")));
        assert!(is_retriable(&api_err("UNKNOWN_ERROR")));
    }

    #[test]
    fn status_classes() {
        let status = |s| ProviderError::UnexpectedStatus {
            provider: "yahoo",
            status: s,
        };
        assert!(is_retriable(&status(503)));
        assert!(!is_retriable(&status(403)));
        assert!(is_retriable(&ProviderError::RateLimited { provider: "yahoo" }));
    }

    #[tokio::test]
    async fn retries_transient_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ProviderError::UnexpectedStatus {
                        provider: "google",
                        status: 502,
                    })
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result: Result<(), _> = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::RateLimited { provider: "yahoo" })
            }
        })
        .await;
        assert!(matches!(result, Err(ProviderError::RateLimited { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_error_is_returned_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result: Result<(), _> = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(api_err("REQUEST_DENIED"))
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
