use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Client windows kept before expired ones are swept on insert.
const CLIENT_SWEEP_THRESHOLD: usize = 1024;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    started_at: Instant,
    count: usize,
}

/// Fixed-window limiter with one window per client address.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    clients: Arc<Mutex<HashMap<String, ClientWindow>>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Counts one request for `client`; false once its window is spent.
    async fn admit(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut clients = self.clients.lock().await;

        if clients.len() >= CLIENT_SWEEP_THRESHOLD && !clients.contains_key(client) {
            clients.retain(|_, w| now.duration_since(w.started_at) < self.window);
        }

        let window = clients.entry(client.to_owned()).or_insert(ClientWindow {
            started_at: now,
            count: 0,
        });
        if now.duration_since(window.started_at) >= self.window {
            *window = ClientWindow {
                started_at: now,
                count: 0,
            };
        }

        if window.count >= self.max_requests {
            return false;
        }
        window.count += 1;
        true
    }

    #[cfg(test)]
    async fn tracked_clients(&self) -> usize {
        self.clients.lock().await.len()
    }
}

/// First `x-forwarded-for` hop, else the peer address, else `"unknown"`.
fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_owned())
}

/// Takes the caller's `x-request-id` or generates a `UUIDv4`, stores it as
/// [`RequestId`] and echoes it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, val);
    }
    res
}

/// Rejects a client's requests past its per-window budget with a
/// `rate_limited` [`ApiError`].
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_key(req.headers(), peer);

    if !rate_limit.admit(&client).await {
        let request_id = req
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.clone())
            .unwrap_or_default();
        tracing::warn!(
            client = %client,
            max_requests = rate_limit.max_requests,
            "rate limit exceeded"
        );
        return ApiError::new(request_id, "rate_limited", "rate limit exceeded").into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_key_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            FORWARDED_FOR_HEADER,
            HeaderValue::from_static(" 203.0.113.7 , 10.0.0.1"),
        );
        let peer = "192.0.2.1:5000".parse().ok();
        assert_eq!(client_key(&headers, peer), "203.0.113.7");
    }

    #[test]
    fn client_key_falls_back_to_peer_then_unknown() {
        let headers = HeaderMap::new();
        assert_eq!(
            client_key(&headers, "192.0.2.1:5000".parse().ok()),
            "192.0.2.1"
        );
        assert_eq!(client_key(&headers, None), "unknown");
    }

    #[tokio::test]
    async fn each_client_gets_its_own_window() {
        let limiter = RateLimitState::new(1, Duration::from_secs(60));
        assert!(limiter.admit("a").await);
        assert!(!limiter.admit("a").await);
        assert!(limiter.admit("b").await);
    }

    #[tokio::test]
    async fn spent_window_reopens_after_it_elapses() {
        let limiter = RateLimitState::new(1, Duration::ZERO);
        assert!(limiter.admit("a").await);
        assert!(limiter.admit("a").await);
    }

    #[tokio::test]
    async fn expired_clients_are_swept_when_the_table_is_full() {
        let limiter = RateLimitState::new(1, Duration::ZERO);
        for i in 0..CLIENT_SWEEP_THRESHOLD {
            limiter.admit(&format!("client-{i}")).await;
        }
        assert_eq!(limiter.tracked_clients().await, CLIENT_SWEEP_THRESHOLD);

        limiter.admit("newcomer").await;
        assert_eq!(limiter.tracked_clients().await, 1);
    }
}
