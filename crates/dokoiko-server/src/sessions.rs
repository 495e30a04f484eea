//! Per-visitor search sessions.
//!
//! Each session owns one [`SearchController`], so aggregate state is never
//! shared between visitors. Sessions idle for longer than the TTL are swept.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dokoiko_search::{SearchController, SearchServices};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

struct SessionEntry {
    controller: Arc<SearchController>,
    last_access: Instant,
}

#[derive(Clone)]
pub struct SessionStore {
    services: Arc<SearchServices>,
    ttl: Duration,
    sessions: Arc<Mutex<HashMap<Uuid, SessionEntry>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(services: Arc<SearchServices>, ttl: Duration) -> Self {
        Self {
            services,
            ttl,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Controller for `id`, or a fresh session when `id` is absent or unknown.
    pub async fn get_or_create(&self, id: Option<Uuid>) -> (Uuid, Arc<SearchController>) {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(&id) {
                entry.last_access = now;
                return (id, Arc::clone(&entry.controller));
            }
        }

        let id = Uuid::new_v4();
        let controller = Arc::new(SearchController::new(Arc::clone(&self.services)));
        sessions.insert(
            id,
            SessionEntry {
                controller: Arc::clone(&controller),
                last_access: now,
            },
        );
        tracing::debug!(session_id = %id, sessions = sessions.len(), "search session created");
        (id, controller)
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<SearchController>> {
        let mut sessions = self.sessions.lock().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_access = Instant::now();
        Some(Arc::clone(&entry.controller))
    }

    /// Drops sessions idle for at least the TTL. Rounds already running keep
    /// their controller alive until they settle.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_access.elapsed() < self.ttl);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Runs [`SessionStore::evict_idle`] every `every` until the runtime stops.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle().await;
                if evicted > 0 {
                    tracing::info!(evicted, "evicted idle search sessions");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{services, UNREACHABLE_BASE_URL};

    fn store(ttl: Duration) -> SessionStore {
        SessionStore::new(services(UNREACHABLE_BASE_URL), ttl)
    }

    #[tokio::test]
    async fn known_id_returns_the_same_controller() {
        let store = store(Duration::from_secs(60));
        let (id, first) = store.get_or_create(None).await;
        let (again, second) = store.get_or_create(Some(id)).await;
        assert_eq!(id, again);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(store.get(id).await.is_some());
    }

    #[tokio::test]
    async fn unknown_id_starts_a_new_session() {
        let store = store(Duration::from_secs(60));
        let stale = Uuid::new_v4();
        let (id, _) = store.get_or_create(Some(stale)).await;
        assert_ne!(id, stale);
        assert!(store.get(stale).await.is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted() {
        let store = store(Duration::ZERO);
        store.get_or_create(None).await;
        store.get_or_create(None).await;
        assert_eq!(store.evict_idle().await, 2);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn active_sessions_survive_the_sweep() {
        let store = store(Duration::from_secs(600));
        let (id, _) = store.get_or_create(None).await;
        assert_eq!(store.evict_idle().await, 0);
        assert!(store.get(id).await.is_some());
    }
}
