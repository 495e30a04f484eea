//! Search / load-more state machine for one session.
//!
//! `Idle → Searching → Ready ⇄ LoadingMore`. Every round (initial search or
//! load-more) takes a fresh round id; a round whose id is no longer current
//! when it settles is discarded without touching the aggregate.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use dokoiko_core::{
    markers_for, Coordinate, MarkerData, ProviderTypeSelection, SearchRequest,
    UnifiedSearchResult,
};
use dokoiko_providers::ProviderError;
use serde::Serialize;

use crate::aggregate::AggregateSearchState;
use crate::error::{LoadMoreError, SearchError};
use crate::local::LocalBatch;
use crate::nearby::NearbyBatch;
use crate::services::SearchServices;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerPhase {
    Idle,
    Searching,
    Ready,
    LoadingMore,
}

/// What one provider contributed to the latest round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProviderOutcome {
    Ok { count: usize },
    Failed { reason: String },
    /// Not called: nothing left to page through, or no location.
    Skipped,
}

/// Distinct signals for the latest round, even where the UI shows one
/// "no results" message for all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundStatus {
    pub round_id: u64,
    pub address_not_found: bool,
    pub provider_a: ProviderOutcome,
    pub provider_b: ProviderOutcome,
}

impl RoundStatus {
    fn skipped(round_id: u64) -> Self {
        Self {
            round_id,
            address_not_found: false,
            provider_a: ProviderOutcome::Skipped,
            provider_b: ProviderOutcome::Skipped,
        }
    }
}

/// Everything the rendering layer needs after a round.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchView {
    pub phase: ControllerPhase,
    pub origin: Option<Coordinate>,
    pub results: Vec<UnifiedSearchResult>,
    pub markers: Vec<MarkerData>,
    pub has_more: bool,
    pub status: RoundStatus,
}

struct Inner {
    phase: ControllerPhase,
    round_id: u64,
    aggregate: Option<AggregateSearchState>,
    status: RoundStatus,
}

impl Inner {
    fn view(&self) -> SearchView {
        let (origin, results, has_more) = match &self.aggregate {
            Some(state) => (Some(state.origin), state.unified(), state.has_more()),
            None => (None, Vec::new(), false),
        };
        SearchView {
            phase: self.phase,
            origin,
            markers: markers_for(&results),
            results,
            has_more,
            status: self.status.clone(),
        }
    }
}

/// One provider leg of a round.
enum Leg<T> {
    Fetched(T),
    Failed(String),
    Skipped,
}

impl<T> Leg<T> {
    fn outcome(&self, count: impl FnOnce(&T) -> usize) -> ProviderOutcome {
        match self {
            Leg::Fetched(batch) => ProviderOutcome::Ok {
                count: count(batch),
            },
            Leg::Failed(reason) => ProviderOutcome::Failed {
                reason: reason.clone(),
            },
            Leg::Skipped => ProviderOutcome::Skipped,
        }
    }
}

/// Which legs a round runs. `None` skips the provider.
struct RoundPlan {
    selections: Option<Vec<ProviderTypeSelection>>,
    page: Option<u32>,
}

impl RoundPlan {
    fn first(request: &SearchRequest) -> Self {
        Self {
            selections: Some(
                request
                    .provider_a_types
                    .iter()
                    .map(ProviderTypeSelection::first_page)
                    .collect(),
            ),
            page: Some(1),
        }
    }

    fn next(state: &AggregateSearchState) -> Self {
        Self {
            selections: state
                .cursor_a
                .has_more()
                .then(|| state.cursor_a.selections.clone()),
            page: state
                .cursor_b
                .has_more()
                .then_some(state.cursor_b.page + 1),
        }
    }

    fn is_empty(&self) -> bool {
        self.selections.is_none() && self.page.is_none()
    }
}

/// Restores `phase` if a round's future is dropped before it settles.
struct PhaseGuard<'a> {
    inner: &'a Mutex<Inner>,
    round_id: u64,
    during: ControllerPhase,
    restore: ControllerPhase,
    armed: bool,
}

impl PhaseGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.round_id == self.round_id && inner.phase == self.during {
            tracing::debug!(round_id = self.round_id, "round abandoned before settling");
            inner.phase = self.restore;
        }
    }
}

/// Drives searches and load-more rounds for one session.
pub struct SearchController {
    services: Arc<SearchServices>,
    inner: Mutex<Inner>,
}

impl SearchController {
    #[must_use]
    pub fn new(services: Arc<SearchServices>) -> Self {
        Self {
            services,
            inner: Mutex::new(Inner {
                phase: ControllerPhase::Idle,
                round_id: 0,
                aggregate: None,
                status: RoundStatus::skipped(0),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn phase(&self) -> ControllerPhase {
        self.lock().phase
    }

    #[must_use]
    pub fn view(&self) -> SearchView {
        self.lock().view()
    }

    /// Snapshot of the accumulated state, if a search has completed.
    #[must_use]
    pub fn aggregate(&self) -> Option<AggregateSearchState> {
        self.lock().aggregate.clone()
    }

    /// Starts a new search, discarding any previous aggregate and
    /// superseding whatever round is in flight.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Validation`] before any network call for bad input.
    /// - [`SearchError::Superseded`] if another search started meanwhile.
    pub async fn search(&self, request: SearchRequest) -> Result<SearchView, SearchError> {
        let request = request.normalized();
        request.validate()?;

        let round_id = {
            let mut inner = self.lock();
            inner.round_id += 1;
            inner.phase = ControllerPhase::Searching;
            inner.aggregate = None;
            inner.status = RoundStatus::skipped(inner.round_id);
            inner.round_id
        };
        let mut guard = PhaseGuard {
            inner: &self.inner,
            round_id,
            during: ControllerPhase::Searching,
            restore: ControllerPhase::Idle,
            armed: true,
        };
        tracing::info!(
            round_id,
            address = %request.address,
            category = %request.category,
            "search started"
        );

        let Some(origin) = self.services.geocoder.geocode(&request.address).await else {
            guard.disarm();
            let mut inner = self.lock();
            if inner.round_id != round_id {
                return Err(SearchError::Superseded { round_id });
            }
            inner.phase = ControllerPhase::Idle;
            inner.status.address_not_found = true;
            return Ok(inner.view());
        };

        let plan = RoundPlan::first(&request);
        let mut state = AggregateSearchState::new(origin, request);
        let (nearby, local) = self.run_round(round_id, &state, &plan).await;

        guard.disarm();
        let mut inner = self.lock();
        if inner.round_id != round_id {
            tracing::info!(round_id, current = inner.round_id, "discarding stale search round");
            return Err(SearchError::Superseded { round_id });
        }
        inner.status = apply_round(&mut state, round_id, &plan, nearby, local);
        tracing::info!(
            round_id,
            results = state.len(),
            has_more = state.has_more(),
            "search settled"
        );
        inner.aggregate = Some(state);
        inner.phase = ControllerPhase::Ready;
        Ok(inner.view())
    }

    /// Advances both provider cursors once and appends the new pages.
    ///
    /// Uses the request captured at search time. A provider with nothing
    /// left to page through is not called; when neither has more, the
    /// current view is returned unchanged.
    ///
    /// # Errors
    ///
    /// - [`LoadMoreError::NoActiveSearch`] before a search has settled.
    /// - [`LoadMoreError::InFlight`] while another load-more runs.
    /// - [`LoadMoreError::Superseded`] if a new search started meanwhile.
    pub async fn load_more(&self) -> Result<SearchView, LoadMoreError> {
        let (round_id, snapshot, plan) = {
            let mut inner = self.lock();
            match inner.phase {
                ControllerPhase::Ready => {}
                ControllerPhase::LoadingMore => return Err(LoadMoreError::InFlight),
                ControllerPhase::Idle | ControllerPhase::Searching => {
                    return Err(LoadMoreError::NoActiveSearch)
                }
            }
            let Some(state) = inner.aggregate.as_ref() else {
                return Err(LoadMoreError::NoActiveSearch);
            };
            let plan = RoundPlan::next(state);
            if plan.is_empty() {
                return Ok(inner.view());
            }
            let snapshot = AggregateSearchState::new(state.origin, state.request.clone());
            inner.round_id += 1;
            inner.phase = ControllerPhase::LoadingMore;
            (inner.round_id, snapshot, plan)
        };
        let mut guard = PhaseGuard {
            inner: &self.inner,
            round_id,
            during: ControllerPhase::LoadingMore,
            restore: ControllerPhase::Ready,
            armed: true,
        };
        tracing::info!(
            round_id,
            provider_a = plan.selections.is_some(),
            provider_b_page = plan.page,
            "load more started"
        );

        let (nearby, local) = self.run_round(round_id, &snapshot, &plan).await;

        guard.disarm();
        let mut inner = self.lock();
        if inner.round_id != round_id {
            tracing::info!(round_id, current = inner.round_id, "discarding stale load-more round");
            return Err(LoadMoreError::Superseded { round_id });
        }
        let Some(mut state) = inner.aggregate.take() else {
            inner.phase = ControllerPhase::Idle;
            return Err(LoadMoreError::NoActiveSearch);
        };
        inner.status = apply_round(&mut state, round_id, &plan, nearby, local);
        tracing::info!(
            round_id,
            results = state.len(),
            has_more = state.has_more(),
            "load more settled"
        );
        inner.aggregate = Some(state);
        inner.phase = ControllerPhase::Ready;
        Ok(inner.view())
    }

    /// Runs both legs concurrently; each is bounded by the round timeout.
    async fn run_round(
        &self,
        round_id: u64,
        state: &AggregateSearchState,
        plan: &RoundPlan,
    ) -> (Leg<NearbyBatch>, Leg<LocalBatch>) {
        let services = &self.services;
        let request = &state.request;
        let keyword = request.keyword.as_deref();
        let limit = services.round_timeout;

        let nearby = async {
            match &plan.selections {
                Some(selections) => {
                    bounded(
                        limit,
                        round_id,
                        "google",
                        services.nearby.search_nearby(
                            state.origin,
                            selections,
                            request.radius_m,
                            keyword,
                        ),
                    )
                    .await
                }
                None => Leg::Skipped,
            }
        };
        let local = async {
            match plan.page {
                Some(page) => {
                    bounded(
                        limit,
                        round_id,
                        "yahoo",
                        services.local.search_local(
                            state.origin,
                            &request.category,
                            page,
                            &request.provider_b_genres,
                            request.radius_m,
                            keyword,
                        ),
                    )
                    .await
                }
                None => Leg::Skipped,
            }
        };

        tokio::join!(nearby, local)
    }
}

async fn bounded<T>(
    limit: Duration,
    round_id: u64,
    provider: &'static str,
    call: impl Future<Output = Result<T, ProviderError>>,
) -> Leg<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(batch)) => Leg::Fetched(batch),
        Ok(Err(e)) => {
            tracing::warn!(round_id, provider, error = %e, "provider leg failed, treating as empty");
            Leg::Failed(e.to_string())
        }
        Err(_) => {
            tracing::warn!(
                round_id,
                provider,
                timeout_secs = limit.as_secs(),
                "provider leg timed out, treating as empty"
            );
            Leg::Failed("timed out".to_owned())
        }
    }
}

/// Appends a settled round onto `state` and advances its cursors.
///
/// A failed leg ends that provider's pagination; a skipped leg leaves it
/// untouched.
fn apply_round(
    state: &mut AggregateSearchState,
    round_id: u64,
    plan: &RoundPlan,
    nearby: Leg<NearbyBatch>,
    local: Leg<LocalBatch>,
) -> RoundStatus {
    let status = RoundStatus {
        round_id,
        address_not_found: false,
        provider_a: nearby.outcome(|b| b.results.len()),
        provider_b: local.outcome(|b| b.results.len()),
    };

    match nearby {
        Leg::Fetched(batch) => {
            state.results_a.extend(batch.results);
            state.cursor_a.selections = batch.next_selections;
        }
        Leg::Failed(_) => state.cursor_a.selections.clear(),
        Leg::Skipped => {}
    }

    match local {
        Leg::Fetched(batch) => {
            state.results_b.extend(batch.results);
            state.cursor_b.page = plan.page.unwrap_or(state.cursor_b.page);
            state.cursor_b.total_known = batch.total;
            state.cursor_b.has_next_page = batch.has_next_page;
        }
        Leg::Failed(_) => state.cursor_b.has_next_page = false,
        Leg::Skipped => {}
    }

    status
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
