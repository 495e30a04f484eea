use axum::{
    extract::{Path, State},
    Extension, Json,
};
use dokoiko_core::SearchRequest;
use dokoiko_search::{LoadMoreError, SearchController, SearchError, SearchView};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SearchBody {
    #[serde(flatten)]
    pub request: SearchRequest,
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SessionView {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub view: SearchView,
}

pub(super) async fn start_search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SearchBody>,
) -> Result<Json<ApiResponse<SessionView>>, ApiError> {
    let (session_id, controller) = state.sessions.get_or_create(body.session_id).await;

    let view = controller
        .search(body.request)
        .await
        .map_err(|e| map_search_error(req_id.0.clone(), &e))?;

    tracing::info!(
        session_id = %session_id,
        round_id = view.status.round_id,
        results = view.results.len(),
        has_more = view.has_more,
        "search completed"
    );

    Ok(Json(ApiResponse::new(SessionView { session_id, view }, req_id.0)))
}

pub(super) async fn load_more(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<SessionView>>, ApiError> {
    let (session_id, controller) = find_session(&state, &req_id, &session_id).await?;

    // Every load-more refusal is a session-state conflict.
    let view = controller
        .load_more()
        .await
        .map_err(|e: LoadMoreError| {
            tracing::info!(session_id = %session_id, error = %e, "load more rejected");
            ApiError::new(req_id.0.clone(), "conflict", e.to_string())
        })?;

    Ok(Json(ApiResponse::new(SessionView { session_id, view }, req_id.0)))
}

pub(super) async fn get_search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<SessionView>>, ApiError> {
    let (session_id, controller) = find_session(&state, &req_id, &session_id).await?;
    let view = controller.view();
    Ok(Json(ApiResponse::new(SessionView { session_id, view }, req_id.0)))
}

async fn find_session(
    state: &AppState,
    req_id: &RequestId,
    raw_id: &str,
) -> Result<(Uuid, Arc<SearchController>), ApiError> {
    let not_found = || {
        ApiError::new(
            req_id.0.clone(),
            "not_found",
            format!("search session {raw_id} not found"),
        )
    };

    let id = Uuid::parse_str(raw_id).map_err(|_| not_found())?;
    let controller = state.sessions.get(id).await.ok_or_else(not_found)?;
    Ok((id, controller))
}

fn map_search_error(request_id: String, error: &SearchError) -> ApiError {
    match error {
        SearchError::Validation(errors) => {
            let message = errors
                .0
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect::<Vec<_>>()
                .join("; ");
            ApiError::new(request_id, "validation_error", message)
        }
        SearchError::Superseded { .. } => {
            ApiError::new(request_id, "conflict", error.to_string())
        }
    }
}
