use axum::{
    extract::{Query, State},
    Extension, Json,
};
use dokoiko_providers::PhotoData;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_provider_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PhotoQuery {
    pub photo_reference: Option<String>,
}

/// Resolves a Google photo reference server-side so the API key never
/// reaches the browser.
pub(super) async fn get_photo(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PhotoQuery>,
) -> Result<Json<ApiResponse<PhotoData>>, ApiError> {
    let Some(reference) = query
        .photo_reference
        .filter(|r| !r.trim().is_empty())
    else {
        return Err(ApiError::new(
            req_id.0,
            "bad_request",
            "photoReference is required",
        ));
    };

    let photo = state
        .photos
        .fetch(&reference)
        .await
        .map_err(|e| map_provider_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(photo, req_id.0)))
}
