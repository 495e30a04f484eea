//! Favorites live entirely in the visitor's cookie; these routes read it,
//! apply one change, and hand back the rewritten `Set-Cookie`.

use axum::{
    extract::Query,
    http::{header, HeaderMap},
    Extension, Json,
};
use dokoiko_core::{FavoriteItem, FavoriteList, UnifiedSearchResult};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse};

type WithCookie<T> = ([(header::HeaderName, String); 1], Json<ApiResponse<T>>);

#[derive(Debug, Serialize)]
pub(super) struct FavoritesData {
    pub favorites: Vec<FavoriteItem>,
    pub count: usize,
}

impl From<&FavoriteList> for FavoritesData {
    fn from(list: &FavoriteList) -> Self {
        Self {
            favorites: list.items().to_vec(),
            count: list.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ToggleData {
    pub id: String,
    pub favorited: bool,
    #[serde(flatten)]
    pub list: FavoritesData,
}

#[derive(Debug, Deserialize)]
pub(super) struct RemoveQuery {
    pub id: String,
}

pub(super) fn favorites_from_headers(headers: &HeaderMap) -> FavoriteList {
    FavoriteList::from_cookie_headers(
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok()),
    )
}

fn with_cookie<T: serde::Serialize>(
    request_id: String,
    list: &FavoriteList,
    data: T,
) -> Result<WithCookie<T>, ApiError> {
    let cookie = list.to_cookie().map_err(|e| {
        tracing::error!(error = %e, "failed to encode favorites cookie");
        ApiError::new(request_id.clone(), "internal_error", "failed to encode favorites")
    })?;
    Ok((
        [(header::SET_COOKIE, cookie.to_string())],
        Json(ApiResponse::new(data, request_id)),
    ))
}

pub(super) async fn list_favorites(
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
) -> Json<ApiResponse<FavoritesData>> {
    let list = favorites_from_headers(&headers);
    Json(ApiResponse::new(FavoritesData::from(&list), req_id.0))
}

pub(super) async fn add_favorite(
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    Json(result): Json<UnifiedSearchResult>,
) -> Result<WithCookie<FavoritesData>, ApiError> {
    let mut list = favorites_from_headers(&headers);
    list.add(FavoriteItem::from_result(&result));
    let data = FavoritesData::from(&list);
    with_cookie(req_id.0, &list, data)
}

pub(super) async fn remove_favorite(
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    Query(query): Query<RemoveQuery>,
) -> Result<WithCookie<FavoritesData>, ApiError> {
    let mut list = favorites_from_headers(&headers);
    if !list.remove(&query.id) {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("favorite {} not found", query.id),
        ));
    }
    let data = FavoritesData::from(&list);
    with_cookie(req_id.0, &list, data)
}

pub(super) async fn toggle_favorite(
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    Json(result): Json<UnifiedSearchResult>,
) -> Result<WithCookie<ToggleData>, ApiError> {
    let mut list = favorites_from_headers(&headers);
    let item = FavoriteItem::from_result(&result);
    let id = item.id.clone();
    let favorited = list.toggle(item);
    let data = ToggleData {
        id,
        favorited,
        list: FavoritesData::from(&list),
    };
    with_cookie(req_id.0, &list, data)
}
