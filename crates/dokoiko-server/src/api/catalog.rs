use axum::{extract::State, Extension, Json};
use dokoiko_core::{
    place_type_label, reconcile_filters, CategoryEntry, FilterState, ReconcileOutcome,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiResponse, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CategoryItem {
    pub name: String,
    pub provider_a_types: Vec<PlaceTypeItem>,
    pub provider_b_genres: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct PlaceTypeItem {
    pub code: String,
    /// Japanese display label; `None` for codes without one.
    pub label: Option<&'static str>,
}

impl From<&CategoryEntry> for CategoryItem {
    fn from(entry: &CategoryEntry) -> Self {
        Self {
            name: entry.name.clone(),
            provider_a_types: entry
                .provider_a_types
                .iter()
                .map(|code| PlaceTypeItem {
                    code: code.clone(),
                    label: place_type_label(code),
                })
                .collect(),
            provider_b_genres: entry.provider_b_genres.clone(),
        }
    }
}

pub(super) async fn list_categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<CategoryItem>>> {
    let data = state.categories.iter().map(CategoryItem::from).collect();
    Json(ApiResponse::new(data, req_id.0))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ReconcileBody {
    #[serde(default)]
    pub category: String,
    #[serde(flatten)]
    pub filters: FilterState,
}

#[derive(Debug, Serialize)]
pub(super) struct ReconcileData {
    #[serde(flatten)]
    pub filters: FilterState,
    #[serde(flatten)]
    pub outcome: ReconcileOutcome,
}

/// Prunes the submitted selections to what `category` allows.
pub(super) async fn reconcile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ReconcileBody>,
) -> Json<ApiResponse<ReconcileData>> {
    let mut filters = body.filters;
    let outcome = reconcile_filters(&state.categories, body.category.trim(), &mut filters);
    Json(ApiResponse::new(ReconcileData { filters, outcome }, req_id.0))
}
