//! Provider filter selections and their reconciliation against a category.

use serde::{Deserialize, Serialize};

use crate::categories::CategoryMapping;

/// Maximum number of live selections per provider filter list.
pub const MAX_FILTER_SELECTIONS: usize = 3;

/// Currently selected provider-specific filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    #[serde(default)]
    pub provider_a_types: Vec<String>,
    #[serde(default)]
    pub provider_b_genres: Vec<String>,
}

/// Which lists a reconciliation pass rewrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    pub provider_a_changed: bool,
    pub provider_b_changed: bool,
}

impl ReconcileOutcome {
    #[must_use]
    pub fn changed(self) -> bool {
        self.provider_a_changed || self.provider_b_changed
    }
}

impl FilterState {
    /// Adds a Google type. Returns `false` (no-op) when the list is full or
    /// the type is already selected.
    pub fn try_add_type(&mut self, place_type: impl Into<String>) -> bool {
        try_add(&mut self.provider_a_types, place_type.into())
    }

    /// Adds a Yahoo genre code. Same cap and de-duplication as
    /// [`FilterState::try_add_type`].
    pub fn try_add_genre(&mut self, genre_code: impl Into<String>) -> bool {
        try_add(&mut self.provider_b_genres, genre_code.into())
    }

    pub fn remove_type(&mut self, place_type: &str) {
        self.provider_a_types.retain(|t| t != place_type);
    }

    pub fn remove_genre(&mut self, genre_code: &str) {
        self.provider_b_genres.retain(|g| g != genre_code);
    }
}

fn try_add(list: &mut Vec<String>, value: String) -> bool {
    if list.len() >= MAX_FILTER_SELECTIONS || list.contains(&value) {
        return false;
    }
    list.push(value);
    true
}

/// Prunes `state` to the filters allowed by `category`.
///
/// An empty category clears both lists. Otherwise Google types must appear
/// in the category's type list exactly, and Yahoo genres must start with one
/// of the category's genre prefixes. A list is only written back when its
/// length changed, so repeated passes settle immediately.
pub fn reconcile_filters(
    mapping: &CategoryMapping,
    category: &str,
    state: &mut FilterState,
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();

    if category.is_empty() {
        if !state.provider_a_types.is_empty() {
            state.provider_a_types.clear();
            outcome.provider_a_changed = true;
        }
        if !state.provider_b_genres.is_empty() {
            state.provider_b_genres.clear();
            outcome.provider_b_changed = true;
        }
        return outcome;
    }

    let entry = mapping.get(category);

    let filtered_types: Vec<String> = state
        .provider_a_types
        .iter()
        .filter(|t| entry.is_some_and(|e| e.allows_type(t)))
        .cloned()
        .collect();

    let filtered_genres: Vec<String> = state
        .provider_b_genres
        .iter()
        .filter(|g| entry.is_some_and(|e| e.allows_genre(g)))
        .cloned()
        .collect();

    if filtered_types.len() != state.provider_a_types.len() {
        state.provider_a_types = filtered_types;
        outcome.provider_a_changed = true;
    }
    if filtered_genres.len() != state.provider_b_genres.len() {
        state.provider_b_genres = filtered_genres;
        outcome.provider_b_changed = true;
    }

    outcome
}
