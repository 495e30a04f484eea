//! User search input and its validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filters::MAX_FILTER_SELECTIONS;

pub const DEFAULT_RADIUS_M: u32 = 3_000;
pub const MIN_RADIUS_M: u32 = 100;
pub const MAX_RADIUS_M: u32 = 50_000;

fn default_radius() -> u32 {
    DEFAULT_RADIUS_M
}

/// Everything the rendering layer submits for one search.
///
/// Captured once per search; load-more reuses the captured copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Missing reads as empty so it fails validation rather than parsing.
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub provider_a_types: Vec<String>,
    #[serde(default)]
    pub provider_b_genres: Vec<String>,
    #[serde(rename = "radius", default = "default_radius")]
    pub radius_m: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

impl SearchRequest {
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            category: String::new(),
            provider_a_types: Vec::new(),
            provider_b_genres: Vec::new(),
            radius_m: DEFAULT_RADIUS_M,
            keyword: None,
        }
    }

    /// Trims free-text fields and drops empty filter entries and keywords.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.address = self.address.trim().to_owned();
        self.category = self.category.trim().to_owned();
        self.provider_a_types.retain(|t| !t.trim().is_empty());
        self.provider_b_genres.retain(|g| !g.trim().is_empty());
        self.keyword = self
            .keyword
            .map(|k| k.trim().to_owned())
            .filter(|k| !k.is_empty());
        self
    }

    /// Field-level checks run before any network call.
    ///
    /// # Errors
    ///
    /// Returns every failing field at once.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        if self.address.trim().is_empty() {
            errors.push(FieldError::new("address", "住所を入力してください"));
        }
        if self.provider_a_types.len() > MAX_FILTER_SELECTIONS {
            errors.push(FieldError::new(
                "providerATypes",
                format!("Google検索オプションは最大{MAX_FILTER_SELECTIONS}つまでです"),
            ));
        }
        if self.provider_b_genres.len() > MAX_FILTER_SELECTIONS {
            errors.push(FieldError::new(
                "providerBGenres",
                format!("Yahoo検索オプションは最大{MAX_FILTER_SELECTIONS}つまでです"),
            ));
        }
        if !(MIN_RADIUS_M..=MAX_RADIUS_M).contains(&self.radius_m) {
            errors.push(FieldError::new(
                "radius",
                format!("検索範囲は{MIN_RADIUS_M}〜{MAX_RADIUS_M}mで指定してください"),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid search request: {}", .0.iter().map(|e| e.field).collect::<Vec<_>>().join(", "))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    #[must_use]
    pub fn fields(&self) -> Vec<&'static str> {
        self.0.iter().map(|e| e.field).collect()
    }
}
