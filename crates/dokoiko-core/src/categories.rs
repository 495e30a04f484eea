//! Category → provider filter code mapping.
//!
//! The mapping is loaded once at startup (YAML file or the built-in table)
//! and shared read-only as `Arc<CategoryMapping>`.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One human-facing category and the filter codes each provider understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
    /// Google place types, matched exactly.
    #[serde(rename = "google", default)]
    pub provider_a_types: Vec<String>,
    /// Yahoo genre-code prefixes; sub-genres extend these.
    #[serde(rename = "yahoo", default)]
    pub provider_b_genres: Vec<String>,
}

impl CategoryEntry {
    #[must_use]
    pub fn allows_type(&self, place_type: &str) -> bool {
        self.provider_a_types.iter().any(|t| t == place_type)
    }

    #[must_use]
    pub fn allows_genre(&self, genre_code: &str) -> bool {
        self.provider_b_genres
            .iter()
            .any(|prefix| genre_code.starts_with(prefix.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMapping {
    categories: Vec<CategoryEntry>,
}

impl CategoryMapping {
    /// Builds a mapping after validating names and genre codes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] on empty or duplicate names, or
    /// non-numeric genre codes.
    pub fn new(categories: Vec<CategoryEntry>) -> Result<Self, ConfigError> {
        let mapping = Self { categories };
        mapping.validate()?;
        Ok(mapping)
    }

    /// The table the application ships with.
    #[must_use]
    pub fn builtin() -> Self {
        let entry = |name: &str, google: &[&str], yahoo: &[&str]| CategoryEntry {
            name: name.to_owned(),
            provider_a_types: google.iter().map(|s| (*s).to_owned()).collect(),
            provider_b_genres: yahoo.iter().map(|s| (*s).to_owned()).collect(),
        };

        Self {
            categories: vec![
                entry(
                    "グルメ・レストラン",
                    &["restaurant", "cafe", "bar", "fast_food_restaurant", "bakery"],
                    &["01"],
                ),
                entry(
                    "ショッピング",
                    &[
                        "shopping_mall",
                        "store",
                        "supermarket",
                        "convenience_store",
                        "department_store",
                    ],
                    &["02"],
                ),
                entry(
                    "レジャー・エンタメ",
                    &[
                        "tourist_attraction",
                        "museum",
                        "amusement_park",
                        "park",
                        "movie_theater",
                    ],
                    &["03"],
                ),
                entry(
                    "暮らし・生活",
                    &["hospital", "pharmacy", "bank", "beauty_salon", "post_office"],
                    &["04"],
                ),
                entry(
                    "交通",
                    &[
                        "train_station",
                        "bus_station",
                        "parking",
                        "gas_station",
                        "airport",
                    ],
                    &["0306", "0411"],
                ),
                entry("教育", &["school", "university", "library"], &["0406"]),
                entry("宿泊", &["lodging", "hotel"], &["0304"]),
                entry("宗教", &["place_of_worship", "church"], &["0305"]),
            ],
        }
    }

    #[must_use]
    pub fn get(&self, category: &str) -> Option<&CategoryEntry> {
        self.categories.iter().find(|c| c.name == category)
    }

    /// Genre prefixes for `category`; empty when the category is unknown.
    #[must_use]
    pub fn provider_b_genres(&self, category: &str) -> &[String] {
        self.get(category)
            .map_or(&[][..], |c| c.provider_b_genres.as_slice())
    }

    #[must_use]
    pub fn provider_a_types(&self, category: &str) -> &[String] {
        self.get(category)
            .map_or(&[][..], |c| c.provider_a_types.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryEntry> {
        self.categories.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for category in &self.categories {
            if category.name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "category name must be non-empty".to_string(),
                ));
            }
            if !seen.insert(category.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate category: '{}'",
                    category.name
                )));
            }
            if let Some(bad) = category
                .provider_b_genres
                .iter()
                .find(|code| code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()))
            {
                return Err(ConfigError::Validation(format!(
                    "category '{}' has invalid genre code '{bad}'",
                    category.name
                )));
            }
        }
        Ok(())
    }
}

impl Default for CategoryMapping {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Load and validate a category mapping from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_categories(path: &Path) -> Result<CategoryMapping, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CategoriesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let mapping: CategoryMapping = serde_yaml::from_str(&content)?;
    mapping.validate()?;
    Ok(mapping)
}

const PLACE_TYPE_LABELS: &[(&str, &str)] = &[
    ("restaurant", "レストラン"),
    ("cafe", "カフェ"),
    ("bar", "バー"),
    ("fast_food_restaurant", "ファストフード"),
    ("bakery", "ベーカリー"),
    ("shopping_mall", "ショッピングモール"),
    ("store", "店舗"),
    ("supermarket", "スーパーマーケット"),
    ("convenience_store", "コンビニ"),
    ("department_store", "デパート"),
    ("tourist_attraction", "観光地"),
    ("museum", "博物館"),
    ("amusement_park", "遊園地"),
    ("park", "公園"),
    ("movie_theater", "映画館"),
    ("hospital", "病院"),
    ("pharmacy", "薬局"),
    ("bank", "銀行"),
    ("beauty_salon", "美容院"),
    ("post_office", "郵便局"),
    ("train_station", "電車駅"),
    ("bus_station", "バス停"),
    ("parking", "駐車場"),
    ("gas_station", "ガソリンスタンド"),
    ("airport", "空港"),
    ("school", "学校"),
    ("university", "大学"),
    ("library", "図書館"),
    ("lodging", "宿泊施設"),
    ("hotel", "ホテル"),
    ("place_of_worship", "宗教施設"),
    ("church", "教会"),
];

/// Japanese display label for a Google place type.
#[must_use]
pub fn place_type_label(place_type: &str) -> Option<&'static str> {
    PLACE_TYPE_LABELS
        .iter()
        .find(|(code, _)| *code == place_type)
        .map(|(_, label)| *label)
}
