//! Client-side favorites stored as a percent-encoded JSON cookie.

use chrono::Utc;
use cookie::time::{Duration, OffsetDateTime};
use cookie::{Cookie, SameSite};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::geo::Position;
use crate::results::{SourceProvider, UnifiedSearchResult};

pub const FAVORITES_COOKIE_KEY: &str = "dokoiko_favorites";
pub const COOKIE_EXPIRY_DAYS: i64 = 365;

/// `encodeURIComponent` leaves these unescaped; cookies written by older
/// clients depend on it.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(rename = "type")]
    pub provider: SourceProvider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub added_at: i64,
}

impl FavoriteItem {
    #[must_use]
    pub fn from_result(result: &UnifiedSearchResult) -> Self {
        let inner = &result.result;
        Self {
            id: favorite_id(
                inner.source_provider,
                inner.name.as_deref(),
                inner.latitude,
                inner.longitude,
            ),
            name: inner.name.clone(),
            address: inner.address.clone(),
            position: result.position,
            provider: inner.source_provider,
            url: inner.url.clone(),
            image: inner.image.clone(),
            added_at: Utc::now().timestamp_millis(),
        }
    }
}

/// `{provider}_{name}_{lat}_{lng}`; missing parts render as `undefined`
/// so ids match the ones existing cookies already carry.
#[must_use]
pub fn favorite_id(
    provider: SourceProvider,
    name: Option<&str>,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> String {
    let part = |v: Option<String>| v.unwrap_or_else(|| "undefined".to_owned());
    format!(
        "{provider}_{}_{}_{}",
        part(name.map(str::to_owned)),
        part(latitude.map(|v| v.to_string())),
        part(longitude.map(|v| v.to_string())),
    )
}

/// Ordered favorites, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteList {
    items: Vec<FavoriteItem>,
}

impl FavoriteList {
    /// Decodes a raw cookie value. Anything undecodable reads as empty.
    #[must_use]
    pub fn from_cookie_value(raw: &str) -> Self {
        let Ok(decoded) = percent_decode_str(raw).decode_utf8() else {
            return Self::default();
        };
        serde_json::from_str::<Vec<FavoriteItem>>(&decoded)
            .map(|items| Self { items })
            .unwrap_or_default()
    }

    /// Finds the favorites cookie among `Cookie` header values. A missing or
    /// undecodable cookie reads as empty.
    #[must_use]
    pub fn from_cookie_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        headers
            .into_iter()
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == FAVORITES_COOKIE_KEY)
            .map(|cookie| Self::from_cookie_value(cookie.value()))
            .unwrap_or_default()
    }

    /// Encodes the list for a cookie value.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; not expected for well-formed items.
    pub fn to_cookie_value(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(&self.items)?;
        Ok(utf8_percent_encode(&json, COMPONENT).to_string())
    }

    /// The favorites cookie, expiring 365 days from now.
    ///
    /// # Errors
    ///
    /// Propagates [`FavoriteList::to_cookie_value`] failures.
    pub fn to_cookie(&self) -> Result<Cookie<'static>, serde_json::Error> {
        Ok(Cookie::build((FAVORITES_COOKIE_KEY, self.to_cookie_value()?))
            .path("/")
            .same_site(SameSite::Lax)
            .expires(OffsetDateTime::now_utc() + Duration::days(COOKIE_EXPIRY_DAYS))
            .build())
    }

    /// Prepends `item` unless an item with the same id exists.
    /// Returns whether the list changed.
    pub fn add(&mut self, item: FavoriteItem) -> bool {
        if self.contains(&item.id) {
            return false;
        }
        self.items.insert(0, item);
        true
    }

    /// Returns whether an item was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|fav| fav.id != id);
        self.items.len() != before
    }

    /// Adds when absent, removes when present. Returns `true` if the item is
    /// a favorite afterwards.
    pub fn toggle(&mut self, item: FavoriteItem) -> bool {
        if self.remove(&item.id) {
            false
        } else {
            self.add(item)
        }
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|fav| fav.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn items(&self) -> &[FavoriteItem] {
        &self.items
    }
}
