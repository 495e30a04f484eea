//! Google Places photo fetch, returned as an inline data URL.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Url;
use serde::Serialize;

use crate::error::ProviderError;
use crate::google;
use crate::http::{endpoint, parse_base_url, HttpSettings, ProviderHttp};

pub const PHOTO_MAX_WIDTH: u32 = 400;
pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// Photo bytes ready for the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoData {
    /// `data:{content_type};base64,...`
    pub image_data: String,
    pub content_type: String,
}

impl PhotoData {
    #[must_use]
    pub fn from_bytes(bytes: &[u8], content_type: Option<&str>) -> Self {
        let content_type = content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_owned();
        Self {
            image_data: format!("data:{content_type};base64,{}", STANDARD.encode(bytes)),
            content_type,
        }
    }
}

pub struct GooglePhotoClient {
    http: ProviderHttp,
    api_key: String,
    photo_url: Url,
}

impl GooglePhotoClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, settings: &HttpSettings) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, settings, google::DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// See [`GooglePhotoClient::new`]; also [`ProviderError::InvalidBaseUrl`].
    pub fn with_base_url(
        api_key: &str,
        settings: &HttpSettings,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        let base = parse_base_url(base_url)?;
        Ok(Self {
            http: ProviderHttp::new(google::PROVIDER, settings)?,
            api_key: api_key.to_owned(),
            photo_url: endpoint(&base, "place/photo")?,
        })
    }

    /// Fetches the photo for `photo_reference`, following Google's redirect
    /// to the image host.
    ///
    /// # Errors
    ///
    /// [`ProviderError::UnexpectedStatus`] carries the upstream status for
    /// non-2xx answers; transport failures surface as [`ProviderError::Http`].
    pub async fn fetch(&self, photo_reference: &str) -> Result<PhotoData, ProviderError> {
        let mut url = self.photo_url.clone();
        url.query_pairs_mut()
            .append_pair("maxwidth", &PHOTO_MAX_WIDTH.to_string())
            .append_pair("photoreference", photo_reference)
            .append_pair("key", &self.api_key);

        let (bytes, content_type) = self.http.get_bytes(&url).await?;
        tracing::debug!(bytes = bytes.len(), "google photo fetched");
        Ok(PhotoData::from_bytes(&bytes, content_type.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_defaults_to_jpeg() {
        let photo = PhotoData::from_bytes(b"abc", None);
        assert_eq!(photo.content_type, "image/jpeg");
        assert_eq!(photo.image_data, "data:image/jpeg;base64,YWJj");
    }

    #[test]
    fn data_url_uses_upstream_content_type() {
        let photo = PhotoData::from_bytes(&[0x89, 0x50], Some("image/png"));
        assert_eq!(photo.image_data, "data:image/png;base64,iVA=");
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(PhotoData::from_bytes(b"", None)).expect("serialize");
        assert_eq!(json["contentType"], "image/jpeg");
        assert_eq!(json["imageData"], "data:image/jpeg;base64,");
    }
}
