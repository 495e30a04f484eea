//! Raw Yahoo! Local Search (`localSearch` V1, `output=json`) response shapes.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocalSearchResponse {
    #[serde(default)]
    pub result_info: ResultInfo,
    /// Absent entirely when nothing matched.
    #[serde(default)]
    pub feature: Vec<Feature>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultInfo {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub start: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Feature {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub property: Property,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Geometry {
    /// `"lng,lat"` as a single string.
    pub coordinates: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Property {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub genre: Vec<Genre>,
    #[serde(default)]
    pub detail: Option<Detail>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Genre {
    pub code: String,
    pub name: String,
}

/// `detail=full` block. Up to nine image slots, any of which may be empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Detail {
    #[serde(rename = "PcUrl1", default)]
    pub pc_url1: Option<String>,
    #[serde(rename = "MobileUrl1", default)]
    pub mobile_url1: Option<String>,
    #[serde(rename = "Image1", default)]
    pub image1: Option<String>,
    #[serde(rename = "Image2", default)]
    pub image2: Option<String>,
    #[serde(rename = "Image3", default)]
    pub image3: Option<String>,
    #[serde(rename = "Image4", default)]
    pub image4: Option<String>,
    #[serde(rename = "Image5", default)]
    pub image5: Option<String>,
    #[serde(rename = "Image6", default)]
    pub image6: Option<String>,
    #[serde(rename = "Image7", default)]
    pub image7: Option<String>,
    #[serde(rename = "Image8", default)]
    pub image8: Option<String>,
    #[serde(rename = "Image9", default)]
    pub image9: Option<String>,
}

impl Detail {
    /// First non-empty image slot, in slot order.
    #[must_use]
    pub fn first_image(&self) -> Option<&str> {
        [
            &self.image1,
            &self.image2,
            &self.image3,
            &self.image4,
            &self.image5,
            &self.image6,
            &self.image7,
            &self.image8,
            &self.image9,
        ]
        .into_iter()
        .filter_map(Option::as_deref)
        .find(|s| !s.is_empty())
    }
}
