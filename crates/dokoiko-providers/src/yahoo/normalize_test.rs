use super::*;
use crate::yahoo::response::{Detail, Genre, Geometry, Property};

fn feature() -> Feature {
    Feature {
        name: Some("喫茶 梅田".to_owned()),
        geometry: Some(Geometry {
            coordinates: "135.4959,34.7025".to_owned(),
        }),
        property: Property {
            address: Some("大阪府大阪市北区梅田3丁目".to_owned()),
            genre: vec![Genre {
                code: "0110005".to_owned(),
                name: "喫茶店".to_owned(),
            }],
            detail: None,
        },
    }
}

#[test]
fn coordinates_are_swapped_into_lat_lng() {
    let r = normalize_feature(feature(), 7);
    assert_eq!(r.latitude, Some(34.7025));
    assert_eq!(r.longitude, Some(135.4959));
    assert_eq!(r.source_provider, SourceProvider::Yahoo);
    assert_eq!(r.fetched_at_epoch_millis, 7);
}

#[test]
fn malformed_coordinates_leave_result_unlocated() {
    let mut f = feature();
    f.geometry = Some(Geometry {
        coordinates: "135.4959".to_owned(),
    });
    assert_eq!(normalize_feature(f, 0).position(), None);
    assert_eq!(parse_coordinates("abc,34.7"), None);
}

#[test]
fn first_non_empty_image_wins() {
    let mut f = feature();
    f.property.detail = Some(Detail {
        image1: Some(String::new()),
        image3: Some("https://img.example/3.jpg".to_owned()),
        image4: Some("https://img.example/4.jpg".to_owned()),
        ..Detail::default()
    });
    let r = normalize_feature(f, 0);
    assert_eq!(r.image.as_deref(), Some("https://img.example/3.jpg"));
}

#[test]
fn pc_url_preferred_then_mobile() {
    let mut f = feature();
    f.property.detail = Some(Detail {
        pc_url1: Some("https://pc.example".to_owned()),
        mobile_url1: Some("https://m.example".to_owned()),
        ..Detail::default()
    });
    assert_eq!(normalize_feature(f.clone(), 0).url.as_deref(), Some("https://pc.example"));

    f.property.detail = Some(Detail {
        mobile_url1: Some("https://m.example".to_owned()),
        ..Detail::default()
    });
    assert_eq!(normalize_feature(f, 0).url.as_deref(), Some("https://m.example"));
}

#[test]
fn genre_tags_are_preserved() {
    let r = normalize_feature(feature(), 0);
    assert_eq!(r.genre_tags.len(), 1);
    assert_eq!(r.genre_tags[0].code, "0110005");
    assert_eq!(r.genre_tags[0].name, "喫茶店");
    assert!(r.type_tags.is_empty());
    assert_eq!(r.selection_type, None);
}
