//! Coordinates and the literal `"lat,lng"` address form.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `[lat, lng]` pair as consumed by map markers.
pub type Position = [f64; 2];

/// Mean equatorial radius used for distance checks, in metres.
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Distance from the search origin beyond which the UI offers a re-search.
pub const RESEARCH_THRESHOLD_M: f64 = 3_000.0;

static LAT_LNG_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?[0-9]+\.?[0-9]*,-?[0-9]+\.?[0-9]*$").expect("lat,lng literal regex is valid")
});

/// A validated WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Returns `None` unless both components are finite and in range.
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        valid.then_some(Self { lat, lng })
    }

    #[must_use]
    pub fn position(self) -> Position {
        [self.lat, self.lng]
    }

    /// Renders the coordinate as the literal address form accepted by
    /// [`parse_lat_lng`], used for "search here" on the current map centre.
    #[must_use]
    pub fn to_query(self) -> String {
        format!("{},{}", self.lat, self.lng)
    }

    /// Great-circle distance in metres (haversine).
    #[must_use]
    pub fn distance_m(self, other: Coordinate) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }
}

/// Outcome of checking an address for the literal `"lat,lng"` form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LatLngLiteral {
    /// The input is not a coordinate literal; it needs real geocoding.
    NotLiteral,
    /// The input is a literal and parsed into a valid coordinate.
    Parsed(Coordinate),
    /// The input looks like a literal but does not form a valid coordinate.
    /// Callers must treat this as "no location", never fall back to the network.
    Invalid,
}

/// Classifies `address` against the ASCII-digit `"lat,lng"` literal form.
///
/// Full-width digits are not a literal and go to the geocoder.
#[must_use]
pub fn parse_lat_lng(address: &str) -> LatLngLiteral {
    if !LAT_LNG_LITERAL.is_match(address) {
        return LatLngLiteral::NotLiteral;
    }

    let Some((lat_raw, lng_raw)) = address.split_once(',') else {
        return LatLngLiteral::Invalid;
    };

    match (lat_raw.parse::<f64>(), lng_raw.parse::<f64>()) {
        (Ok(lat), Ok(lng)) => {
            Coordinate::new(lat, lng).map_or(LatLngLiteral::Invalid, LatLngLiteral::Parsed)
        }
        _ => LatLngLiteral::Invalid,
    }
}

/// True when the map has been panned far enough from `origin` that results
/// around `center` would differ meaningfully.
#[must_use]
pub fn should_offer_research(origin: Coordinate, center: Coordinate) -> bool {
    origin.distance_m(center) > RESEARCH_THRESHOLD_M
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_rejects_out_of_range_and_non_finite() {
        assert!(Coordinate::new(90.0, 180.0).is_some());
        assert!(Coordinate::new(-90.0, -180.0).is_some());
        assert!(Coordinate::new(90.1, 0.0).is_none());
        assert!(Coordinate::new(0.0, 180.5).is_none());
        assert!(Coordinate::new(f64::NAN, 0.0).is_none());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_none());
    }

    #[test]
    fn literal_parses_without_network() {
        assert_eq!(
            parse_lat_lng("34.702,135.495"),
            LatLngLiteral::Parsed(Coordinate {
                lat: 34.702,
                lng: 135.495
            })
        );
    }

    #[test]
    fn literal_accepts_negative_and_trailing_dot() {
        assert_eq!(
            parse_lat_lng("-33.,151"),
            LatLngLiteral::Parsed(Coordinate {
                lat: -33.0,
                lng: 151.0
            })
        );
    }

    #[test]
    fn literal_out_of_range_is_invalid_not_geocodable() {
        assert_eq!(parse_lat_lng("123.4,200"), LatLngLiteral::Invalid);
    }

    #[test]
    fn non_literal_addresses_need_geocoding() {
        assert_eq!(parse_lat_lng("大阪駅"), LatLngLiteral::NotLiteral);
        assert_eq!(parse_lat_lng("34.7, 135.4"), LatLngLiteral::NotLiteral);
        assert_eq!(parse_lat_lng("34.7,135.4,1"), LatLngLiteral::NotLiteral);
        assert_eq!(parse_lat_lng(""), LatLngLiteral::NotLiteral);
    }

    #[test]
    fn full_width_digits_are_geocoded_not_parsed() {
        assert_eq!(parse_lat_lng("３４,１３５"), LatLngLiteral::NotLiteral);
        assert_eq!(parse_lat_lng("３４.７,１３５.５"), LatLngLiteral::NotLiteral);
    }

    #[test]
    fn to_query_round_trips_through_literal_parser() {
        let c = Coordinate::new(35.681_236, 139.767_125).unwrap();
        assert_eq!(parse_lat_lng(&c.to_query()), LatLngLiteral::Parsed(c));
    }

    #[test]
    fn distance_between_osaka_and_umeda_is_short() {
        let osaka = Coordinate::new(34.702_485, 135.495_951).unwrap();
        let umeda = Coordinate::new(34.705_027, 135.498_427).unwrap();
        let d = osaka.distance_m(umeda);
        assert!(d > 300.0 && d < 450.0, "unexpected distance {d}");
    }

    #[test]
    fn research_offered_only_beyond_threshold() {
        let origin = Coordinate::new(35.0, 139.0).unwrap();
        let near = Coordinate::new(35.01, 139.0).unwrap();
        let far = Coordinate::new(35.05, 139.0).unwrap();
        assert!(!should_offer_research(origin, near));
        assert!(should_offer_research(origin, far));
    }
}
