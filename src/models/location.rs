use serde::{Deserialize, Serialize};
use std::fmt;

/// A latitude/longitude pair in degrees.
///
/// Range is not checked: |lat| > 90 or |lng| > 180 passes through as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&LocationCodec::format(*self))
    }
}

/// Location as it arrives on the wire.
///
/// Anything unrecognised lands in `Other` so a strange location never fails
/// the whole issue payload; it simply parses to no coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLocation {
    Text(String),
    Point {
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        kind: Option<String>,
        /// GeoJSON order: `[lng, lat]`.
        coordinates: Vec<f64>,
    },
    LatLng {
        lat: f64,
        #[serde(alias = "lon")]
        lng: f64,
    },
    Other(serde_json::Value),
}

impl From<Coordinate> for RawLocation {
    fn from(coordinate: Coordinate) -> Self {
        RawLocation::Text(LocationCodec::format(coordinate))
    }
}

pub struct LocationCodec;

impl LocationCodec {
    pub fn parse(raw: &RawLocation) -> Option<Coordinate> {
        match raw {
            RawLocation::Text(s) => Self::parse_str(s),
            RawLocation::Point { coordinates, .. } => match coordinates.as_slice() {
                [lng, lat, ..] => Self::finite(*lat, *lng),
                _ => None,
            },
            RawLocation::LatLng { lat, lng } => Self::finite(*lat, *lng),
            RawLocation::Other(_) => None,
        }
    }

    /// Parses `"lat,lng"`, splitting on the first comma.
    pub fn parse_str(raw: &str) -> Option<Coordinate> {
        let (lat, lng) = raw.split_once(',')?;
        let lat = lat.trim().parse::<f64>().ok()?;
        let lng = lng.trim().parse::<f64>().ok()?;
        Self::finite(lat, lng)
    }

    /// No rounding, so the output parses back to the same pair.
    pub fn format(coordinate: Coordinate) -> String {
        format!("{},{}", coordinate.lat, coordinate.lng)
    }

    fn finite(lat: f64, lng: f64) -> Option<Coordinate> {
        if lat.is_finite() && lng.is_finite() {
            Some(Coordinate { lat, lng })
        } else {
            None
        }
    }
}
