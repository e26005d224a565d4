// ── Coordinates ──
//
// The backend stores locations as `"lat,lng"` strings. `GeoPosition` is
// the parsed form; parsing is strict (exactly two finite numbers).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

/// A `point` string that is not two comma-separated finite numbers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid point {0:?}: expected \"lat,lng\"")]
pub struct InvalidPoint(pub String);

impl GeoPosition {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Wire form used by the backend, e.g. `"55.75,37.61"`.
    pub fn to_point(self) -> String {
        self.to_string()
    }

    pub fn is_finite(self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl fmt::Display for GeoPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

impl FromStr for GeoPosition {
    type Err = InvalidPoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidPoint(s.to_owned());

        let mut parts = s.split(',');
        let (Some(lat), Some(lng), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };

        let latitude: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let longitude: f64 = lng.trim().parse().map_err(|_| invalid())?;

        let pos = Self::new(latitude, longitude);
        if pos.is_finite() { Ok(pos) } else { Err(invalid()) }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_round_numbers_without_decimals() {
        let pos: GeoPosition = "10,20".parse().unwrap();
        assert_eq!(pos, GeoPosition::new(10.0, 20.0));
        assert_eq!(pos.to_point(), "10,20");
    }

    #[test]
    fn tolerates_whitespace_around_components() {
        let pos: GeoPosition = " 55.75 , 37.61 ".parse().unwrap();
        assert_eq!(pos.to_point(), "55.75,37.61");
    }

    #[test]
    fn rejects_wrong_component_counts() {
        assert!("55.75".parse::<GeoPosition>().is_err());
        assert!("1,2,3".parse::<GeoPosition>().is_err());
        assert!("".parse::<GeoPosition>().is_err());
    }

    #[test]
    fn rejects_non_numeric_and_non_finite() {
        assert!("north,south".parse::<GeoPosition>().is_err());
        assert!("NaN,1".parse::<GeoPosition>().is_err());
        assert!("inf,1".parse::<GeoPosition>().is_err());
    }
}
