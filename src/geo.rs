use serde::{Deserialize, Serialize};
use std::ops::{Add, Neg, Sub};

/// Pixel coordinate. Depending on context this is a layer point (relative to the
/// map's pixel origin) or a container point (relative to the viewport's top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "PointRepr")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn round(self) -> Self {
        Self::new(self.x.round(), self.y.round())
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PointRepr {
    Pair([f64; 2]),
    Object { x: f64, y: f64 },
}

impl From<PointRepr> for Point {
    fn from(repr: PointRepr) -> Self {
        match repr {
            PointRepr::Pair([x, y]) => Point::new(x, y),
            PointRepr::Object { x, y } => Point::new(x, y),
        }
    }
}

/// Geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "LatLngRepr")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<(f64, f64)> for LatLng {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self::new(lat, lng)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LatLngRepr {
    Pair([f64; 2]),
    Object {
        lat: f64,
        #[serde(alias = "lon")]
        lng: f64,
    },
}

impl From<LatLngRepr> for LatLng {
    fn from(repr: LatLngRepr) -> Self {
        match repr {
            LatLngRepr::Pair([lat, lng]) => LatLng::new(lat, lng),
            LatLngRepr::Object { lat, lng } => LatLng::new(lat, lng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_arithmetic() {
        let a = Point::new(10.0, 20.0);
        let b = Point::new(12.0, -15.0);
        assert_eq!(a + b, Point::new(22.0, 5.0));
        assert_eq!(a - b, Point::new(-2.0, 35.0));
        assert_eq!(-b, Point::new(-12.0, 15.0));
        assert_eq!(Point::new(1.4, 2.6).round(), Point::new(1.0, 3.0));
    }

    #[test]
    fn coordinates_accept_pairs_and_objects() {
        let pair: LatLng = serde_json::from_str("[51.5, -0.09]").unwrap();
        let object: LatLng = serde_json::from_str(r#"{"lat": 51.5, "lon": -0.09}"#).unwrap();
        assert_eq!(pair, object);

        let offset: Point = serde_json::from_str("[12, -15]").unwrap();
        assert_eq!(offset, Point::new(12.0, -15.0));
        let offset: Point = serde_json::from_str(r#"{"x": 12, "y": -15}"#).unwrap();
        assert_eq!(offset, Point::new(12.0, -15.0));
    }
}
