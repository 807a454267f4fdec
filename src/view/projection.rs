// Spherical mercator (EPSG:3857) with the usual 256px tile scale.

use crate::geo::{LatLng, Point};
use std::f64::consts::PI;

const EARTH_RADIUS: f64 = 6_378_137.0;
const MAX_LATITUDE: f64 = 85.051_128_779_8;
const TILE_SIZE: f64 = 256.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SphericalMercator;

impl SphericalMercator {
    pub fn scale(zoom: f64) -> f64 {
        TILE_SIZE * 2f64.powf(zoom)
    }

    /// Projected meters for `latlng`.
    pub fn project(&self, latlng: LatLng) -> Point {
        let d = PI / 180.0;
        let lat = latlng.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let sin = (lat * d).sin();
        Point::new(
            EARTH_RADIUS * latlng.lng * d,
            EARTH_RADIUS * ((1.0 + sin) / (1.0 - sin)).ln() / 2.0,
        )
    }

    pub fn unproject(&self, point: Point) -> LatLng {
        let d = 180.0 / PI;
        LatLng::new(
            (2.0 * (point.y / EARTH_RADIUS).exp().atan() - PI / 2.0) * d,
            point.x * d / EARTH_RADIUS,
        )
    }

    /// Absolute pixel coordinate of `latlng` at `zoom`.
    pub fn lat_lng_to_point(&self, latlng: LatLng, zoom: f64) -> Point {
        let projected = self.project(latlng);
        let scale = Self::scale(zoom);
        let factor = 0.5 / (PI * EARTH_RADIUS);
        Point::new(
            scale * (factor * projected.x + 0.5),
            scale * (-factor * projected.y + 0.5),
        )
    }

    pub fn point_to_lat_lng(&self, point: Point, zoom: f64) -> LatLng {
        let scale = Self::scale(zoom);
        let factor = 0.5 / (PI * EARTH_RADIUS);
        let projected = Point::new(
            (point.x / scale - 0.5) / factor,
            (point.y / scale - 0.5) / -factor,
        );
        self.unproject(projected)
    }
}
