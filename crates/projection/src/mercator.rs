//! Spherical (Web) Mercator projection, EPSG:3857.
//!
//! Treats the WGS84 ellipsoid as a sphere of radius `a`. Latitude is clamped
//! to the square-world limit so the poles map to finite northings.

use std::f64::consts::PI;

use crate::error::{check_geographic, check_input, check_planar, Result};

/// Latitude at which the Web Mercator world becomes square.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Web Mercator projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebMercator {
    /// Sphere radius (meters)
    pub radius: f64,
}

impl Default for WebMercator {
    fn default() -> Self {
        Self {
            radius: 6_378_137.0,
        }
    }
}

impl WebMercator {
    const NAME: &'static str = "Web Mercator";

    /// Convert (lon, lat) in degrees to (x, y) in meters.
    pub fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        check_input(lon, lat)?;
        let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let x = self.radius * lon.to_radians();
        let y = self.radius * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
        check_planar(x, y, lon, lat, Self::NAME)
    }

    /// Convert (x, y) in meters to (lon, lat) in degrees.
    ///
    /// Eastings beyond the world extent yield longitudes beyond ±180; they
    /// are not wrapped so envelopes crossing the antimeridian stay ordered.
    pub fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        check_input(x, y)?;
        let lon = (x / self.radius).to_degrees();
        let lat = (2.0 * (y / self.radius).exp().atan() - PI / 2.0).to_degrees();
        check_geographic(lon, lat, x, y, Self::NAME)
    }
}
