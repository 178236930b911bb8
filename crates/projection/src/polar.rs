//! Polar stereographic projection (EPSG method 9829, variant B).
//!
//! Parameterised by a latitude of true scale instead of a scale factor at
//! the pole. Used by the NSIDC sea ice grids (EPSG:3413) and the Antarctic
//! grids (EPSG:3031).

use std::f64::consts::FRAC_PI_2;
use std::f64::consts::FRAC_PI_4;

use crate::ellipsoid::Ellipsoid;
use crate::error::{check_geographic, check_input, check_planar, wrap_degrees, Result};

/// Polar stereographic projection parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarStereographic {
    /// Latitude of true scale (degrees); its sign selects the pole
    pub lat_ts: f64,
    /// Longitude pointing straight down from the pole (degrees)
    pub lon0: f64,
    pub ellipsoid: Ellipsoid,
    /// a * m(lat_ts) / t(lat_ts)
    scale: f64,
}

impl PolarStereographic {
    const NAME: &'static str = "Polar Stereographic";

    pub fn new(lat_ts: f64, lon0: f64, ellipsoid: Ellipsoid) -> Self {
        let e = ellipsoid.e();
        let phi_c = lat_ts.abs().to_radians();
        let mc = phi_c.cos() / (1.0 - e * e * phi_c.sin().powi(2)).sqrt();
        let tc = conformal_t(phi_c, e);
        Self {
            lat_ts,
            lon0,
            ellipsoid,
            scale: ellipsoid.a * mc / tc,
        }
    }

    /// NSIDC Sea Ice Polar Stereographic North (EPSG:3413).
    pub fn nsidc_north() -> Self {
        Self::new(70.0, -45.0, Ellipsoid::WGS84)
    }

    /// Antarctic Polar Stereographic (EPSG:3031).
    pub fn antarctic() -> Self {
        Self::new(-71.0, 0.0, Ellipsoid::WGS84)
    }

    fn is_north(&self) -> bool {
        self.lat_ts >= 0.0
    }

    /// Convert (lon, lat) in degrees to (x, y) in meters.
    pub fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        check_input(lon, lat)?;
        let e = self.ellipsoid.e();
        let phi = if self.is_north() { lat } else { -lat }.to_radians();
        let lam = wrap_degrees(lon - self.lon0).to_radians();

        let rho = self.scale * conformal_t(phi, e);
        let x = rho * lam.sin();
        let y = if self.is_north() {
            -rho * lam.cos()
        } else {
            rho * lam.cos()
        };
        check_planar(x, y, lon, lat, Self::NAME)
    }

    /// Convert (x, y) in meters to (lon, lat) in degrees.
    pub fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        check_input(x, y)?;
        let e2 = self.ellipsoid.e2();
        let rho = x.hypot(y);
        let t = rho / self.scale;
        let chi = FRAC_PI_2 - 2.0 * t.atan();

        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let e8 = e4 * e4;
        let phi = chi
            + (e2 / 2.0 + 5.0 * e4 / 24.0 + e6 / 12.0 + 13.0 * e8 / 360.0) * (2.0 * chi).sin()
            + (7.0 * e4 / 48.0 + 29.0 * e6 / 240.0 + 811.0 * e8 / 11520.0) * (4.0 * chi).sin()
            + (7.0 * e6 / 120.0 + 81.0 * e8 / 1120.0) * (6.0 * chi).sin()
            + (4279.0 * e8 / 161_280.0) * (8.0 * chi).sin();

        let (lat, dlon) = if self.is_north() {
            (phi.to_degrees(), x.atan2(-y).to_degrees())
        } else {
            (-phi.to_degrees(), x.atan2(y).to_degrees())
        };
        check_geographic(wrap_degrees(self.lon0 + dlon), lat, x, y, Self::NAME)
    }
}

/// Isometric helper t(φ) for the north-polar aspect.
fn conformal_t(phi: f64, e: f64) -> f64 {
    let es = e * phi.sin();
    (FRAC_PI_4 - phi / 2.0).tan() / ((1.0 - es) / (1.0 + es)).powf(e / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pole_maps_to_origin() {
        let north = PolarStereographic::nsidc_north();
        let (x, y) = north.forward(0.0, 90.0).unwrap();
        assert!(x.abs() < 1e-6 && y.abs() < 1e-6);

        let south = PolarStereographic::antarctic();
        let (x, y) = south.forward(123.0, -90.0).unwrap();
        assert!(x.abs() < 1e-6 && y.abs() < 1e-6);
    }

    #[test]
    fn test_true_scale_circle_on_central_meridian() {
        let north = PolarStereographic::nsidc_north();
        let (x, y) = north.forward(-45.0, 70.0).unwrap();
        let e2 = Ellipsoid::WGS84.e2();
        let phi = 70f64.to_radians();
        let expected = 6_378_137.0 * phi.cos() / (1.0 - e2 * phi.sin().powi(2)).sqrt();
        assert!(x.abs() < 1e-6);
        assert!((y + expected).abs() < 1e-6);
    }

    #[test]
    fn test_inverse_of_origin_is_pole() {
        let south = PolarStereographic::antarctic();
        let (_, lat) = south.inverse(0.0, 0.0).unwrap();
        assert!((lat + 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip_both_hemispheres() {
        for (proj, lon, lat) in [
            (PolarStereographic::nsidc_north(), 10.0, 75.0),
            (PolarStereographic::nsidc_north(), -150.0, 62.5),
            (PolarStereographic::antarctic(), 166.67, -77.85),
            (PolarStereographic::antarctic(), -60.0, -65.0),
        ] {
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert!((lon2 - lon).abs() < 1e-8, "{lon} -> {lon2}");
            assert!((lat2 - lat).abs() < 1e-8, "{lat} -> {lat2}");
        }
    }
}
