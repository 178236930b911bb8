//! Transverse Mercator projection (UTM and friends).
//!
//! Uses the Krüger series truncated at third order in the third flattening
//! `n`, which is accurate to well under a millimeter within a UTM zone and
//! to centimeters several zones out.

use crate::ellipsoid::Ellipsoid;
use crate::error::{
    check_geographic, check_input, check_planar, wrap_degrees, ProjectionError, Result,
};

/// Transverse Mercator projection parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TransverseMercator {
    /// Central meridian (degrees)
    pub lon0: f64,
    /// Scale factor on the central meridian
    pub k0: f64,
    /// False easting (meters)
    pub false_easting: f64,
    /// False northing (meters)
    pub false_northing: f64,
    /// Ellipsoid the coordinates live on
    pub ellipsoid: Ellipsoid,
    /// Rectifying radius
    big_a: f64,
    alpha: [f64; 3],
    beta: [f64; 3],
    delta: [f64; 3],
}

impl TransverseMercator {
    const NAME: &'static str = "Transverse Mercator";

    pub fn new(
        lon0: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
        ellipsoid: Ellipsoid,
    ) -> Self {
        let f = ellipsoid.f();
        let n = f / (2.0 - f);
        let n2 = n * n;
        let n3 = n2 * n;

        let big_a = ellipsoid.a / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0);

        let alpha = [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
            61.0 * n3 / 240.0,
        ];
        let beta = [
            n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
            n2 / 48.0 + n3 / 15.0,
            17.0 * n3 / 480.0,
        ];
        let delta = [
            2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
            7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
            56.0 * n3 / 15.0,
        ];

        Self {
            lon0,
            k0,
            false_easting,
            false_northing,
            ellipsoid,
            big_a,
            alpha,
            beta,
            delta,
        }
    }

    /// Universal Transverse Mercator zone `zone` (1..=60).
    pub fn utm(zone: u8, north: bool, ellipsoid: Ellipsoid) -> Self {
        let lon0 = f64::from(zone) * 6.0 - 183.0;
        let false_northing = if north { 0.0 } else { 10_000_000.0 };
        Self::new(lon0, 0.9996, 500_000.0, false_northing, ellipsoid)
    }

    /// Convert (lon, lat) in degrees to (easting, northing) in meters.
    pub fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        check_input(lon, lat)?;
        let dlon = wrap_degrees(lon - self.lon0);
        if dlon.abs() >= 90.0 || lat.abs() > 90.0 {
            return Err(ProjectionError::OutOfDomain {
                x: lon,
                y: lat,
                projection: Self::NAME,
            });
        }

        let e = self.ellipsoid.e();
        let phi = lat.to_radians();
        let lam = dlon.to_radians();

        let sin_phi = phi.sin();
        let t = (sin_phi.atanh() - e * (e * sin_phi).atanh()).sinh();
        let xi_p = t.atan2(lam.cos());
        let eta_p = (lam.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, a) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += a * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += a * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        let x = self.false_easting + self.k0 * self.big_a * eta;
        let y = self.false_northing + self.k0 * self.big_a * xi;
        check_planar(x, y, lon, lat, Self::NAME)
    }

    /// Convert (easting, northing) in meters to (lon, lat) in degrees.
    pub fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        check_input(x, y)?;
        let scale = self.k0 * self.big_a;
        let xi = (y - self.false_northing) / scale;
        let eta = (x - self.false_easting) / scale;
        if eta.abs() > 3.0 || xi.abs() > std::f64::consts::FRAC_PI_2 {
            return Err(ProjectionError::OutOfDomain {
                x,
                y,
                projection: Self::NAME,
            });
        }

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, b) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_p -= b * (k * xi).sin() * (k * eta).cosh();
            eta_p -= b * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xi_p.sin() / eta_p.cosh()).asin();
        let mut phi = chi;
        for (j, d) in self.delta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            phi += d * (k * chi).sin();
        }
        let lam = eta_p.sinh().atan2(xi_p.cos());

        let lon = self.lon0 + lam.to_degrees();
        let lat = phi.to_degrees();
        check_geographic(lon, lat, x, y, Self::NAME)
    }
}
