//! Albers Equal Area Conic projection.
//!
//! Used for CONUS-wide products such as the NLCD land cover grids
//! (EPSG:5070, NAD83 / Conus Albers).

use crate::ellipsoid::Ellipsoid;
use crate::error::{
    check_geographic, check_input, check_planar, wrap_degrees, ProjectionError, Result,
};

const MAX_ITERATIONS: usize = 25;
const TOLERANCE: f64 = 1e-12;

/// Albers Equal Area projection parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct AlbersEqualArea {
    /// Latitude of origin (degrees)
    pub lat0: f64,
    /// Central meridian (degrees)
    pub lon0: f64,
    /// First standard parallel (degrees)
    pub lat1: f64,
    /// Second standard parallel (degrees)
    pub lat2: f64,
    pub ellipsoid: Ellipsoid,
    /// Cone constant
    n: f64,
    c: f64,
    rho0: f64,
    /// q at the pole; |q| never exceeds it
    q_pole: f64,
}

impl AlbersEqualArea {
    const NAME: &'static str = "Albers Equal Area";

    pub fn new(lat0: f64, lon0: f64, lat1: f64, lat2: f64, ellipsoid: Ellipsoid) -> Self {
        let e = ellipsoid.e();
        let phi1 = lat1.to_radians();
        let phi2 = lat2.to_radians();

        let m1 = m(phi1, e);
        let m2 = m(phi2, e);
        let q0 = q(lat0.to_radians(), e);
        let q1 = q(phi1, e);
        let q2 = q(phi2, e);

        let n = if (lat1 - lat2).abs() < 1e-10 {
            phi1.sin()
        } else {
            (m1 * m1 - m2 * m2) / (q2 - q1)
        };
        let c = m1 * m1 + n * q1;
        let rho0 = ellipsoid.a * (c - n * q0).sqrt() / n;

        Self {
            lat0,
            lon0,
            lat1,
            lat2,
            ellipsoid,
            n,
            c,
            rho0,
            q_pole: q(std::f64::consts::FRAC_PI_2, e),
        }
    }

    /// NAD83 / Conus Albers (EPSG:5070).
    pub fn conus() -> Self {
        Self::new(23.0, -96.0, 29.5, 45.5, Ellipsoid::GRS80)
    }

    /// Convert (lon, lat) in degrees to (x, y) in meters.
    pub fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        check_input(lon, lat)?;
        let e = self.ellipsoid.e();
        let rho = self.ellipsoid.a * (self.c - self.n * q(lat.to_radians(), e)).sqrt() / self.n;
        let theta = self.n * wrap_degrees(lon - self.lon0).to_radians();

        let x = rho * theta.sin();
        let y = self.rho0 - rho * theta.cos();
        check_planar(x, y, lon, lat, Self::NAME)
    }

    /// Convert (x, y) in meters to (lon, lat) in degrees.
    pub fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        check_input(x, y)?;
        let a = self.ellipsoid.a;
        let e = self.ellipsoid.e();
        let e2 = self.ellipsoid.e2();

        let dy = self.rho0 - y;
        let (rho, theta) = if self.n >= 0.0 {
            (x.hypot(dy), x.atan2(dy))
        } else {
            (-x.hypot(dy), (-x).atan2(-dy))
        };
        let q_val = (self.c - (rho * self.n / a).powi(2)) / self.n;

        let out_of_domain = ProjectionError::OutOfDomain {
            x,
            y,
            projection: Self::NAME,
        };
        if q_val.abs() > self.q_pole + 1e-9 {
            return Err(out_of_domain);
        }

        let lon = self.lon0 + (theta / self.n).to_degrees();
        if (q_val.abs() - self.q_pole).abs() <= 1e-9 {
            return check_geographic(lon, 90f64.copysign(q_val), x, y, Self::NAME);
        }

        let mut phi = (q_val / 2.0).asin();
        for _ in 0..MAX_ITERATIONS {
            let sin_phi = phi.sin();
            let es = e * sin_phi;
            let one_minus = 1.0 - es * es;
            let delta = one_minus * one_minus / (2.0 * phi.cos())
                * (q_val / (1.0 - e2) - sin_phi / one_minus
                    + 1.0 / (2.0 * e) * ((1.0 - es) / (1.0 + es)).ln());
            phi += delta;
            if !phi.is_finite() {
                return Err(ProjectionError::Diverged {
                    x,
                    y,
                    projection: Self::NAME,
                });
            }
            if delta.abs() < TOLERANCE {
                return check_geographic(lon, phi.to_degrees(), x, y, Self::NAME);
            }
        }

        Err(ProjectionError::NoConvergence {
            x,
            y,
            projection: Self::NAME,
            iterations: MAX_ITERATIONS,
        })
    }
}

fn m(phi: f64, e: f64) -> f64 {
    phi.cos() / (1.0 - (e * phi.sin()).powi(2)).sqrt()
}

fn q(phi: f64, e: f64) -> f64 {
    let sin_phi = phi.sin();
    let es = e * sin_phi;
    (1.0 - e * e)
        * (sin_phi / (1.0 - es * es) - 1.0 / (2.0 * e) * ((1.0 - es) / (1.0 + es)).ln())
}
