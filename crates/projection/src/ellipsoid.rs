//! Reference ellipsoids.

use raster_common::Datum;

/// An oblate ellipsoid given by its semi-major axis and inverse flattening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis (meters)
    pub a: f64,
    /// Inverse flattening
    pub inv_f: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        inv_f: 298.257_223_563,
    };

    pub const GRS80: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        inv_f: 298.257_222_101,
    };

    pub fn for_datum(datum: Datum) -> Self {
        match datum {
            Datum::Wgs84 => Self::WGS84,
            Datum::Nad83 | Datum::Etrs89 => Self::GRS80,
        }
    }

    /// Flattening.
    pub fn f(&self) -> f64 {
        1.0 / self.inv_f
    }

    /// Semi-minor axis (meters).
    pub fn b(&self) -> f64 {
        self.a * (1.0 - self.f())
    }

    /// First eccentricity squared.
    pub fn e2(&self) -> f64 {
        let f = self.f();
        f * (2.0 - f)
    }

    /// First eccentricity.
    pub fn e(&self) -> f64 {
        self.e2().sqrt()
    }
}
