//! Error types for projection math.

use thiserror::Error;

/// Errors raised while projecting a single coordinate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// The input coordinate contains NaN or infinity.
    #[error("non-finite input coordinate ({x}, {y})")]
    NonFiniteInput { x: f64, y: f64 },

    /// The input lies outside the region where the projection is defined.
    #[error("coordinate ({x}, {y}) is outside the domain of {projection}")]
    OutOfDomain {
        x: f64,
        y: f64,
        projection: &'static str,
    },

    /// The projection formulas produced NaN or infinity.
    #[error("{projection} diverged for ({x}, {y})")]
    Diverged {
        x: f64,
        y: f64,
        projection: &'static str,
    },

    /// An iterative inverse did not settle.
    #[error("{projection} inverse did not converge for ({x}, {y}) after {iterations} iterations")]
    NoConvergence {
        x: f64,
        y: f64,
        projection: &'static str,
        iterations: usize,
    },

    /// No projection is available between the CRS and WGS84.
    #[error("no transform path from {crs} to WGS84: {reason}")]
    NoTransformPath { crs: String, reason: String },

    /// The PROJ.4 pipeline rejected a coordinate.
    #[error("{crs} transform failed for ({x}, {y}): {reason}")]
    Proj4Failed {
        x: f64,
        y: f64,
        crs: String,
        reason: String,
    },
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;

pub(crate) fn check_input(x: f64, y: f64) -> Result<()> {
    if x.is_finite() && y.is_finite() {
        Ok(())
    } else {
        Err(ProjectionError::NonFiniteInput { x, y })
    }
}

/// Validate a geographic result produced from planar input `(x, y)`.
pub(crate) fn check_geographic(
    lon: f64,
    lat: f64,
    x: f64,
    y: f64,
    projection: &'static str,
) -> Result<(f64, f64)> {
    if !lon.is_finite() || !lat.is_finite() {
        return Err(ProjectionError::Diverged { x, y, projection });
    }
    if lat.abs() > 90.0 + 1e-9 {
        return Err(ProjectionError::OutOfDomain { x, y, projection });
    }
    Ok((lon, lat.clamp(-90.0, 90.0)))
}

/// Validate a planar result produced from geographic input `(lon, lat)`.
pub(crate) fn check_planar(
    x: f64,
    y: f64,
    lon: f64,
    lat: f64,
    projection: &'static str,
) -> Result<(f64, f64)> {
    if x.is_finite() && y.is_finite() {
        Ok((x, y))
    } else {
        Err(ProjectionError::Diverged {
            x: lon,
            y: lat,
            projection,
        })
    }
}

/// Wrap a longitude difference into [-180, 180).
pub(crate) fn wrap_degrees(delta: f64) -> f64 {
    (delta + 180.0).rem_euclid(360.0) - 180.0
}
