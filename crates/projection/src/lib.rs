//! Coordinate reference system transformations.
//!
//! The common projections are implemented directly. Every other EPSG code
//! goes through its PROJ.4 definition with proj4rs. Each projection converts
//! between its own planar coordinates and longitude/latitude in degrees.

pub mod albers;
pub mod ellipsoid;
pub mod error;
pub mod mercator;
pub mod polar;
pub mod proj4;
pub mod transform;
pub mod transverse_mercator;

pub use albers::AlbersEqualArea;
pub use ellipsoid::Ellipsoid;
pub use error::{ProjectionError, Result};
pub use mercator::WebMercator;
pub use polar::PolarStereographic;
pub use proj4::Proj4Projection;
pub use transform::{CrsTransform, Projection};
pub use transverse_mercator::TransverseMercator;
