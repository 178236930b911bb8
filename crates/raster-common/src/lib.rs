//! Common types shared across the raster metadata crates.

pub mod crs;
pub mod envelope;
pub mod footprint;
pub mod grid;

pub use crs::{AxisOrder, Crs, CrsCode, CrsParseError, Datum};
pub use envelope::Envelope;
pub use footprint::{Coord, Footprint, FootprintError};
pub use grid::{GridShape, PixelSize, SamplingStride};
