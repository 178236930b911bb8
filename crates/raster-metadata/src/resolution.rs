//! Ground pixel size.

use raster_common::{AxisOrder, Envelope, GridShape, PixelSize};

use crate::error::{MetadataError, Result};

/// Computes ground sample distance from the native envelope and grid.
pub struct ResolutionCalculator;

impl ResolutionCalculator {
    /// Pixel size in native CRS units.
    ///
    /// `envelope` is the native envelope in `axis_order`; the x size is
    /// always the east extent divided by the grid width. The reprojected
    /// footprint is never used here so units stay those of the native CRS.
    pub fn pixel_size(
        envelope: &Envelope,
        axis_order: AxisOrder,
        grid: GridShape,
    ) -> Result<PixelSize> {
        if grid.is_empty() {
            return Err(MetadataError::DegenerateGrid {
                width: grid.width,
                height: grid.height,
            });
        }

        let east_north = envelope.to_east_north(axis_order);
        Ok(PixelSize {
            x: east_north.width() / grid.width as f64,
            y: east_north.height() / grid.height as f64,
        })
    }
}
