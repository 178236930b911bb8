//! The narrow interface between extraction and a raster-reading toolkit.
//!
//! Extraction only ever asks a source for its CRS definition, envelope, grid
//! shape, band count, nodata value and sampled band values. Any toolkit that
//! can answer those questions can sit behind [`RasterSource`].

use std::path::Path;

use num_traits::ToPrimitive;
use raster_common::{Envelope, GridShape, SamplingStride};

use crate::error::SourceError;

/// A decoded raster resource.
pub trait RasterSource: Send {
    /// Native CRS definition (an `EPSG:n` string, URN or WKT), if the raster
    /// carries one.
    fn crs_definition(&self) -> Option<String>;

    /// Native bounding envelope, ordinates in the CRS axis order.
    fn envelope(&self) -> Result<Envelope, SourceError>;

    /// Pixel grid dimensions.
    fn grid_shape(&self) -> GridShape;

    /// Number of bands (sample dimensions).
    fn band_count(&self) -> usize;

    /// Sample value marking missing data, if any.
    fn nodata(&self) -> Option<f64> {
        None
    }

    /// Read band `band` (zero based), visiting only the pixels selected by
    /// `stride`.
    fn read_band(&mut self, band: usize, stride: SamplingStride)
        -> Result<BandSamples, SourceError>;

    /// Release any resources held by the source.
    ///
    /// Called exactly once, by [`crate::RasterHandle`].
    fn close(&mut self) {}
}

/// Opens raster resources by path.
pub trait RasterOpener: Send + Sync {
    type Source: RasterSource;

    fn open(&self, path: &Path) -> Result<Self::Source, SourceError>;
}

/// Subsampled values of one band, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct BandSamples {
    /// Shape of the subsample (not of the full raster)
    pub shape: GridShape,
    pub values: Vec<f64>,
}

impl BandSamples {
    pub fn new(shape: GridShape, values: Vec<f64>) -> Result<Self, SourceError> {
        if shape.len() != values.len() {
            return Err(SourceError::invalid_georeference(format!(
                "band sample count {} does not match {}x{} subsample",
                values.len(),
                shape.width,
                shape.height
            )));
        }
        Ok(Self { shape, values })
    }

    pub fn empty() -> Self {
        Self {
            shape: GridShape::new(0, 0),
            values: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over subsample rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.shape.width.max(1))
    }

    /// Subsample one band out of a full, pixel-interleaved buffer.
    ///
    /// `data` holds `shape.len() * samples_per_pixel` values in row-major
    /// order with the samples of each pixel adjacent. Values that cannot be
    /// represented as `f64` become NaN.
    pub fn from_interleaved<T: ToPrimitive>(
        data: &[T],
        shape: GridShape,
        samples_per_pixel: usize,
        band: usize,
        stride: SamplingStride,
    ) -> Result<Self, SourceError> {
        if band >= samples_per_pixel {
            return Err(SourceError::BandOutOfRange {
                band,
                count: samples_per_pixel,
            });
        }

        let expected = shape.len() * samples_per_pixel;
        if data.len() < expected {
            return Err(SourceError::invalid_georeference(format!(
                "decoded {} samples, expected {}",
                data.len(),
                expected
            )));
        }

        let sampled = stride.sampled_shape(shape);
        let mut values = Vec::with_capacity(sampled.len());
        for row in stride.sampled_rows(shape.height) {
            for col in stride.sampled_cols(shape.width) {
                let idx = (row * shape.width + col) * samples_per_pixel + band;
                values.push(data[idx].to_f64().unwrap_or(f64::NAN));
            }
        }

        Self::new(sampled, values)
    }
}
