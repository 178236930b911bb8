//! Band extrema from a systematic subsample.
//!
//! The scanner never visits every pixel. It reads every `stride.rows`-th row
//! and every `stride.cols`-th column, starting at row 0 and column 0, so the
//! reported minimum and maximum approximate the true extrema of the raster
//! and can miss a value that only occurs between sampled pixels. Narrow the
//! stride (down to [`SamplingStride::exhaustive`]) to trade speed for
//! accuracy.
//!
//! Nodata values and non-finite samples (NaN, infinities) are ignored.

use raster_common::SamplingStride;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MetadataError, Result};
use crate::source::{BandSamples, RasterSource};

/// Extrema of one band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandExtrema {
    pub band: usize,
    pub min: f64,
    pub max: f64,
    /// Number of samples that contributed
    pub samples: usize,
}

/// Outcome of an extrema scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtremaScan {
    /// At least one finite sample was found.
    Found {
        min: f64,
        max: f64,
        bands: Vec<BandExtrema>,
    },
    /// No band produced a finite sample (including the zero-band case).
    Empty,
}

impl ExtremaScan {
    /// Global (min, max), if any sample was found.
    pub fn range(&self) -> Option<(f64, f64)> {
        match self {
            ExtremaScan::Found { min, max, .. } => Some((*min, *max)),
            ExtremaScan::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ExtremaScan::Empty)
    }
}

/// Computes global band extrema over a sampled grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtremaScanner {
    stride: SamplingStride,
}

impl ExtremaScanner {
    pub fn new(stride: SamplingStride) -> Self {
        Self { stride }
    }

    pub fn stride(&self) -> SamplingStride {
        self.stride
    }

    /// Scan every band of `source`.
    pub fn scan<S: RasterSource + ?Sized>(&self, source: &mut S) -> Result<ExtremaScan> {
        let nodata = source.nodata();
        let band_count = source.band_count();

        let mut bands = Vec::with_capacity(band_count);
        for band in 0..band_count {
            let samples = source
                .read_band(band, self.stride)
                .map_err(MetadataError::ResourceRead)?;

            match Self::band_extrema(band, &samples, nodata) {
                Some(extrema) => {
                    debug!(
                        band,
                        min = extrema.min,
                        max = extrema.max,
                        samples = extrema.samples,
                        "Band extrema"
                    );
                    bands.push(extrema);
                }
                None => debug!(band, "Band has no finite samples"),
            }
        }

        Ok(Self::reduce(bands))
    }

    /// Extrema of one band's samples, or `None` if none is usable.
    ///
    /// Rows are reduced in parallel; min/max is order independent so the
    /// result matches a sequential scan.
    pub fn band_extrema(
        band: usize,
        samples: &BandSamples,
        nodata: Option<f64>,
    ) -> Option<BandExtrema> {
        if samples.is_empty() {
            return None;
        }

        let width = samples.shape.width.max(1);
        let (min, max, count) = samples
            .values
            .par_chunks(width)
            .map(|row| {
                row.iter()
                    .copied()
                    .filter(|v| v.is_finite() && Some(*v) != nodata)
                    .fold((f64::INFINITY, f64::NEG_INFINITY, 0usize), |acc, v| {
                        (acc.0.min(v), acc.1.max(v), acc.2 + 1)
                    })
            })
            .reduce(
                || (f64::INFINITY, f64::NEG_INFINITY, 0usize),
                |a, b| (a.0.min(b.0), a.1.max(b.1), a.2 + b.2),
            );

        (count > 0).then_some(BandExtrema {
            band,
            min,
            max,
            samples: count,
        })
    }

    /// Reduce per-band extrema to one global minimum and maximum.
    pub fn reduce(bands: Vec<BandExtrema>) -> ExtremaScan {
        let min = bands.iter().map(|b| b.min).fold(f64::INFINITY, f64::min);
        let max = bands.iter().map(|b| b.max).fold(f64::NEG_INFINITY, f64::max);

        if bands.is_empty() {
            ExtremaScan::Empty
        } else {
            ExtremaScan::Found { min, max, bands }
        }
    }
}
