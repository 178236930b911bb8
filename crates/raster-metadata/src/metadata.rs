//! The extraction output record.

use std::path::{Path, PathBuf};

use raster_common::{Footprint, PixelSize, SamplingStride};
use serde::{Deserialize, Serialize};

/// Where the reported extrema came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtremaOrigin {
    /// Computed from sampled band values.
    Sampled,
    /// No finite sample existed; configured defaults were substituted.
    Default,
}

/// Geospatial metadata of one raster.
///
/// Built once per extraction and never mutated; fields are read through
/// accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterMetadata {
    source_path: PathBuf,
    crs_identifier: Option<String>,
    geographic_footprint: Footprint,
    pixel_size_x: f64,
    pixel_size_y: f64,
    min_value: f64,
    max_value: f64,
    sample_dimension_count: usize,
    extrema_origin: ExtremaOrigin,
    sampling_stride: SamplingStride,
}

impl RasterMetadata {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        source_path: &Path,
        crs_identifier: Option<String>,
        geographic_footprint: Footprint,
        pixel_size: PixelSize,
        (min_value, max_value): (f64, f64),
        sample_dimension_count: usize,
        extrema_origin: ExtremaOrigin,
        sampling_stride: SamplingStride,
    ) -> Self {
        Self {
            source_path: source_path.to_path_buf(),
            crs_identifier,
            geographic_footprint,
            pixel_size_x: pixel_size.x,
            pixel_size_y: pixel_size.y,
            min_value,
            max_value,
            sample_dimension_count,
            extrema_origin,
            sampling_stride,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Native CRS as `authority:code`, e.g. `EPSG:32633`.
    pub fn crs_identifier(&self) -> Option<&str> {
        self.crs_identifier.as_deref()
    }

    /// Ground coverage as a closed WGS84 lon/lat ring.
    pub fn geographic_footprint(&self) -> &Footprint {
        &self.geographic_footprint
    }

    pub fn pixel_size_x(&self) -> f64 {
        self.pixel_size_x
    }

    pub fn pixel_size_y(&self) -> f64 {
        self.pixel_size_y
    }

    pub fn pixel_size(&self) -> PixelSize {
        PixelSize {
            x: self.pixel_size_x,
            y: self.pixel_size_y,
        }
    }

    pub fn min_value(&self) -> f64 {
        self.min_value
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    /// Number of bands.
    pub fn sample_dimension_count(&self) -> usize {
        self.sample_dimension_count
    }

    pub fn extrema_origin(&self) -> ExtremaOrigin {
        self.extrema_origin
    }

    /// Stride the extrema were sampled with.
    pub fn sampling_stride(&self) -> SamplingStride {
        self.sampling_stride
    }
}

/// Metadata labelled with the logical layer name a publisher will use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerMetadata {
    pub layer: String,
    pub metadata: RasterMetadata,
}

impl LayerMetadata {
    pub fn new(layer: impl Into<String>, metadata: RasterMetadata) -> Self {
        Self {
            layer: layer.into(),
            metadata,
        }
    }

    /// Layer name derived from a file stem, e.g. `dem` for `/data/dem.tif`.
    pub fn default_layer_name(path: &Path) -> String {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("raster")
            .to_string()
    }
}
