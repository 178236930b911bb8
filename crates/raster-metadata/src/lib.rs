//! Geospatial metadata extraction for raster resources.
//!
//! Turns a decoded raster into one immutable [`RasterMetadata`] record:
//! native CRS, WGS84 footprint, ground pixel size and sampled band extrema.
//!
//! # Pipeline
//!
//! ```text
//! RasterMetadataExtractor::extract(path)
//!      │
//!      ├─► RasterOpener::open            (Opened, handle guard armed)
//!      ├─► CoordinateSystemResolver      (CrsResolved)
//!      ├─► RasterSource::envelope        (EnvelopeBuilt)
//!      ├─► EnvelopeReprojector           (Reprojected)
//!      ├─► ResolutionCalculator          (GridMeasured)
//!      ├─► ExtremaScanner                (ExtremaScanned)
//!      └─► RasterMetadata                (Assembled)
//!               │
//!               ▼
//!          handle released               (Closed)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use raster_metadata::{ExtractorConfig, GeoTiffOpener, RasterMetadataExtractor};
//!
//! let extractor = RasterMetadataExtractor::new(GeoTiffOpener, ExtractorConfig::default());
//! let metadata = extractor.extract("dem.tif".as_ref())?;
//! println!("{}", metadata.geographic_footprint().to_wkt());
//! ```

pub mod config;
pub mod crs_resolver;
pub mod error;
pub mod extractor;
pub mod extrema;
pub mod geotiff;
pub mod handle;
pub mod metadata;
pub mod reproject;
pub mod resolution;
pub mod source;

pub use config::{EmptyExtremaPolicy, ExtractorConfig};
pub use crs_resolver::CoordinateSystemResolver;
pub use error::{
    CrsResolutionError, ExtractionError, ExtractionStage, MetadataError, ReprojectionError,
    Result, SourceError,
};
pub use extractor::RasterMetadataExtractor;
pub use extrema::{BandExtrema, ExtremaScan, ExtremaScanner};
pub use geotiff::{GeoTiffOpener, GeoTiffSource};
pub use handle::RasterHandle;
pub use metadata::{ExtremaOrigin, LayerMetadata, RasterMetadata};
pub use reproject::EnvelopeReprojector;
pub use resolution::ResolutionCalculator;
pub use source::{BandSamples, RasterOpener, RasterSource};

// Re-export shared types so callers need only this crate
pub use raster_common::{Crs, Envelope, Footprint, GridShape, PixelSize, SamplingStride};
