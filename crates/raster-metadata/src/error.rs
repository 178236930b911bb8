//! Error types for metadata extraction.

use std::fmt;
use std::path::{Path, PathBuf};

use projection::ProjectionError;
use raster_common::{CrsParseError, Envelope, FootprintError};
use thiserror::Error;

/// Errors raised by a raster-reading collaborator.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TIFF container error.
    #[error("TIFF decoding error: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// The container decoded but its georeferencing is malformed.
    #[error("invalid georeferencing: {0}")]
    InvalidGeoreference(String),

    /// A feature of the file that this reader does not handle.
    #[error("unsupported raster layout: {0}")]
    Unsupported(String),

    /// A band index past the end of the raster.
    #[error("band {band} requested but raster has {count} bands")]
    BandOutOfRange { band: usize, count: usize },
}

impl SourceError {
    /// Create an InvalidGeoreference error.
    pub fn invalid_georeference(msg: impl Into<String>) -> Self {
        Self::InvalidGeoreference(msg.into())
    }

    /// Create an Unsupported error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }
}

/// Why no CRS could be determined for a raster.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CrsResolutionError {
    /// The raster carries no CRS information at all.
    #[error("raster carries no coordinate reference system")]
    Missing,

    /// A CRS definition is present but unusable.
    #[error("CRS definition {definition:?} is not usable: {cause}")]
    Invalid {
        definition: String,
        #[source]
        cause: CrsParseError,
    },
}

/// Failure transforming a native envelope into a WGS84 footprint.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReprojectionError {
    /// The envelope has NaN or infinite ordinates.
    #[error("native envelope is not finite: {0:?}")]
    NonFiniteEnvelope(Envelope),

    /// No projection between the CRS and WGS84 is available.
    #[error("{0}")]
    NoTransformPath(#[source] ProjectionError),

    /// One ring vertex could not be transformed.
    #[error("vertex ({x}, {y}) did not transform: {cause}")]
    Vertex {
        x: f64,
        y: f64,
        #[source]
        cause: ProjectionError,
    },

    /// The transformed vertices do not form a ring.
    #[error("transformed ring is invalid: {0}")]
    Ring(#[from] FootprintError),
}

/// Errors from the individual extraction steps.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// The raster could not be opened or decoded.
    #[error("failed to open raster: {0}")]
    ResourceOpen(#[source] SourceError),

    /// Raster content could not be read after opening.
    #[error("failed to read raster: {0}")]
    ResourceRead(#[source] SourceError),

    /// No CRS could be determined.
    #[error("unresolved CRS: {0}")]
    UnresolvedCrs(#[from] CrsResolutionError),

    /// The envelope could not be transformed to WGS84.
    #[error("failed to reproject envelope from {crs} to WGS84: {cause}")]
    Reprojection {
        crs: String,
        #[source]
        cause: ReprojectionError,
    },

    /// A grid dimension is zero, so pixel size is undefined.
    #[error("degenerate pixel grid {width}x{height}")]
    DegenerateGrid { width: usize, height: usize },

    /// No finite sample was found and the policy forbids substituting defaults.
    #[error("no finite samples found across {bands} bands")]
    EmptyExtrema { bands: usize },
}

/// Result type for extraction steps.
pub type Result<T> = std::result::Result<T, MetadataError>;

/// The pipeline step that was running when extraction failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionStage {
    Open,
    ResolveCrs,
    BuildEnvelope,
    Reproject,
    MeasureGrid,
    ScanExtrema,
}

impl ExtractionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::ResolveCrs => "resolve_crs",
            Self::BuildEnvelope => "build_envelope",
            Self::Reproject => "reproject",
            Self::MeasureGrid => "measure_grid",
            Self::ScanExtrema => "scan_extrema",
        }
    }
}

impl fmt::Display for ExtractionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single failure surfaced by [`crate::RasterMetadataExtractor`].
///
/// By the time a caller sees this error the raster handle has already been
/// released.
#[derive(Error, Debug)]
#[error("metadata extraction failed for {} during {stage}: {cause}", path.display())]
pub struct ExtractionError {
    pub path: PathBuf,
    pub stage: ExtractionStage,
    #[source]
    pub cause: MetadataError,
}

impl ExtractionError {
    pub fn new(path: &Path, stage: ExtractionStage, cause: MetadataError) -> Self {
        Self {
            path: path.to_path_buf(),
            stage,
            cause,
        }
    }
}
