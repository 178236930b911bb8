//! The extraction pipeline.

use std::path::Path;

use tracing::{debug, info, info_span, warn};

use crate::config::{EmptyExtremaPolicy, ExtractorConfig};
use crate::crs_resolver::CoordinateSystemResolver;
use crate::error::{ExtractionError, ExtractionStage, MetadataError};
use crate::extrema::{ExtremaScan, ExtremaScanner};
use crate::handle::RasterHandle;
use crate::metadata::{ExtremaOrigin, LayerMetadata, RasterMetadata};
use crate::reproject::EnvelopeReprojector;
use crate::resolution::ResolutionCalculator;
use crate::source::{RasterOpener, RasterSource};

type StageResult<T> = std::result::Result<T, (ExtractionStage, MetadataError)>;

/// Produces [`RasterMetadata`] for raster files.
///
/// Each call opens the raster, runs every step once in order and releases
/// the raster before returning, whether it succeeded or not. Calls share no
/// mutable state and may run concurrently on different files.
pub struct RasterMetadataExtractor<O: RasterOpener> {
    opener: O,
    config: ExtractorConfig,
    reprojector: EnvelopeReprojector,
    scanner: ExtremaScanner,
}

impl<O: RasterOpener> RasterMetadataExtractor<O> {
    pub fn new(opener: O, config: ExtractorConfig) -> Self {
        Self {
            opener,
            reprojector: EnvelopeReprojector::with_densify_points(config.densify_points),
            scanner: ExtremaScanner::new(config.stride),
            config,
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract metadata from the raster at `path`.
    pub fn extract(&self, path: &Path) -> Result<RasterMetadata, ExtractionError> {
        let span = info_span!("extract", path = %path.display());
        let _enter = span.enter();

        let source = self.opener.open(path).map_err(|e| {
            ExtractionError::new(path, ExtractionStage::Open, MetadataError::ResourceOpen(e))
        })?;

        let mut handle = RasterHandle::new(path, source);
        let result = self.run(&mut handle);
        handle.close();

        match result {
            Ok(metadata) => {
                info!(
                    crs = metadata.crs_identifier().unwrap_or("none"),
                    bands = metadata.sample_dimension_count(),
                    min = metadata.min_value(),
                    max = metadata.max_value(),
                    "Extracted raster metadata"
                );
                Ok(metadata)
            }
            Err((stage, cause)) => {
                warn!(stage = %stage, error = %cause, "Metadata extraction failed");
                Err(ExtractionError::new(path, stage, cause))
            }
        }
    }

    /// Extract metadata and label it with a publisher layer name.
    pub fn extract_layer(
        &self,
        path: &Path,
        layer: &str,
    ) -> Result<LayerMetadata, ExtractionError> {
        self.extract(path)
            .map(|metadata| LayerMetadata::new(layer, metadata))
    }

    fn run(&self, handle: &mut RasterHandle<O::Source>) -> StageResult<RasterMetadata> {
        let crs = CoordinateSystemResolver::resolve(&**handle)
            .map_err(|e| (ExtractionStage::ResolveCrs, e.into()))?;
        debug!(crs = %crs.identifier(), "CRS resolved");

        let envelope = handle.envelope().map_err(|e| {
            (
                ExtractionStage::BuildEnvelope,
                MetadataError::ResourceRead(e),
            )
        })?;
        debug!(envelope = ?envelope, "Envelope built");

        let footprint = self.reprojector.reproject(&envelope, &crs).map_err(|cause| {
            (
                ExtractionStage::Reproject,
                MetadataError::Reprojection {
                    crs: crs.identifier(),
                    cause,
                },
            )
        })?;

        let grid = handle.grid_shape();
        let pixel_size = ResolutionCalculator::pixel_size(&envelope, crs.axis_order, grid)
            .map_err(|e| (ExtractionStage::MeasureGrid, e))?;
        debug!(
            width = grid.width,
            height = grid.height,
            pixel_size_x = pixel_size.x,
            pixel_size_y = pixel_size.y,
            "Grid measured"
        );

        let band_count = handle.band_count();
        let scan = self
            .scanner
            .scan(&mut **handle)
            .map_err(|e| (ExtractionStage::ScanExtrema, e))?;
        let (range, origin) = self
            .resolve_extrema(&scan, band_count)
            .map_err(|e| (ExtractionStage::ScanExtrema, e))?;

        Ok(RasterMetadata::new(
            handle.path(),
            Some(crs.identifier()),
            footprint,
            pixel_size,
            range,
            band_count,
            origin,
            self.scanner.stride(),
        ))
    }

    /// Apply the empty-extrema policy to a scan result.
    fn resolve_extrema(
        &self,
        scan: &ExtremaScan,
        band_count: usize,
    ) -> crate::error::Result<((f64, f64), ExtremaOrigin)> {
        if let Some(range) = scan.range() {
            return Ok((range, ExtremaOrigin::Sampled));
        }

        match self.config.empty_extrema {
            EmptyExtremaPolicy::Default => {
                warn!(
                    bands = band_count,
                    min = self.config.empty_min,
                    max = self.config.empty_max,
                    "No finite samples found; using default extrema"
                );
                Ok((
                    (self.config.empty_min, self.config.empty_max),
                    ExtremaOrigin::Default,
                ))
            }
            EmptyExtremaPolicy::Fail => Err(MetadataError::EmptyExtrema { bands: band_count }),
        }
    }
}
