//! An in-memory raster source that counts how it is used.
//!
//! Lets tests check lifecycle guarantees (closed exactly once, envelope never
//! read after a CRS failure) and inject failures at specific steps.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use raster_common::{Envelope, GridShape, SamplingStride};
use raster_metadata::{BandSamples, RasterOpener, RasterSource, SourceError};

/// Shared usage counters, cloned into every raster a [`FakeOpener`] hands out.
#[derive(Debug, Clone, Default)]
pub struct Counters {
    opens: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
    envelope_reads: Arc<AtomicUsize>,
    band_reads: Arc<AtomicUsize>,
}

impl Counters {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn envelope_reads(&self) -> usize {
        self.envelope_reads.load(Ordering::SeqCst)
    }

    pub fn band_reads(&self) -> usize {
        self.band_reads.load(Ordering::SeqCst)
    }
}

/// An in-memory single-resolution raster.
#[derive(Debug, Clone)]
pub struct FakeRaster {
    crs: Option<String>,
    envelope: Envelope,
    shape: GridShape,
    bands: Vec<Vec<f64>>,
    nodata: Option<f64>,
    fail_envelope: bool,
    fail_reads: bool,
    counters: Counters,
}

impl FakeRaster {
    /// A raster with no bands.
    pub fn new(crs: Option<&str>, envelope: Envelope, shape: GridShape) -> Self {
        Self {
            crs: crs.map(str::to_string),
            envelope,
            shape,
            bands: Vec::new(),
            nodata: None,
            fail_envelope: false,
            fail_reads: false,
            counters: Counters::default(),
        }
    }

    /// Append a band of `shape.len()` values, row-major.
    ///
    /// # Panics
    ///
    /// Panics if the value count does not match the grid.
    pub fn with_band(mut self, values: Vec<f64>) -> Self {
        assert_eq!(values.len(), self.shape.len(), "band size mismatch");
        self.bands.push(values);
        self
    }

    pub fn with_nodata(mut self, nodata: f64) -> Self {
        self.nodata = Some(nodata);
        self
    }

    /// Make [`RasterSource::envelope`] fail.
    pub fn failing_envelope(mut self) -> Self {
        self.fail_envelope = true;
        self
    }

    /// Make [`RasterSource::read_band`] fail.
    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn counters(&self) -> Counters {
        self.counters.clone()
    }
}

impl RasterSource for FakeRaster {
    fn crs_definition(&self) -> Option<String> {
        self.crs.clone()
    }

    fn envelope(&self) -> Result<Envelope, SourceError> {
        self.counters.envelope_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_envelope {
            return Err(SourceError::invalid_georeference("injected envelope failure"));
        }
        Ok(self.envelope)
    }

    fn grid_shape(&self) -> GridShape {
        self.shape
    }

    fn band_count(&self) -> usize {
        self.bands.len()
    }

    fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    fn read_band(
        &mut self,
        band: usize,
        stride: SamplingStride,
    ) -> Result<BandSamples, SourceError> {
        self.counters.band_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            return Err(SourceError::unsupported("injected read failure"));
        }
        let values = self.bands.get(band).ok_or(SourceError::BandOutOfRange {
            band,
            count: self.bands.len(),
        })?;
        BandSamples::from_interleaved(values, self.shape, 1, 0, stride)
    }

    fn close(&mut self) {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Hands out clones of one [`FakeRaster`], or fails to open.
#[derive(Debug, Clone)]
pub struct FakeOpener {
    raster: FakeRaster,
    fail_open: bool,
}

impl FakeOpener {
    pub fn new(raster: FakeRaster) -> Self {
        Self {
            raster,
            fail_open: false,
        }
    }

    /// An opener whose every open fails with a not-found I/O error.
    pub fn failing(raster: FakeRaster) -> Self {
        Self {
            raster,
            fail_open: true,
        }
    }

    pub fn counters(&self) -> Counters {
        self.raster.counters()
    }
}

impl RasterOpener for FakeOpener {
    type Source = FakeRaster;

    fn open(&self, path: &Path) -> Result<FakeRaster, SourceError> {
        self.raster.counters.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail_open {
            return Err(SourceError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )));
        }
        Ok(self.raster.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_shared_between_clones() {
        let raster = FakeRaster::new(
            Some("EPSG:4326"),
            Envelope::new(0.0, 0.0, 1.0, 1.0),
            GridShape::new(2, 2),
        )
        .with_band(vec![1.0, 2.0, 3.0, 4.0]);
        let opener = FakeOpener::new(raster);
        let counters = opener.counters();

        let mut source = opener.open(Path::new("fake.tif")).unwrap();
        source.envelope().unwrap();
        source.read_band(0, SamplingStride::exhaustive()).unwrap();
        source.close();

        assert_eq!(counters.opens(), 1);
        assert_eq!(counters.envelope_reads(), 1);
        assert_eq!(counters.band_reads(), 1);
        assert_eq!(counters.closes(), 1);
    }

    #[test]
    fn test_failing_opener() {
        let raster = FakeRaster::new(None, Envelope::new(0.0, 0.0, 1.0, 1.0), GridShape::new(1, 1));
        let opener = FakeOpener::failing(raster);
        assert!(opener.open(Path::new("missing.tif")).is_err());
        assert_eq!(opener.counters().opens(), 1);
    }
}
