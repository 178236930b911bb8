//! Scoped ownership of an opened raster.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::source::RasterSource;

/// Guard owning an opened [`RasterSource`].
///
/// The source is closed exactly once: either by [`RasterHandle::close`] or,
/// on any other exit path including unwinding, when the guard is dropped.
pub struct RasterHandle<S: RasterSource> {
    path: PathBuf,
    source: S,
    closed: bool,
}

impl<S: RasterSource> RasterHandle<S> {
    pub fn new(path: &Path, source: S) -> Self {
        debug!(path = %path.display(), "Raster opened");
        Self {
            path: path.to_path_buf(),
            source,
            closed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the source now.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.source.close();
            debug!(path = %self.path.display(), "Raster closed");
        }
    }
}

impl<S: RasterSource> Deref for RasterHandle<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.source
    }
}

impl<S: RasterSource> DerefMut for RasterHandle<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S: RasterSource> Drop for RasterHandle<S> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::source::BandSamples;
    use raster_common::{Envelope, GridShape, SamplingStride};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting(Arc<AtomicUsize>);

    impl RasterSource for Counting {
        fn crs_definition(&self) -> Option<String> {
            None
        }
        fn envelope(&self) -> Result<Envelope, SourceError> {
            Ok(Envelope::new(0.0, 0.0, 1.0, 1.0))
        }
        fn grid_shape(&self) -> GridShape {
            GridShape::new(1, 1)
        }
        fn band_count(&self) -> usize {
            0
        }
        fn read_band(&mut self, _: usize, _: SamplingStride) -> Result<BandSamples, SourceError> {
            Ok(BandSamples::empty())
        }
        fn close(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_explicit_close_releases_once() {
        let closes = Arc::new(AtomicUsize::new(0));
        let handle = RasterHandle::new(Path::new("a.tif"), Counting(closes.clone()));
        handle.close();
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_releases_once() {
        let closes = Arc::new(AtomicUsize::new(0));
        {
            let handle = RasterHandle::new(Path::new("a.tif"), Counting(closes.clone()));
            assert_eq!(handle.path(), Path::new("a.tif"));
            assert_eq!(handle.band_count(), 0);
        }
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_release_on_unwind() {
        let closes = Arc::new(AtomicUsize::new(0));
        let inner = closes.clone();
        let result = std::panic::catch_unwind(move || {
            let _handle = RasterHandle::new(Path::new("a.tif"), Counting(inner));
            panic!("boom");
        });
        assert!(result.is_err());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }
}
