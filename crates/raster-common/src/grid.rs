//! Pixel grid shape, ground resolution and sampling stride.

use serde::{Deserialize, Serialize};

/// Width and height of a raster's pixel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
}

impl GridShape {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Total number of pixels.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Check if grid is empty.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Ground extent covered by one pixel, in native CRS units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelSize {
    pub x: f64,
    pub y: f64,
}

/// Systematic subsampling interval for band statistics.
///
/// Only every `rows`-th row and every `cols`-th column is visited, starting
/// at row 0 and column 0. Statistics over the subsample approximate the true
/// values of the full raster; they may miss an extreme value that sits
/// between sampled pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingStride {
    pub rows: usize,
    pub cols: usize,
}

impl SamplingStride {
    /// Default interval along each axis.
    pub const DEFAULT: usize = 10;

    /// Create a stride. Zero intervals are clamped to 1 (every pixel).
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: rows.max(1),
            cols: cols.max(1),
        }
    }

    /// Same interval on both axes.
    pub fn uniform(step: usize) -> Self {
        Self::new(step, step)
    }

    /// A stride that visits every pixel.
    pub fn exhaustive() -> Self {
        Self::new(1, 1)
    }

    /// Row indices visited for a grid of `height` rows.
    pub fn sampled_rows(&self, height: usize) -> impl Iterator<Item = usize> {
        (0..height).step_by(self.rows.max(1))
    }

    /// Column indices visited for a grid of `width` columns.
    pub fn sampled_cols(&self, width: usize) -> impl Iterator<Item = usize> {
        (0..width).step_by(self.cols.max(1))
    }

    /// Shape of the subsample taken from `shape`.
    pub fn sampled_shape(&self, shape: GridShape) -> GridShape {
        GridShape::new(
            shape.width.div_ceil(self.cols.max(1)),
            shape.height.div_ceil(self.rows.max(1)),
        )
    }
}

impl Default for SamplingStride {
    fn default() -> Self {
        Self::uniform(Self::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stride_is_ten() {
        let stride = SamplingStride::default();
        assert_eq!(stride.rows, 10);
        assert_eq!(stride.cols, 10);
    }

    #[test]
    fn test_sampled_indices_start_at_zero() {
        let stride = SamplingStride::uniform(10);
        let rows: Vec<usize> = stride.sampled_rows(25).collect();
        assert_eq!(rows, vec![0, 10, 20]);
        assert_eq!(
            stride.sampled_shape(GridShape::new(25, 100)),
            GridShape::new(3, 10)
        );
    }

    #[test]
    fn test_zero_stride_clamped() {
        let stride = SamplingStride::new(0, 0);
        assert_eq!(stride, SamplingStride::exhaustive());
        assert_eq!(stride.sampled_cols(3).count(), 3);
    }

    #[test]
    fn test_empty_grid() {
        assert!(GridShape::new(0, 10).is_empty());
        assert!(!GridShape::new(1, 1).is_empty());
        assert_eq!(GridShape::new(4, 5).len(), 20);
    }
}
