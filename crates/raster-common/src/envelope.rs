//! Envelope types and operations.

use serde::{Deserialize, Serialize};

use crate::crs::AxisOrder;

/// An axis-aligned bounding rectangle in a raster's native CRS.
///
/// Ordinates are stored in the CRS axis order: `x` is ordinate 0 and `y` is
/// ordinate 1. For a CRS with [`AxisOrder::LatLon`] that means `x` holds
/// latitude; use [`Envelope::to_east_north`] before doing anything that
/// assumes easting first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Envelope {
    /// Create a new envelope from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Build an envelope from a lower and an upper corner position.
    ///
    /// The corners are folded in with [`Envelope::expand_to_include`], so a
    /// reader that reports them swapped still yields `min <= max`.
    pub fn from_corners(lower: [f64; 2], upper: [f64; 2]) -> Self {
        let mut envelope = Self::new(lower[0], lower[1], lower[0], lower[1]);
        envelope.expand_to_include(upper[0], upper[1]);
        envelope
    }

    /// Grow the envelope so it contains `(x, y)`.
    pub fn expand_to_include(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Width of the envelope in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the envelope in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// True when every ordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite()
    }

    /// True when the envelope collapses to a line or a point.
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Reorder ordinates so `x` is easting/longitude and `y` northing/latitude.
    pub fn to_east_north(&self, axis_order: AxisOrder) -> Envelope {
        match axis_order {
            AxisOrder::XY => *self,
            AxisOrder::LatLon => Envelope::new(self.min_y, self.min_x, self.max_y, self.max_x),
        }
    }

    /// The four corners, counter-clockwise from the lower-left.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.min_x, self.min_y),
            (self.max_x, self.min_y),
            (self.max_x, self.max_y),
            (self.min_x, self.max_y),
        ]
    }

    /// Check if a point is contained within this envelope.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}
