//! Geographic footprint polygons.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::Envelope;

/// A WGS84 position, longitude first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lon: f64,
    pub lat: f64,
}

impl Coord {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Ground coverage of a raster as a closed ring in WGS84 lon/lat.
///
/// The ring always ends on its first vertex. A footprint built from an
/// envelope with zero width or height is kept as-is and reports itself
/// through [`Footprint::is_degenerate`]. Deserialized footprints pass
/// through [`Footprint::from_ring`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FootprintRing")]
pub struct Footprint {
    ring: Vec<Coord>,
}

/// Wire form of a [`Footprint`], validated on the way in.
#[derive(Deserialize)]
struct FootprintRing {
    ring: Vec<Coord>,
}

impl TryFrom<FootprintRing> for Footprint {
    type Error = FootprintError;

    fn try_from(wire: FootprintRing) -> Result<Self, Self::Error> {
        Footprint::from_ring(wire.ring)
    }
}

impl Footprint {
    /// Bounds extents at or below this many degrees count as zero.
    const MIN_EXTENT: f64 = 1e-10;
    /// Area below this fraction of the bounding box counts as no area.
    const AREA_TOLERANCE: f64 = 1e-9;

    /// Build a footprint from ring vertices, closing the ring if needed.
    pub fn from_ring(mut ring: Vec<Coord>) -> Result<Self, FootprintError> {
        if let Some(bad) = ring
            .iter()
            .find(|c| !c.lon.is_finite() || !c.lat.is_finite())
        {
            return Err(FootprintError::NonFinite {
                lon: bad.lon,
                lat: bad.lat,
            });
        }

        let (first, last) = match (ring.first(), ring.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(FootprintError::TooFewVertices(0)),
        };
        if first != last {
            ring.push(first);
        }

        // Three corners plus the closing vertex is the smallest polygon.
        if ring.len() < 4 {
            return Err(FootprintError::TooFewVertices(ring.len()));
        }

        Ok(Self { ring })
    }

    /// Ring vertices, closing vertex included.
    pub fn vertices(&self) -> &[Coord] {
        &self.ring
    }

    pub fn is_closed(&self) -> bool {
        self.ring.first() == self.ring.last()
    }

    /// Signed shoelace area in square degrees; positive when counter-clockwise.
    pub fn signed_area(&self) -> f64 {
        // Relative to the first vertex to keep small rings precise.
        let origin = self.ring[0];
        self.ring
            .windows(2)
            .map(|w| {
                let (x0, y0) = (w[0].lon - origin.lon, w[0].lat - origin.lat);
                let (x1, y1) = (w[1].lon - origin.lon, w[1].lat - origin.lat);
                x0 * y1 - x1 * y0
            })
            .sum::<f64>()
            / 2.0
    }

    /// The same footprint with its ring wound counter-clockwise.
    pub fn into_counter_clockwise(mut self) -> Self {
        if self.signed_area() < 0.0 {
            self.ring.reverse();
        }
        self
    }

    /// True when the ring encloses no area (a line or a point).
    ///
    /// Area is judged relative to the bounding box, so tiny but real
    /// footprints are not degenerate and rounding noise along a line is.
    pub fn is_degenerate(&self) -> bool {
        let bounds = self.bounds();
        let (width, height) = (bounds.width(), bounds.height());
        width <= Self::MIN_EXTENT
            || height <= Self::MIN_EXTENT
            || self.signed_area().abs() <= Self::AREA_TOLERANCE * width * height
    }

    /// Lon/lat bounds of the ring.
    pub fn bounds(&self) -> Envelope {
        let first = self.ring[0];
        let mut bounds = Envelope::new(first.lon, first.lat, first.lon, first.lat);
        for c in &self.ring[1..] {
            bounds.expand_to_include(c.lon, c.lat);
        }
        bounds
    }

    /// Well-Known Text, e.g. `POLYGON ((0 0, 1 0, 1 1, 0 1, 0 0))`.
    pub fn to_wkt(&self) -> String {
        let mut wkt = String::from("POLYGON ((");
        for (i, c) in self.ring.iter().enumerate() {
            if i > 0 {
                wkt.push_str(", ");
            }
            let _ = write!(wkt, "{} {}", c.lon, c.lat);
        }
        wkt.push_str("))");
        wkt
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FootprintError {
    #[error("Footprint ring needs at least 4 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("Footprint vertex is not finite: ({lon}, {lat})")]
    NonFinite { lon: f64, lat: f64 },
}
