//! Native envelope to WGS84 footprint.

use projection::CrsTransform;
use raster_common::{Coord, Crs, Envelope, Footprint};
use tracing::{debug, warn};

use crate::error::ReprojectionError;

/// Reprojects a native envelope into a closed WGS84 lon/lat ring.
///
/// Every CRS, geographic ones included, goes through the same transform path.
/// The ring is wound counter-clockwise and explicitly closed, so it always
/// has at least five vertices. A projected envelope that contains a pole
/// becomes a polar cap spanning every longitude.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeReprojector {
    densify_points: usize,
}

impl EnvelopeReprojector {
    /// A reprojector that transforms the four corners only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `densify_points` extra vertices along each edge before
    /// transforming, so curved edges of the projected rectangle are followed.
    pub fn with_densify_points(densify_points: usize) -> Self {
        Self { densify_points }
    }

    /// Transform `envelope`, given in the axis order of `crs`, into WGS84.
    pub fn reproject(
        &self,
        envelope: &Envelope,
        crs: &Crs,
    ) -> Result<Footprint, ReprojectionError> {
        if !envelope.is_finite() {
            return Err(ReprojectionError::NonFiniteEnvelope(*envelope));
        }

        let transform = CrsTransform::to_wgs84(crs).map_err(ReprojectionError::NoTransformPath)?;
        let native_ring = self.native_ring(envelope);

        let mut ring = Vec::with_capacity(native_ring.len());
        for (x, y) in native_ring {
            let (lon, lat) = transform
                .transform(x, y)
                .map_err(|cause| ReprojectionError::Vertex { x, y, cause })?;
            ring.push(Coord::new(lon, lat));
        }

        let footprint = match enclosed_pole(envelope, &transform) {
            Some(pole) => {
                debug!(crs = %crs.identifier(), pole, "Envelope contains a pole");
                polar_cap(&ring, pole)?
            }
            None => Footprint::from_ring(ring)?,
        }
        .into_counter_clockwise();

        if footprint.is_degenerate() {
            warn!(
                crs = %crs.identifier(),
                envelope = ?envelope,
                "Envelope has no area; footprint is degenerate"
            );
        } else {
            debug!(
                crs = %crs.identifier(),
                projection = transform.projection().name(),
                vertices = footprint.vertices().len(),
                "Reprojected envelope"
            );
        }

        Ok(footprint)
    }

    /// Corner ring in native ordinates, densified and explicitly closed.
    fn native_ring(&self, envelope: &Envelope) -> Vec<(f64, f64)> {
        let corners = envelope.corners();
        let steps = self.densify_points + 1;

        let mut ring = Vec::with_capacity(corners.len() * steps + 1);
        for (i, &(x0, y0)) in corners.iter().enumerate() {
            let (x1, y1) = corners[(i + 1) % corners.len()];
            for k in 0..steps {
                let t = k as f64 / steps as f64;
                ring.push((x0 + (x1 - x0) * t, y0 + (y1 - y0) * t));
            }
        }
        ring.push(corners[0]);
        ring
    }
}

/// Latitude of the pole inside a projected envelope, if any.
fn enclosed_pole(envelope: &Envelope, transform: &CrsTransform) -> Option<f64> {
    if transform.projection().is_geographic() {
        return None;
    }
    [90.0, -90.0].into_iter().find(|&lat| {
        transform
            .inverse(0.0, lat)
            .is_ok_and(|(first, second)| envelope.contains_point(first, second))
    })
}

/// Cap from the pole to the transformed perimeter vertex closest to the equator.
fn polar_cap(perimeter: &[Coord], pole: f64) -> Result<Footprint, ReprojectionError> {
    let lats = perimeter.iter().map(|c| c.lat);
    let edge = if pole > 0.0 {
        lats.fold(f64::INFINITY, f64::min)
    } else {
        lats.fold(f64::NEG_INFINITY, f64::max)
    };

    Ok(Footprint::from_ring(vec![
        Coord::new(-180.0, edge),
        Coord::new(180.0, edge),
        Coord::new(180.0, pole),
        Coord::new(-180.0, pole),
    ])?)
}
