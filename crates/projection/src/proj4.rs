//! Projections for EPSG codes without a built-in implementation, driven by
//! the PROJ.4 definitions bundled with `crs-definitions`.

use std::fmt;
use std::sync::Arc;

use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use raster_common::CrsCode;

use crate::error::{check_geographic, check_input, check_planar, ProjectionError, Result};

const WGS84_LONLAT: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// A CRS projected through proj4rs, in both directions against WGS84.
#[derive(Clone)]
pub struct Proj4Projection {
    code: CrsCode,
    geographic: bool,
    source: Arc<Proj>,
    wgs84: Arc<Proj>,
}

impl Proj4Projection {
    /// Build from the PROJ.4 definition of `code`.
    pub fn new(code: CrsCode) -> Result<Self> {
        let definition = code
            .proj4_definition()
            .ok_or_else(|| ProjectionError::NoTransformPath {
                crs: code.to_string(),
                reason: "no definition in the EPSG database".to_string(),
            })?;

        let source = Proj::from_proj_string(definition).map_err(|e| {
            ProjectionError::NoTransformPath {
                crs: code.to_string(),
                reason: format!("{e:?}"),
            }
        })?;
        let wgs84 = Proj::from_proj_string(WGS84_LONLAT).map_err(|e| {
            ProjectionError::NoTransformPath {
                crs: code.to_string(),
                reason: format!("{e:?}"),
            }
        })?;

        Ok(Self {
            code,
            geographic: definition.contains("+proj=longlat"),
            source: Arc::new(source),
            wgs84: Arc::new(wgs84),
        })
    }

    pub fn code(&self) -> CrsCode {
        self.code
    }

    /// True when the source ordinates are longitude/latitude.
    pub fn is_geographic(&self) -> bool {
        self.geographic
    }

    /// Source (east, north) to WGS84 (lon, lat) in degrees.
    pub fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        check_input(x, y)?;
        let mut point = if self.geographic {
            (x.to_radians(), y.to_radians(), 0.0)
        } else {
            (x, y, 0.0)
        };
        transform(&self.source, &self.wgs84, &mut point).map_err(|e| self.failed(x, y, e))?;
        check_geographic(point.0.to_degrees(), point.1.to_degrees(), x, y, "PROJ.4")
    }

    /// WGS84 (lon, lat) in degrees to source (east, north).
    pub fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        check_input(lon, lat)?;
        let mut point = (lon.to_radians(), lat.to_radians(), 0.0);
        transform(&self.wgs84, &self.source, &mut point).map_err(|e| self.failed(lon, lat, e))?;
        let (x, y) = if self.geographic {
            (point.0.to_degrees(), point.1.to_degrees())
        } else {
            (point.0, point.1)
        };
        check_planar(x, y, lon, lat, "PROJ.4")
    }

    fn failed(&self, x: f64, y: f64, e: impl fmt::Debug) -> ProjectionError {
        ProjectionError::Proj4Failed {
            x,
            y,
            crs: self.code.to_string(),
            reason: format!("{e:?}"),
        }
    }
}

impl fmt::Debug for Proj4Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proj4Projection")
            .field("code", &self.code)
            .field("geographic", &self.geographic)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Proj4Projection {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}
