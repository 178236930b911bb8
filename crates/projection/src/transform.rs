//! Dispatch from a CRS to its projection and conversion to WGS84.

use raster_common::{Crs, CrsCode};

use crate::albers::AlbersEqualArea;
use crate::ellipsoid::Ellipsoid;
use crate::error::{check_geographic, check_input, Result};
use crate::mercator::WebMercator;
use crate::polar::PolarStereographic;
use crate::proj4::Proj4Projection;
use crate::transverse_mercator::TransverseMercator;

/// The map projection behind a CRS.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// Longitude/latitude in degrees; no projection.
    Geographic,
    WebMercator(WebMercator),
    TransverseMercator(TransverseMercator),
    PolarStereographic(PolarStereographic),
    AlbersEqualArea(AlbersEqualArea),
    /// Any other EPSG code, through its PROJ.4 definition.
    Proj4(Proj4Projection),
}

impl Projection {
    /// Projection for a CRS code.
    ///
    /// Fails with [`ProjectionError::NoTransformPath`] when the code has
    /// neither a built-in projection nor a usable PROJ.4 definition.
    ///
    /// [`ProjectionError::NoTransformPath`]: crate::ProjectionError::NoTransformPath
    pub fn for_crs(code: CrsCode) -> Result<Self> {
        let ellipsoid = code.datum().map_or(Ellipsoid::WGS84, Ellipsoid::for_datum);
        let projection = match code {
            CrsCode::Epsg4326 | CrsCode::Epsg4269 | CrsCode::Epsg4258 => Projection::Geographic,
            CrsCode::Epsg3857 => Projection::WebMercator(WebMercator::default()),
            CrsCode::UtmWgs84 { zone, north } => {
                Projection::TransverseMercator(TransverseMercator::utm(zone, north, ellipsoid))
            }
            CrsCode::UtmNad83 { zone } | CrsCode::UtmEtrs89 { zone } => {
                Projection::TransverseMercator(TransverseMercator::utm(zone, true, ellipsoid))
            }
            CrsCode::Epsg3413 => Projection::PolarStereographic(PolarStereographic::nsidc_north()),
            CrsCode::Epsg3031 => Projection::PolarStereographic(PolarStereographic::antarctic()),
            CrsCode::Epsg5070 => Projection::AlbersEqualArea(AlbersEqualArea::conus()),
            CrsCode::Epsg(_) => Projection::Proj4(Proj4Projection::new(code)?),
        };
        Ok(projection)
    }

    /// True when planar coordinates are already longitude/latitude.
    pub fn is_geographic(&self) -> bool {
        match self {
            Projection::Geographic => true,
            Projection::Proj4(p) => p.is_geographic(),
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Projection::Geographic => "Geographic",
            Projection::WebMercator(_) => "Web Mercator",
            Projection::TransverseMercator(_) => "Transverse Mercator",
            Projection::PolarStereographic(_) => "Polar Stereographic",
            Projection::AlbersEqualArea(_) => "Albers Equal Area",
            Projection::Proj4(_) => "PROJ.4",
        }
    }

    /// Planar (east, north) to (lon, lat) in degrees.
    pub fn to_geographic(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        match self {
            Projection::Geographic => {
                check_input(x, y)?;
                check_geographic(x, y, x, y, self.name())
            }
            Projection::WebMercator(p) => p.inverse(x, y),
            Projection::TransverseMercator(p) => p.inverse(x, y),
            Projection::PolarStereographic(p) => p.inverse(x, y),
            Projection::AlbersEqualArea(p) => p.inverse(x, y),
            Projection::Proj4(p) => p.inverse(x, y),
        }
    }

    /// (lon, lat) in degrees to planar (east, north).
    pub fn from_geographic(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        match self {
            Projection::Geographic => {
                check_input(lon, lat)?;
                Ok((lon, lat))
            }
            Projection::WebMercator(p) => p.forward(lon, lat),
            Projection::TransverseMercator(p) => p.forward(lon, lat),
            Projection::PolarStereographic(p) => p.forward(lon, lat),
            Projection::AlbersEqualArea(p) => p.forward(lon, lat),
            Projection::Proj4(p) => p.forward(lon, lat),
        }
    }
}

/// Transform between a source CRS, in its declared axis order, and WGS84
/// longitude/latitude.
#[derive(Debug, Clone, PartialEq)]
pub struct CrsTransform {
    source: Crs,
    projection: Projection,
}

impl CrsTransform {
    /// Build the transform from `source` to WGS84 lon/lat.
    pub fn to_wgs84(source: &Crs) -> Result<Self> {
        Ok(Self {
            source: *source,
            projection: Projection::for_crs(source.code)?,
        })
    }

    pub fn source(&self) -> &Crs {
        &self.source
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// True when the source is WGS84 longitude/latitude already.
    pub fn is_identity(&self) -> bool {
        self.source == Crs::wgs84()
    }

    /// Transform a position given as (ordinate 0, ordinate 1) in the source
    /// CRS into (lon, lat).
    pub fn transform(&self, first: f64, second: f64) -> Result<(f64, f64)> {
        let (east, north) = self.source.axis_order.to_east_north(first, second);
        self.projection.to_geographic(east, north)
    }

    /// Transform (lon, lat) back into source ordinates, in source axis order.
    pub fn inverse(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        let (east, north) = self.projection.from_geographic(lon, lat)?;
        Ok(self.source.axis_order.to_east_north(east, north))
    }
}
