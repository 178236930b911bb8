//! Coordinate Reference System types and utilities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Geodetic datum of a supported CRS.
///
/// NAD83 and ETRS89 are realised on GRS80 and differ from WGS84 by well under
/// a metre, so no datum shift is applied between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Datum {
    Wgs84,
    Nad83,
    Etrs89,
}

/// EPSG codes live in this range; 32767 is reserved for user-defined systems.
pub const EPSG_CODE_RANGE: std::ops::RangeInclusive<u32> = 1024..=32766;

/// A CRS identified by EPSG code.
///
/// The named variants have built-in projections. Any other code in the
/// EPSG range is carried as [`CrsCode::Epsg`] and projected through its
/// PROJ.4 definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic (lat/lon in degrees)
    Epsg4326,
    /// NAD83 Geographic
    Epsg4269,
    /// ETRS89 Geographic
    Epsg4258,
    /// Web Mercator (meters)
    Epsg3857,
    /// WGS84 / UTM, EPSG:326xx (north) and EPSG:327xx (south)
    UtmWgs84 { zone: u8, north: bool },
    /// NAD83 / UTM north, EPSG:26901-26923
    UtmNad83 { zone: u8 },
    /// ETRS89 / UTM north, EPSG:25828-25838
    UtmEtrs89 { zone: u8 },
    /// Polar Stereographic North (NSIDC Sea Ice)
    Epsg3413,
    /// Polar Stereographic South (Antarctic)
    Epsg3031,
    /// CONUS Albers Equal Area
    Epsg5070,
    /// Any other EPSG code
    Epsg(u32),
}

impl CrsCode {
    /// Look up a CRS by its EPSG code.
    pub fn from_epsg(code: u32) -> Result<Self, CrsParseError> {
        match code {
            4326 => Ok(CrsCode::Epsg4326),
            4269 => Ok(CrsCode::Epsg4269),
            4258 => Ok(CrsCode::Epsg4258),
            3857 | 900913 => Ok(CrsCode::Epsg3857),
            3413 => Ok(CrsCode::Epsg3413),
            3031 => Ok(CrsCode::Epsg3031),
            5070 => Ok(CrsCode::Epsg5070),
            32601..=32660 => Ok(CrsCode::UtmWgs84 {
                zone: (code - 32600) as u8,
                north: true,
            }),
            32701..=32760 => Ok(CrsCode::UtmWgs84 {
                zone: (code - 32700) as u8,
                north: false,
            }),
            26901..=26923 => Ok(CrsCode::UtmNad83 {
                zone: (code - 26900) as u8,
            }),
            25828..=25838 => Ok(CrsCode::UtmEtrs89 {
                zone: (code - 25800) as u8,
            }),
            code if EPSG_CODE_RANGE.contains(&code) => Ok(CrsCode::Epsg(code)),
            _ => Err(CrsParseError::CodeOutOfRange(code)),
        }
    }

    /// The EPSG code of this CRS.
    pub fn epsg(&self) -> u32 {
        match self {
            CrsCode::Epsg4326 => 4326,
            CrsCode::Epsg4269 => 4269,
            CrsCode::Epsg4258 => 4258,
            CrsCode::Epsg3857 => 3857,
            CrsCode::UtmWgs84 { zone, north: true } => 32600 + *zone as u32,
            CrsCode::UtmWgs84 { zone, north: false } => 32700 + *zone as u32,
            CrsCode::UtmNad83 { zone } => 26900 + *zone as u32,
            CrsCode::UtmEtrs89 { zone } => 25800 + *zone as u32,
            CrsCode::Epsg3413 => 3413,
            CrsCode::Epsg3031 => 3031,
            CrsCode::Epsg5070 => 5070,
            CrsCode::Epsg(code) => *code,
        }
    }

    /// PROJ.4 definition from the bundled EPSG database.
    pub fn proj4_definition(&self) -> Option<&'static str> {
        u16::try_from(self.epsg())
            .ok()
            .and_then(crs_definitions::from_code)
            .map(|def| def.proj4)
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        match self {
            CrsCode::Epsg4326 | CrsCode::Epsg4269 | CrsCode::Epsg4258 => true,
            CrsCode::Epsg(_) => self
                .proj4_definition()
                .is_some_and(|def| def.contains("+proj=longlat")),
            _ => false,
        }
    }

    /// Datum of a CRS with a built-in projection.
    pub fn datum(&self) -> Option<Datum> {
        match self {
            CrsCode::Epsg4326
            | CrsCode::Epsg3857
            | CrsCode::UtmWgs84 { .. }
            | CrsCode::Epsg3413
            | CrsCode::Epsg3031 => Some(Datum::Wgs84),
            CrsCode::Epsg4269 | CrsCode::UtmNad83 { .. } | CrsCode::Epsg5070 => {
                Some(Datum::Nad83)
            }
            CrsCode::Epsg4258 | CrsCode::UtmEtrs89 { .. } => Some(Datum::Etrs89),
            CrsCode::Epsg(_) => None,
        }
    }

    /// Axis order as published by the EPSG registry.
    ///
    /// Geographic systems are latitude first; projected systems are taken
    /// as easting first.
    pub fn authority_axis_order(&self) -> AxisOrder {
        if self.is_geographic() {
            AxisOrder::LatLon
        } else {
            AxisOrder::XY
        }
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

/// Axis order for coordinate interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisOrder {
    /// X (longitude/easting), Y (latitude/northing)
    XY,
    /// Y (latitude/northing), X (longitude/easting)
    LatLon,
}

impl AxisOrder {
    /// Reorder a position given in this axis order into (east, north).
    pub fn to_east_north(&self, first: f64, second: f64) -> (f64, f64) {
        match self {
            AxisOrder::XY => (first, second),
            AxisOrder::LatLon => (second, first),
        }
    }
}

/// A resolved CRS: which system, and how its ordinates are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crs {
    pub code: CrsCode,
    pub axis_order: AxisOrder,
}

impl Crs {
    /// A CRS with easting/longitude first, the GIS convention used by
    /// GeoTIFF and `EPSG:n` strings.
    pub fn new(code: CrsCode) -> Self {
        Self {
            code,
            axis_order: AxisOrder::XY,
        }
    }

    pub fn with_axis_order(code: CrsCode, axis_order: AxisOrder) -> Self {
        Self { code, axis_order }
    }

    /// WGS84 longitude/latitude (CRS:84).
    pub fn wgs84() -> Self {
        Self::new(CrsCode::Epsg4326)
    }

    /// Authority identifier, e.g. `EPSG:32633`.
    pub fn identifier(&self) -> String {
        self.code.to_string()
    }

    pub fn is_geographic(&self) -> bool {
        self.code.is_geographic()
    }

    /// Parse a CRS definition string.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326", "epsg:32633" or a bare "32633" (easting first)
    /// - "CRS:84" and "urn:ogc:def:crs:OGC:1.3:CRS84" (longitude first)
    /// - "urn:ogc:def:crs:EPSG::4326" and
    ///   "http://www.opengis.net/def/crs/EPSG/0/4326" (authority axis order)
    /// - WKT1/WKT2, identified by the outermost `AUTHORITY["EPSG","n"]` or
    ///   `ID["EPSG",n]` (easting first)
    pub fn parse(definition: &str) -> Result<Self, CrsParseError> {
        let trimmed = definition.trim();
        if trimmed.is_empty() {
            return Err(CrsParseError::Empty);
        }

        let normalized = trimmed.to_ascii_uppercase();

        match normalized.as_str() {
            "CRS:84"
            | "OGC:CRS84"
            | "URN:OGC:DEF:CRS:OGC:1.3:CRS84"
            | "URN:OGC:DEF:CRS:OGC::CRS84" => return Ok(Crs::wgs84()),
            _ => {}
        }

        if normalized.ends_with("/OGC/1.3/CRS84") {
            return Ok(Crs::wgs84());
        }

        if let Some(code) = normalized.strip_prefix("EPSG:") {
            return Ok(Crs::new(CrsCode::from_epsg(parse_code(code)?)?));
        }

        if let Some(rest) = normalized.strip_prefix("URN:OGC:DEF:CRS:EPSG:") {
            // Optional version between the colons: "::4326" or ":6.6:4326"
            let code = rest.rsplit(':').next().unwrap_or(rest);
            let code = CrsCode::from_epsg(parse_code(code)?)?;
            return Ok(Crs::with_axis_order(code, code.authority_axis_order()));
        }

        if let Some(pos) = normalized.find("OPENGIS.NET/DEF/CRS/EPSG/") {
            let rest = &normalized[pos..];
            let code = rest.trim_end_matches('/').rsplit('/').next().unwrap_or(rest);
            let code = CrsCode::from_epsg(parse_code(code)?)?;
            return Ok(Crs::with_axis_order(code, code.authority_axis_order()));
        }

        if looks_like_wkt(&normalized) {
            let code = wkt_authority_code(&normalized)
                .ok_or_else(|| CrsParseError::UnrecognizedDefinition(truncate(trimmed)))?;
            return Ok(Crs::new(CrsCode::from_epsg(code)?));
        }

        if normalized.chars().all(|c| c.is_ascii_digit()) {
            return Ok(Crs::new(CrsCode::from_epsg(parse_code(&normalized)?)?));
        }

        Err(CrsParseError::UnrecognizedDefinition(truncate(trimmed)))
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

fn parse_code(s: &str) -> Result<u32, CrsParseError> {
    s.trim()
        .parse()
        .map_err(|_| CrsParseError::InvalidCode(s.to_string()))
}

fn looks_like_wkt(s: &str) -> bool {
    const ROOTS: [&str; 7] = [
        "PROJCS[", "GEOGCS[", "PROJCRS[", "GEOGCRS[", "GEODCRS[", "PROJECTEDCRS[", "GEODETICCRS[",
    ];
    ROOTS.iter().any(|root| s.starts_with(root))
}

/// The outermost authority of a WKT string is the last one in the text.
fn wkt_authority_code(wkt: &str) -> Option<u32> {
    let authority = wkt.rfind("AUTHORITY[\"EPSG\",").map(|p| p + "AUTHORITY[\"EPSG\",".len());
    let id = wkt.rfind("ID[\"EPSG\",").map(|p| p + "ID[\"EPSG\",".len());

    let start = match (authority, id) {
        (Some(a), Some(i)) => a.max(i),
        (Some(a), None) => a,
        (None, Some(i)) => i,
        (None, None) => return None,
    };

    let digits: String = wkt[start..]
        .trim_start_matches(|c: char| c == '"' || c.is_whitespace())
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    digits.parse().ok()
}

fn truncate(s: &str) -> String {
    s.chars().take(64).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CrsParseError {
    #[error("Empty CRS definition")]
    Empty,

    #[error("EPSG code {0} is outside the EPSG code range")]
    CodeOutOfRange(u32),

    #[error("Invalid CRS code: {0}")]
    InvalidCode(String),

    #[error("Unrecognized CRS definition: {0}")]
    UnrecognizedDefinition(String),
}
