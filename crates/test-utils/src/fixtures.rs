//! Common test fixtures for raster metadata tests.
//!
//! This module provides pre-defined envelopes, grids and CRS definitions
//! that represent common scenarios in raster metadata extraction.

/// Native envelopes as (min_x, min_y, max_x, max_y) in CRS axis order.
pub mod envelope {
    /// Small projected envelope: 10 km x 10 km in meters
    pub const PROJECTED_10KM: (f64, f64, f64, f64) =
        (-1000.0, 4_000_000.0, 9000.0, 4_010_000.0);

    /// UTM zone 33N tile around the central meridian (15E)
    pub const UTM_33N: (f64, f64, f64, f64) =
        (400_000.0, 5_000_000.0, 600_000.0, 5_200_000.0);

    /// Western Europe in lon/lat
    pub const EUROPE_LON_LAT: (f64, f64, f64, f64) = (-10.0, 40.0, 5.0, 45.0);

    /// Same area as [`EUROPE_LON_LAT`] with latitude first
    pub const EUROPE_LAT_LON: (f64, f64, f64, f64) = (40.0, -10.0, 45.0, 5.0);

    /// Continental United States in EPSG:5070 meters
    pub const CONUS_ALBERS: (f64, f64, f64, f64) =
        (-2_356_000.0, 270_000.0, 2_258_000.0, 3_173_000.0);

    /// Greenland area in EPSG:3413 meters
    pub const ARCTIC_3413: (f64, f64, f64, f64) =
        (-800_000.0, -3_400_000.0, 900_000.0, -600_000.0);

    /// Antarctica in EPSG:3031 meters, South Pole included
    pub const ANTARCTIC_3031: (f64, f64, f64, f64) =
        (-3_000_000.0, -3_000_000.0, 3_000_000.0, 3_000_000.0);

    /// Waikato, New Zealand, in EPSG:2193 meters
    pub const NZTM_WAIKATO: (f64, f64, f64, f64) =
        (1_750_000.0, 5_800_000.0, 1_850_000.0, 5_900_000.0);

    /// Single point (degenerate envelope)
    pub const POINT: (f64, f64, f64, f64) = (3.0, 3.0, 3.0, 3.0);

    /// Zero-height envelope (degenerate line)
    pub const LINE: (f64, f64, f64, f64) = (0.0, 10.0, 20.0, 10.0);
}

/// CRS definition strings in the formats a raster may carry.
pub mod crs {
    /// WGS84 geographic, easting first
    pub const EPSG_4326: &str = "EPSG:4326";

    /// WGS84 geographic, authority axis order (latitude first)
    pub const URN_4326: &str = "urn:ogc:def:crs:EPSG::4326";

    /// Web Mercator
    pub const EPSG_3857: &str = "EPSG:3857";

    /// WGS84 / UTM zone 33N
    pub const EPSG_32633: &str = "EPSG:32633";

    /// NSIDC Sea Ice Polar Stereographic North
    pub const EPSG_3413: &str = "EPSG:3413";

    /// NAD83 / Conus Albers
    pub const EPSG_5070: &str = "EPSG:5070";

    /// WKT1 for WGS84 / UTM zone 33N
    pub const WKT_32633: &str = r#"PROJCS["WGS 84 / UTM zone 33N",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433],AUTHORITY["EPSG","4326"]],PROJECTION["Transverse_Mercator"],PARAMETER["central_meridian",15],PARAMETER["scale_factor",0.9996],PARAMETER["false_easting",500000],UNIT["metre",1],AUTHORITY["EPSG","32633"]]"#;

    /// Antarctic Polar Stereographic
    pub const EPSG_3031: &str = "EPSG:3031";

    /// NZGD2000 / New Zealand Transverse Mercator, projected from its
    /// PROJ.4 definition
    pub const EPSG_2193: &str = "EPSG:2193";

    /// Inside the EPSG code range but not a defined CRS
    pub const UNDEFINED: &str = "EPSG:1100";

    /// Outside the EPSG code range
    pub const OUT_OF_RANGE: &str = "EPSG:99999";
}

/// GeoKeyDirectory contents for common GeoTIFF layouts.
pub mod geokeys {
    /// Projected WGS84 / UTM zone 33N, pixel-is-area
    pub fn utm_33n() -> Vec<u16> {
        vec![1, 1, 0, 3, 1024, 0, 1, 1, 1025, 0, 1, 1, 3072, 0, 1, 32633]
    }

    /// Geographic WGS84, pixel-is-area
    pub fn wgs84() -> Vec<u16> {
        vec![1, 1, 0, 3, 1024, 0, 1, 2, 1025, 0, 1, 1, 2048, 0, 1, 4326]
    }

    /// Geographic WGS84, pixel-is-point
    pub fn wgs84_pixel_is_point() -> Vec<u16> {
        vec![1, 1, 0, 3, 1024, 0, 1, 2, 1025, 0, 1, 2, 2048, 0, 1, 4326]
    }

    /// Projected, user-defined CRS (no EPSG code)
    pub fn user_defined() -> Vec<u16> {
        vec![1, 1, 0, 2, 1024, 0, 1, 1, 3072, 0, 1, 32767]
    }
}
