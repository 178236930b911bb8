//! Native CRS resolution.

use raster_common::Crs;
use tracing::debug;

use crate::error::CrsResolutionError;
use crate::source::RasterSource;

/// Determines the native CRS of a raster.
pub struct CoordinateSystemResolver;

impl CoordinateSystemResolver {
    /// Resolve the CRS a source declares.
    pub fn resolve<S: RasterSource + ?Sized>(source: &S) -> Result<Crs, CrsResolutionError> {
        Self::resolve_definition(source.crs_definition().as_deref())
    }

    /// Resolve a CRS from an optional definition string.
    pub fn resolve_definition(definition: Option<&str>) -> Result<Crs, CrsResolutionError> {
        let definition = match definition {
            Some(def) if !def.trim().is_empty() => def,
            _ => return Err(CrsResolutionError::Missing),
        };

        let crs = Crs::parse(definition).map_err(|cause| CrsResolutionError::Invalid {
            definition: definition.to_string(),
            cause,
        })?;

        debug!(
            definition = %definition,
            crs = %crs.identifier(),
            axis_order = ?crs.axis_order,
            "Resolved CRS"
        );
        Ok(crs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raster_common::{AxisOrder, CrsCode, CrsParseError};

    #[test]
    fn test_missing_definition() {
        assert_eq!(
            CoordinateSystemResolver::resolve_definition(None),
            Err(CrsResolutionError::Missing)
        );
        assert_eq!(
            CoordinateSystemResolver::resolve_definition(Some("  ")),
            Err(CrsResolutionError::Missing)
        );
    }

    #[test]
    fn test_epsg_definition() {
        let crs = CoordinateSystemResolver::resolve_definition(Some("EPSG:32633")).unwrap();
        assert_eq!(
            crs.code,
            CrsCode::UtmWgs84 {
                zone: 33,
                north: true
            }
        );
        assert_eq!(crs.identifier(), "EPSG:32633");
    }

    #[test]
    fn test_urn_definition_uses_authority_axis_order() {
        let crs =
            CoordinateSystemResolver::resolve_definition(Some("urn:ogc:def:crs:EPSG::4326"))
                .unwrap();
        assert_eq!(crs.axis_order, AxisOrder::LatLon);
    }

    #[test]
    fn test_code_without_builtin_projection_resolves() {
        let crs = CoordinateSystemResolver::resolve_definition(Some("EPSG:2193")).unwrap();
        assert_eq!(crs.code, CrsCode::Epsg(2193));
        assert_eq!(crs.identifier(), "EPSG:2193");
    }

    #[test]
    fn test_out_of_range_code_is_invalid() {
        let err = CoordinateSystemResolver::resolve_definition(Some("EPSG:99999")).unwrap_err();
        match err {
            CrsResolutionError::Invalid { definition, cause } => {
                assert_eq!(definition, "EPSG:99999");
                assert_eq!(cause, CrsParseError::CodeOutOfRange(99999));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
