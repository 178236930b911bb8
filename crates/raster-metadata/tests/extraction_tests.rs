//! Integration tests for the extraction pipeline using counting test doubles.

use std::path::Path;

use raster_metadata::{
    CrsResolutionError, EmptyExtremaPolicy, Envelope, ExtractionStage, ExtractorConfig,
    ExtremaOrigin, GridShape, MetadataError, RasterMetadataExtractor, ReprojectionError,
    SamplingStride,
};
use test_utils::{
    assert_approx_eq, create_constant_grid, create_grid_with_values, create_test_grid, crs,
    envelope, FakeOpener, FakeRaster,
};

fn env((min_x, min_y, max_x, max_y): (f64, f64, f64, f64)) -> Envelope {
    Envelope::new(min_x, min_y, max_x, max_y)
}

fn extractor(raster: FakeRaster) -> RasterMetadataExtractor<FakeOpener> {
    RasterMetadataExtractor::new(FakeOpener::new(raster), ExtractorConfig::default())
}

fn projected_raster() -> FakeRaster {
    FakeRaster::new(
        Some(crs::EPSG_32633),
        env(envelope::PROJECTED_10KM),
        GridShape::new(100, 100),
    )
    .with_band(create_test_grid(100, 100))
}

// ============================================================================
// Successful extraction
// ============================================================================

#[test]
fn test_projected_pixel_size_scenario() {
    let metadata = extractor(projected_raster())
        .extract(Path::new("utm.tif"))
        .unwrap();

    assert_eq!(metadata.pixel_size_x(), 100.0);
    assert_eq!(metadata.pixel_size_y(), 100.0);
    assert_eq!(metadata.crs_identifier(), Some("EPSG:32633"));
    assert_eq!(metadata.source_path(), Path::new("utm.tif"));
    assert_eq!(metadata.sample_dimension_count(), 1);
}

#[test]
fn test_pixel_size_times_grid_is_native_extent() {
    let native = env(envelope::UTM_33N);
    for (width, height) in [(1, 1), (7, 3), (333, 1000)] {
        let raster = FakeRaster::new(Some(crs::EPSG_32633), native, GridShape::new(width, height));
        let metadata = extractor(raster).extract(Path::new("a.tif")).unwrap();
        assert_approx_eq!(metadata.pixel_size_x() * width as f64, native.width(), 1e-6);
        assert_approx_eq!(metadata.pixel_size_y() * height as f64, native.height(), 1e-6);
    }
}

#[test]
fn test_footprint_is_closed_ring() {
    let cases = [
        (crs::EPSG_4326, envelope::EUROPE_LON_LAT),
        (crs::URN_4326, envelope::EUROPE_LAT_LON),
        (crs::EPSG_32633, envelope::UTM_33N),
        (crs::EPSG_3857, (-1_000_000.0, 5_000_000.0, 1_000_000.0, 6_000_000.0)),
        (crs::EPSG_3413, envelope::ARCTIC_3413),
        (crs::EPSG_3031, envelope::ANTARCTIC_3031),
        (crs::EPSG_2193, envelope::NZTM_WAIKATO),
        (crs::EPSG_5070, envelope::CONUS_ALBERS),
        (crs::WKT_32633, envelope::UTM_33N),
    ];

    for (definition, native) in cases {
        let raster = FakeRaster::new(Some(definition), env(native), GridShape::new(10, 10));
        let metadata = extractor(raster)
            .extract(Path::new("a.tif"))
            .unwrap_or_else(|e| panic!("{definition}: {e}"));

        let footprint = metadata.geographic_footprint();
        let vertices = footprint.vertices();
        assert!(vertices.len() >= 5, "{definition}: {} vertices", vertices.len());
        assert_eq!(vertices.first(), vertices.last());
        assert!(footprint.signed_area() > 0.0, "{definition}: not counter-clockwise");
    }
}

#[test]
fn test_lat_lon_axis_order() {
    let raster = FakeRaster::new(
        Some(crs::URN_4326),
        env(envelope::EUROPE_LAT_LON),
        GridShape::new(300, 50),
    );
    let metadata = extractor(raster).extract(Path::new("a.tif")).unwrap();

    assert_eq!(
        metadata.geographic_footprint().bounds(),
        env(envelope::EUROPE_LON_LAT)
    );
    assert_approx_eq!(metadata.pixel_size_x(), 0.05, 1e-12);
    assert_approx_eq!(metadata.pixel_size_y(), 0.1, 1e-12);
}

#[test]
fn test_geographic_reprojection_is_idempotent() {
    let first = extractor(FakeRaster::new(
        Some(crs::EPSG_4326),
        env(envelope::EUROPE_LON_LAT),
        GridShape::new(10, 10),
    ))
    .extract(Path::new("a.tif"))
    .unwrap();

    // Feed the footprint bounds back through as a new geographic raster
    let bounds = first.geographic_footprint().bounds();
    let second = extractor(FakeRaster::new(Some(crs::EPSG_4326), bounds, GridShape::new(10, 10)))
        .extract(Path::new("b.tif"))
        .unwrap();

    let a = first.geographic_footprint().vertices();
    let b = second.geographic_footprint().vertices();
    assert_eq!(a.len(), b.len());
    for (p, q) in a.iter().zip(b) {
        assert_approx_eq!(p.lon, q.lon, 1e-12);
        assert_approx_eq!(p.lat, q.lat, 1e-12);
    }
}

#[test]
fn test_densified_footprint() {
    let config = ExtractorConfig {
        densify_points: 8,
        ..Default::default()
    };
    let extractor = RasterMetadataExtractor::new(FakeOpener::new(projected_raster()), config);
    let metadata = extractor.extract(Path::new("utm.tif")).unwrap();
    assert_eq!(metadata.geographic_footprint().vertices().len(), 4 * 9 + 1);
}

#[test]
fn test_degenerate_envelope_still_extracts() {
    let raster = FakeRaster::new(Some(crs::EPSG_4326), env(envelope::LINE), GridShape::new(10, 1));
    let metadata = extractor(raster).extract(Path::new("a.tif")).unwrap();

    let footprint = metadata.geographic_footprint();
    assert!(footprint.is_degenerate());
    assert!(footprint.is_closed());
    assert_eq!(metadata.pixel_size_y(), 0.0);
}

#[test]
fn test_point_envelope_gives_closed_ring() {
    let raster = FakeRaster::new(Some(crs::EPSG_4326), env(envelope::POINT), GridShape::new(1, 1));
    let metadata = extractor(raster).extract(Path::new("a.tif")).unwrap();

    let footprint = metadata.geographic_footprint();
    assert_eq!(footprint.vertices().len(), 5);
    assert!(footprint.is_closed());
    assert!(footprint.is_degenerate());
    assert_eq!(metadata.pixel_size_x(), 0.0);
}

#[test]
fn test_pole_in_envelope_gives_polar_cap() {
    let raster = FakeRaster::new(
        Some(crs::EPSG_3031),
        env(envelope::ANTARCTIC_3031),
        GridShape::new(600, 600),
    );
    let metadata = extractor(raster).extract(Path::new("antarctica.tif")).unwrap();

    let footprint = metadata.geographic_footprint();
    let bounds = footprint.bounds();
    assert_eq!((bounds.min_x, bounds.max_x), (-180.0, 180.0));
    assert_eq!(bounds.min_y, -90.0);
    // the envelope corners are the vertices closest to the equator
    assert!(bounds.max_y > -54.0 && bounds.max_y < -50.0, "{bounds:?}");
    assert!(!footprint.is_degenerate());
    assert!(footprint.is_closed());
    assert_eq!(metadata.pixel_size_x(), 10_000.0);
}

#[test]
fn test_extract_layer_labels_metadata() {
    let labelled = extractor(projected_raster())
        .extract_layer(Path::new("utm.tif"), "elevation")
        .unwrap();
    assert_eq!(labelled.layer, "elevation");
    assert_eq!(labelled.metadata.pixel_size_x(), 100.0);
}

// ============================================================================
// Extrema
// ============================================================================

#[test]
fn test_extrema_min_le_max() {
    let metadata = extractor(projected_raster())
        .extract(Path::new("utm.tif"))
        .unwrap();

    // stride 10: columns 0..=90, rows 0..=90
    assert_eq!(metadata.min_value(), 0.0);
    assert_eq!(metadata.max_value(), 90_090.0);
    assert!(metadata.min_value() <= metadata.max_value());
    assert_eq!(metadata.extrema_origin(), ExtremaOrigin::Sampled);
    assert_eq!(metadata.sampling_stride(), SamplingStride::uniform(10));
}

#[test]
fn test_sampling_can_miss_off_grid_extremes() {
    // spike at (5, 5) sits between sampled pixels at stride 10
    let raster = FakeRaster::new(
        Some(crs::EPSG_4326),
        env(envelope::EUROPE_LON_LAT),
        GridShape::new(20, 20),
    )
    .with_band(create_grid_with_values(20, 20, &[(5, 5)], 500.0));

    let sampled = extractor(raster.clone()).extract(Path::new("a.tif")).unwrap();
    assert_eq!(sampled.max_value(), 0.0);

    let exhaustive = RasterMetadataExtractor::new(
        FakeOpener::new(raster),
        ExtractorConfig {
            stride: SamplingStride::exhaustive(),
            ..Default::default()
        },
    )
    .extract(Path::new("a.tif"))
    .unwrap();
    assert_eq!(exhaustive.max_value(), 500.0);
}

#[test]
fn test_extrema_reduced_across_bands() {
    let raster = FakeRaster::new(
        Some(crs::EPSG_4326),
        env(envelope::EUROPE_LON_LAT),
        GridShape::new(4, 4),
    )
    .with_band(create_constant_grid(4, 4, 10.0))
    .with_band(create_constant_grid(4, 4, -3.0))
    .with_band(create_constant_grid(4, 4, 42.0));

    let metadata = extractor(raster).extract(Path::new("a.tif")).unwrap();
    assert_eq!(metadata.sample_dimension_count(), 3);
    assert_eq!(metadata.min_value(), -3.0);
    assert_eq!(metadata.max_value(), 42.0);
}

#[test]
fn test_zero_bands_uses_default_extrema() {
    let raster = FakeRaster::new(
        Some(crs::EPSG_32633),
        env(envelope::PROJECTED_10KM),
        GridShape::new(100, 100),
    );
    let metadata = extractor(raster).extract(Path::new("a.tif")).unwrap();

    assert_eq!(metadata.sample_dimension_count(), 0);
    assert_eq!(metadata.min_value(), 0.0);
    assert_eq!(metadata.max_value(), 100.0);
    assert_eq!(metadata.extrema_origin(), ExtremaOrigin::Default);
}

#[test]
fn test_all_nodata_uses_default_extrema() {
    let raster = FakeRaster::new(
        Some(crs::EPSG_4326),
        env(envelope::EUROPE_LON_LAT),
        GridShape::new(4, 4),
    )
    .with_band(create_constant_grid(4, 4, -9999.0))
    .with_nodata(-9999.0);

    let metadata = extractor(raster).extract(Path::new("a.tif")).unwrap();
    assert_eq!(metadata.sample_dimension_count(), 1);
    assert_eq!((metadata.min_value(), metadata.max_value()), (0.0, 100.0));
}

#[test]
fn test_empty_extrema_fail_policy() {
    let raster = FakeRaster::new(
        Some(crs::EPSG_4326),
        env(envelope::EUROPE_LON_LAT),
        GridShape::new(4, 4),
    );
    let opener = FakeOpener::new(raster);
    let counters = opener.counters();
    let extractor = RasterMetadataExtractor::new(
        opener,
        ExtractorConfig {
            empty_extrema: EmptyExtremaPolicy::Fail,
            ..Default::default()
        },
    );

    let err = extractor.extract(Path::new("a.tif")).unwrap_err();
    assert_eq!(err.stage, ExtractionStage::ScanExtrema);
    assert!(matches!(err.cause, MetadataError::EmptyExtrema { bands: 0 }));
    assert_eq!(counters.closes(), 1);
}

// ============================================================================
// Failures and resource release
// ============================================================================

#[test]
fn test_open_failure() {
    let opener = FakeOpener::failing(projected_raster());
    let counters = opener.counters();
    let err = RasterMetadataExtractor::new(opener, ExtractorConfig::default())
        .extract(Path::new("missing.tif"))
        .unwrap_err();

    assert_eq!(err.stage, ExtractionStage::Open);
    assert!(matches!(err.cause, MetadataError::ResourceOpen(_)));
    assert_eq!(err.path, Path::new("missing.tif"));
    // nothing was opened, so nothing is released
    assert_eq!(counters.closes(), 0);
}

#[test]
fn test_missing_crs_never_reads_envelope() {
    let raster = FakeRaster::new(None, env(envelope::PROJECTED_10KM), GridShape::new(100, 100));
    let opener = FakeOpener::new(raster);
    let counters = opener.counters();

    let err = RasterMetadataExtractor::new(opener, ExtractorConfig::default())
        .extract(Path::new("a.tif"))
        .unwrap_err();

    assert_eq!(err.stage, ExtractionStage::ResolveCrs);
    assert!(matches!(
        err.cause,
        MetadataError::UnresolvedCrs(CrsResolutionError::Missing)
    ));
    assert_eq!(counters.envelope_reads(), 0);
    assert_eq!(counters.band_reads(), 0);
    assert_eq!(counters.closes(), 1);
}

#[test]
fn test_out_of_range_code_is_unresolved() {
    let raster = FakeRaster::new(
        Some(crs::OUT_OF_RANGE),
        env(envelope::PROJECTED_10KM),
        GridShape::new(10, 10),
    );
    let err = extractor(raster).extract(Path::new("a.tif")).unwrap_err();
    assert_eq!(err.stage, ExtractionStage::ResolveCrs);
    assert!(matches!(
        err.cause,
        MetadataError::UnresolvedCrs(CrsResolutionError::Invalid { .. })
    ));
}

#[test]
fn test_database_crs_is_reprojected() {
    let raster = FakeRaster::new(
        Some(crs::EPSG_2193),
        env(envelope::NZTM_WAIKATO),
        GridShape::new(100, 100),
    );
    let metadata = extractor(raster).extract(Path::new("nz.tif")).unwrap();

    assert_eq!(metadata.crs_identifier(), Some("EPSG:2193"));
    let bounds = metadata.geographic_footprint().bounds();
    assert!(bounds.min_x > 174.0 && bounds.max_x < 177.0, "{bounds:?}");
    assert!(bounds.min_y > -39.0 && bounds.max_y < -36.0, "{bounds:?}");
    assert_eq!(metadata.pixel_size_x(), 1000.0);
}

#[test]
fn test_undefined_code_has_no_transform_path() {
    let raster = FakeRaster::new(
        Some(crs::UNDEFINED),
        env(envelope::PROJECTED_10KM),
        GridShape::new(10, 10),
    );
    let opener = FakeOpener::new(raster);
    let counters = opener.counters();

    let err = RasterMetadataExtractor::new(opener, ExtractorConfig::default())
        .extract(Path::new("a.tif"))
        .unwrap_err();

    assert_eq!(err.stage, ExtractionStage::Reproject);
    match err.cause {
        MetadataError::Reprojection { crs, cause } => {
            assert_eq!(crs, "EPSG:1100");
            assert!(matches!(cause, ReprojectionError::NoTransformPath(_)));
        }
        other => panic!("unexpected cause {other:?}"),
    }
    assert_eq!(counters.band_reads(), 0);
    assert_eq!(counters.closes(), 1);
}

#[test]
fn test_reprojection_failure() {
    let raster = FakeRaster::new(
        Some(crs::EPSG_32633),
        Envelope::new(0.0, 0.0, 1.0e9, 1.0e9),
        GridShape::new(10, 10),
    );
    let opener = FakeOpener::new(raster);
    let counters = opener.counters();

    let err = RasterMetadataExtractor::new(opener, ExtractorConfig::default())
        .extract(Path::new("a.tif"))
        .unwrap_err();

    assert_eq!(err.stage, ExtractionStage::Reproject);
    match err.cause {
        MetadataError::Reprojection { crs, cause } => {
            assert_eq!(crs, "EPSG:32633");
            assert!(matches!(cause, ReprojectionError::Vertex { .. }));
        }
        other => panic!("unexpected cause {other:?}"),
    }
    assert_eq!(counters.band_reads(), 0);
    assert_eq!(counters.closes(), 1);
}

#[test]
fn test_geographic_out_of_range_fails() {
    let raster = FakeRaster::new(
        Some(crs::EPSG_4326),
        Envelope::new(0.0, 0.0, 10.0, 95.0),
        GridShape::new(10, 10),
    );
    let err = extractor(raster).extract(Path::new("a.tif")).unwrap_err();
    assert_eq!(err.stage, ExtractionStage::Reproject);
}

#[test]
fn test_degenerate_grid() {
    let raster = FakeRaster::new(
        Some(crs::EPSG_32633),
        env(envelope::PROJECTED_10KM),
        GridShape::new(0, 100),
    );
    let err = extractor(raster).extract(Path::new("a.tif")).unwrap_err();
    assert_eq!(err.stage, ExtractionStage::MeasureGrid);
    assert!(matches!(
        err.cause,
        MetadataError::DegenerateGrid {
            width: 0,
            height: 100
        }
    ));
}

#[test]
fn test_release_exactly_once_for_every_stage() {
    let base = || {
        FakeRaster::new(
            Some(crs::EPSG_32633),
            env(envelope::PROJECTED_10KM),
            GridShape::new(100, 100),
        )
    };

    let cases: Vec<(FakeRaster, Option<ExtractionStage>)> = vec![
        (base().with_band(create_test_grid(100, 100)), None),
        (
            FakeRaster::new(None, env(envelope::PROJECTED_10KM), GridShape::new(100, 100)),
            Some(ExtractionStage::ResolveCrs),
        ),
        (base().failing_envelope(), Some(ExtractionStage::BuildEnvelope)),
        (
            FakeRaster::new(
                Some(crs::EPSG_32633),
                Envelope::new(0.0, 0.0, 1.0e9, 1.0e9),
                GridShape::new(1, 1),
            ),
            Some(ExtractionStage::Reproject),
        ),
        (
            FakeRaster::new(
                Some(crs::EPSG_32633),
                env(envelope::PROJECTED_10KM),
                GridShape::new(100, 0),
            ),
            Some(ExtractionStage::MeasureGrid),
        ),
        (
            base().with_band(create_test_grid(100, 100)).failing_reads(),
            Some(ExtractionStage::ScanExtrema),
        ),
    ];

    for (raster, expected) in cases {
        let opener = FakeOpener::new(raster);
        let counters = opener.counters();
        let result = RasterMetadataExtractor::new(opener, ExtractorConfig::default())
            .extract(Path::new("a.tif"));

        match expected {
            None => assert!(result.is_ok()),
            Some(stage) => assert_eq!(result.unwrap_err().stage, stage),
        }
        assert_eq!(counters.opens(), 1);
        assert_eq!(counters.closes(), 1, "stage {expected:?}");
    }
}

#[test]
fn test_read_failure_is_resource_read() {
    let raster = projected_raster().failing_reads();
    let err = extractor(raster).extract(Path::new("a.tif")).unwrap_err();
    assert!(matches!(err.cause, MetadataError::ResourceRead(_)));
    assert!(err.to_string().contains("scan_extrema"));
}
