//! GeoTIFF raster source backed by the `tiff` crate.
//!
//! Georeferencing is read from the GeoTIFF tags:
//! - ModelPixelScale + ModelTiepoint, or ModelTransformation, give the
//!   pixel to model affine transform
//! - GeoKeyDirectory gives the CRS (ProjectedCSType or GeographicType)
//!   and the raster type (PixelIsArea or PixelIsPoint)
//! - GDAL_NODATA gives the nodata value
//!
//! Pixels are decoded one strip or tile at a time, and only the chunks that
//! hold sampled pixels are read. Pixel-interleaved and band-sequential
//! (PlanarConfiguration 2) layouts are both handled.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use nalgebra::{Matrix3, Point2, Vector2};
use raster_common::{Envelope, GridShape, SamplingStride};
use num_traits::ToPrimitive;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;
use tiff::{TiffError, TiffFormatError};
use tracing::debug;

use crate::error::SourceError;
use crate::source::{BandSamples, RasterOpener, RasterSource};

// GeoKey IDs
const GT_MODEL_TYPE: u16 = 1024;
const GT_RASTER_TYPE: u16 = 1025;
const GEOGRAPHIC_TYPE: u16 = 2048;
const PROJECTED_CS_TYPE: u16 = 3072;

const MODEL_TYPE_PROJECTED: u16 = 1;
const RASTER_PIXEL_IS_POINT: u16 = 2;
const USER_DEFINED: u16 = 32767;

/// Opens GeoTIFF files from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoTiffOpener;

impl RasterOpener for GeoTiffOpener {
    type Source = GeoTiffSource;

    fn open(&self, path: &Path) -> Result<GeoTiffSource, SourceError> {
        GeoTiffSource::open(path)
    }
}

/// An opened GeoTIFF.
pub struct GeoTiffSource {
    decoder: Option<Decoder<BufReader<File>>>,
    shape: GridShape,
    samples_per_pixel: usize,
    layout: ChunkLayout,
    geo_keys: GeoKeys,
    pixel_to_model: Option<Matrix3<f64>>,
    nodata: Option<f64>,
}

impl GeoTiffSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        let mut decoder = Decoder::new(BufReader::new(file))?.with_limits(Limits::unlimited());

        let (width, height) = decoder.dimensions()?;
        let shape = GridShape::new(width as usize, height as usize);

        let samples_per_pixel = decoder.get_tag_u32(Tag::SamplesPerPixel).unwrap_or(1) as usize;
        let planar = decoder
            .get_tag_u32(Tag::PlanarConfiguration)
            .map(|v| v == 2)
            .unwrap_or(false);
        let layout = ChunkLayout::new(shape, decoder.chunk_dimensions(), planar)?;

        let geo_keys = match decoder.get_tag_u16_vec(Tag::GeoKeyDirectoryTag) {
            Ok(directory) => GeoKeys::parse(&directory)?,
            Err(_) => GeoKeys::default(),
        };

        let pixel_to_model = read_affine(&mut decoder)?.map(|affine| {
            if geo_keys.pixel_is_point() {
                // tiepoints refer to pixel centers; shift to the pixel corner
                affine * Matrix3::new_translation(&Vector2::new(-0.5, -0.5))
            } else {
                affine
            }
        });

        let nodata = decoder
            .get_tag_ascii_string(Tag::GdalNodata)
            .ok()
            .and_then(|s| {
                s.trim_matches(|c: char| c == '\0' || c.is_whitespace())
                    .parse()
                    .ok()
            });

        debug!(
            path = %path.display(),
            width,
            height,
            samples_per_pixel,
            chunk_type = ?decoder.get_chunk_type(),
            chunks = layout.across * layout.down,
            planar,
            crs = ?geo_keys.crs_definition(),
            nodata = ?nodata,
            "Opened GeoTIFF"
        );

        Ok(Self {
            decoder: Some(decoder),
            shape,
            samples_per_pixel,
            layout,
            geo_keys,
            pixel_to_model,
            nodata,
        })
    }
}

impl RasterSource for GeoTiffSource {
    fn crs_definition(&self) -> Option<String> {
        self.geo_keys.crs_definition()
    }

    fn envelope(&self) -> Result<Envelope, SourceError> {
        let affine = self.pixel_to_model.ok_or_else(|| {
            SourceError::invalid_georeference(
                "no ModelPixelScale/ModelTiepoint or ModelTransformation tags",
            )
        })?;

        let (w, h) = (self.shape.width as f64, self.shape.height as f64);
        let corners = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];

        let first = affine.transform_point(&Point2::new(0.0, 0.0));
        let mut envelope = Envelope::new(first.x, first.y, first.x, first.y);
        for (col, row) in corners {
            let p = affine.transform_point(&Point2::new(col, row));
            envelope.expand_to_include(p.x, p.y);
        }

        if !envelope.is_finite() {
            return Err(SourceError::invalid_georeference(format!(
                "envelope is not finite: {envelope:?}"
            )));
        }
        Ok(envelope)
    }

    fn grid_shape(&self) -> GridShape {
        self.shape
    }

    fn band_count(&self) -> usize {
        self.samples_per_pixel
    }

    fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    fn read_band(
        &mut self,
        band: usize,
        stride: SamplingStride,
    ) -> Result<BandSamples, SourceError> {
        let spp = self.samples_per_pixel;
        if band >= spp {
            return Err(SourceError::BandOutOfRange { band, count: spp });
        }

        let (shape, layout) = (self.shape, self.layout);
        let decoder = self
            .decoder
            .as_mut()
            .ok_or_else(|| SourceError::unsupported("raster already closed"))?;

        let sampled = stride.sampled_shape(shape);
        let mut values = vec![f64::NAN; sampled.len()];
        let (step_rows, step_cols) = (stride.rows.max(1), stride.cols.max(1));
        let mut decoded = 0usize;

        for chunk_row in 0..layout.down {
            let row0 = chunk_row * layout.chunk_height;
            let row1 = (row0 + layout.chunk_height).min(shape.height);
            if row0.next_multiple_of(step_rows) >= row1 {
                continue;
            }

            for chunk_col in 0..layout.across {
                let col0 = chunk_col * layout.chunk_width;
                let col1 = (col0 + layout.chunk_width).min(shape.width);
                if col0.next_multiple_of(step_cols) >= col1 {
                    continue;
                }

                let index = u32::try_from(layout.index(band, chunk_row, chunk_col))
                    .map_err(|_| SourceError::unsupported("more than u32::MAX chunks"))?;
                let chunk = decoder.read_chunk(index)?;
                decoded += 1;

                let window = ChunkWindow {
                    rows: (row0, row1),
                    cols: (col0, col1),
                    samples_per_pixel: if layout.planar { 1 } else { spp },
                    band_offset: if layout.planar { 0 } else { band },
                };
                window.copy_decoded(&chunk, stride, sampled.width, &mut values)?;
            }
        }

        debug!(band, chunks = decoded, sampled = ?sampled, "Read band");
        BandSamples::new(sampled, values)
    }

    fn close(&mut self) {
        self.decoder = None;
    }
}

/// How pixel data is split into strips or tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChunkLayout {
    chunk_width: usize,
    chunk_height: usize,
    across: usize,
    down: usize,
    /// Band-sequential: each band has its own set of chunks
    planar: bool,
}

impl ChunkLayout {
    fn new(shape: GridShape, chunk: (u32, u32), planar: bool) -> Result<Self, SourceError> {
        let (chunk_width, chunk_height) = (chunk.0 as usize, chunk.1 as usize);
        if chunk_width == 0 || chunk_height == 0 {
            return Err(SourceError::unsupported(format!(
                "chunk size {chunk_width}x{chunk_height}"
            )));
        }
        Ok(Self {
            chunk_width,
            chunk_height,
            across: shape.width.div_ceil(chunk_width),
            down: shape.height.div_ceil(chunk_height),
            planar,
        })
    }

    fn index(&self, band: usize, chunk_row: usize, chunk_col: usize) -> usize {
        let within_band = chunk_row * self.across + chunk_col;
        if self.planar {
            band * self.across * self.down + within_band
        } else {
            within_band
        }
    }
}

/// The image pixels covered by one decoded chunk, with padding excluded.
struct ChunkWindow {
    rows: (usize, usize),
    cols: (usize, usize),
    samples_per_pixel: usize,
    band_offset: usize,
}

impl ChunkWindow {
    fn copy_decoded(
        &self,
        chunk: &DecodingResult,
        stride: SamplingStride,
        sampled_width: usize,
        values: &mut [f64],
    ) -> Result<(), SourceError> {
        match chunk {
            DecodingResult::U8(data) => self.copy(data, stride, sampled_width, values),
            DecodingResult::U16(data) => self.copy(data, stride, sampled_width, values),
            DecodingResult::U32(data) => self.copy(data, stride, sampled_width, values),
            DecodingResult::U64(data) => self.copy(data, stride, sampled_width, values),
            DecodingResult::I8(data) => self.copy(data, stride, sampled_width, values),
            DecodingResult::I16(data) => self.copy(data, stride, sampled_width, values),
            DecodingResult::I32(data) => self.copy(data, stride, sampled_width, values),
            DecodingResult::I64(data) => self.copy(data, stride, sampled_width, values),
            DecodingResult::F32(data) => self.copy(data, stride, sampled_width, values),
            DecodingResult::F64(data) => self.copy(data, stride, sampled_width, values),
            #[allow(unreachable_patterns)]
            _ => Err(SourceError::unsupported("sample format")),
        }
    }

    /// Copy the sampled pixels of this chunk into their subsample slots.
    /// Values that cannot be represented as `f64` become NaN.
    fn copy<T: ToPrimitive>(
        &self,
        data: &[T],
        stride: SamplingStride,
        sampled_width: usize,
        values: &mut [f64],
    ) -> Result<(), SourceError> {
        let (row0, row1) = self.rows;
        let (col0, col1) = self.cols;
        let data_width = col1 - col0;
        if data.len() < (row1 - row0) * data_width * self.samples_per_pixel {
            return Err(
                TiffError::FormatError(TiffFormatError::InconsistentSizesEncountered).into(),
            );
        }

        let (step_rows, step_cols) = (stride.rows.max(1), stride.cols.max(1));
        for row in (row0.next_multiple_of(step_rows)..row1).step_by(step_rows) {
            for col in (col0.next_multiple_of(step_cols)..col1).step_by(step_cols) {
                let src = ((row - row0) * data_width + col - col0) * self.samples_per_pixel
                    + self.band_offset;
                let dst = (row / step_rows) * sampled_width + col / step_cols;
                values[dst] = data[src].to_f64().unwrap_or(f64::NAN);
            }
        }
        Ok(())
    }
}

/// Pixel (col, row) to model (x, y) affine from the GeoTIFF model tags.
fn read_affine(
    decoder: &mut Decoder<BufReader<File>>,
) -> Result<Option<Matrix3<f64>>, SourceError> {
    if let Ok(m) = decoder.get_tag_f64_vec(Tag::ModelTransformationTag) {
        return affine_from_transformation(&m).map(Some);
    }

    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok();
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).ok();
    match (scale, tiepoint) {
        (Some(scale), Some(tiepoint)) => affine_from_tiepoint(&scale, &tiepoint).map(Some),
        _ => Ok(None),
    }
}

fn affine_from_transformation(m: &[f64]) -> Result<Matrix3<f64>, SourceError> {
    if m.len() < 16 {
        return Err(SourceError::invalid_georeference(format!(
            "ModelTransformation has {} values, expected 16",
            m.len()
        )));
    }
    Ok(Matrix3::new(m[0], m[1], m[3], m[4], m[5], m[7], 0.0, 0.0, 1.0))
}

fn affine_from_tiepoint(scale: &[f64], tiepoint: &[f64]) -> Result<Matrix3<f64>, SourceError> {
    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(SourceError::invalid_georeference(format!(
            "ModelPixelScale has {} values and ModelTiepoint {}, expected 3 and 6",
            scale.len(),
            tiepoint.len()
        )));
    }
    let (sx, sy) = (scale[0], scale[1]);
    if sx == 0.0 || sy == 0.0 {
        return Err(SourceError::invalid_georeference("zero pixel scale"));
    }
    let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
    Ok(Matrix3::new(
        sx,
        0.0,
        x - i * sx,
        0.0,
        -sy,
        y + j * sy,
        0.0,
        0.0,
        1.0,
    ))
}

/// The GeoKeys that matter for CRS and pixel registration.
#[derive(Debug, Clone, Default, PartialEq)]
struct GeoKeys {
    model_type: Option<u16>,
    raster_type: Option<u16>,
    geographic_type: Option<u16>,
    projected_type: Option<u16>,
}

impl GeoKeys {
    /// Parse a GeoKeyDirectory: a 4-value header, then one
    /// `[key, location, count, value]` entry per key. Only keys stored
    /// inline (location 0) are read.
    fn parse(directory: &[u16]) -> Result<Self, SourceError> {
        if directory.len() < 4 {
            return Err(SourceError::invalid_georeference("GeoKeyDirectory header truncated"));
        }
        let count = directory[3] as usize;
        let entries = &directory[4..];
        if entries.len() < count * 4 {
            return Err(SourceError::invalid_georeference(format!(
                "GeoKeyDirectory declares {count} keys but holds {}",
                entries.len() / 4
            )));
        }

        let mut keys = GeoKeys::default();
        for entry in entries.chunks_exact(4).take(count) {
            let (id, location, value) = (entry[0], entry[1], entry[3]);
            if location != 0 {
                continue;
            }
            match id {
                GT_MODEL_TYPE => keys.model_type = Some(value),
                GT_RASTER_TYPE => keys.raster_type = Some(value),
                GEOGRAPHIC_TYPE => keys.geographic_type = Some(value),
                PROJECTED_CS_TYPE => keys.projected_type = Some(value),
                _ => {}
            }
        }
        Ok(keys)
    }

    fn pixel_is_point(&self) -> bool {
        self.raster_type == Some(RASTER_PIXEL_IS_POINT)
    }

    /// `EPSG:n` for the declared CRS; user-defined systems count as none.
    fn crs_definition(&self) -> Option<String> {
        let code = if self.model_type == Some(MODEL_TYPE_PROJECTED) || self.projected_type.is_some()
        {
            self.projected_type
        } else {
            self.geographic_type
        }?;

        match code {
            0 | USER_DEFINED => None,
            code => Some(format!("EPSG:{code}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory(keys: &[(u16, u16)]) -> Vec<u16> {
        let mut dir = vec![1, 1, 0, keys.len() as u16];
        for &(id, value) in keys {
            dir.extend_from_slice(&[id, 0, 1, value]);
        }
        dir
    }

    #[test]
    fn test_strip_layout_indexing() {
        let shape = GridShape::new(10, 25);
        let chunky = ChunkLayout::new(shape, (10, 8), false).unwrap();
        assert_eq!((chunky.across, chunky.down), (1, 4));
        assert_eq!(chunky.index(2, 3, 0), 3);

        let planar = ChunkLayout::new(shape, (10, 8), true).unwrap();
        assert_eq!(planar.index(0, 1, 0), 1);
        assert_eq!(planar.index(2, 1, 0), 9);
    }

    #[test]
    fn test_tile_layout_indexing() {
        let planar = ChunkLayout::new(GridShape::new(40, 20), (16, 16), true).unwrap();
        assert_eq!((planar.across, planar.down), (3, 2));
        assert_eq!(planar.index(1, 1, 2), 6 + 5);
        assert!(ChunkLayout::new(GridShape::new(4, 4), (0, 4), false).is_err());
    }

    #[test]
    fn test_window_copies_sampled_pixels_of_one_band() {
        // 2 rows x 3 cols, two interleaved bands, starting at image row 4
        let data: Vec<u8> = vec![1, 10, 2, 20, 3, 30, 4, 40, 5, 50, 6, 60];
        let window = ChunkWindow {
            rows: (4, 6),
            cols: (0, 3),
            samples_per_pixel: 2,
            band_offset: 1,
        };
        let stride = SamplingStride::new(2, 2);
        let mut values = vec![f64::NAN; 6];
        window
            .copy_decoded(&DecodingResult::U8(data), stride, 2, &mut values)
            .unwrap();
        // Only row 4, cols 0 and 2 are sampled; they land in subsample row 2
        assert_eq!(&values[4..], &[10.0, 30.0]);
        assert!(values[..4].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_window_rejects_short_chunk() {
        let window = ChunkWindow {
            rows: (0, 2),
            cols: (0, 2),
            samples_per_pixel: 1,
            band_offset: 0,
        };
        let mut values = vec![0.0; 4];
        let err = window
            .copy_decoded(
                &DecodingResult::F32(vec![1.0; 3]),
                SamplingStride::exhaustive(),
                2,
                &mut values,
            )
            .unwrap_err();
        assert!(matches!(err, SourceError::Tiff(_)));
    }

    #[test]
    fn test_geokeys_projected() {
        let keys = GeoKeys::parse(&directory(&[
            (GT_MODEL_TYPE, 1),
            (GT_RASTER_TYPE, 1),
            (PROJECTED_CS_TYPE, 32633),
        ]))
        .unwrap();
        assert_eq!(keys.crs_definition(), Some("EPSG:32633".to_string()));
        assert!(!keys.pixel_is_point());
    }

    #[test]
    fn test_geokeys_geographic_point() {
        let keys = GeoKeys::parse(&directory(&[
            (GT_MODEL_TYPE, 2),
            (GT_RASTER_TYPE, 2),
            (GEOGRAPHIC_TYPE, 4326),
        ]))
        .unwrap();
        assert_eq!(keys.crs_definition(), Some("EPSG:4326".to_string()));
        assert!(keys.pixel_is_point());
    }

    #[test]
    fn test_geokeys_user_defined_is_none() {
        let keys =
            GeoKeys::parse(&directory(&[(GT_MODEL_TYPE, 1), (PROJECTED_CS_TYPE, USER_DEFINED)]))
                .unwrap();
        assert_eq!(keys.crs_definition(), None);
        assert_eq!(GeoKeys::default().crs_definition(), None);
    }

    #[test]
    fn test_geokeys_truncated() {
        assert!(GeoKeys::parse(&[1, 1]).is_err());
        assert!(GeoKeys::parse(&[1, 1, 0, 2, 1024, 0, 1, 1]).is_err());
    }

    #[test]
    fn test_tiepoint_affine() {
        let affine =
            affine_from_tiepoint(&[100.0, 100.0, 0.0], &[0.0, 0.0, 0.0, -1000.0, 4_010_000.0, 0.0])
                .unwrap();
        let ll = affine.transform_point(&Point2::new(0.0, 100.0));
        let ur = affine.transform_point(&Point2::new(100.0, 0.0));
        assert_eq!((ll.x, ll.y), (-1000.0, 4_000_000.0));
        assert_eq!((ur.x, ur.y), (9000.0, 4_010_000.0));
    }

    #[test]
    fn test_transformation_affine() {
        let mut m = [0.0; 16];
        m[0] = 2.0;
        m[3] = 10.0;
        m[5] = -2.0;
        m[7] = 50.0;
        m[15] = 1.0;
        let affine = affine_from_transformation(&m).unwrap();
        let p = affine.transform_point(&Point2::new(5.0, 5.0));
        assert_eq!((p.x, p.y), (20.0, 40.0));
        assert!(affine_from_transformation(&m[..6]).is_err());
    }

    #[test]
    fn test_zero_scale_rejected() {
        assert!(affine_from_tiepoint(&[0.0, 1.0, 0.0], &[0.0; 6]).is_err());
    }
}
