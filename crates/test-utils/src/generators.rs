//! Test data generators for synthetic rasters.
//!
//! These generators create predictable, verifiable data patterns and write
//! them to GeoTIFF files that can be used across the test suite.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tiff::encoder::colortype::{Gray32Float, Gray8, RGB8};
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;
use tiff::TiffResult;

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify sampled extrema: with a stride of `n` the
/// largest sampled value sits at the last sampled column and row.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], 0.0);   // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[1], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f64);
        }
    }
    data
}

/// Creates a grid filled with a constant value.
pub fn create_constant_grid(width: usize, height: usize, value: f64) -> Vec<f64> {
    vec![value; width * height]
}

/// Creates a grid with `value` at specified positions and zeros elsewhere.
///
/// Useful for placing a spike on or between sampled pixels.
///
/// # Arguments
///
/// * `width` - Number of columns
/// * `height` - Number of rows
/// * `positions` - List of (col, row) positions that get `value`
pub fn create_grid_with_values(
    width: usize,
    height: usize,
    positions: &[(usize, usize)],
    value: f64,
) -> Vec<f64> {
    let mut data = vec![0.0; width * height];
    for &(col, row) in positions {
        if col < width && row < height {
            data[row * width + col] = value;
        }
    }
    data
}

/// Pixel data of a synthetic GeoTIFF.
#[derive(Debug, Clone)]
pub enum GeoTiffPixels {
    /// Single band, 32-bit float
    Float32(Vec<f32>),
    /// Single band, 8-bit unsigned
    Gray8(Vec<u8>),
    /// Three interleaved 8-bit bands
    Rgb8(Vec<u8>),
    /// Three band-sequential 8-bit bands: every red sample, then green, then
    /// blue. Each band starts on a strip boundary, so `rows_per_strip` must
    /// divide the height.
    PlanarRgb8(Vec<u8>),
}

/// A synthetic GeoTIFF to be written by [`write_geotiff`].
#[derive(Debug, Clone)]
pub struct GeoTiffFixture {
    pub width: u32,
    pub height: u32,
    pub pixels: GeoTiffPixels,
    /// ModelPixelScale (sx, sy, sz)
    pub pixel_scale: Option<[f64; 3]>,
    /// ModelTiepoint (i, j, k, x, y, z)
    pub tiepoint: Option<[f64; 6]>,
    /// ModelTransformation, row-major 4x4
    pub transformation: Option<[f64; 16]>,
    /// GeoKeyDirectory contents
    pub geokeys: Option<Vec<u16>>,
    /// GDAL_NODATA text
    pub nodata: Option<String>,
    /// Strip height (default: the encoder's choice)
    pub rows_per_strip: Option<u32>,
}

impl GeoTiffFixture {
    /// A single-band float raster whose upper-left pixel corner sits at
    /// (`origin_x`, `origin_y`) with square pixels of `pixel_size`.
    pub fn float32(
        width: u32,
        height: u32,
        data: Vec<f32>,
        origin_x: f64,
        origin_y: f64,
        pixel_size: f64,
        geokeys: Vec<u16>,
    ) -> Self {
        Self {
            width,
            height,
            pixels: GeoTiffPixels::Float32(data),
            pixel_scale: Some([pixel_size, pixel_size, 0.0]),
            tiepoint: Some([0.0, 0.0, 0.0, origin_x, origin_y, 0.0]),
            transformation: None,
            geokeys: Some(geokeys),
            nodata: None,
            rows_per_strip: None,
        }
    }
}

/// Write `fixture` as a GeoTIFF at `path`.
pub fn write_geotiff(path: &Path, fixture: &GeoTiffFixture) -> TiffResult<()> {
    let file = BufWriter::new(File::create(path)?);
    let mut encoder = TiffEncoder::new(file)?;
    let (w, h) = (fixture.width, fixture.height);

    macro_rules! write_image {
        ($color:ty, $data:expr) => {
            write_image!($color, h, $data, false)
        };
        ($color:ty, $rows:expr, $data:expr, $planar:expr) => {{
            let mut image = encoder.new_image::<$color>(w, $rows)?;
            if let Some(rows) = fixture.rows_per_strip {
                image.rows_per_strip(rows)?;
            } else if $planar {
                image.rows_per_strip(h)?;
            }
            {
                let dir = image.encoder();
                if let Some(scale) = &fixture.pixel_scale {
                    dir.write_tag(Tag::ModelPixelScaleTag, &scale[..])?;
                }
                if let Some(tiepoint) = &fixture.tiepoint {
                    dir.write_tag(Tag::ModelTiepointTag, &tiepoint[..])?;
                }
                if let Some(m) = &fixture.transformation {
                    dir.write_tag(Tag::ModelTransformationTag, &m[..])?;
                }
                if let Some(keys) = &fixture.geokeys {
                    dir.write_tag(Tag::GeoKeyDirectoryTag, keys.as_slice())?;
                }
                if let Some(nodata) = &fixture.nodata {
                    dir.write_tag(Tag::GdalNodata, nodata.as_str())?;
                }
                if $planar {
                    // Written as one tall gray image, then relabelled
                    dir.write_tag(Tag::ImageLength, h)?;
                    dir.write_tag(Tag::SamplesPerPixel, 3u16)?;
                    dir.write_tag(Tag::BitsPerSample, &[8u16, 8, 8][..])?;
                    dir.write_tag(Tag::SampleFormat, &[1u16, 1, 1][..])?;
                    dir.write_tag(Tag::PhotometricInterpretation, 2u16)?;
                    dir.write_tag(Tag::PlanarConfiguration, 2u16)?;
                }
            }
            image.write_data($data)?;
        }};
    }

    match &fixture.pixels {
        GeoTiffPixels::Float32(data) => write_image!(Gray32Float, data),
        GeoTiffPixels::Gray8(data) => write_image!(Gray8, data),
        GeoTiffPixels::Rgb8(data) => write_image!(RGB8, data),
        GeoTiffPixels::PlanarRgb8(data) => write_image!(Gray8, h * 3, data, true),
    }
    Ok(())
}
