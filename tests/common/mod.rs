//! Synthetic GeoTIFF fixtures shared by the integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rasterpatch::compression::AdobeDeflateHandler;
use rasterpatch::raster::{GeoTransform, SampleType};
use rasterpatch::tiff::{GeoKeyDirectory, GeoKeys, TiffBuilder};

pub const EPSG: u16 = 32633;
pub const PIXEL_SIZE: f64 = 10.0;
pub const PIXEL_AREA: f64 = PIXEL_SIZE * PIXEL_SIZE;

pub fn transform() -> GeoTransform {
    GeoTransform::new(500_000.0, 4_000_000.0, PIXEL_SIZE, -PIXEL_SIZE)
}

/// Row-major u8 raster with 0 as nodata
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub values: Vec<f64>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Canvas { width, height, values: vec![0.0; (width * height) as usize] }
    }

    /// Marks the half-open pixel rectangle `[x0, x1) x [y0, y1)` as valid
    pub fn fill(mut self, x0: u32, y0: u32, x1: u32, y1: u32, value: f64) -> Self {
        for y in y0..y1 {
            for x in x0..x1 {
                self.values[(y * self.width + x) as usize] = value;
            }
        }
        self
    }

    pub fn write(&self, path: &Path) -> PathBuf {
        let mut builder = TiffBuilder::new();
        builder
            .set_raster_data(self.width, self.height, SampleType::U8, &self.values, 16, &AdobeDeflateHandler::new())
            .unwrap();
        builder.set_geo_transform(&transform());
        builder.set_geo_keys(&GeoKeys::new(GeoKeyDirectory::for_epsg(EPSG)));
        builder.set_nodata("0");
        builder.write(path).unwrap();
        path.to_path_buf()
    }
}

/// 100 x 60 raster with one patch crossing the first vertical seam and one
/// patch inside a single tile
///
/// With 40 px tiles and 4 px overlap the grid is 2 rows by 3 columns.
pub fn seam_raster(dir: &Path) -> PathBuf {
    Canvas::new(100, 60)
        .fill(30, 5, 50, 15, 1.0)
        .fill(80, 45, 90, 55, 2.0)
        .write(&dir.join("seam.tif"))
}
