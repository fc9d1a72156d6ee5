//! TIFF file construction
//!
//! `TiffBuilder` assembles one single-band GeoTIFF: structure tags, encoded
//! strips and georeferencing, then hands the result to the writer.

use std::collections::BTreeMap;
use std::path::Path;
use log::info;

use crate::compression::CompressionHandler;
use crate::raster::{GeoTransform, SampleType};
use crate::tiff::builders::basic_tags::BasicTagsBuilder;
use crate::tiff::builders::geo_tags::GeoTagsBuilder;
use crate::tiff::builders::writer::WriterBuilder;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::geo_keys::GeoKeys;
use crate::tiff::ifd::IFD;

/// Builder for single-band GeoTIFF files
pub struct TiffBuilder {
    ifd: IFD,
    external_data: BTreeMap<u16, Vec<u8>>,
    strips: Vec<Vec<u8>>,
}

impl Default for TiffBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TiffBuilder {
    pub fn new() -> Self {
        TiffBuilder {
            ifd: IFD::new(0, 0),
            external_data: BTreeMap::new(),
            strips: Vec::new(),
        }
    }

    /// The directory assembled so far
    pub fn ifd(&self) -> &IFD {
        &self.ifd
    }

    /// Encodes band values into compressed strips and adds the image tags
    ///
    /// # Arguments
    /// * `width` / `height` - Image size; `values` holds `width * height` samples
    /// * `sample_type` - Sample type written to the file
    /// * `values` - Row-major sample values
    /// * `rows_per_strip` - Rows per strip, clamped to the image height
    /// * `compression` - Codec applied to every strip
    pub fn set_raster_data(
        &mut self,
        width: u32,
        height: u32,
        sample_type: SampleType,
        values: &[f64],
        rows_per_strip: u32,
        compression: &dyn CompressionHandler,
    ) -> TiffResult<()> {
        let expected = width as usize * height as usize;
        if width == 0 || height == 0 || values.len() != expected {
            return Err(TiffError::GenericError(format!(
                "Cannot write {}x{} image from {} samples", width, height, values.len())));
        }

        let rows_per_strip = rows_per_strip.clamp(1, height);
        let row_len = width as usize;
        let mut strips = Vec::new();
        for rows in values.chunks(row_len * rows_per_strip as usize) {
            let mut raw = Vec::with_capacity(rows.len() * sample_type.bytes());
            for value in rows {
                sample_type.encode_le(*value, &mut raw);
            }
            strips.push(compression.compress(&raw)?);
        }

        let sizes: Vec<u32> = strips.iter().map(|s| s.len() as u32).collect();
        BasicTagsBuilder::add_basic_gray_tags(&mut self.ifd, width, height, sample_type);
        BasicTagsBuilder::set_compression(&mut self.ifd, compression.code());
        BasicTagsBuilder::setup_strips(&mut self.ifd, &mut self.external_data, &sizes, rows_per_strip);
        self.strips = strips;
        Ok(())
    }

    /// Adds pixel scale and tiepoint for the transform
    pub fn set_geo_transform(&mut self, transform: &GeoTransform) {
        GeoTagsBuilder::add_geo_transform(&mut self.ifd, &mut self.external_data, transform);
    }

    /// Copies the coordinate system keys
    pub fn set_geo_keys(&mut self, keys: &GeoKeys) {
        GeoTagsBuilder::add_geo_keys(&mut self.ifd, &mut self.external_data, keys);
    }

    /// Adds a GDAL NoData tag
    pub fn set_nodata(&mut self, nodata_value: &str) {
        GeoTagsBuilder::add_nodata_tag(&mut self.ifd, &mut self.external_data, nodata_value);
    }

    pub fn set_software(&mut self, software: &str) {
        BasicTagsBuilder::add_software(&mut self.ifd, &mut self.external_data, software);
    }

    /// Write the TIFF file to disk
    pub fn write(&self, output_path: &Path) -> TiffResult<()> {
        if self.strips.is_empty() {
            return Err(TiffError::GenericError("No image data set".to_string()));
        }
        info!("Writing TIFF to {}", output_path.display());
        WriterBuilder::write(&self.ifd, &self.external_data, &self.strips, output_path)
    }
}
