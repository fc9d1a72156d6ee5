//! Strip-based raster window reads
//!
//! Stripped TIFFs organise image data in horizontal strips spanning the
//! full image width. A window read decodes every strip that intersects the
//! window's rows.

use log::debug;

use crate::io::seekable::SeekableReader;
use crate::raster::block::BlockDecoder;
use crate::raster::region::Region;
use crate::tiff::errors::{TiffError, TiffResult};

/// Reads band-1 windows from a stripped TIFF
pub struct StripReader<'a, R: SeekableReader> {
    reader: R,
    decoder: &'a BlockDecoder<'a>,
    offsets: &'a [u64],
    byte_counts: &'a [u64],
    image_width: u32,
    image_height: u32,
    rows_per_strip: u32,
}

impl<'a, R: SeekableReader> StripReader<'a, R> {
    /// Create a new strip reader
    ///
    /// # Arguments
    /// * `reader` - Seekable reader for the TIFF file
    /// * `decoder` - Block decoder configured for the image
    /// * `offsets` / `byte_counts` - StripOffsets and StripByteCounts
    /// * `image_width` / `image_height` - Image dimensions
    /// * `rows_per_strip` - RowsPerStrip, already defaulted to the image height
    pub fn new(
        reader: R,
        decoder: &'a BlockDecoder<'a>,
        offsets: &'a [u64],
        byte_counts: &'a [u64],
        image_width: u32,
        image_height: u32,
        rows_per_strip: u32,
    ) -> Self {
        StripReader {
            reader,
            decoder,
            offsets,
            byte_counts,
            image_width,
            image_height,
            rows_per_strip: rows_per_strip.clamp(1, image_height.max(1)),
        }
    }

    /// Reads the region's band-1 values, row-major
    pub fn read(&mut self, region: Region) -> TiffResult<Vec<f64>> {
        let rps = self.rows_per_strip;
        let start_strip = region.y / rps;
        let end_strip = (region.end_y() + rps - 1) / rps;
        let width = self.image_width as usize;

        debug!("Reading strips {}..{} for {:?}", start_strip, end_strip, region);

        let mut values = vec![0.0; region.pixel_count()];
        for strip_idx in start_strip..end_strip {
            let idx = strip_idx as usize;
            let (offset, byte_count) = match (self.offsets.get(idx), self.byte_counts.get(idx)) {
                (Some(o), Some(c)) => (*o, *c),
                _ => return Err(TiffError::GenericError(format!(
                    "Strip {} missing from strip tables ({} entries)", idx, self.offsets.len()))),
            };

            let strip_y = strip_idx * rps;
            let rows_in_strip = rps.min(self.image_height - strip_y) as usize;
            let block = self.decoder.read_block(&mut self.reader, offset, byte_count, width, rows_in_strip)?;

            let first_row = region.y.max(strip_y);
            let last_row = region.end_y().min(strip_y + rows_in_strip as u32);
            for y in first_row..last_row {
                let out_row = (y - region.y) as usize * region.width as usize;
                for x in region.x..region.end_x() {
                    values[out_row + (x - region.x) as usize] =
                        self.decoder.sample(&block, width, x as usize, (y - strip_y) as usize);
                }
            }
        }

        Ok(values)
    }
}
