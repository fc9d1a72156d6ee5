//! Tile-based raster window reads
//!
//! Tiled TIFFs organise image data in equally sized rectangular tiles; edge
//! tiles are padded to the full tile size.

use log::debug;

use crate::io::seekable::SeekableReader;
use crate::raster::block::BlockDecoder;
use crate::raster::region::Region;
use crate::tiff::errors::{TiffError, TiffResult};

/// Reads band-1 windows from a tiled TIFF
pub struct TileReader<'a, R: SeekableReader> {
    reader: R,
    decoder: &'a BlockDecoder<'a>,
    offsets: &'a [u64],
    byte_counts: &'a [u64],
    image_width: u32,
    tile_width: u32,
    tile_height: u32,
}

impl<'a, R: SeekableReader> TileReader<'a, R> {
    pub fn new(
        reader: R,
        decoder: &'a BlockDecoder<'a>,
        offsets: &'a [u64],
        byte_counts: &'a [u64],
        image_width: u32,
        tile_width: u32,
        tile_height: u32,
    ) -> TiffResult<Self> {
        if tile_width == 0 || tile_height == 0 {
            return Err(TiffError::GenericError("Tile dimensions must be positive".to_string()));
        }

        Ok(TileReader {
            reader,
            decoder,
            offsets,
            byte_counts,
            image_width,
            tile_width,
            tile_height,
        })
    }

    /// Reads the region's band-1 values, row-major
    pub fn read(&mut self, region: Region) -> TiffResult<Vec<f64>> {
        let (tw, th) = (self.tile_width, self.tile_height);
        let tiles_across = (self.image_width + tw - 1) / tw;

        let (tx0, tx1) = (region.x / tw, (region.end_x() + tw - 1) / tw);
        let (ty0, ty1) = (region.y / th, (region.end_y() + th - 1) / th);
        debug!("Reading tiles x {}..{}, y {}..{} for {:?}", tx0, tx1, ty0, ty1, region);

        let mut values = vec![0.0; region.pixel_count()];
        for ty in ty0..ty1 {
            for tx in tx0..tx1 {
                let idx = (ty * tiles_across + tx) as usize;
                let (offset, byte_count) = match (self.offsets.get(idx), self.byte_counts.get(idx)) {
                    (Some(o), Some(c)) => (*o, *c),
                    _ => return Err(TiffError::GenericError(format!(
                        "Tile {} missing from tile tables ({} entries)", idx, self.offsets.len()))),
                };

                let block = self.decoder.read_block(&mut self.reader, offset, byte_count, tw as usize, th as usize)?;

                let tile_region = Region::new(tx * tw, ty * th, tw, th);
                let Some(overlap) = tile_region.intersection(&region) else {
                    continue;
                };

                for y in overlap.y..overlap.end_y() {
                    let out_row = (y - region.y) as usize * region.width as usize;
                    for x in overlap.x..overlap.end_x() {
                        values[out_row + (x - region.x) as usize] = self.decoder.sample(
                            &block, tw as usize, (x - tile_region.x) as usize, (y - tile_region.y) as usize);
                    }
                }
            }
        }

        Ok(values)
    }
}
