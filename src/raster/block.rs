//! Shared decoding of strips and tiles
//!
//! Strips and tiles are both "blocks": a compressed run of rows that is
//! decompressed, has its predictor undone, and is then sampled for band 1.

use std::io::SeekFrom;
use log::trace;

use crate::compression::{CompressionFactory, CompressionHandler};
use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;
use crate::raster::sample::{self, SampleType};
use crate::tiff::constants::{planar_config, predictor};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::validation;

/// Everything needed to turn raw block bytes into band-1 values
pub struct BlockDecoder<'a> {
    compression: Box<dyn CompressionHandler>,
    handler: &'a dyn ByteOrderHandler,
    sample_type: SampleType,
    samples_per_pixel: usize,
    planar: u16,
    predictor: u16,
    file_size: u64,
}

impl<'a> BlockDecoder<'a> {
    pub fn new(
        compression: u64,
        handler: &'a dyn ByteOrderHandler,
        sample_type: SampleType,
        samples_per_pixel: usize,
        planar: u16,
        predictor: u16,
        file_size: u64,
    ) -> TiffResult<Self> {
        Ok(BlockDecoder {
            compression: CompressionFactory::create_handler(compression)?,
            handler,
            sample_type,
            samples_per_pixel: samples_per_pixel.max(1),
            planar,
            predictor,
            file_size,
        })
    }

    /// Distance in samples between two pixels of band 1
    pub fn pixel_stride(&self) -> usize {
        if self.planar == planar_config::PLANAR { 1 } else { self.samples_per_pixel }
    }

    /// Reads and decodes one block of `block_width` x `block_rows` pixels
    pub fn read_block(
        &self,
        reader: &mut dyn SeekableReader,
        offset: u64,
        byte_count: u64,
        block_width: usize,
        block_rows: usize,
    ) -> TiffResult<Vec<u8>> {
        validation::validate_data_range(offset, byte_count, self.file_size)?;

        reader.seek(SeekFrom::Start(offset))?;
        let mut compressed = vec![0u8; byte_count as usize];
        reader.read_exact(&mut compressed)?;

        let row_samples = block_width * self.pixel_stride();
        let expected = row_samples * block_rows * self.sample_type.bytes();
        let mut block = self.compression.decompress(&compressed, expected)?;
        trace!("Decoded block at {}: {} -> {} bytes", offset, byte_count, block.len());

        match self.predictor {
            predictor::NONE => {}
            predictor::HORIZONTAL_DIFFERENCING => sample::undo_horizontal_predictor(
                &mut block,
                self.sample_type,
                row_samples,
                self.pixel_stride(),
                self.handler.byte_order(),
            )?,
            other => return Err(TiffError::GenericError(format!("Unsupported predictor: {}", other))),
        }

        Ok(block)
    }

    /// Band-1 value of pixel (x, row) inside a decoded block
    pub fn sample(&self, block: &[u8], block_width: usize, x: usize, row: usize) -> f64 {
        let index = (row * block_width + x) * self.pixel_stride();
        let start = index * self.sample_type.bytes();
        self.sample_type.decode(&block[start..], self.handler)
    }
}
