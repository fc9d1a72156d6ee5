//! Handler for Adobe Deflate compressed data

use std::io::{Read, Write};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use crate::tiff::constants::compression;
use crate::tiff::errors::TiffResult;
use super::handler::{fit_block, CompressionHandler};

/// Adobe Deflate (zlib) compression handler
///
/// Decodes both code 8 and the older 32946; always encodes as 8.
pub struct AdobeDeflateHandler {
    level: Compression,
}

impl AdobeDeflateHandler {
    /// Handler with the zlib default level
    pub fn new() -> Self {
        AdobeDeflateHandler { level: Compression::default() }
    }
}

impl Default for AdobeDeflateHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CompressionHandler for AdobeDeflateHandler {
    fn decompress(&self, data: &[u8], expected_len: usize) -> TiffResult<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(data);
        let mut decoded = Vec::with_capacity(expected_len);
        decoder.read_to_end(&mut decoded)?;
        fit_block(decoded, expected_len, self.name())
    }

    fn compress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), self.level);
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }

    fn name(&self) -> &'static str {
        "Adobe Deflate"
    }

    fn code(&self) -> u16 {
        compression::DEFLATE
    }
}
