//! Compression handler trait definition

use crate::tiff::errors::TiffResult;

/// Strategy trait for the block codecs a raster strip or tile may use
pub trait CompressionHandler: Send + Sync {
    /// Decompresses one block
    ///
    /// `expected_len` is the decoded size implied by the block geometry;
    /// a shorter result is an error, a longer one is truncated.
    fn decompress(&self, data: &[u8], expected_len: usize) -> TiffResult<Vec<u8>>;

    /// Compresses one block
    fn compress(&self, data: &[u8]) -> TiffResult<Vec<u8>>;

    /// Get the name of this compression method
    fn name(&self) -> &'static str;

    /// TIFF compression code written into the Compression tag
    fn code(&self) -> u16;
}

/// Checks a decoded block against its expected size
pub(crate) fn fit_block(mut decoded: Vec<u8>, expected_len: usize, codec: &str) -> TiffResult<Vec<u8>> {
    if decoded.len() < expected_len {
        return Err(format!(
            "{} block decoded to {} bytes, expected {}",
            codec, decoded.len(), expected_len
        ).into());
    }
    decoded.truncate(expected_len);
    Ok(decoded)
}
