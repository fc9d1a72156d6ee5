//! Factory for creating compression handlers

use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;
use super::uncompressed::UncompressedHandler;
use super::deflate::AdobeDeflateHandler;
use super::zstd::ZstdHandler;

/// Factory for creating compression handlers
pub struct CompressionFactory;

impl CompressionFactory {
    /// Create a compression handler for the given Compression tag value
    pub fn create_handler(code: u64) -> TiffResult<Box<dyn CompressionHandler>> {
        match code as u16 {
            compression::NONE => Ok(Box::new(UncompressedHandler)),
            compression::DEFLATE | compression::DEFLATE_OLD => Ok(Box::new(AdobeDeflateHandler::new())),
            compression::ZSTD => Ok(Box::new(ZstdHandler::new())),
            _ => Err(TiffError::UnsupportedCompression(code))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_old_deflate_code_shares_handler() {
        let handler = CompressionFactory::create_handler(32946).unwrap();
        assert_eq!(handler.code(), compression::DEFLATE);
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        assert!(matches!(
            CompressionFactory::create_handler(5),
            Err(TiffError::UnsupportedCompression(5))
        ));
    }

    #[test]
    fn test_deflate_block_round_trip_truncates_to_expected() {
        let handler = CompressionFactory::create_handler(compression::DEFLATE as u64).unwrap();
        let data: Vec<u8> = (0..=255).collect();
        let packed = handler.compress(&data).unwrap();
        let unpacked = handler.decompress(&packed, 200).unwrap();
        assert_eq!(unpacked, data[..200].to_vec());
        assert!(handler.decompress(&packed, 300).is_err());
    }
}
