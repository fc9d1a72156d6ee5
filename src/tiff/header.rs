//! TIFF and BigTIFF file header

use log::debug;

use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::header;
use crate::tiff::errors::{TiffError, TiffResult};

/// Decoded file header
pub struct TiffHeader {
    pub byte_order: ByteOrder,
    pub is_big_tiff: bool,
    pub first_ifd_offset: u64,
}

impl TiffHeader {
    /// Reads the header from the start of the stream
    ///
    /// Leaves the reader positioned right after the first IFD offset.
    pub fn read(reader: &mut dyn SeekableReader) -> TiffResult<Self> {
        let byte_order = ByteOrder::detect(reader)?;
        let handler = byte_order.create_handler();

        let version = handler.read_u16(reader)?;
        let is_big_tiff = match version {
            header::TIFF_VERSION => false,
            header::BIG_TIFF_VERSION => {
                check_bigtiff_preamble(reader, handler.as_ref())?;
                true
            }
            other => return Err(TiffError::UnsupportedVersion(other)),
        };

        let first_ifd_offset = read_offset(reader, is_big_tiff, handler.as_ref())?;
        debug!("{} {}, first IFD at {}", byte_order.name(),
               if is_big_tiff { "BigTIFF" } else { "TIFF" }, first_ifd_offset);

        Ok(TiffHeader { byte_order, is_big_tiff, first_ifd_offset })
    }
}

/// Reads an IFD link: 4 bytes in classic TIFF, 8 in BigTIFF
pub fn read_offset(reader: &mut dyn SeekableReader, is_big_tiff: bool, handler: &dyn ByteOrderHandler) -> TiffResult<u64> {
    let offset = if is_big_tiff {
        handler.read_u64(reader)?
    } else {
        handler.read_u32(reader)? as u64
    };
    Ok(offset)
}

// BigTIFF follows the version with the offset size (always 8) and a zero word
fn check_bigtiff_preamble(reader: &mut dyn SeekableReader, handler: &dyn ByteOrderHandler) -> TiffResult<()> {
    let offset_size = handler.read_u16(reader)?;
    let reserved = handler.read_u16(reader)?;
    if offset_size != header::BIGTIFF_OFFSET_SIZE || reserved != 0 {
        return Err(TiffError::InvalidBigTIFFHeader);
    }
    Ok(())
}
