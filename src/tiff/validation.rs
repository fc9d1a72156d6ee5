//! Bounds checks that keep a malformed file from sending the reader into
//! unrelated bytes

use log::warn;
use std::io::SeekFrom;

use crate::io::seekable::SeekableReader;
use crate::tiff::errors::{TiffError, TiffResult};

/// Length of the stream, `u64::MAX` when it cannot be determined
///
/// The read position is restored.
pub fn get_file_size(reader: &mut dyn SeekableReader) -> TiffResult<u64> {
    let position = reader.stream_position()?;
    let size = reader.seek(SeekFrom::End(0)).unwrap_or_else(|e| {
        warn!("Could not determine file size: {}", e);
        u64::MAX
    });
    reader.seek(SeekFrom::Start(position))?;
    Ok(size)
}

/// An IFD must start past the 8-byte header and inside the file
pub fn validate_ifd_offset(offset: u64, file_size: u64) -> TiffResult<()> {
    if offset < 8 || offset >= file_size {
        return Err(TiffError::GenericError(format!(
            "Invalid IFD offset: {} (file size: {})", offset, file_size)));
    }
    Ok(())
}

/// Checks that a byte range lies inside the file
pub fn validate_data_range(offset: u64, byte_count: u64, file_size: u64) -> TiffResult<()> {
    match offset.checked_add(byte_count) {
        Some(end) if end <= file_size => Ok(()),
        _ => Err(TiffError::GenericError(format!(
            "Data block at offset {} with {} bytes exceeds file size {}", offset, byte_count, file_size))),
    }
}
