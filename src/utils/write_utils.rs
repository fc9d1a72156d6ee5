//! TIFF writing utilities
//!
//! Helpers for laying out IFD entries and their out-of-line values.

use std::collections::BTreeMap;
use std::io::Write;

use crate::tiff::errors::TiffResult;
use crate::tiff::ifd::{IFD, IFDEntry};

/// Bytes available for an inline value in a classic TIFF entry
const INLINE_BYTES: usize = 4;

/// Align an offset to a 4-byte boundary
pub fn align_to_4_bytes(offset: u64) -> u64 {
    (offset + 3) & !3
}

/// Write padding bytes so the next write starts on a 4-byte boundary
pub fn write_padding(writer: &mut impl Write, data_len: usize) -> TiffResult<()> {
    let padding = calculate_padding(data_len);
    if padding > 0 {
        writer.write_all(&[0u8; 4][..padding])?;
    }
    Ok(())
}

/// Padding required after `data_len` bytes
pub fn calculate_padding(data_len: usize) -> usize {
    (4 - (data_len % 4)) % 4
}

/// Stores little-endian tag values, inline when they fit, else out of line
///
/// Out-of-line values get a placeholder offset that the writer resolves.
pub fn store_tag_bytes(
    ifd: &mut IFD,
    external_data: &mut BTreeMap<u16, Vec<u8>>,
    tag: u16,
    field_type: u16,
    count: u64,
    bytes: Vec<u8>,
) {
    if bytes.len() <= INLINE_BYTES {
        let mut inline = [0u8; INLINE_BYTES];
        inline[..bytes.len()].copy_from_slice(&bytes);
        external_data.remove(&tag);
        ifd.add_entry(IFDEntry::new(tag, field_type, count, u32::from_le_bytes(inline) as u64));
    } else {
        ifd.add_entry(IFDEntry::new(tag, field_type, count, 0));
        external_data.insert(tag, bytes);
    }
}

/// Little-endian bytes of a SHORT array
pub fn shorts_to_bytes(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Little-endian bytes of a LONG array
pub fn longs_to_bytes(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Little-endian bytes of a DOUBLE array
pub fn doubles_to_bytes(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// NUL-terminated ASCII bytes
pub fn ascii_to_bytes(text: &str) -> Vec<u8> {
    let mut bytes = text.as_bytes().to_vec();
    bytes.push(0);
    bytes
}
