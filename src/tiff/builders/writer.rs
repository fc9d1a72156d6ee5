//! TIFF writing strategies
//!
//! Lays out and writes a single-image, little-endian classic TIFF. The file
//! is written front to back: header, IFD, out-of-line tag values, the strip
//! offset table and finally the strips, each block 4-byte aligned.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use log::debug;

use crate::tiff::constants::{field_types, header, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{field_type_size, IFDEntry, IFD};
use crate::utils::write_utils;

/// Size of the classic TIFF header
const HEADER_SIZE: u64 = 8;

/// Handles writing TIFF files to disk
pub struct WriterBuilder;

/// File offsets decided before anything is written
struct Layout {
    tag_offsets: BTreeMap<u16, u64>,
    strip_table_offset: Option<u64>,
    strip_offsets: Vec<u64>,
}

impl WriterBuilder {
    /// Write a complete TIFF file to disk
    ///
    /// # Arguments
    /// * `ifd` - The image's directory, StripOffsets still a placeholder
    /// * `external_data` - Out-of-line tag values keyed by tag
    /// * `strips` - Encoded strip payloads in image order
    /// * `output_path` - Destination file
    pub fn write(
        ifd: &IFD,
        external_data: &BTreeMap<u16, Vec<u8>>,
        strips: &[Vec<u8>],
        output_path: &Path,
    ) -> TiffResult<()> {
        let entries: Vec<&IFDEntry> = ifd.entries().collect();
        let layout = Self::calculate_offsets(entries.len(), external_data, strips)?;

        let file = File::create(output_path)?;
        let mut writer = BufWriter::with_capacity(1024 * 1024, file);

        Self::write_header(&mut writer)?;

        writer.write_all(&(entries.len() as u16).to_le_bytes())?;
        for entry in &entries {
            let value = match entry.tag {
                tags::STRIP_OFFSETS => match layout.strip_table_offset {
                    Some(table) => table,
                    None => layout.strip_offsets.first().copied().unwrap_or(0),
                },
                tag => layout.tag_offsets.get(&tag).copied().unwrap_or(entry.value_offset),
            };

            writer.write_all(&entry.tag.to_le_bytes())?;
            writer.write_all(&entry.field_type.to_le_bytes())?;
            writer.write_all(&(entry.count as u32).to_le_bytes())?;
            writer.write_all(&(value as u32).to_le_bytes())?;
        }
        // Single image: no next IFD
        writer.write_all(&0u32.to_le_bytes())?;

        for data in external_data.values() {
            writer.write_all(data)?;
            write_utils::write_padding(&mut writer, data.len())?;
        }

        if layout.strip_table_offset.is_some() {
            for offset in &layout.strip_offsets {
                writer.write_all(&(*offset as u32).to_le_bytes())?;
            }
        }

        for strip in strips {
            writer.write_all(strip)?;
            write_utils::write_padding(&mut writer, strip.len())?;
        }

        writer.flush()?;
        debug!("Wrote {} ({} strips)", output_path.display(), strips.len());
        Ok(())
    }

    /// Calculate where every block of the file will live
    ///
    /// Classic TIFF offsets are 32-bit, so a layout past 4 GiB is refused.
    fn calculate_offsets(
        entry_count: usize,
        external_data: &BTreeMap<u16, Vec<u8>>,
        strips: &[Vec<u8>],
    ) -> TiffResult<Layout> {
        // Entry count (2) + 12 bytes per entry + next IFD offset (4)
        let mut current = HEADER_SIZE + 2 + 12 * entry_count as u64 + 4;

        let mut tag_offsets = BTreeMap::new();
        for (tag, data) in external_data {
            tag_offsets.insert(*tag, current);
            current = write_utils::align_to_4_bytes(current + data.len() as u64);
        }

        let strip_table_offset = if strips.len() > 1 {
            let table = current;
            let field_size = field_type_size(field_types::LONG) as u64;
            current += field_size * strips.len() as u64;
            Some(table)
        } else {
            None
        };

        let mut strip_offsets = Vec::with_capacity(strips.len());
        for strip in strips {
            strip_offsets.push(current);
            current = write_utils::align_to_4_bytes(current + strip.len() as u64);
        }

        if current > u32::MAX as u64 {
            return Err(TiffError::GenericError(format!(
                "Image of {} bytes exceeds the classic TIFF size limit", current)));
        }

        Ok(Layout { tag_offsets, strip_table_offset, strip_offsets })
    }

    /// Write the header: byte order marker, version, first IFD offset
    fn write_header(writer: &mut impl Write) -> TiffResult<()> {
        writer.write_all(&header::LITTLE_ENDIAN_MARKER)?;
        writer.write_all(&header::TIFF_VERSION.to_le_bytes())?;
        // The IFD directly follows the header
        writer.write_all(&(HEADER_SIZE as u32).to_le_bytes())?;
        Ok(())
    }
}
