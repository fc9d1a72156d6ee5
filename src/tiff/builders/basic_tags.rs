//! Basic TIFF tag strategies
//!
//! Image structure tags for the single-band rasters this crate writes:
//! dimensions, sample layout, compression and the strip tables.

use std::collections::BTreeMap;
use log::debug;

use crate::raster::SampleType;
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::constants::{tags, field_types, photometric, planar_config};
use crate::utils::write_utils;

/// Adds basic TIFF tags to an IFD
pub struct BasicTagsBuilder;

impl BasicTagsBuilder {
    /// Add the tags of a one-band image with the given sample type
    pub fn add_basic_gray_tags(
        ifd: &mut IFD,
        width: u32,
        height: u32,
        sample_type: SampleType,
    ) {
        debug!("Adding single-band tags for {}x{} image, {:?}", width, height, sample_type);

        ifd.add_entry(IFDEntry::new(tags::IMAGE_WIDTH, field_types::LONG, 1, width as u64));
        ifd.add_entry(IFDEntry::new(tags::IMAGE_LENGTH, field_types::LONG, 1, height as u64));
        ifd.add_entry(IFDEntry::new(tags::BITS_PER_SAMPLE, field_types::SHORT, 1, sample_type.bits() as u64));
        ifd.add_entry(IFDEntry::new(
            tags::PHOTOMETRIC_INTERPRETATION, field_types::SHORT, 1, photometric::BLACK_IS_ZERO as u64));
        ifd.add_entry(IFDEntry::new(tags::SAMPLES_PER_PIXEL, field_types::SHORT, 1, 1));
        ifd.add_entry(IFDEntry::new(
            tags::PLANAR_CONFIGURATION, field_types::SHORT, 1, planar_config::CHUNKY as u64));
        ifd.add_entry(IFDEntry::new(
            tags::SAMPLE_FORMAT, field_types::SHORT, 1, sample_type.sample_format() as u64));
    }

    /// Record the compression scheme
    pub fn set_compression(ifd: &mut IFD, code: u16) {
        ifd.add_entry(IFDEntry::new(tags::COMPRESSION, field_types::SHORT, 1, code as u64));
    }

    /// Set up the strip tables for strips of the given sizes
    ///
    /// StripOffsets gets a placeholder; the writer fills in the real offsets
    /// once the file layout is known.
    pub fn setup_strips(
        ifd: &mut IFD,
        external_data: &mut BTreeMap<u16, Vec<u8>>,
        strip_sizes: &[u32],
        rows_per_strip: u32,
    ) {
        debug!("Setting up {} strips of {} rows", strip_sizes.len(), rows_per_strip);

        let count = strip_sizes.len() as u64;
        ifd.add_entry(IFDEntry::new(tags::STRIP_OFFSETS, field_types::LONG, count, 0));
        write_utils::store_tag_bytes(
            ifd, external_data, tags::STRIP_BYTE_COUNTS, field_types::LONG, count,
            write_utils::longs_to_bytes(strip_sizes));
        ifd.add_entry(IFDEntry::new(tags::ROWS_PER_STRIP, field_types::LONG, 1, rows_per_strip as u64));
    }

    /// Record the producing software
    pub fn add_software(ifd: &mut IFD, external_data: &mut BTreeMap<u16, Vec<u8>>, software: &str) {
        let bytes = write_utils::ascii_to_bytes(software);
        let count = bytes.len() as u64;
        write_utils::store_tag_bytes(ifd, external_data, tags::SOFTWARE, field_types::ASCII, count, bytes);
    }
}
