//! Image File Directories
//!
//! An IFD is the tag table describing one image. Entries are kept ordered by
//! tag, which is also the order the writer must emit them in.

use std::collections::BTreeMap;
use std::fmt;
use log::trace;

use crate::tiff::constants::{field_types, tags};

/// Size in bytes of one value of a TIFF field type
///
/// Unknown types count as one byte so a stray entry cannot inflate reads.
pub fn field_type_size(field_type: u16) -> usize {
    match field_type {
        field_types::SHORT | field_types::SSHORT => 2,
        field_types::LONG | field_types::SLONG | field_types::FLOAT => 4,
        field_types::RATIONAL | field_types::SRATIONAL | field_types::DOUBLE
        | field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => 8,
        _ => 1,
    }
}

/// One tag of a directory
#[derive(Debug, Clone, PartialEq)]
pub struct IFDEntry {
    pub tag: u16,
    pub field_type: u16,
    pub count: u64,
    /// Inline value, or the file offset of the values
    pub value_offset: u64,
    /// File position of the value field itself, 0 for entries built in memory
    ///
    /// Inline arrays are re-read from here so they decode with the file's
    /// byte order.
    pub value_position: u64,
}

impl IFDEntry {
    pub fn new(tag: u16, field_type: u16, count: u64, value_offset: u64) -> Self {
        IFDEntry { tag, field_type, count, value_offset, value_position: 0 }
    }

    /// Entry read from a file, remembering where its value field lives
    pub fn with_position(tag: u16, field_type: u16, count: u64, value_offset: u64, value_position: u64) -> Self {
        IFDEntry { value_position, ..Self::new(tag, field_type, count, value_offset) }
    }

    pub fn value_size(&self) -> usize {
        field_type_size(self.field_type)
    }

    /// Total byte length of the values
    pub fn byte_len(&self) -> u64 {
        self.value_size() as u64 * self.count
    }

    /// Whether the values fit in the entry's own value field
    pub fn is_value_inline(&self, is_big_tiff: bool) -> bool {
        self.byte_len() <= if is_big_tiff { 8 } else { 4 }
    }

    pub fn is_ascii(&self) -> bool {
        self.field_type == field_types::ASCII
    }
}

impl fmt::Display for IFDEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tag {} type {} count {} value/offset {}", self.tag, self.field_type, self.count, self.value_offset)
    }
}

/// Directory of one image
#[derive(Debug, Clone, Default)]
pub struct IFD {
    /// Position in the IFD chain, 0-based
    pub number: usize,
    /// File offset of the directory
    pub offset: u64,
    entries: BTreeMap<u16, IFDEntry>,
}

impl IFD {
    pub fn new(number: usize, offset: u64) -> Self {
        IFD { number, offset, entries: BTreeMap::new() }
    }

    /// Adds an entry, replacing any entry with the same tag
    pub fn add_entry(&mut self, entry: IFDEntry) {
        trace!("IFD #{}: {}", self.number, entry);
        self.entries.insert(entry.tag, entry);
    }

    /// Entries in ascending tag order
    pub fn entries(&self) -> impl Iterator<Item = &IFDEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.entries.get(&tag)
    }

    pub fn has_tag(&self, tag: u16) -> bool {
        self.entries.contains_key(&tag)
    }

    /// The raw value field of a tag; only meaningful for single inline values
    pub fn get_tag_value(&self, tag: u16) -> Option<u64> {
        self.get_entry(tag).map(|entry| entry.value_offset)
    }

    pub fn get_dimensions(&self) -> Option<(u64, u64)> {
        Some((self.get_tag_value(tags::IMAGE_WIDTH)?, self.get_tag_value(tags::IMAGE_LENGTH)?))
    }

    pub fn get_samples_per_pixel(&self) -> u64 {
        self.get_tag_value(tags::SAMPLES_PER_PIXEL).unwrap_or(1)
    }

    /// Whether pixel data is stored in tiles rather than strips
    pub fn is_tiled(&self) -> bool {
        self.has_tag(tags::TILE_WIDTH) && self.has_tag(tags::TILE_LENGTH)
    }
}
