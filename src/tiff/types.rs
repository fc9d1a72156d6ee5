//! Parsed TIFF file

use crate::tiff::ifd::IFD;

/// The directories of a TIFF file, in chain order
#[derive(Debug)]
pub struct TIFF {
    pub ifds: Vec<IFD>,
    pub is_big_tiff: bool,
}

impl TIFF {
    pub fn new(is_big_tiff: bool) -> Self {
        TIFF { ifds: Vec::new(), is_big_tiff }
    }

    /// The first directory, which describes the full-resolution image
    pub fn main_ifd(&self) -> Option<&IFD> {
        self.ifds.first()
    }

    pub fn ifd_count(&self) -> usize {
        self.ifds.len()
    }
}
