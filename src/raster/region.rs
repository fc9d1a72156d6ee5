//! Region structure for defining a pixel window
//!
//! A Region is a rectangular area of an image in pixel coordinates, where
//! (0,0) is the top-left corner of the image.

use crate::tiff::errors::{TiffError, TiffResult};

/// Rectangular pixel window
///
/// Represents a rectangular area defined by its top-left corner coordinates
/// and dimensions. Used both for reading windows from a raster and for the
/// windows a tile grid is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    /// X-coordinate of the top-left corner (pixels from left)
    pub x: u32,

    /// Y-coordinate of the top-left corner (pixels from top)
    pub y: u32,

    /// Width of the region in pixels
    pub width: u32,

    /// Height of the region in pixels
    pub height: u32,
}

impl Region {
    /// Create a new region
    ///
    /// # Arguments
    /// * `x` - X-coordinate of the top-left corner
    /// * `y` - Y-coordinate of the top-left corner
    /// * `width` - Width of the region in pixels
    /// * `height` - Height of the region in pixels
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Region { x, y, width, height }
    }

    /// Region covering a whole image
    pub fn full(width: u32, height: u32) -> Self {
        Region::new(0, 0, width, height)
    }

    /// Get the rightmost X coordinate (exclusive)
    pub fn end_x(&self) -> u32 {
        self.x + self.width
    }

    /// Get the bottommost Y coordinate (exclusive)
    pub fn end_y(&self) -> u32 {
        self.y + self.height
    }

    /// Number of pixels in the region
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether the region lies entirely inside an image of the given size
    pub fn fits_within(&self, image_width: u32, image_height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && (self.x as u64 + self.width as u64) <= image_width as u64
            && (self.y as u64 + self.height as u64) <= image_height as u64
    }

    /// Fails with `RegionOutOfBounds` unless the region fits the image
    pub fn validate_within(&self, image_width: u32, image_height: u32) -> TiffResult<()> {
        if self.fits_within(image_width, image_height) {
            Ok(())
        } else {
            Err(TiffError::RegionOutOfBounds {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
                image_width,
                image_height,
            })
        }
    }

    /// Overlap of two regions, if any
    pub fn intersection(&self, other: &Region) -> Option<Region> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.end_x().min(other.end_x());
        let y1 = self.end_y().min(other.end_y());
        if x0 < x1 && y0 < y1 {
            Some(Region::new(x0, y0, x1 - x0, y1 - y0))
        } else {
            None
        }
    }
}
