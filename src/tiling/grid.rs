//! Tile grid planning
//!
//! Splits a raster extent into overlapping windows. Along each axis window
//! origins advance by `stride = tile_size - overlap`; every window is
//! `tile_size` long except the last, which is clipped to the raster edge.
//! The windows cover the extent without gaps and neighbours share exactly
//! `overlap` pixels, apart from the clipped last window.

use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};
use crate::raster::Region;

/// Extension of written tile files
pub const TILE_EXTENSION: &str = "tif";

/// One planned tile window
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileSpec {
    pub row: u32,
    pub col: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Deterministic identifier derived from (row, col)
    pub name: String,
}

impl TileSpec {
    pub fn tile_name(row: u32, col: u32) -> String {
        format!("tile_{:04}_{:04}", row, col)
    }

    pub fn region(&self) -> Region {
        Region::new(self.x, self.y, self.width, self.height)
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, TILE_EXTENSION)
    }

    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

/// Windows along one axis as (origin, length)
pub type AxisWindows = Vec<(u32, u32)>;

/// Ordered (row-major) set of tile windows for one raster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    pub specs: Vec<TileSpec>,
    pub rows: u32,
    pub cols: u32,
    pub raster_width: u32,
    pub raster_height: u32,
}

impl TileGrid {
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn get(&self, row: u32, col: u32) -> Option<&TileSpec> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.specs.get((row * self.cols + col) as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileSpec> {
        self.specs.iter()
    }
}

/// Computes tile grids for a fixed tile size and overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGridPlanner {
    tile_size: u32,
    overlap: u32,
}

impl TileGridPlanner {
    /// Fails with a configuration error when `tile_size` is zero or
    /// `overlap >= tile_size`
    pub fn new(tile_size: u32, overlap: u32) -> PipelineResult<Self> {
        if tile_size == 0 {
            return Err(PipelineError::Configuration("tile_size must be positive".to_string()));
        }
        if overlap >= tile_size {
            return Err(PipelineError::Configuration(format!(
                "overlap ({}) must be smaller than tile_size ({})", overlap, tile_size)));
        }
        Ok(TileGridPlanner { tile_size, overlap })
    }

    pub fn stride(&self) -> u32 {
        self.tile_size - self.overlap
    }

    /// Windows along an axis of `dimension` pixels
    ///
    /// A window that would lie wholly inside its predecessor is not emitted,
    /// so the count is `1 + ceil((dimension - tile_size) / stride)` for
    /// dimensions beyond one tile.
    pub fn axis_windows(&self, dimension: u32) -> AxisWindows {
        if dimension <= self.tile_size {
            return vec![(0, dimension)];
        }

        let stride = self.stride() as u64;
        let remainder = (dimension - self.tile_size) as u64;
        let count = 1 + (remainder + stride - 1) / stride;

        (0..count)
            .map(|i| {
                let origin = (i * stride) as u32;
                (origin, self.tile_size.min(dimension - origin))
            })
            .collect()
    }

    /// Plans the full grid for a raster, row-major
    pub fn plan(&self, width: u32, height: u32) -> PipelineResult<TileGrid> {
        if width == 0 || height == 0 {
            return Err(PipelineError::Configuration(format!(
                "Cannot tile an empty raster ({}x{})", width, height)));
        }

        let columns = self.axis_windows(width);
        let rows = self.axis_windows(height);

        let mut specs = Vec::with_capacity(columns.len() * rows.len());
        for (row, (y, h)) in rows.iter().enumerate() {
            for (col, (x, w)) in columns.iter().enumerate() {
                let (row, col) = (row as u32, col as u32);
                specs.push(TileSpec {
                    row,
                    col,
                    x: *x,
                    y: *y,
                    width: *w,
                    height: *h,
                    name: TileSpec::tile_name(row, col),
                });
            }
        }

        Ok(TileGrid {
            specs,
            rows: rows.len() as u32,
            cols: columns.len() as u32,
            raster_width: width,
            raster_height: height,
        })
    }
}
