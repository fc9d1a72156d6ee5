//! Raster tiling
//!
//! Plans an overlapping tile grid over a raster and writes the tiles as
//! standalone GeoTIFFs.

pub mod grid;
pub mod writer;

pub use grid::{TileGrid, TileGridPlanner, TileSpec};
pub use writer::{TileWriter, TilingSummary, TILES_DIR_NAME};
