//! Raster data access
//!
//! Band-1 window reads on top of the TIFF codec: sample decoding,
//! georeferencing and the strip and tile block readers.

pub mod region;
pub mod sample;
pub mod geotransform;
pub mod window;
pub mod dataset;
mod block;
mod strip_reader;
mod tile_reader;

pub use dataset::{BlockLayout, GeoRaster};
pub use geotransform::GeoTransform;
pub use region::Region;
pub use sample::SampleType;
pub use window::RasterWindow;
