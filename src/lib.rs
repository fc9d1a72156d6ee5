pub mod io;
pub mod tiff;
pub mod raster;
pub mod compression;
pub mod utils;
pub mod config;
pub mod error;
pub mod tiling;
pub mod patches;
pub mod pipeline;
pub mod vector;
pub mod commands;
pub mod api;

pub use crate::api::RasterPatch;

pub use config::{ExtractionConfig, MergeStrategy, TileCompression, TilingConfig};
pub use error::{ErrorKind, PipelineError, PipelineResult};
pub use patches::{FeatureCollection, PatchExtractor, PolygonFeature};
pub use pipeline::{extract_patches, tile_raster, PipelineSummary};
pub use raster::GeoRaster;
pub use tiff::TiffReader;
pub use tiling::{TileGrid, TileGridPlanner, TileSpec};
pub use vector::OutputDriver;
