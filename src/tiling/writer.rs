//! Tile writer
//!
//! Cuts the planned windows out of the source raster and writes each one as
//! a standalone GeoTIFF whose georeferencing is shifted to the window origin.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use log::{debug, info};

use crate::compression::CompressionHandler;
use crate::config::TilingConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::raster::GeoRaster;
use crate::tiff::TiffBuilder;
use crate::tiling::grid::{TileGrid, TileSpec};
use crate::utils::progress::ProgressTracker;

/// Name of the tile directory created inside the output directory
pub const TILES_DIR_NAME: &str = "tiles";

/// Result of a completed tiling run
#[derive(Debug, Clone)]
pub struct TilingSummary {
    pub tiles_dir: PathBuf,
    /// Written files in grid order
    pub tiles: Vec<PathBuf>,
    pub grid: TileGrid,
    pub elapsed: Duration,
}

/// Writes tiles of one source raster into `<output_dir>/tiles`
pub struct TileWriter<'a> {
    source: &'a GeoRaster,
    tiles_dir: PathBuf,
    rows_per_strip: u32,
    compression: Box<dyn CompressionHandler>,
}

impl<'a> TileWriter<'a> {
    /// Prepares the tile directory
    ///
    /// # Arguments
    /// * `source` - Opened source raster
    /// * `output_dir` - Directory receiving the `tiles` subdirectory
    /// * `config` - Compression and strip layout of the written tiles
    pub fn new(source: &'a GeoRaster, output_dir: &Path, config: &TilingConfig) -> PipelineResult<Self> {
        let tiles_dir = output_dir.join(TILES_DIR_NAME);
        fs::create_dir_all(&tiles_dir).map_err(|e| PipelineError::Resource(format!(
            "Cannot create tile directory {}: {}", tiles_dir.display(), e)))?;

        Ok(TileWriter {
            source,
            tiles_dir,
            rows_per_strip: config.rows_per_strip,
            compression: config.compression.handler(),
        })
    }

    pub fn tiles_dir(&self) -> &Path {
        &self.tiles_dir
    }

    /// Reads one window and writes it as `<tiles_dir>/<name>.tif`
    pub fn write_tile(&self, spec: &TileSpec) -> PipelineResult<PathBuf> {
        let window = self.source.read_window(spec.region())?;
        let path = spec.path_in(&self.tiles_dir);

        let mut builder = TiffBuilder::new();
        builder.set_raster_data(
            window.width,
            window.height,
            window.sample_type,
            &window.values,
            self.rows_per_strip,
            self.compression.as_ref(),
        )?;
        builder.set_geo_transform(&self.source.geo_transform.shifted(spec.x, spec.y));
        if let Some(keys) = &self.source.geo_keys {
            builder.set_geo_keys(keys);
        }
        if let Some(nodata) = &self.source.nodata_text {
            builder.set_nodata(nodata);
        }
        builder.set_software(concat!("rasterpatch ", env!("CARGO_PKG_VERSION")));
        builder.write(&path)?;

        debug!("Wrote {} ({}x{} at {},{})", path.display(), spec.width, spec.height, spec.x, spec.y);
        Ok(path)
    }

    /// Writes every tile of the grid in order, stopping at the first failure
    ///
    /// Tiles written before a failure are left in place.
    pub fn write_all(&self, grid: &TileGrid, progress: &ProgressTracker) -> PipelineResult<TilingSummary> {
        let start = Instant::now();
        let mut tiles = Vec::with_capacity(grid.len());

        for spec in grid.iter() {
            let path = self.write_tile(spec)
                .map_err(|e| PipelineError::tile_io(spec.row, spec.col, e))?;
            tiles.push(path);
            progress.increment(1);
        }
        progress.finish();

        let elapsed = start.elapsed();
        info!("Wrote {} tiles ({}x{} grid) to {} in {:.2}s",
              tiles.len(), grid.rows, grid.cols, self.tiles_dir.display(), elapsed.as_secs_f64());

        Ok(TilingSummary {
            tiles_dir: self.tiles_dir.clone(),
            tiles,
            grid: grid.clone(),
            elapsed,
        })
    }
}
