//! Library facade over the two pipeline stages

use std::path::{Path, PathBuf};

use crate::config::{ExtractionConfig, TilingConfig};
use crate::error::PipelineResult;
use crate::pipeline::{self, PipelineSummary};
use crate::tiling::TilingSummary;
use crate::utils::logger::Logger;

/// Main interface to the rasterpatch library
pub struct RasterPatch {
    logger: Logger,
    tiling: TilingConfig,
    extraction: ExtractionConfig,
}

impl RasterPatch {
    /// Create a new RasterPatch instance with default configuration
    ///
    /// # Arguments
    /// * `log_file` - Optional path of the run journal; `None` keeps no journal
    ///
    /// # Returns
    /// A RasterPatch instance or an error if the journal cannot be created
    pub fn new(log_file: Option<&Path>) -> PipelineResult<Self> {
        let logger = match log_file {
            Some(path) => Logger::new(path)?,
            None => Logger::disabled(),
        };
        Ok(RasterPatch {
            logger,
            tiling: TilingConfig::default(),
            extraction: ExtractionConfig::default(),
        })
    }

    /// Replaces the tiling parameters
    pub fn with_tiling(mut self, config: TilingConfig) -> Self {
        self.tiling = config;
        self
    }

    /// Replaces the extraction parameters
    pub fn with_extraction(mut self, config: ExtractionConfig) -> Self {
        self.extraction = config;
        self
    }

    pub fn tiling_config(&self) -> &TilingConfig {
        &self.tiling
    }

    pub fn extraction_config(&self) -> &ExtractionConfig {
        &self.extraction
    }

    /// Split a raster into overlapping tiles
    ///
    /// # Arguments
    /// * `input` - Source GeoTIFF
    /// * `output_dir` - Directory that receives the `tiles/` subdirectory
    pub fn tile(&self, input: &Path, output_dir: &Path) -> PipelineResult<TilingSummary> {
        pipeline::tile_raster(input, output_dir, &self.tiling, &self.logger)
    }

    /// Extract, merge and write the patches of every tile in a directory
    ///
    /// # Arguments
    /// * `tiles_dir` - Directory of GeoTIFF tiles
    /// * `output` - Vector file; the extension selects the format
    pub fn extract_patches(&self, tiles_dir: &Path, output: &Path) -> PipelineResult<PipelineSummary> {
        pipeline::extract_patches(tiles_dir, output, &self.extraction, &self.logger)
    }

    /// Run both stages
    ///
    /// # Returns
    /// The tile directory and the extraction summary
    pub fn run(&self, input: &Path, output_dir: &Path, output: &Path) -> PipelineResult<(PathBuf, PipelineSummary)> {
        let tiling = self.tile(input, output_dir)?;
        let summary = self.extract_patches(&tiling.tiles_dir, output)?;
        Ok((tiling.tiles_dir, summary))
    }
}
