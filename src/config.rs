//! Run configuration for the tiling and extraction stages

use serde::{Deserialize, Serialize};

use crate::compression::{AdobeDeflateHandler, CompressionHandler, UncompressedHandler, ZstdHandler};
use crate::error::{PipelineError, PipelineResult};

/// Default edge length of a tile in pixels
pub const DEFAULT_TILE_SIZE: u32 = 2000;
/// Default overlap between adjacent tiles in pixels
pub const DEFAULT_OVERLAP: u32 = 20;
/// Default rows per strip in written tiles
pub const DEFAULT_ROWS_PER_STRIP: u32 = 256;
/// Upper bound on extraction workers
pub const MAX_WORKERS: usize = 10;
/// Cores kept free for the rest of the system
pub const RESERVED_CORES: usize = 2;

/// Codec used for written tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileCompression {
    None,
    #[default]
    Deflate,
    Zstd,
}

impl TileCompression {
    pub fn parse(name: &str) -> PipelineResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "none" | "uncompressed" => Ok(TileCompression::None),
            "deflate" | "zip" => Ok(TileCompression::Deflate),
            "zstd" => Ok(TileCompression::Zstd),
            other => Err(PipelineError::Configuration(format!("Unknown tile compression '{}'", other))),
        }
    }

    pub fn handler(&self) -> Box<dyn CompressionHandler> {
        match self {
            TileCompression::None => Box::new(UncompressedHandler),
            TileCompression::Deflate => Box::new(AdobeDeflateHandler::new()),
            TileCompression::Zstd => Box::new(ZstdHandler::new()),
        }
    }
}

/// Parameters of the tiling stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilingConfig {
    pub tile_size: u32,
    pub overlap: u32,
    pub compression: TileCompression,
    pub rows_per_strip: u32,
    pub show_progress: bool,
}

impl Default for TilingConfig {
    fn default() -> Self {
        TilingConfig {
            tile_size: DEFAULT_TILE_SIZE,
            overlap: DEFAULT_OVERLAP,
            compression: TileCompression::default(),
            rows_per_strip: DEFAULT_ROWS_PER_STRIP,
            show_progress: false,
        }
    }
}

impl TilingConfig {
    /// Rejects degenerate grids before anything touches the disk
    pub fn validate(&self) -> PipelineResult<()> {
        if self.tile_size == 0 {
            return Err(PipelineError::Configuration("tile_size must be positive".to_string()));
        }
        if self.overlap >= self.tile_size {
            return Err(PipelineError::Configuration(format!(
                "overlap ({}) must be smaller than tile_size ({})", self.overlap, self.tile_size)));
        }
        if self.rows_per_strip == 0 {
            return Err(PipelineError::Configuration("rows_per_strip must be positive".to_string()));
        }
        Ok(())
    }
}

/// How per-tile polygons are reconciled into the final layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Union only the multi-part features, pass single-part ones through
    #[default]
    MultiPartOnly,
    /// Union every feature
    DissolveAll,
}

/// Parameters of the extraction and merge stage
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Requested worker count; `None` picks the automatic default
    pub workers: Option<usize>,
    /// Treat zero-valued pixels as background
    pub zero_as_nodata: bool,
    pub merge_strategy: MergeStrategy,
    pub show_progress: bool,
}

/// Number of extraction workers for a run
///
/// `min(requested or default, max(cores - 2, 1), 10)`; a request of zero is
/// a configuration error.
pub fn resolve_worker_count(requested: Option<usize>, cores: usize) -> PipelineResult<usize> {
    let available = cores.saturating_sub(RESERVED_CORES).max(1);
    let default = available.min(MAX_WORKERS);
    match requested {
        Some(0) => Err(PipelineError::Configuration("worker count must be positive".to_string())),
        Some(n) => Ok(n.min(available).min(MAX_WORKERS)),
        None => Ok(default),
    }
}
