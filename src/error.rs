//! Pipeline error taxonomy
//!
//! Configuration, resource and tile I/O errors halt a run. Processing errors
//! stay inside the extraction stage and are reported per tile. An
//! aggregation error means nothing usable came out of extraction.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::tiff::errors::TiffError;

/// Errors raised by the tiling and patch pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid parameters, detected before any work starts
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Missing inputs or unusable output locations
    #[error("Resource error: {0}")]
    Resource(String),

    /// Fail-fast tile read or write failure while tiling
    #[error("Tile ({row}, {col}) failed: {source}")]
    TileIo {
        row: u32,
        col: u32,
        #[source]
        source: Box<PipelineError>,
    },

    /// Patch extraction failed for one tile
    #[error("Processing of {} failed: {source}", path.display())]
    Processing {
        path: PathBuf,
        #[source]
        source: Box<PipelineError>,
    },

    /// No tile produced usable results
    #[error("Aggregation error: {0}")]
    Aggregation(String),

    /// Raster codec failure
    #[error(transparent)]
    Tiff(#[from] TiffError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Vector output failure
    #[error("Vector output error: {0}")]
    Vector(String),
}

/// Coarse classification of a `PipelineError`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Resource,
    TileIo,
    Processing,
    Aggregation,
    Codec,
    Io,
    Vector,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Configuration(_) => ErrorKind::Configuration,
            PipelineError::Resource(_) => ErrorKind::Resource,
            PipelineError::TileIo { .. } => ErrorKind::TileIo,
            PipelineError::Processing { .. } => ErrorKind::Processing,
            PipelineError::Aggregation(_) => ErrorKind::Aggregation,
            PipelineError::Tiff(_) => ErrorKind::Codec,
            PipelineError::Io(_) => ErrorKind::Io,
            PipelineError::Vector(_) => ErrorKind::Vector,
        }
    }

    /// Whether the run can continue past this error
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::Processing
    }

    pub fn tile_io(row: u32, col: u32, source: impl Into<PipelineError>) -> Self {
        PipelineError::TileIo { row, col, source: Box::new(source.into()) }
    }

    pub fn processing(path: impl Into<PathBuf>, source: impl Into<PipelineError>) -> Self {
        PipelineError::Processing { path: path.into(), source: Box::new(source.into()) }
    }
}

impl From<rusqlite::Error> for PipelineError {
    fn from(e: rusqlite::Error) -> Self {
        PipelineError::Vector(format!("GeoPackage: {}", e))
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::Vector(format!("GeoJSON: {}", e))
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_and_recoverability() {
        let processing = PipelineError::processing("tiles/tile_0000_0000.tif",
                                                   TiffError::InvalidHeader);
        assert_eq!(processing.kind(), ErrorKind::Processing);
        assert!(processing.is_recoverable());

        let tile = PipelineError::tile_io(1, 2, io::Error::new(io::ErrorKind::Other, "disk full"));
        assert_eq!(tile.kind(), ErrorKind::TileIo);
        assert!(!tile.is_recoverable());
        assert!(tile.to_string().contains("(1, 2)"));
        assert!(tile.to_string().contains("disk full"));

        assert_eq!(PipelineError::from(TiffError::MissingDimensions).kind(), ErrorKind::Codec);
    }

    #[test]
    fn test_processing_message_names_path() {
        let err = PipelineError::processing("a/b.tif", PipelineError::Vector("x".into()));
        assert!(err.to_string().contains("a/b.tif"));
    }
}
