//! Two-stage pipeline
//!
//! Stage 1 tiles a raster. Stage 2 extracts patches from every tile in
//! parallel, merges them and writes the vector layer.

pub mod executor;
pub mod merger;
pub mod summary;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use log::{info, warn};

use crate::config::{ExtractionConfig, TilingConfig};
use crate::error::{PipelineError, PipelineResult};
use crate::patches::PatchExtractor;
use crate::raster::GeoRaster;
use crate::tiling::{TileGridPlanner, TileWriter, TilingSummary};
use crate::utils::logger::Logger;
use crate::utils::progress::ProgressTracker;
use crate::vector::{write_layer, OutputDriver};

pub use executor::{ExecutionReport, ParallelExecutor, TaskFailure, TaskOutcome};
pub use merger::{MergeSummary, PatchMerger};
pub use summary::PipelineSummary;

/// Journal write failures never fail a run
fn journal(result: std::io::Result<()>) {
    if let Err(e) = result {
        warn!("Cannot write run journal: {}", e);
    }
}

/// Splits a raster into overlapping GeoTIFF tiles under `<output_dir>/tiles`
///
/// Configuration is checked before anything is read or created. The first
/// tile that cannot be read or written aborts the stage.
pub fn tile_raster(input: &Path, output_dir: &Path, config: &TilingConfig, logger: &Logger) -> PipelineResult<TilingSummary> {
    config.validate()?;
    let planner = TileGridPlanner::new(config.tile_size, config.overlap)?;

    if !input.is_file() {
        return Err(PipelineError::Resource(format!("Input raster not found: {}", input.display())));
    }

    let raster = GeoRaster::open(input)?;
    let grid = planner.plan(raster.width, raster.height)?;
    info!("Tiling {} ({}x{}) into {} tiles of {} px with {} px overlap",
          input.display(), raster.width, raster.height, grid.len(), config.tile_size, config.overlap);

    journal(logger.log_section("Tiling"));
    journal(logger.log(&format!("input: {}", input.display())));
    journal(logger.log_json("config", config));

    let writer = TileWriter::new(&raster, output_dir, config)?;
    let progress = ProgressTracker::optional(grid.len() as u64, "Writing tiles", config.show_progress);
    let summary = writer.write_all(&grid, &progress)?;

    journal(logger.log(&format!("{} tiles ({}x{}) written to {}",
                                summary.tiles.len(), grid.rows, grid.cols, summary.tiles_dir.display())));
    journal(logger.log_timing("tiling", summary.elapsed));
    Ok(summary)
}

/// Lists the tile rasters of a directory in name order
pub fn discover_tiles(tiles_dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    if !tiles_dir.is_dir() {
        return Err(PipelineError::Resource(format!("Tile directory not found: {}", tiles_dir.display())));
    }

    let mut tiles = Vec::new();
    for entry in fs::read_dir(tiles_dir)? {
        let path = entry?.path();
        let is_tiff = path.extension()
            .map(|e| matches!(e.to_string_lossy().to_ascii_lowercase().as_str(), "tif" | "tiff"))
            .unwrap_or(false);
        if is_tiff && path.is_file() {
            tiles.push(path);
        }
    }
    tiles.sort();

    if tiles.is_empty() {
        return Err(PipelineError::Aggregation(format!("No tiles found in {}", tiles_dir.display())));
    }
    Ok(tiles)
}

/// Extracts, merges and writes the patches of every tile in a directory
///
/// Per-tile failures are logged and excluded; the run fails only when no
/// tile yields features.
pub fn extract_patches(tiles_dir: &Path, output: &Path, config: &ExtractionConfig, logger: &Logger) -> PipelineResult<PipelineSummary> {
    OutputDriver::from_path(output)?;
    let executor = ParallelExecutor::new(config.workers)?;
    let tiles = discover_tiles(tiles_dir)?;

    journal(logger.log_section("Extraction"));
    journal(logger.log(&format!("tiles: {} in {}", tiles.len(), tiles_dir.display())));
    journal(logger.log_json("config", config));

    let epsg = tiles.iter()
        .find_map(|tile| GeoRaster::open(tile).ok())
        .and_then(|raster| raster.epsg());

    let extractor = PatchExtractor::new(config.zero_as_nodata);
    let progress = ProgressTracker::optional(tiles.len() as u64, "Extracting patches", config.show_progress);
    let report = executor.run(&tiles, |tile| extractor.extract(tile), &progress)?;

    let failures: Vec<(PathBuf, String)> = report.failures.iter()
        .map(|f| (f.tile.clone(), f.error.to_string()))
        .collect();

    if report.succeeded.is_empty() {
        for (tile, cause) in &failures {
            journal(logger.log(&format!("  failed: {} ({})", tile.display(), cause)));
        }
        return Err(PipelineError::Aggregation(format!(
            "None of {} tiles could be processed", report.attempted)));
    }

    let merge_start = Instant::now();
    let (attempted, succeeded, failed, workers) =
        (report.attempted, report.succeeded_count(), report.failed_count(), report.workers);
    let (layer, merge) = PatchMerger::new(config.merge_strategy).merge(report.succeeded)?;
    write_layer(&layer, epsg, output)?;

    let summary = PipelineSummary {
        output: output.to_path_buf(),
        attempted,
        succeeded,
        failed,
        failures,
        workers,
        merge,
        features_written: layer.len(),
        epsg,
        extraction_elapsed: report.elapsed,
        merge_elapsed: merge_start.elapsed(),
    };

    info!("{}", summary);
    journal(summary.log_to(logger));
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_discovery_sorts_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["tile_0000_0001.tif", "tile_0000_0000.TIF", "notes.txt", "tile_0001_0000.tiff"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.tif")).unwrap();

        let tiles = discover_tiles(dir.path()).unwrap();
        let names: Vec<String> = tiles.iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["tile_0000_0000.TIF", "tile_0000_0001.tif", "tile_0001_0000.tiff"]);
    }

    #[test]
    fn test_discovery_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(discover_tiles(&dir.path().join("missing")).unwrap_err().kind(), ErrorKind::Resource);
        assert_eq!(discover_tiles(dir.path()).unwrap_err().kind(), ErrorKind::Aggregation);
    }

    #[test]
    fn test_bad_output_extension_rejected_before_work() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_patches(&dir.path().join("missing"), &dir.path().join("out.csv"),
                                  &ExtractionConfig::default(), &Logger::disabled()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_tiling_validates_before_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = TilingConfig { tile_size: 10, overlap: 10, ..Default::default() };
        let err = tile_raster(&dir.path().join("missing.tif"), &dir.path().join("out"), &config,
                              &Logger::disabled()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(!dir.path().join("out").exists());

        let err = tile_raster(&dir.path().join("missing.tif"), &dir.path().join("out"),
                              &TilingConfig::default(), &Logger::disabled()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resource);
    }
}
