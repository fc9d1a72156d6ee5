//! Stage 1: tiling a raster on disk

mod common;

use std::fs;

use rasterpatch::config::{TileCompression, TilingConfig};
use rasterpatch::error::ErrorKind;
use rasterpatch::pipeline::{discover_tiles, tile_raster};
use rasterpatch::raster::{GeoRaster, Region};
use rasterpatch::tiling::TileGridPlanner;
use rasterpatch::utils::logger::Logger;

use common::{seam_raster, Canvas, EPSG, PIXEL_SIZE};

fn config(tile_size: u32, overlap: u32) -> TilingConfig {
    TilingConfig { tile_size, overlap, ..Default::default() }
}

#[test]
fn test_tiles_cover_raster_with_overlap() {
    let dir = tempfile::tempdir().unwrap();
    let input = seam_raster(dir.path());
    let logger = Logger::disabled();

    let summary = tile_raster(&input, &dir.path().join("work"), &config(40, 4), &logger).unwrap();
    assert_eq!(summary.grid.rows, 2);
    assert_eq!(summary.grid.cols, 3);
    assert_eq!(summary.tiles.len(), 6);
    assert_eq!(summary.tiles_dir, dir.path().join("work").join("tiles"));

    let source = GeoRaster::open(&input).unwrap();
    for spec in summary.grid.iter() {
        let tile = GeoRaster::open(&spec.path_in(&summary.tiles_dir)).unwrap();
        assert_eq!((tile.width, tile.height), (spec.width, spec.height));
        assert_eq!(tile.epsg(), Some(EPSG as u32));

        let (x, y) = tile.geo_transform.apply(0.0, 0.0);
        assert_eq!(x, 500_000.0 + spec.x as f64 * PIXEL_SIZE);
        assert_eq!(y, 4_000_000.0 - spec.y as f64 * PIXEL_SIZE);

        let expected = source.read_window(spec.region()).unwrap();
        let actual = tile.read_all().unwrap();
        assert_eq!(actual.values, expected.values, "pixels of {}", spec.name);
    }

    // Neighbouring tiles share exactly the overlap
    let left = summary.grid.get(0, 0).unwrap();
    let right = summary.grid.get(0, 1).unwrap();
    assert_eq!(left.x + left.width - right.x, 4);
}

#[test]
fn test_four_thousand_pixel_grid_windows() {
    let planner = TileGridPlanner::new(2000, 20).unwrap();
    let grid = planner.plan(4000, 4000).unwrap();
    let first = grid.get(0, 0).unwrap();
    let second = grid.get(0, 1).unwrap();
    assert_eq!((first.x, first.width), (0, 2000));
    assert_eq!((second.x, second.width), (1980, 2000));
    assert_eq!(first.name, "tile_0000_0000");
    assert_eq!(grid.cols, 3);
    let last = grid.get(0, 2).unwrap();
    assert_eq!(last.x + last.width, 4000);
}

#[test]
fn test_tiling_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let input = Canvas::new(50, 30).fill(3, 3, 20, 10, 7.0).write(&dir.path().join("in.tif"));
    let logger = Logger::disabled();
    let cfg = TilingConfig { compression: TileCompression::Zstd, ..config(24, 2) };

    let first = tile_raster(&input, dir.path(), &cfg, &logger).unwrap();
    let bytes: Vec<Vec<u8>> = first.tiles.iter().map(|p| fs::read(p).unwrap()).collect();

    let second = tile_raster(&input, dir.path(), &cfg, &logger).unwrap();
    assert_eq!(first.tiles, second.tiles);
    let again: Vec<Vec<u8>> = second.tiles.iter().map(|p| fs::read(p).unwrap()).collect();
    assert_eq!(bytes, again);
    assert_eq!(discover_tiles(&second.tiles_dir).unwrap(), second.tiles);
}

#[test]
fn test_small_raster_is_one_tile() {
    let dir = tempfile::tempdir().unwrap();
    let input = Canvas::new(10, 7).fill(0, 0, 10, 7, 1.0).write(&dir.path().join("small.tif"));
    let summary = tile_raster(&input, dir.path(), &config(2000, 20), &Logger::disabled()).unwrap();
    assert_eq!(summary.tiles.len(), 1);
    let tile = GeoRaster::open(&summary.tiles[0]).unwrap();
    assert_eq!((tile.width, tile.height), (10, 7));
    assert_eq!(tile.read_window(Region::new(0, 0, 10, 7)).unwrap().valid_count(), 70);
}

#[test]
fn test_configuration_and_resource_errors() {
    let dir = tempfile::tempdir().unwrap();
    let logger = Logger::disabled();
    let input = Canvas::new(8, 8).write(&dir.path().join("in.tif"));

    let err = tile_raster(&input, dir.path(), &config(16, 16), &logger).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let err = tile_raster(&dir.path().join("nope.tif"), dir.path(), &config(16, 2), &logger).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resource);
}

#[test]
fn test_journal_records_tiling() {
    let dir = tempfile::tempdir().unwrap();
    let input = Canvas::new(30, 30).write(&dir.path().join("in.tif"));
    let journal = dir.path().join("logs").join("run.log");
    let logger = Logger::new(&journal).unwrap();

    tile_raster(&input, dir.path(), &config(16, 2), &logger).unwrap();
    let text = fs::read_to_string(&journal).unwrap();
    assert!(text.contains("Tiling"));
    assert!(text.contains("tile_size"));
}
