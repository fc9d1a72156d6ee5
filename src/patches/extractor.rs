//! Per-tile patch extraction
//!
//! Opens one tile, labels its valid pixels, traces each patch and attaches
//! `patch_id`, `tile` and `area`.

use std::path::Path;
use log::debug;

use crate::error::{PipelineError, PipelineResult};
use crate::patches::feature::{round_area, PatchGeometry, PolygonFeature, ATTR_AREA, ATTR_PATCH_ID, ATTR_TILE};
use crate::patches::labeling::{label_components, Connectivity};
use crate::patches::vectorize::vectorize;
use crate::raster::{GeoRaster, GeoTransform, RasterWindow};

/// Turns raster tiles into polygon features
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchExtractor {
    connectivity: Connectivity,
    zero_as_nodata: bool,
}

impl Default for PatchExtractor {
    fn default() -> Self {
        Self::new(false)
    }
}

impl PatchExtractor {
    pub fn new(zero_as_nodata: bool) -> Self {
        PatchExtractor { connectivity: Connectivity::Eight, zero_as_nodata }
    }

    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Extracts the patches of one tile file
    ///
    /// Any failure is reported as a processing error naming the tile.
    pub fn extract(&self, tile_path: &Path) -> PipelineResult<Vec<PolygonFeature>> {
        self.extract_file(tile_path)
            .map_err(|e| PipelineError::processing(tile_path, e))
    }

    fn extract_file(&self, tile_path: &Path) -> PipelineResult<Vec<PolygonFeature>> {
        let raster = GeoRaster::open(tile_path)?;
        let mut window = raster.read_all()?;
        window.zero_as_nodata = self.zero_as_nodata;

        let tile_name = tile_path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let features = self.extract_window(&window, &raster.geo_transform, &tile_name);
        debug!("{}: {} patches", tile_path.display(), features.len());
        Ok(features)
    }

    /// Extracts the patches of an in-memory window
    ///
    /// # Arguments
    /// * `window` - Pixel values with their validity rules
    /// * `transform` - Georeferencing of the window's top-left corner
    /// * `tile_name` - Value of the `tile` attribute
    pub fn extract_window(&self, window: &RasterWindow, transform: &GeoTransform, tile_name: &str) -> Vec<PolygonFeature> {
        let grid = label_components(window, self.connectivity);
        if grid.count == 0 {
            return Vec::new();
        }

        vectorize(&grid, transform)
            .into_iter()
            .filter(|(_, geometry)| !geometry.0.is_empty())
            .map(|(label, geometry)| {
                let geometry = PatchGeometry::from_polygons(geometry.0);
                let area = round_area(geometry.unsigned_area());
                PolygonFeature::new(geometry)
                    .with_attribute(ATTR_PATCH_ID, label as i64)
                    .with_attribute(ATTR_TILE, tile_name)
                    .with_attribute(ATTR_AREA, area)
            })
            .collect()
    }
}
