//! Output driver selection
//!
//! The output file extension picks the writer; unknown extensions are
//! rejected before any processing starts.

use std::fs;
use std::path::Path;
use log::info;

use crate::error::{PipelineError, PipelineResult};
use crate::patches::FeatureCollection;
use crate::vector::geojson_writer::GeoJsonWriter;
use crate::vector::geopackage::GeoPackageWriter;
use crate::vector::shapefile::ShapefileWriter;
use crate::vector::writer::VectorWriter;

/// Supported vector formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputDriver {
    GeoJson,
    Shapefile,
    GeoPackage,
}

impl OutputDriver {
    /// Driver for an output path, by case-insensitive extension
    pub fn from_path(path: &Path) -> PipelineResult<Self> {
        let extension = path.extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "geojson" => Ok(OutputDriver::GeoJson),
            "shp" => Ok(OutputDriver::Shapefile),
            "gpkg" => Ok(OutputDriver::GeoPackage),
            _ => Err(PipelineError::Configuration(format!(
                "Unsupported output format '{}': expected .shp, .gpkg or .geojson", path.display()))),
        }
    }

    pub fn create_writer(&self) -> Box<dyn VectorWriter> {
        match self {
            OutputDriver::GeoJson => Box::new(GeoJsonWriter),
            OutputDriver::Shapefile => Box::new(ShapefileWriter),
            OutputDriver::GeoPackage => Box::new(GeoPackageWriter::default()),
        }
    }
}

/// Writes a layer with the driver its path selects
///
/// Missing parent directories are created.
pub fn write_layer(layer: &FeatureCollection, epsg: Option<u32>, path: &Path) -> PipelineResult<()> {
    let writer = OutputDriver::from_path(path)?.create_writer();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::Resource(format!(
                "Cannot create output directory {}: {}", parent.display(), e)))?;
        }
    }

    writer.write(layer, epsg, path)?;
    info!("Wrote {} features to {} ({})", layer.len(), path.display(), writer.name());
    Ok(())
}
