//! Vector writer interface

use std::path::Path;

use crate::error::PipelineResult;
use crate::patches::FeatureCollection;

/// Writes a feature layer to one output format
pub trait VectorWriter: Send + Sync {
    /// Writes the layer, replacing any existing output at `path`
    ///
    /// # Arguments
    /// * `layer` - Features and their schema
    /// * `epsg` - Coordinate system of the geometries, when known
    /// * `path` - Output file
    fn write(&self, layer: &FeatureCollection, epsg: Option<u32>, path: &Path) -> PipelineResult<()>;

    /// Driver name used in logs
    fn name(&self) -> &'static str;
}
