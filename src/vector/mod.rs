//! Vector output
//!
//! Writers for the merged patch layer. The output file extension selects
//! GeoJSON, ESRI Shapefile or GeoPackage.

pub mod writer;
pub mod driver;
pub mod wkb;
pub mod geojson_writer;
pub mod shapefile;
pub mod geopackage;

pub use driver::{write_layer, OutputDriver};
pub use geojson_writer::GeoJsonWriter;
pub use geopackage::GeoPackageWriter;
pub use shapefile::ShapefileWriter;
pub use writer::VectorWriter;
