//! Patch extraction
//!
//! Labels connected valid pixels of a tile and traces every patch into a
//! polygon feature with its planar area.

pub mod feature;
pub mod labeling;
pub mod vectorize;
pub mod extractor;
#[cfg(test)]
pub(crate) mod test_support;

pub use extractor::PatchExtractor;
pub use feature::{AttributeValue, FeatureCollection, FieldType, PatchGeometry, PolygonFeature, Schema};
pub use labeling::{label_components, Connectivity, LabelGrid};
pub use vectorize::vectorize;
