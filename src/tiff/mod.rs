//! TIFF file format module
//!
//! Structures and functions for reading TIFF and BigTIFF files and for
//! writing single-band GeoTIFFs.

pub mod errors;
pub mod header;
pub mod ifd;
pub(crate) mod types;
pub mod reader;
pub mod geo_keys;
pub mod builder;
mod builders;
pub(crate) mod constants;
pub(crate) mod validation;
#[cfg(test)]
mod tests;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use errors::{TiffError, TiffResult};
pub use geo_keys::{GeoKeyDirectory, GeoKeyEntry, GeoKeys};
pub use ifd::{IFD, IFDEntry};
pub use reader::TiffReader;
pub use types::TIFF;
pub use builder::TiffBuilder;
