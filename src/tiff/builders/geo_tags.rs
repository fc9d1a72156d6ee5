//! GeoTIFF tag strategies
//!
//! Tags that place a raster on the map: pixel scale and tiepoint for the
//! transform, the GeoKey directory with its parameter tags, and GDAL's
//! nodata marker.

use std::collections::BTreeMap;
use log::debug;

use crate::raster::GeoTransform;
use crate::tiff::constants::{field_types, tags};
use crate::tiff::geo_keys::GeoKeys;
use crate::tiff::ifd::IFD;
use crate::utils::write_utils;

/// Handles GeoTIFF tags
pub struct GeoTagsBuilder;

impl GeoTagsBuilder {
    /// Write the transform as ModelPixelScale + ModelTiepoint
    ///
    /// The tiepoint anchors pixel (0,0) of this image, so a window cut from a
    /// larger raster passes a transform already shifted to its origin.
    pub fn add_geo_transform(
        ifd: &mut IFD,
        external_data: &mut BTreeMap<u16, Vec<u8>>,
        transform: &GeoTransform,
    ) {
        debug!("Adding geotransform {:?}", transform);

        write_utils::store_tag_bytes(
            ifd, external_data, tags::MODEL_PIXEL_SCALE_TAG, field_types::DOUBLE, 3,
            write_utils::doubles_to_bytes(&transform.pixel_scale()));
        write_utils::store_tag_bytes(
            ifd, external_data, tags::MODEL_TIEPOINT_TAG, field_types::DOUBLE, 6,
            write_utils::doubles_to_bytes(&transform.tiepoint()));
    }

    /// Copy the GeoKey directory and the parameter tags it refers to
    pub fn add_geo_keys(
        ifd: &mut IFD,
        external_data: &mut BTreeMap<u16, Vec<u8>>,
        keys: &GeoKeys,
    ) {
        let directory = keys.directory.to_values();
        debug!("Adding GeoKey directory with {} keys", keys.directory.entries.len());
        write_utils::store_tag_bytes(
            ifd, external_data, tags::GEO_KEY_DIRECTORY_TAG, field_types::SHORT, directory.len() as u64,
            write_utils::shorts_to_bytes(&directory));

        if !keys.double_params.is_empty() {
            write_utils::store_tag_bytes(
                ifd, external_data, tags::GEO_DOUBLE_PARAMS_TAG, field_types::DOUBLE,
                keys.double_params.len() as u64, write_utils::doubles_to_bytes(&keys.double_params));
        }

        if let Some(ascii) = &keys.ascii_params {
            let bytes = write_utils::ascii_to_bytes(ascii);
            let count = bytes.len() as u64;
            write_utils::store_tag_bytes(ifd, external_data, tags::GEO_ASCII_PARAMS_TAG, field_types::ASCII, count, bytes);
        }
    }

    /// Add a GDAL NoData tag
    pub fn add_nodata_tag(
        ifd: &mut IFD,
        external_data: &mut BTreeMap<u16, Vec<u8>>,
        nodata_value: &str,
    ) {
        debug!("Adding GDAL_NODATA '{}'", nodata_value);
        let bytes = write_utils::ascii_to_bytes(nodata_value);
        let count = bytes.len() as u64;
        write_utils::store_tag_bytes(ifd, external_data, tags::GDAL_NODATA, field_types::ASCII, count, bytes);
    }
}
