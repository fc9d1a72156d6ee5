//! Tests for the TIFF codec and raster window reads

mod test_utils;
mod byte_order_tests;
