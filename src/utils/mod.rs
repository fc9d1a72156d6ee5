//! Utility modules
//!
//! Run journal, progress reporting and the byte layout helpers of the TIFF
//! writer.

pub mod logger;
pub mod progress;
pub(crate) mod write_utils;
