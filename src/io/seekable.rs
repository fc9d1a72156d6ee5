//! Seekable reader trait
//!
//! Raster windows are read from files, test fixtures are read from
//! in-memory cursors; both go through this trait.

use std::io::{Read, Seek};

/// Trait for readers that can both read and seek
pub trait SeekableReader: Read + Seek + Send + Sync {}

// Blanket implementation for any type that implements the required traits
impl<T: Read + Seek + Send + Sync> SeekableReader for T {}
