//! I/O utilities for file handling
//!
//! This module provides traits and implementations for byte-order aware reads.

pub mod seekable;
pub mod byte_order;
