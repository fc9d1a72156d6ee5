//! Byte order handling for TIFF files
//!
//! This module implements the Strategy pattern for handling different
//! byte orders (little-endian vs big-endian) when reading TIFF data,
//! both for header structures and for decoded pixel samples.

use byteorder::{BigEndian, ByteOrder as ByteOrderCodec, LittleEndian, ReadBytesExt};
use std::io::Result;

use crate::io::seekable::SeekableReader;
use crate::tiff::errors::{TiffError, TiffResult};

/// Represents the byte order of a TIFF file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order (II)
    LittleEndian,
    /// Big-endian byte order (MM)
    BigEndian,
}

impl ByteOrder {
    /// Detects the byte order from the TIFF header
    pub fn detect(reader: &mut dyn SeekableReader) -> TiffResult<Self> {
        let byte_order = reader.read_u16::<LittleEndian>()?;
        match byte_order {
            0x4949 => Ok(ByteOrder::LittleEndian), // "II" (Intel)
            0x4D4D => Ok(ByteOrder::BigEndian),    // "MM" (Motorola)
            _ => Err(TiffError::InvalidByteOrder(byte_order)),
        }
    }

    /// Returns a string representation of this byte order
    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "Little Endian (II)",
            ByteOrder::BigEndian => "Big Endian (MM)",
        }
    }

    /// Creates the appropriate handler for this byte order
    pub fn create_handler(&self) -> Box<dyn ByteOrderHandler> {
        match self {
            ByteOrder::LittleEndian => Box::new(LittleEndianHandler),
            ByteOrder::BigEndian => Box::new(BigEndianHandler),
        }
    }
}

/// Trait for byte order handling strategies
///
/// The `read_*` methods pull values from a stream while the `decode_*`
/// methods interpret bytes already in memory (decompressed strips and tiles).
pub trait ByteOrderHandler: Send + Sync {
    /// The byte order this handler implements
    fn byte_order(&self) -> ByteOrder;

    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16>;

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32>;

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64>;

    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64>;

    /// Decodes from the start of `buf`, which must hold enough bytes
    fn decode_u16(&self, buf: &[u8]) -> u16;

    fn decode_u32(&self, buf: &[u8]) -> u32;

    fn decode_u64(&self, buf: &[u8]) -> u64;

    fn decode_f32(&self, buf: &[u8]) -> f32;

    fn decode_f64(&self, buf: &[u8]) -> f64;
}

macro_rules! byte_order_handler {
    ($(#[$doc:meta])* $name:ident, $codec:ty, $order:expr) => {
        $(#[$doc])*
        pub struct $name;

        impl ByteOrderHandler for $name {
            fn byte_order(&self) -> ByteOrder {
                $order
            }

            fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
                reader.read_u16::<$codec>()
            }

            fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
                reader.read_u32::<$codec>()
            }

            fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
                reader.read_u64::<$codec>()
            }

            fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64> {
                reader.read_f64::<$codec>()
            }

            fn decode_u16(&self, buf: &[u8]) -> u16 {
                <$codec>::read_u16(buf)
            }

            fn decode_u32(&self, buf: &[u8]) -> u32 {
                <$codec>::read_u32(buf)
            }

            fn decode_u64(&self, buf: &[u8]) -> u64 {
                <$codec>::read_u64(buf)
            }

            fn decode_f32(&self, buf: &[u8]) -> f32 {
                <$codec>::read_f32(buf)
            }

            fn decode_f64(&self, buf: &[u8]) -> f64 {
                <$codec>::read_f64(buf)
            }
        }
    };
}

byte_order_handler!(
    /// Handler for "II" files
    LittleEndianHandler, LittleEndian, ByteOrder::LittleEndian
);

byte_order_handler!(
    /// Handler for "MM" files
    BigEndianHandler, BigEndian, ByteOrder::BigEndian
);
