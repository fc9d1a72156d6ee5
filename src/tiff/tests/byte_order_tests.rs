//! Tests for the byte order module

use std::io::Cursor;
use byteorder::{LittleEndian, BigEndian, WriteBytesExt};
use crate::io::byte_order::{ByteOrder, ByteOrderHandler, LittleEndianHandler, BigEndianHandler};

#[test]
fn test_byte_order_detection() {
    let mut le = Vec::new();
    le.write_u16::<LittleEndian>(0x4949).unwrap();
    assert_eq!(ByteOrder::detect(&mut Cursor::new(le)).unwrap(), ByteOrder::LittleEndian);

    let mut be = Vec::new();
    be.write_u16::<BigEndian>(0x4D4D).unwrap();
    assert_eq!(ByteOrder::detect(&mut Cursor::new(be)).unwrap(), ByteOrder::BigEndian);
}

#[test]
fn test_byte_order_detection_invalid() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x1234).unwrap();
    assert!(ByteOrder::detect(&mut Cursor::new(buffer)).is_err());
}

#[test]
fn test_little_endian_handler() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x1234).unwrap();
    buffer.write_u32::<LittleEndian>(0x12345678).unwrap();
    buffer.write_u64::<LittleEndian>(0x1234567890ABCDEF).unwrap();
    buffer.write_f64::<LittleEndian>(-2.5).unwrap();
    let mut cursor = Cursor::new(buffer);

    let handler = LittleEndianHandler;
    assert_eq!(handler.read_u16(&mut cursor).unwrap(), 0x1234);
    assert_eq!(handler.read_u32(&mut cursor).unwrap(), 0x12345678);
    assert_eq!(handler.read_u64(&mut cursor).unwrap(), 0x1234567890ABCDEF);
    assert_eq!(handler.read_f64(&mut cursor).unwrap(), -2.5);
}

#[test]
fn test_big_endian_handler() {
    let mut buffer = Vec::new();
    buffer.write_u16::<BigEndian>(0x1234).unwrap();
    buffer.write_u32::<BigEndian>(0x12345678).unwrap();
    buffer.write_u64::<BigEndian>(0x1234567890ABCDEF).unwrap();
    let mut cursor = Cursor::new(buffer);

    let handler = BigEndianHandler;
    assert_eq!(handler.read_u16(&mut cursor).unwrap(), 0x1234);
    assert_eq!(handler.read_u32(&mut cursor).unwrap(), 0x12345678);
    assert_eq!(handler.read_u64(&mut cursor).unwrap(), 0x1234567890ABCDEF);
}

#[test]
fn test_decode_from_memory() {
    let mut be = Vec::new();
    be.write_f32::<BigEndian>(1.5).unwrap();
    be.write_u16::<BigEndian>(0xBEEF).unwrap();
    assert_eq!(BigEndianHandler.decode_f32(&be), 1.5);
    assert_eq!(BigEndianHandler.decode_u16(&be[4..]), 0xBEEF);
    assert_eq!(LittleEndianHandler.decode_u16(&[0xEF, 0xBE]), 0xBEEF);
    assert_eq!(BigEndianHandler.byte_order(), ByteOrder::BigEndian);
}
