use std::io::Cursor;
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

/// Value of one fixture tag
pub enum Value {
    Short(Vec<u16>),
    Long(Vec<u32>),
    Double(Vec<f64>),
    Ascii(&'static str),
}

impl Value {
    fn field_type(&self) -> u16 {
        match self {
            Value::Short(_) => 3,
            Value::Long(_) => 4,
            Value::Double(_) => 12,
            Value::Ascii(_) => 2,
        }
    }

    fn count(&self) -> u32 {
        match self {
            Value::Short(v) => v.len() as u32,
            Value::Long(v) => v.len() as u32,
            Value::Double(v) => v.len() as u32,
            Value::Ascii(s) => s.len() as u32 + 1,
        }
    }

    fn bytes<B: ByteOrder>(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            Value::Short(v) => v.iter().for_each(|x| out.write_u16::<B>(*x).unwrap()),
            Value::Long(v) => v.iter().for_each(|x| out.write_u32::<B>(*x).unwrap()),
            Value::Double(v) => v.iter().for_each(|x| out.write_f64::<B>(*x).unwrap()),
            Value::Ascii(s) => {
                out.extend_from_slice(s.as_bytes());
                out.push(0);
            }
        }
        out
    }
}

/// Encodes a classic TIFF in byte order `B` with the given tags and blocks
///
/// The block offset and byte count tables are generated (tile tables when
/// `tiled`, strip tables otherwise).
pub fn build_tiff<B: ByteOrder>(mut entries: Vec<(u16, Value)>, blocks: &[Vec<u8>], tiled: bool) -> Vec<u8> {
    let (offsets_tag, counts_tag) = if tiled { (324, 325) } else { (273, 279) };
    entries.push((counts_tag, Value::Long(blocks.iter().map(|b| b.len() as u32).collect())));
    entries.push((offsets_tag, Value::Long(vec![0; blocks.len()])));
    entries.sort_by_key(|(tag, _)| *tag);

    let mut cursor = 8 + 2 + 12 * entries.len() + 4;
    let mut external = Vec::new();
    for (_, value) in &entries {
        let len = value.bytes::<B>().len();
        if len > 4 {
            external.push(Some(cursor));
            cursor += len;
        } else {
            external.push(None);
        }
    }

    let mut block_offsets = Vec::new();
    for block in blocks {
        block_offsets.push(cursor as u32);
        cursor += block.len();
    }
    for (tag, value) in entries.iter_mut() {
        if *tag == offsets_tag {
            *value = Value::Long(block_offsets.clone());
        }
    }

    let mut out = Vec::new();
    let little = B::read_u16(&[1, 0]) == 1;
    out.extend_from_slice(if little { b"II" } else { b"MM" });
    out.write_u16::<B>(42).unwrap();
    out.write_u32::<B>(8).unwrap();

    out.write_u16::<B>(entries.len() as u16).unwrap();
    for ((tag, value), position) in entries.iter().zip(&external) {
        out.write_u16::<B>(*tag).unwrap();
        out.write_u16::<B>(value.field_type()).unwrap();
        out.write_u32::<B>(value.count()).unwrap();
        match position {
            Some(p) => out.write_u32::<B>(*p as u32).unwrap(),
            None => {
                let mut inline = value.bytes::<B>();
                inline.resize(4, 0);
                out.extend_from_slice(&inline);
            }
        }
    }
    out.write_u32::<B>(0).unwrap();

    for ((_, value), position) in entries.iter().zip(&external) {
        if position.is_some() {
            out.extend_from_slice(&value.bytes::<B>());
        }
    }
    for block in blocks {
        out.extend_from_slice(block);
    }
    out
}

/// Writes fixture bytes to a file inside `dir`
pub fn write_fixture(dir: &std::path::Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Creates a test buffer with a minimal little-endian TIFF header and IFD
pub fn create_test_tiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II for little-endian
    buffer.write_u16::<LittleEndian>(42).unwrap();     // TIFF magic number
    buffer.write_u32::<LittleEndian>(8).unwrap();      // IFD offset

    buffer.write_u16::<LittleEndian>(2).unwrap();      // Entry count

    buffer.write_u16::<LittleEndian>(256).unwrap();    // ImageWidth
    buffer.write_u16::<LittleEndian>(4).unwrap();      // LONG
    buffer.write_u32::<LittleEndian>(1).unwrap();
    buffer.write_u32::<LittleEndian>(800).unwrap();

    buffer.write_u16::<LittleEndian>(257).unwrap();    // ImageLength
    buffer.write_u16::<LittleEndian>(4).unwrap();      // LONG
    buffer.write_u32::<LittleEndian>(1).unwrap();
    buffer.write_u32::<LittleEndian>(600).unwrap();

    buffer.write_u32::<LittleEndian>(0).unwrap();      // No next IFD

    Cursor::new(buffer)
}

/// Creates a test buffer with a minimal BigTIFF header and IFD
pub fn create_test_bigtiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II for little-endian
    buffer.write_u16::<LittleEndian>(43).unwrap();     // BigTIFF version
    buffer.write_u16::<LittleEndian>(8).unwrap();      // Offset size
    buffer.write_u16::<LittleEndian>(0).unwrap();      // Reserved
    buffer.write_u64::<LittleEndian>(16).unwrap();     // IFD offset

    buffer.write_u64::<LittleEndian>(3).unwrap();      // Entry count

    buffer.write_u16::<LittleEndian>(256).unwrap();    // ImageWidth
    buffer.write_u16::<LittleEndian>(4).unwrap();      // LONG
    buffer.write_u64::<LittleEndian>(1).unwrap();
    buffer.write_u64::<LittleEndian>(1024).unwrap();

    buffer.write_u16::<LittleEndian>(257).unwrap();    // ImageLength
    buffer.write_u16::<LittleEndian>(4).unwrap();      // LONG
    buffer.write_u64::<LittleEndian>(1).unwrap();
    buffer.write_u64::<LittleEndian>(768).unwrap();

    buffer.write_u16::<LittleEndian>(258).unwrap();    // BitsPerSample, three inline SHORTs
    buffer.write_u16::<LittleEndian>(3).unwrap();
    buffer.write_u64::<LittleEndian>(3).unwrap();
    for bits in [8u16, 16, 32, 0] {
        buffer.write_u16::<LittleEndian>(bits).unwrap();
    }

    buffer.write_u64::<LittleEndian>(0).unwrap();      // No next IFD

    Cursor::new(buffer)
}
