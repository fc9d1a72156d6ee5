//! Sample layouts supported for raster data
//!
//! Maps the BitsPerSample / SampleFormat tag pair onto a closed set of
//! numeric types and converts between raw block bytes and `f64` values.

use byteorder::{BigEndian, ByteOrder as ByteOrderCodec, LittleEndian};

use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::tiff::constants::sample_format;
use crate::tiff::errors::{TiffError, TiffResult};

/// Numeric type of one raster sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl SampleType {
    /// Resolves the sample type from BitsPerSample and SampleFormat
    pub fn from_tags(bits: u16, format: u16) -> TiffResult<Self> {
        match (bits, format) {
            (8, sample_format::UNSIGNED) => Ok(SampleType::U8),
            (8, sample_format::SIGNED) => Ok(SampleType::I8),
            (16, sample_format::UNSIGNED) => Ok(SampleType::U16),
            (16, sample_format::SIGNED) => Ok(SampleType::I16),
            (32, sample_format::UNSIGNED) => Ok(SampleType::U32),
            (32, sample_format::SIGNED) => Ok(SampleType::I32),
            (32, sample_format::IEEEFP) => Ok(SampleType::F32),
            (64, sample_format::IEEEFP) => Ok(SampleType::F64),
            _ => Err(TiffError::UnsupportedSampleFormat { bits, format }),
        }
    }

    /// Size of one sample in bytes
    pub fn bytes(&self) -> usize {
        match self {
            SampleType::U8 | SampleType::I8 => 1,
            SampleType::U16 | SampleType::I16 => 2,
            SampleType::U32 | SampleType::I32 | SampleType::F32 => 4,
            SampleType::F64 => 8,
        }
    }

    /// Value for the BitsPerSample tag
    pub fn bits(&self) -> u16 {
        (self.bytes() * 8) as u16
    }

    /// Value for the SampleFormat tag
    pub fn sample_format(&self) -> u16 {
        match self {
            SampleType::U8 | SampleType::U16 | SampleType::U32 => sample_format::UNSIGNED,
            SampleType::I8 | SampleType::I16 | SampleType::I32 => sample_format::SIGNED,
            SampleType::F32 | SampleType::F64 => sample_format::IEEEFP,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, SampleType::F32 | SampleType::F64)
    }

    /// Decodes one sample from the start of `buf`
    pub fn decode(&self, buf: &[u8], handler: &dyn ByteOrderHandler) -> f64 {
        match self {
            SampleType::U8 => buf[0] as f64,
            SampleType::I8 => buf[0] as i8 as f64,
            SampleType::U16 => handler.decode_u16(buf) as f64,
            SampleType::I16 => handler.decode_u16(buf) as i16 as f64,
            SampleType::U32 => handler.decode_u32(buf) as f64,
            SampleType::I32 => handler.decode_u32(buf) as i32 as f64,
            SampleType::F32 => handler.decode_f32(buf) as f64,
            SampleType::F64 => handler.decode_f64(buf),
        }
    }

    /// Appends one sample in little-endian order
    ///
    /// Values are those previously decoded from the same type, so the
    /// narrowing casts are exact.
    pub fn encode_le(&self, value: f64, out: &mut Vec<u8>) {
        match self {
            SampleType::U8 => out.push(value as u8),
            SampleType::I8 => out.push(value as i8 as u8),
            SampleType::U16 => out.extend_from_slice(&(value as u16).to_le_bytes()),
            SampleType::I16 => out.extend_from_slice(&(value as i16).to_le_bytes()),
            SampleType::U32 => out.extend_from_slice(&(value as u32).to_le_bytes()),
            SampleType::I32 => out.extend_from_slice(&(value as i32).to_le_bytes()),
            SampleType::F32 => out.extend_from_slice(&(value as f32).to_le_bytes()),
            SampleType::F64 => out.extend_from_slice(&value.to_le_bytes()),
        }
    }

    /// Parses a nodata string (GDAL_NODATA) for this sample type
    pub fn parse_nodata(&self, text: &str) -> Option<f64> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("nan") {
            return if self.is_float() { Some(f64::NAN) } else { None };
        }
        text.parse::<f64>().ok()
    }
}

/// Undoes horizontal differencing (Predictor = 2) in place
///
/// `row_samples` is the number of samples in one row of the block and
/// `stride` the number of interleaved samples per pixel.
pub fn undo_horizontal_predictor(
    data: &mut [u8],
    sample_type: SampleType,
    row_samples: usize,
    stride: usize,
    order: ByteOrder,
) -> TiffResult<()> {
    if sample_type.is_float() {
        return Err(TiffError::GenericError(
            "Horizontal predictor is not defined for floating point samples".to_string()));
    }

    match order {
        ByteOrder::LittleEndian => accumulate::<LittleEndian>(data, sample_type.bytes(), row_samples, stride),
        ByteOrder::BigEndian => accumulate::<BigEndian>(data, sample_type.bytes(), row_samples, stride),
    }
    Ok(())
}

fn accumulate<B: ByteOrderCodec>(data: &mut [u8], bytes: usize, row_samples: usize, stride: usize) {
    let row_bytes = row_samples * bytes;
    if row_bytes == 0 {
        return;
    }

    for row in data.chunks_mut(row_bytes) {
        let samples = row.len() / bytes;
        for i in stride..samples {
            let (prev, cur) = ((i - stride) * bytes, i * bytes);
            match bytes {
                1 => row[cur] = row[cur].wrapping_add(row[prev]),
                2 => {
                    let value = B::read_u16(&row[cur..]).wrapping_add(B::read_u16(&row[prev..]));
                    B::write_u16(&mut row[cur..], value);
                }
                _ => {
                    let value = B::read_u32(&row[cur..]).wrapping_add(B::read_u32(&row[prev..]));
                    B::write_u32(&mut row[cur..], value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::byte_order::{BigEndianHandler, LittleEndianHandler};

    #[test]
    fn test_from_tags() {
        assert_eq!(SampleType::from_tags(16, 2).unwrap(), SampleType::I16);
        assert_eq!(SampleType::from_tags(32, 3).unwrap(), SampleType::F32);
        assert!(SampleType::from_tags(12, 1).is_err());
        assert!(SampleType::from_tags(8, 3).is_err());
    }

    #[test]
    fn test_signed_decode_respects_byte_order() {
        let le = [0xFE, 0xFF];
        let be = [0xFF, 0xFE];
        assert_eq!(SampleType::I16.decode(&le, &LittleEndianHandler), -2.0);
        assert_eq!(SampleType::I16.decode(&be, &BigEndianHandler), -2.0);
    }

    #[test]
    fn test_encode_matches_decode() {
        let mut out = Vec::new();
        SampleType::I32.encode_le(-123456.0, &mut out);
        assert_eq!(SampleType::I32.decode(&out, &LittleEndianHandler), -123456.0);
    }

    #[test]
    fn test_predictor_u8_rows_are_independent() {
        let mut data = vec![1, 1, 1, 5, 1, 1];
        undo_horizontal_predictor(&mut data, SampleType::U8, 3, 1, ByteOrder::LittleEndian).unwrap();
        assert_eq!(data, vec![1, 2, 3, 5, 6, 7]);
    }

    #[test]
    fn test_predictor_u16_big_endian() {
        let mut data = vec![0x01, 0x00, 0x00, 0x02];
        undo_horizontal_predictor(&mut data, SampleType::U16, 2, 1, ByteOrder::BigEndian).unwrap();
        assert_eq!(data, vec![0x01, 0x00, 0x01, 0x02]);
    }

    #[test]
    fn test_nodata_parsing() {
        assert_eq!(SampleType::U8.parse_nodata(" 255 "), Some(255.0));
        assert!(SampleType::F32.parse_nodata("nan").unwrap().is_nan());
        assert_eq!(SampleType::U8.parse_nodata("nan"), None);
    }
}
