//! TIFF and BigTIFF reader
//!
//! Parses the header and IFD chain and reads tag values on demand. Value
//! decoding goes through the byte order handler picked from the header.

use byteorder::ReadBytesExt;
use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufReader, SeekFrom};
use std::path::{Path, PathBuf};

use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::field_types;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::header::{self, TiffHeader};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::types::TIFF;
use crate::tiff::validation;

/// Upper bound on the IFD chain, guards against offset loops
const MAX_IFDS: usize = 100;

/// Reader for TIFF and BigTIFF files
#[derive(Default)]
pub struct TiffReader {
    byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    current_file: Option<PathBuf>,
    is_big_tiff: bool,
}

impl TiffReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a fresh buffered reader on the loaded file
    pub fn create_reader(&self) -> TiffResult<BufReader<File>> {
        let path = self.current_file.as_ref()
            .ok_or_else(|| TiffError::GenericError("No file path specified".to_string()))?;
        Ok(BufReader::with_capacity(1024 * 1024, File::open(path)?))
    }

    /// Byte order handler of the parsed file
    pub fn handler(&self) -> TiffResult<&dyn ByteOrderHandler> {
        self.byte_order_handler.as_deref()
            .ok_or_else(|| TiffError::GenericError("Byte order not yet determined".to_string()))
    }

    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    /// Parses the file at `path`
    pub fn load(&mut self, path: &Path) -> TiffResult<TIFF> {
        info!("Loading TIFF file: {}", path.display());
        self.current_file = Some(path.to_path_buf());
        let mut reader = BufReader::with_capacity(64 * 1024, File::open(path)?);
        self.read(&mut reader)
    }

    /// Parses header and directories from any seekable stream
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> TiffResult<TIFF> {
        let header = TiffHeader::read(reader)?;
        self.byte_order_handler = Some(header.byte_order.create_handler());
        self.is_big_tiff = header.is_big_tiff;

        let file_size = validation::get_file_size(reader)?;
        validation::validate_ifd_offset(header.first_ifd_offset, file_size)?;

        let mut tiff = TIFF::new(header.is_big_tiff);
        tiff.ifds = self.read_ifd_chain(reader, header.first_ifd_offset, file_size)?;
        if tiff.ifds.is_empty() {
            return Err(TiffError::InvalidHeader);
        }

        debug!("Read {} IFDs", tiff.ifds.len());
        Ok(tiff)
    }

    /// Follows the IFD links from `offset`
    ///
    /// The first directory must parse; a broken link further down ends the
    /// chain with a warning.
    fn read_ifd_chain(&self, reader: &mut dyn SeekableReader, mut offset: u64, file_size: u64) -> TiffResult<Vec<IFD>> {
        let mut ifds: Vec<IFD> = Vec::new();

        while offset != 0 && ifds.len() < MAX_IFDS {
            let ifd = match self.read_ifd(reader, offset, ifds.len()) {
                Ok(ifd) => ifd,
                Err(e) if ifds.is_empty() => return Err(e),
                Err(e) => {
                    warn!("Stopping at unreadable IFD {}: {}", ifds.len(), e);
                    break;
                }
            };
            ifds.push(ifd);

            // read_ifd leaves the stream at the next-IFD link
            offset = match header::read_offset(reader, self.is_big_tiff, self.handler()?) {
                Ok(next) if next == 0 || validation::validate_ifd_offset(next, file_size).is_ok() => next,
                Ok(next) => {
                    warn!("Invalid next IFD offset {}, stopping IFD chain", next);
                    0
                }
                Err(e) => {
                    warn!("Cannot read next IFD offset: {}", e);
                    0
                }
            };
        }

        Ok(ifds)
    }

    /// Reads one directory at `offset`
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> TiffResult<IFD> {
        reader.seek(SeekFrom::Start(offset))?;
        let handler = self.handler()?;
        let count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u16(reader)? as u64
        };
        debug!("IFD #{} at {}: {} entries", number, offset, count);

        let mut ifd = IFD::new(number, offset);
        for _ in 0..count {
            ifd.add_entry(self.read_ifd_entry(reader, handler)?);
        }
        Ok(ifd)
    }

    // Inline values are decoded by their own width, so a SHORT in a
    // big-endian file is not taken for the high half of a LONG.
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader, handler: &dyn ByteOrderHandler) -> TiffResult<IFDEntry> {
        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        let value_position = reader.stream_position()?;
        let width = if self.is_big_tiff { 8 } else { 4 };
        let mut raw = [0u8; 8];
        reader.read_exact(&mut raw[..width])?;

        let mut entry = IFDEntry::with_position(tag, field_type, count, 0, value_position);
        entry.value_offset = if entry.is_value_inline(self.is_big_tiff) {
            match entry.value_size() {
                1 => raw[0] as u64,
                2 => handler.decode_u16(&raw) as u64,
                4 => handler.decode_u32(&raw) as u64,
                _ => handler.decode_u64(&raw),
            }
        } else if self.is_big_tiff {
            handler.decode_u64(&raw)
        } else {
            handler.decode_u32(&raw) as u64
        };
        Ok(entry)
    }

    fn seek_to_values(&self, reader: &mut dyn SeekableReader, entry: &IFDEntry) -> TiffResult<()> {
        let position = if entry.is_value_inline(self.is_big_tiff) {
            entry.value_position
        } else {
            entry.value_offset
        };
        reader.seek(SeekFrom::Start(position))?;
        Ok(())
    }

    /// Integer values of a tag, inline or out of line
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<u64>> {
        let entry = ifd.get_entry(tag).ok_or(TiffError::TagNotFound(tag))?;

        if entry.value_position == 0 && entry.is_value_inline(self.is_big_tiff) {
            // Built in memory: only the single inline value is known
            return Ok(vec![entry.value_offset]);
        }

        self.seek_to_values(reader, entry)?;
        let handler = self.handler()?;
        (0..entry.count)
            .map(|_| -> TiffResult<u64> {
                Ok(match entry.field_type {
                    field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED => reader.read_u8()? as u64,
                    field_types::SHORT | field_types::SSHORT => handler.read_u16(reader)? as u64,
                    field_types::LONG | field_types::SLONG => handler.read_u32(reader)? as u64,
                    field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => handler.read_u64(reader)?,
                    other => return Err(TiffError::UnsupportedFieldType(other)),
                })
            })
            .collect()
    }

    /// DOUBLE values of a tag (pixel scale, tiepoints, GeoDoubleParams)
    pub fn read_f64_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<f64>> {
        let entry = ifd.get_entry(tag).ok_or(TiffError::TagNotFound(tag))?;
        if entry.field_type != field_types::DOUBLE {
            return Err(TiffError::UnsupportedFieldType(entry.field_type));
        }

        self.seek_to_values(reader, entry)?;
        let handler = self.handler()?;
        let values = (0..entry.count)
            .map(|_| handler.read_f64(reader))
            .collect::<std::io::Result<Vec<f64>>>()?;
        Ok(values)
    }

    /// ASCII tag text without the trailing NULs
    pub fn read_ascii(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<String> {
        let entry = ifd.get_entry(tag).ok_or(TiffError::TagNotFound(tag))?;
        if !entry.is_ascii() {
            return Err(TiffError::UnsupportedFieldType(entry.field_type));
        }

        self.seek_to_values(reader, entry)?;
        let mut buffer = vec![0u8; entry.count as usize];
        reader.read_exact(&mut buffer)?;
        while buffer.last() == Some(&0) {
            buffer.pop();
        }

        String::from_utf8(buffer)
            .map_err(|e| TiffError::GenericError(format!("Invalid UTF-8 string: {}", e)))
    }
}
