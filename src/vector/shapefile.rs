//! ESRI Shapefile output
//!
//! Writes `.shp`, `.shx`, `.dbf` and a `.cpg` naming the attribute encoding.
//! All records are polygon shapes (type 5); every ring of every part becomes
//! a shapefile part, exteriors clockwise and holes counter-clockwise.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use log::warn;

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use chrono::{Datelike, Local, NaiveDate};
use geo::orient::{Direction, Orient};
use geo::{LineString, Rect};

use crate::error::{PipelineError, PipelineResult};
use crate::patches::{AttributeValue, FeatureCollection, FieldType, PolygonFeature};
use crate::vector::wkb::{bounds, merge_bounds};
use crate::vector::writer::VectorWriter;

const FILE_CODE: i32 = 9994;
const VERSION: i32 = 1000;
const SHAPE_POLYGON: i32 = 5;
const HEADER_BYTES: usize = 100;
const MAX_FIELD_NAME: usize = 10;
const MAX_TEXT_WIDTH: usize = 254;

pub struct ShapefileWriter;

/// One dBASE column
#[derive(Debug, Clone, PartialEq)]
struct DbfField {
    /// Attribute name in the layer schema
    source: String,
    /// Column name, at most 10 bytes
    name: String,
    kind: u8,
    width: usize,
    decimals: usize,
}

impl DbfField {
    fn format(&self, value: Option<&AttributeValue>) -> String {
        let text = match value {
            Some(AttributeValue::Int(v)) => format!("{:>w$}", v, w = self.width),
            Some(AttributeValue::Real(v)) => format!("{:>w$.d$}", v, w = self.width, d = self.decimals),
            Some(AttributeValue::Text(v)) => format!("{:<w$}", v, w = self.width),
            None => " ".repeat(self.width),
        };
        // Values wider than the column are cut rather than shifting later fields
        text.chars().take(self.width).collect()
    }
}

fn dbf_fields(layer: &FeatureCollection) -> Vec<DbfField> {
    let mut used: Vec<String> = Vec::new();
    layer.schema.fields().iter().map(|(name, field_type)| {
        let mut column: String = name.chars().take(MAX_FIELD_NAME).collect();
        let mut suffix = 1;
        while used.contains(&column) {
            let tail = format!("_{}", suffix);
            column = name.chars().take(MAX_FIELD_NAME - tail.len()).collect::<String>() + &tail;
            suffix += 1;
        }
        used.push(column.clone());

        let (kind, width, decimals) = match field_type {
            FieldType::Integer => (b'N', 18, 0),
            FieldType::Real => (b'N', 24, 6),
            FieldType::Text => {
                let longest = layer.features.iter()
                    .filter_map(|f| f.get(name).and_then(AttributeValue::as_str))
                    .map(|s| s.chars().count())
                    .max()
                    .unwrap_or(1);
                (b'C', longest.clamp(1, MAX_TEXT_WIDTH), 0)
            }
        };
        DbfField { source: name.clone(), name: column, kind, width, decimals }
    }).collect()
}

/// Rings of a feature in shapefile winding order
fn feature_rings(feature: &PolygonFeature) -> Vec<LineString<f64>> {
    feature.geometry.polygons()
        .into_iter()
        .flat_map(|polygon| {
            let oriented = polygon.orient(Direction::Reversed);
            std::iter::once(oriented.exterior().clone())
                .chain(oriented.interiors().iter().cloned())
                .collect::<Vec<_>>()
        })
        .collect()
}

fn record_content(rings: &[LineString<f64>], rect: Rect<f64>) -> io::Result<Vec<u8>> {
    let points: usize = rings.iter().map(|r| r.0.len()).sum();
    let mut out = Vec::with_capacity(44 + 4 * rings.len() + 16 * points);
    out.write_i32::<LittleEndian>(SHAPE_POLYGON)?;
    write_box(&mut out, rect)?;
    out.write_i32::<LittleEndian>(rings.len() as i32)?;
    out.write_i32::<LittleEndian>(points as i32)?;

    let mut start = 0;
    for ring in rings {
        out.write_i32::<LittleEndian>(start as i32)?;
        start += ring.0.len();
    }
    for ring in rings {
        for coord in &ring.0 {
            out.write_f64::<LittleEndian>(coord.x)?;
            out.write_f64::<LittleEndian>(coord.y)?;
        }
    }
    Ok(out)
}

fn write_box<W: Write>(out: &mut W, rect: Rect<f64>) -> io::Result<()> {
    out.write_f64::<LittleEndian>(rect.min().x)?;
    out.write_f64::<LittleEndian>(rect.min().y)?;
    out.write_f64::<LittleEndian>(rect.max().x)?;
    out.write_f64::<LittleEndian>(rect.max().y)
}

fn write_main_header<W: Write>(out: &mut W, file_bytes: usize, extent: Rect<f64>) -> io::Result<()> {
    out.write_i32::<BigEndian>(FILE_CODE)?;
    for _ in 0..5 {
        out.write_i32::<BigEndian>(0)?;
    }
    out.write_i32::<BigEndian>((file_bytes / 2) as i32)?;
    out.write_i32::<LittleEndian>(VERSION)?;
    out.write_i32::<LittleEndian>(SHAPE_POLYGON)?;
    write_box(out, extent)?;
    for _ in 0..4 {
        out.write_f64::<LittleEndian>(0.0)?;
    }
    Ok(())
}

/// dBASE "last update" bytes: years since 1900, month, day
fn dbf_date(date: NaiveDate) -> [u8; 3] {
    [(date.year() - 1900).clamp(0, 255) as u8, date.month() as u8, date.day() as u8]
}

fn write_dbf<W: Write>(out: &mut W, layer: &FeatureCollection, fields: &[DbfField]) -> io::Result<()> {
    let header_len = 32 + 32 * fields.len() + 1;
    let record_len = 1 + fields.iter().map(|f| f.width).sum::<usize>();
    out.write_u8(0x03)?;
    out.write_all(&dbf_date(Local::now().date_naive()))?;
    out.write_u32::<LittleEndian>(layer.features.len() as u32)?;
    out.write_u16::<LittleEndian>(header_len as u16)?;
    out.write_u16::<LittleEndian>(record_len as u16)?;
    out.write_all(&[0u8; 20])?;

    for field in fields {
        let mut name = [0u8; 11];
        for (slot, byte) in name.iter_mut().zip(field.name.bytes()) {
            *slot = byte;
        }
        out.write_all(&name)?;
        out.write_u8(field.kind)?;
        out.write_all(&[0u8; 4])?;
        out.write_u8(field.width as u8)?;
        out.write_u8(field.decimals as u8)?;
        out.write_all(&[0u8; 14])?;
    }
    out.write_u8(0x0D)?;

    for feature in &layer.features {
        out.write_u8(b' ')?;
        for field in fields {
            let text = field.format(feature.get(&field.source));
            let mut bytes = text.into_bytes();
            bytes.resize(field.width, b' ');
            out.write_all(&bytes)?;
        }
    }
    out.write_u8(0x1A)
}

impl VectorWriter for ShapefileWriter {
    fn write(&self, layer: &FeatureCollection, epsg: Option<u32>, path: &Path) -> PipelineResult<()> {
        let mut records = Vec::with_capacity(layer.features.len());
        for feature in &layer.features {
            let rect = bounds(&feature.geometry).ok_or_else(|| PipelineError::Vector(
                "Cannot write an empty geometry to a shapefile".to_string()))?;
            records.push((record_content(&feature_rings(feature), rect)?, rect));
        }

        let extent = merge_bounds(records.iter().map(|(_, rect)| *rect))
            .unwrap_or_else(|| Rect::new((0.0, 0.0), (0.0, 0.0)));
        let shp_bytes = HEADER_BYTES + records.iter().map(|(c, _)| 8 + c.len()).sum::<usize>();
        let shx_bytes = HEADER_BYTES + 8 * records.len();

        let mut shp = BufWriter::new(File::create(path)?);
        let mut shx = BufWriter::new(File::create(path.with_extension("shx"))?);
        write_main_header(&mut shp, shp_bytes, extent)?;
        write_main_header(&mut shx, shx_bytes, extent)?;

        let mut offset = HEADER_BYTES;
        for (number, (content, _)) in records.iter().enumerate() {
            shp.write_i32::<BigEndian>(number as i32 + 1)?;
            shp.write_i32::<BigEndian>((content.len() / 2) as i32)?;
            shp.write_all(content)?;

            shx.write_i32::<BigEndian>((offset / 2) as i32)?;
            shx.write_i32::<BigEndian>((content.len() / 2) as i32)?;
            offset += 8 + content.len();
        }
        shp.flush()?;
        shx.flush()?;

        let fields = dbf_fields(layer);
        let mut dbf = BufWriter::new(File::create(path.with_extension("dbf"))?);
        write_dbf(&mut dbf, layer, &fields)?;
        dbf.flush()?;

        std::fs::write(path.with_extension("cpg"), "UTF-8")?;

        if let Some(epsg) = epsg {
            warn!("No .prj written for EPSG:{}; the shapefile carries no coordinate system", epsg);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ESRI Shapefile"
    }
}
