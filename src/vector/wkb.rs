//! Well-known binary encoding of patch geometries
//!
//! Little-endian, 2D only.

use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};
use geo::{BoundingRect, LineString, Polygon, Rect};

use crate::patches::PatchGeometry;

const WKB_LITTLE_ENDIAN: u8 = 1;
pub const WKB_POLYGON: u32 = 3;
pub const WKB_MULTI_POLYGON: u32 = 6;

fn write_ring<W: Write>(out: &mut W, ring: &LineString<f64>) -> io::Result<()> {
    out.write_u32::<LittleEndian>(ring.0.len() as u32)?;
    for coord in &ring.0 {
        out.write_f64::<LittleEndian>(coord.x)?;
        out.write_f64::<LittleEndian>(coord.y)?;
    }
    Ok(())
}

fn write_polygon<W: Write>(out: &mut W, polygon: &Polygon<f64>) -> io::Result<()> {
    out.write_u8(WKB_LITTLE_ENDIAN)?;
    out.write_u32::<LittleEndian>(WKB_POLYGON)?;
    out.write_u32::<LittleEndian>(1 + polygon.interiors().len() as u32)?;
    write_ring(out, polygon.exterior())?;
    for interior in polygon.interiors() {
        write_ring(out, interior)?;
    }
    Ok(())
}

/// Appends the WKB of a geometry
pub fn write_geometry<W: Write>(out: &mut W, geometry: &PatchGeometry) -> io::Result<()> {
    match geometry {
        PatchGeometry::Polygon(polygon) => write_polygon(out, polygon),
        PatchGeometry::MultiPolygon(multi) => {
            out.write_u8(WKB_LITTLE_ENDIAN)?;
            out.write_u32::<LittleEndian>(WKB_MULTI_POLYGON)?;
            out.write_u32::<LittleEndian>(multi.0.len() as u32)?;
            for polygon in &multi.0 {
                write_polygon(out, polygon)?;
            }
            Ok(())
        }
    }
}

pub fn to_wkb(geometry: &PatchGeometry) -> Vec<u8> {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_geometry(&mut out, geometry);
    out
}

/// Bounding box of a geometry, `None` when it has no coordinates
pub fn bounds(geometry: &PatchGeometry) -> Option<Rect<f64>> {
    match geometry {
        PatchGeometry::Polygon(polygon) => polygon.bounding_rect(),
        PatchGeometry::MultiPolygon(multi) => multi.bounding_rect(),
    }
}

/// Smallest box covering all given boxes
pub fn merge_bounds<I: IntoIterator<Item = Rect<f64>>>(boxes: I) -> Option<Rect<f64>> {
    boxes.into_iter().reduce(|a, b| {
        Rect::new(
            (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
            (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
        )
    })
}
