//! GeoPackage output
//!
//! Creates a fresh GeoPackage with the core metadata tables and one feature
//! table. Geometries are stored as GeoPackage binary: a header carrying the
//! SRS id and envelope, followed by WKB.

use std::fs;
use std::path::Path;
use log::debug;

use byteorder::{LittleEndian, WriteBytesExt};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection};

use crate::error::PipelineResult;
use crate::patches::{AttributeValue, FeatureCollection, FieldType, PatchGeometry};
use crate::vector::wkb::{bounds, merge_bounds, write_geometry};
use crate::vector::writer::VectorWriter;

/// "GPKG" as a big-endian integer
const APPLICATION_ID: i32 = 0x4750_4B47;
const USER_VERSION: i32 = 10_300;
/// Undefined cartesian SRS of the GeoPackage core
const UNDEFINED_CARTESIAN: i32 = -1;
/// Flags: little-endian, envelope [minx, maxx, miny, maxy]
const GP_FLAGS: u8 = 0b0000_0011;

const CORE_TABLES: &str = "
CREATE TABLE gpkg_spatial_ref_sys (
    srs_name TEXT NOT NULL,
    srs_id INTEGER NOT NULL PRIMARY KEY,
    organization TEXT NOT NULL,
    organization_coordsys_id INTEGER NOT NULL,
    definition TEXT NOT NULL,
    description TEXT
);
CREATE TABLE gpkg_contents (
    table_name TEXT NOT NULL PRIMARY KEY,
    data_type TEXT NOT NULL,
    identifier TEXT UNIQUE,
    description TEXT DEFAULT '',
    last_change DATETIME NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
    min_x DOUBLE,
    min_y DOUBLE,
    max_x DOUBLE,
    max_y DOUBLE,
    srs_id INTEGER,
    CONSTRAINT fk_gc_r_srs_id FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys(srs_id)
);
CREATE TABLE gpkg_geometry_columns (
    table_name TEXT NOT NULL,
    column_name TEXT NOT NULL,
    geometry_type_name TEXT NOT NULL,
    srs_id INTEGER NOT NULL,
    z TINYINT NOT NULL,
    m TINYINT NOT NULL,
    CONSTRAINT pk_geom_cols PRIMARY KEY (table_name, column_name),
    CONSTRAINT fk_gc_tn FOREIGN KEY (table_name) REFERENCES gpkg_contents(table_name),
    CONSTRAINT fk_gc_srs FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys (srs_id)
);
INSERT INTO gpkg_spatial_ref_sys VALUES
    ('Undefined cartesian SRS', -1, 'NONE', -1, 'undefined', 'undefined cartesian coordinate reference system'),
    ('Undefined geographic SRS', 0, 'NONE', 0, 'undefined', 'undefined geographic coordinate reference system'),
    ('WGS 84 geodetic', 4326, 'EPSG', 4326,
     'GEOGCS[\"WGS 84\",DATUM[\"WGS_1984\",SPHEROID[\"WGS 84\",6378137,298.257223563]],PRIMEM[\"Greenwich\",0],UNIT[\"degree\",0.0174532925199433]]',
     'longitude/latitude coordinates in decimal degrees on the WGS 84 spheroid');
";

/// Writes a single feature table into a new GeoPackage
pub struct GeoPackageWriter {
    table: String,
}

impl Default for GeoPackageWriter {
    fn default() -> Self {
        GeoPackageWriter { table: "patches".to_string() }
    }
}

fn sql_type(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::Integer => "INTEGER",
        FieldType::Real => "REAL",
        FieldType::Text => "TEXT",
    }
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// GeoPackage binary encoding of a geometry
pub fn geometry_blob(geometry: &PatchGeometry, srs_id: i32) -> std::io::Result<Vec<u8>> {
    let mut blob = Vec::new();
    blob.extend_from_slice(b"GP");
    blob.write_u8(0)?;
    blob.write_u8(GP_FLAGS)?;
    blob.write_i32::<LittleEndian>(srs_id)?;

    let (min_x, max_x, min_y, max_y) = match bounds(geometry) {
        Some(rect) => (rect.min().x, rect.max().x, rect.min().y, rect.max().y),
        None => (f64::NAN, f64::NAN, f64::NAN, f64::NAN),
    };
    for v in [min_x, max_x, min_y, max_y] {
        blob.write_f64::<LittleEndian>(v)?;
    }

    write_geometry(&mut blob, geometry)?;
    Ok(blob)
}

fn attribute_sql(value: Option<&AttributeValue>) -> SqlValue {
    match value {
        Some(AttributeValue::Int(v)) => SqlValue::Integer(*v),
        Some(AttributeValue::Real(v)) => SqlValue::Real(*v),
        Some(AttributeValue::Text(v)) => SqlValue::Text(v.clone()),
        None => SqlValue::Null,
    }
}

impl VectorWriter for GeoPackageWriter {
    fn write(&self, layer: &FeatureCollection, epsg: Option<u32>, path: &Path) -> PipelineResult<()> {
        if path.exists() {
            fs::remove_file(path)?;
        }

        let mut conn = Connection::open(path)?;
        conn.pragma_update(None, "application_id", APPLICATION_ID)?;
        conn.pragma_update(None, "user_version", USER_VERSION)?;

        let tx = conn.transaction()?;
        tx.execute_batch(CORE_TABLES)?;

        let srs_id = epsg.map(|code| code as i32).unwrap_or(UNDEFINED_CARTESIAN);
        if let Some(code) = epsg.filter(|code| *code != 4326) {
            tx.execute(
                "INSERT INTO gpkg_spatial_ref_sys VALUES (?1, ?2, 'EPSG', ?2, 'undefined', NULL)",
                params![format!("EPSG:{}", code), code as i32],
            )?;
        }

        let extent = merge_bounds(layer.features.iter().filter_map(|f| bounds(&f.geometry)));
        tx.execute(
            "INSERT INTO gpkg_contents (table_name, data_type, identifier, min_x, min_y, max_x, max_y, srs_id)
             VALUES (?1, 'features', ?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                self.table,
                extent.map(|r| r.min().x),
                extent.map(|r| r.min().y),
                extent.map(|r| r.max().x),
                extent.map(|r| r.max().y),
                srs_id,
            ],
        )?;
        tx.execute(
            "INSERT INTO gpkg_geometry_columns VALUES (?1, 'geom', 'GEOMETRY', ?2, 0, 0)",
            params![self.table, srs_id],
        )?;

        let mut columns = vec![
            "fid INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL".to_string(),
            "geom GEOMETRY".to_string(),
        ];
        columns.extend(layer.schema.fields().iter()
            .map(|(name, field_type)| format!("{} {}", quote(name), sql_type(*field_type))));
        tx.execute_batch(&format!("CREATE TABLE {} ({});", quote(&self.table), columns.join(", ")))?;

        let names: Vec<String> = std::iter::once("geom".to_string())
            .chain(layer.schema.fields().iter().map(|(name, _)| quote(name)))
            .collect();
        let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();
        let insert = format!("INSERT INTO {} ({}) VALUES ({})",
                             quote(&self.table), names.join(", "), placeholders.join(", "));

        {
            let mut statement = tx.prepare(&insert)?;
            for feature in &layer.features {
                let mut values = vec![SqlValue::Blob(geometry_blob(&feature.geometry, srs_id)?)];
                values.extend(layer.schema.fields().iter().map(|(name, _)| attribute_sql(feature.get(name))));
                statement.execute(params_from_iter(values))?;
            }
        }
        tx.commit()?;

        debug!("GeoPackage table '{}' holds {} features", self.table, layer.len());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "GPKG"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::ByteOrder;
    use geo::{polygon, MultiPolygon};
    use crate::patches::feature::{ATTR_AREA, ATTR_MERGE_STATE, MERGED, NON_MERGED};
    use crate::patches::{PolygonFeature, Schema};
    use crate::vector::wkb::{WKB_MULTI_POLYGON, WKB_POLYGON};

    fn layer() -> FeatureCollection {
        let a = polygon![(x: 500000.0, y: 4000000.0), (x: 500010.0, y: 4000000.0), (x: 500010.0, y: 4000010.0)];
        let b = polygon![(x: 500100.0, y: 4000100.0), (x: 500110.0, y: 4000100.0), (x: 500110.0, y: 4000110.0)];
        FeatureCollection {
            schema: Schema::merged(),
            features: vec![
                PolygonFeature::new(PatchGeometry::Polygon(a.clone()))
                    .with_attribute(ATTR_AREA, 50.0)
                    .with_attribute(ATTR_MERGE_STATE, NON_MERGED),
                PolygonFeature::new(PatchGeometry::MultiPolygon(MultiPolygon::new(vec![a, b])))
                    .with_attribute(ATTR_AREA, 100.0)
                    .with_attribute(ATTR_MERGE_STATE, MERGED),
            ],
        }
    }

    #[test]
    fn test_feature_table_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patches.gpkg");
        GeoPackageWriter::default().write(&layer(), Some(32633), &path).unwrap();

        let conn = Connection::open(&path).unwrap();
        let app_id: i32 = conn.query_row("PRAGMA application_id", [], |r| r.get(0)).unwrap();
        assert_eq!(app_id, APPLICATION_ID);

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM patches", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 2);

        let (srs, max_y): (i32, f64) = conn.query_row(
            "SELECT srs_id, max_y FROM gpkg_contents WHERE table_name = 'patches'", [],
            |r| Ok((r.get(0)?, r.get(1)?))).unwrap();
        assert_eq!(srs, 32633);
        assert_eq!(max_y, 4000110.0);

        let state: String = conn.query_row(
            "SELECT merge_state FROM patches WHERE fid = 2", [], |r| r.get(0)).unwrap();
        assert_eq!(state, MERGED);

        let blob: Vec<u8> = conn.query_row("SELECT geom FROM patches WHERE fid = 2", [], |r| r.get(0)).unwrap();
        assert_eq!(&blob[0..2], b"GP");
        assert_eq!(blob[3], GP_FLAGS);
        assert_eq!(LittleEndian::read_i32(&blob[4..8]), 32633);
        assert_eq!(LittleEndian::read_u32(&blob[41..45]), WKB_MULTI_POLYGON);
    }

    #[test]
    fn test_rewrite_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("again.gpkg");
        let writer = GeoPackageWriter::default();
        writer.write(&layer(), None, &path).unwrap();
        writer.write(&layer(), None, &path).unwrap();

        let conn = Connection::open(&path).unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM patches", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 2);
        let srs: i32 = conn.query_row("SELECT srs_id FROM gpkg_geometry_columns", [], |r| r.get(0)).unwrap();
        assert_eq!(srs, UNDEFINED_CARTESIAN);
    }

    #[test]
    fn test_blob_header_for_polygon() {
        let square = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)];
        let blob = geometry_blob(&PatchGeometry::Polygon(square), 4326).unwrap();
        assert_eq!(LittleEndian::read_f64(&blob[8..16]), 0.0);
        assert_eq!(LittleEndian::read_f64(&blob[16..24]), 1.0);
        assert_eq!(blob[40], 1);
        assert_eq!(LittleEndian::read_u32(&blob[41..45]), WKB_POLYGON);
    }
}
