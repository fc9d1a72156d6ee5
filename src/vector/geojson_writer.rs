//! GeoJSON output
//!
//! Rings follow the right-hand rule (exteriors counter-clockwise). When the
//! layer has an EPSG code other than 4326 a legacy `crs` member names it.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use geo::orient::{Direction, Orient};
use geo::{LineString, Polygon};
use geojson::{Feature, Geometry, JsonObject, JsonValue, Position, Value as GeoValue};

use crate::error::PipelineResult;
use crate::patches::{AttributeValue, FeatureCollection, PatchGeometry, PolygonFeature, Schema};
use crate::vector::writer::VectorWriter;

pub struct GeoJsonWriter;

fn ring_positions(ring: &LineString<f64>) -> Vec<Position> {
    ring.0.iter().map(|c| vec![c.x, c.y]).collect()
}

fn polygon_rings(polygon: &Polygon<f64>) -> Vec<Vec<Position>> {
    let polygon = polygon.orient(Direction::Default);
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(ring_positions)
        .collect()
}

fn to_geojson_value(geometry: &PatchGeometry) -> GeoValue {
    match geometry {
        PatchGeometry::Polygon(p) => GeoValue::Polygon(polygon_rings(p)),
        PatchGeometry::MultiPolygon(mp) => GeoValue::MultiPolygon(mp.0.iter().map(polygon_rings).collect()),
    }
}

fn attribute_json(value: &AttributeValue) -> JsonValue {
    match value {
        AttributeValue::Int(v) => JsonValue::from(*v),
        AttributeValue::Real(v) => JsonValue::from(*v),
        AttributeValue::Text(v) => JsonValue::from(v.as_str()),
    }
}

fn to_feature(feature: &PolygonFeature, schema: &Schema) -> Feature {
    let mut properties = JsonObject::new();
    for (name, _) in schema.fields() {
        let value = feature.get(name).map(attribute_json).unwrap_or(JsonValue::Null);
        properties.insert(name.clone(), value);
    }

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(to_geojson_value(&feature.geometry))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn crs_member(epsg: u32) -> JsonObject {
    let mut member = JsonObject::new();
    member.insert("crs".to_string(), serde_json::json!({
        "type": "name",
        "properties": { "name": format!("urn:ogc:def:crs:EPSG::{}", epsg) }
    }));
    member
}

impl VectorWriter for GeoJsonWriter {
    fn write(&self, layer: &FeatureCollection, epsg: Option<u32>, path: &Path) -> PipelineResult<()> {
        let collection = geojson::FeatureCollection {
            bbox: None,
            features: layer.features.iter().map(|f| to_feature(f, &layer.schema)).collect(),
            foreign_members: epsg.filter(|code| *code != 4326).map(crs_member),
        };

        let mut out = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut out, &collection)?;
        out.flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "GeoJSON"
    }
}
