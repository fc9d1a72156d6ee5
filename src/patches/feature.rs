//! Polygon features and their attribute schema
//!
//! Per-tile features carry `patch_id`, `tile` and `area`. The merged layer
//! carries `area` and `merge_state`.

use std::collections::BTreeMap;
use std::fmt;

use geo::{Area, MultiPolygon, Polygon};

pub const ATTR_PATCH_ID: &str = "patch_id";
pub const ATTR_TILE: &str = "tile";
pub const ATTR_AREA: &str = "area";
pub const ATTR_MERGE_STATE: &str = "merge_state";

/// `merge_state` of features produced by the union step
pub const MERGED: &str = "merged";
/// `merge_state` of features passed through unchanged
pub const NON_MERGED: &str = "non_merged";

/// Rounds a planar area to two decimals
pub fn round_area(area: f64) -> f64 {
    (area * 100.0).round() / 100.0
}

/// Storage type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Integer,
    Real,
    Text,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Integer => "integer",
            FieldType::Real => "real",
            FieldType::Text => "text",
        };
        f.write_str(name)
    }
}

/// A single attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Int(i64),
    Real(f64),
    Text(String),
}

impl AttributeValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            AttributeValue::Int(_) => FieldType::Integer,
            AttributeValue::Real(_) => FieldType::Real,
            AttributeValue::Text(_) => FieldType::Text,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(v) => Some(*v as f64),
            AttributeValue::Real(v) => Some(*v),
            AttributeValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Real(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Text(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Text(v)
    }
}

/// Ordered attribute schema of a feature collection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    fields: Vec<(String, FieldType)>,
}

impl Schema {
    pub fn new() -> Self {
        Schema { fields: Vec::new() }
    }

    /// Adds a field, replacing the type of an existing one with the same name
    pub fn with_field(mut self, name: &str, field_type: FieldType) -> Self {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some(field) => field.1 = field_type,
            None => self.fields.push((name.to_string(), field_type)),
        }
        self
    }

    /// Schema of features straight out of the extractor
    pub fn tile_features() -> Self {
        Schema::new()
            .with_field(ATTR_PATCH_ID, FieldType::Integer)
            .with_field(ATTR_TILE, FieldType::Text)
            .with_field(ATTR_AREA, FieldType::Real)
    }

    /// Schema of the merged output layer
    pub fn merged() -> Self {
        Schema::new()
            .with_field(ATTR_AREA, FieldType::Real)
            .with_field(ATTR_MERGE_STATE, FieldType::Text)
    }

    pub fn fields(&self) -> &[(String, FieldType)] {
        &self.fields
    }

    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, t)| *t)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field_type(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields present in both schemas with the same type, in `self`'s order
    pub fn intersect(&self, other: &Schema) -> Schema {
        Schema {
            fields: self.fields.iter()
                .filter(|(name, t)| other.field_type(name) == Some(*t))
                .cloned()
                .collect(),
        }
    }
}

/// Geometry of one patch
#[derive(Debug, Clone, PartialEq)]
pub enum PatchGeometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl PatchGeometry {
    /// Single-part when exactly one polygon is given
    pub fn from_polygons(mut polygons: Vec<Polygon<f64>>) -> Self {
        if polygons.len() == 1 {
            if let Some(polygon) = polygons.pop() {
                return PatchGeometry::Polygon(polygon);
            }
        }
        PatchGeometry::MultiPolygon(MultiPolygon::new(polygons))
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, PatchGeometry::MultiPolygon(_))
    }

    pub fn part_count(&self) -> usize {
        match self {
            PatchGeometry::Polygon(_) => 1,
            PatchGeometry::MultiPolygon(mp) => mp.0.len(),
        }
    }

    pub fn polygons(&self) -> Vec<&Polygon<f64>> {
        match self {
            PatchGeometry::Polygon(p) => vec![p],
            PatchGeometry::MultiPolygon(mp) => mp.0.iter().collect(),
        }
    }

    pub fn to_multi_polygon(&self) -> MultiPolygon<f64> {
        match self {
            PatchGeometry::Polygon(p) => MultiPolygon::new(vec![p.clone()]),
            PatchGeometry::MultiPolygon(mp) => mp.clone(),
        }
    }

    /// Planar area in CRS units
    pub fn unsigned_area(&self) -> f64 {
        match self {
            PatchGeometry::Polygon(p) => p.unsigned_area(),
            PatchGeometry::MultiPolygon(mp) => mp.unsigned_area(),
        }
    }
}

/// A polygon with its attributes
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonFeature {
    pub geometry: PatchGeometry,
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl PolygonFeature {
    pub fn new(geometry: PatchGeometry) -> Self {
        PolygonFeature { geometry, attributes: BTreeMap::new() }
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<AttributeValue>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    pub fn area(&self) -> Option<f64> {
        self.get(ATTR_AREA).and_then(AttributeValue::as_f64)
    }

    pub fn tile(&self) -> Option<&str> {
        self.get(ATTR_TILE).and_then(AttributeValue::as_str)
    }

    pub fn merge_state(&self) -> Option<&str> {
        self.get(ATTR_MERGE_STATE).and_then(AttributeValue::as_str)
    }

    /// Sets `area` from the geometry
    pub fn recompute_area(&mut self) {
        let area = round_area(self.geometry.unsigned_area());
        self.set(ATTR_AREA, area);
    }

    /// Drops attributes the schema does not declare
    pub fn project(&mut self, schema: &Schema) {
        self.attributes.retain(|name, value| schema.field_type(name) == Some(value.field_type()));
    }
}

/// A schema and the features conforming to it
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureCollection {
    pub schema: Schema,
    pub features: Vec<PolygonFeature>,
}

impl FeatureCollection {
    pub fn new(schema: Schema) -> Self {
        FeatureCollection { schema, features: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Sum of the `area` attributes
    pub fn total_area(&self) -> f64 {
        self.features.iter().filter_map(PolygonFeature::area).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square(x: f64, y: f64, size: f64) -> Polygon<f64> {
        polygon![(x: x, y: y), (x: x + size, y: y), (x: x + size, y: y + size), (x: x, y: y + size)]
    }

    #[test]
    fn test_schema_intersection_keeps_order_and_types() {
        let a = Schema::tile_features();
        let b = Schema::merged().with_field(ATTR_TILE, FieldType::Integer);
        let common = a.intersect(&b);
        assert_eq!(common.fields(), &[(ATTR_AREA.to_string(), FieldType::Real)]);
        assert_eq!(Schema::merged().intersect(&Schema::merged()), Schema::merged());
    }

    #[test]
    fn test_geometry_parts_and_area() {
        let single = PatchGeometry::from_polygons(vec![square(0.0, 0.0, 2.0)]);
        assert!(!single.is_multi());
        assert_eq!(single.unsigned_area(), 4.0);

        let multi = PatchGeometry::from_polygons(vec![square(0.0, 0.0, 1.0), square(1.0, 1.0, 1.0)]);
        assert!(multi.is_multi());
        assert_eq!(multi.part_count(), 2);
        assert_eq!(multi.unsigned_area(), 2.0);
    }

    #[test]
    fn test_feature_attributes() {
        let mut feature = PolygonFeature::new(PatchGeometry::from_polygons(vec![square(0.0, 0.0, 1.234)]))
            .with_attribute(ATTR_PATCH_ID, 3i64)
            .with_attribute(ATTR_TILE, "tile_0000_0001");
        feature.recompute_area();
        assert_eq!(feature.area(), Some(1.52));
        assert_eq!(feature.tile(), Some("tile_0000_0001"));

        feature.project(&Schema::merged());
        assert!(feature.get(ATTR_PATCH_ID).is_none());
        assert!(feature.get(ATTR_TILE).is_none());
        assert_eq!(feature.area(), Some(1.52));
    }

    #[test]
    fn test_round_area() {
        assert_eq!(round_area(12.344999), 12.34);
        assert_eq!(round_area(0.005), 0.01);
        assert_eq!(round_area(7.0), 7.0);
    }
}
