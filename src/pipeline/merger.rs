//! Reduction of per-tile features into one output layer
//!
//! Multi-part features are taken as the ones straddling tile seams: they are
//! unioned as a single group and split back into single polygons tagged
//! `merged`. Single-part features pass through tagged `non_merged`. With
//! `MergeStrategy::DissolveAll` every feature goes through the union.

use log::{debug, info};
use geo::{BooleanOps, MultiPolygon};

use crate::config::MergeStrategy;
use crate::error::{PipelineError, PipelineResult};
use crate::patches::feature::{
    FeatureCollection, FieldType, PatchGeometry, PolygonFeature, Schema, ATTR_MERGE_STATE, MERGED, NON_MERGED,
};

/// Feature counts of one merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct MergeSummary {
    pub input: usize,
    pub non_merged: usize,
    /// Features fed into the union
    pub merged_inputs: usize,
    /// Polygons the union split into
    pub merged_outputs: usize,
}

impl MergeSummary {
    pub fn output(&self) -> usize {
        self.non_merged + self.merged_outputs
    }
}

/// Unions geometries pairwise, level by level
///
/// Balanced reduction keeps each union's operands of similar size.
pub fn union_all(mut parts: Vec<MultiPolygon<f64>>) -> MultiPolygon<f64> {
    if parts.is_empty() {
        return MultiPolygon::new(Vec::new());
    }
    while parts.len() > 1 {
        let mut next = Vec::with_capacity((parts.len() + 1) / 2);
        let mut iter = parts.into_iter();
        while let Some(a) = iter.next() {
            match iter.next() {
                Some(b) => next.push(a.union(&b)),
                None => next.push(a),
            }
        }
        parts = next;
    }
    parts.pop().unwrap_or_else(|| MultiPolygon::new(Vec::new()))
}

/// Reduces per-tile feature sets into the final layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatchMerger {
    strategy: MergeStrategy,
}

impl PatchMerger {
    pub fn new(strategy: MergeStrategy) -> Self {
        PatchMerger { strategy }
    }

    /// Merges the successful task results
    ///
    /// Fails with an aggregation error when there are no features at all.
    pub fn merge(&self, batches: Vec<Vec<PolygonFeature>>) -> PipelineResult<(FeatureCollection, MergeSummary)> {
        let features: Vec<PolygonFeature> = batches.into_iter().flatten().collect();
        if features.is_empty() {
            return Err(PipelineError::Aggregation("No features to merge".to_string()));
        }

        let input = features.len();
        let (to_union, pass_through): (Vec<PolygonFeature>, Vec<PolygonFeature>) = features
            .into_iter()
            .partition(|f| self.strategy == MergeStrategy::DissolveAll || f.geometry.is_multi());
        debug!("Merge buckets: {} to union, {} single-part", to_union.len(), pass_through.len());

        let merged_inputs = to_union.len();
        let merged = if to_union.is_empty() {
            Vec::new()
        } else {
            union_bucket(to_union)
        };

        let non_merged: Vec<PolygonFeature> = pass_through.into_iter()
            .map(|f| f.with_attribute(ATTR_MERGE_STATE, NON_MERGED))
            .collect();

        let summary = MergeSummary {
            input,
            non_merged: non_merged.len(),
            merged_inputs,
            merged_outputs: merged.len(),
        };

        let layer = recombine(non_merged, merged);
        info!("Merged {} features into {} ({} passed through, {} unioned into {})",
              summary.input, layer.len(), summary.non_merged, summary.merged_inputs, summary.merged_outputs);
        Ok((layer, summary))
    }
}

fn union_bucket(features: Vec<PolygonFeature>) -> Vec<PolygonFeature> {
    let parts = features.iter().map(|f| f.geometry.to_multi_polygon()).collect();
    union_all(parts)
        .0
        .into_iter()
        .map(|polygon| {
            PolygonFeature::new(PatchGeometry::Polygon(polygon))
                .with_attribute(ATTR_MERGE_STATE, MERGED)
        })
        .collect()
}

/// Joins both buckets under their common schema and recomputes every area
fn recombine(non_merged: Vec<PolygonFeature>, merged: Vec<PolygonFeature>) -> FeatureCollection {
    let merged_schema = Schema::merged();
    let schema = if non_merged.is_empty() {
        merged_schema
    } else {
        let pass_through_schema = Schema::tile_features().with_field(ATTR_MERGE_STATE, FieldType::Text);
        merged_schema.intersect(&pass_through_schema)
    };

    let features = non_merged.into_iter()
        .chain(merged)
        .map(|mut feature| {
            feature.recompute_area();
            feature.project(&schema);
            feature
        })
        .collect();

    FeatureCollection { schema, features }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Area, Polygon};
    use crate::error::ErrorKind;
    use crate::patches::feature::{round_area, ATTR_AREA, ATTR_PATCH_ID, ATTR_TILE};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
        polygon![(x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1)]
    }

    fn tile_feature(polygons: Vec<Polygon<f64>>, tile: &str) -> PolygonFeature {
        let geometry = PatchGeometry::from_polygons(polygons);
        PolygonFeature::new(geometry)
            .with_attribute(ATTR_PATCH_ID, 1i64)
            .with_attribute(ATTR_TILE, tile)
            .with_attribute(ATTR_AREA, -1.0)
    }

    #[test]
    fn test_seam_fragments_merge_into_one_polygon() {
        // Both tiles see a multi-part patch whose main parts overlap in the
        // shared 2-unit strip
        let left = tile_feature(vec![rect(0.0, 0.0, 12.0, 10.0), rect(13.0, 11.0, 14.0, 12.0)], "tile_0000_0000");
        let right = tile_feature(vec![rect(10.0, 0.0, 20.0, 10.0), rect(13.0, 11.0, 14.0, 12.0)], "tile_0000_0001");

        let (layer, summary) = PatchMerger::default().merge(vec![vec![left], vec![right]]).unwrap();

        assert_eq!(summary.merged_inputs, 2);
        assert_eq!(layer.len(), 2);
        let areas: Vec<f64> = layer.features.iter().filter_map(PolygonFeature::area).collect();
        assert!(areas.contains(&200.0));
        assert!(areas.contains(&1.0));
        assert!(layer.features.iter().all(|f| f.merge_state() == Some(MERGED)));
    }

    #[test]
    fn test_single_parts_pass_through() {
        let a = tile_feature(vec![rect(0.0, 0.0, 2.0, 2.0)], "t0");
        let b = tile_feature(vec![rect(1.0, 0.0, 3.0, 2.0)], "t1");

        let (layer, summary) = PatchMerger::default().merge(vec![vec![a, b]]).unwrap();
        assert_eq!(summary.merged_inputs, 0);
        assert_eq!(summary.non_merged, 2);
        assert_eq!(layer.len(), 2);
        assert!(layer.features.iter().all(|f| f.merge_state() == Some(NON_MERGED)));
    }

    #[test]
    fn test_dissolve_all_resolves_single_part_duplicates() {
        let a = tile_feature(vec![rect(0.0, 0.0, 2.0, 2.0)], "t0");
        let b = tile_feature(vec![rect(1.0, 0.0, 3.0, 2.0)], "t1");

        let (layer, _) = PatchMerger::new(MergeStrategy::DissolveAll).merge(vec![vec![a], vec![b]]).unwrap();
        assert_eq!(layer.len(), 1);
        assert_eq!(layer.features[0].area(), Some(6.0));
    }

    #[test]
    fn test_schema_is_intersection_and_areas_recomputed() {
        let single = tile_feature(vec![rect(50.0, 50.0, 51.5, 51.5)], "t0");
        let multi = tile_feature(vec![rect(0.0, 0.0, 1.0, 1.0), rect(2.0, 2.0, 3.0, 3.0)], "t1");

        let (layer, _) = PatchMerger::default().merge(vec![vec![single, multi]]).unwrap();
        assert_eq!(layer.schema, Schema::merged());
        for feature in &layer.features {
            assert_eq!(feature.attributes.len(), 2);
            assert!(feature.get(ATTR_TILE).is_none());
            assert_eq!(feature.area(), Some(round_area(feature.geometry.unsigned_area())));
        }
        assert_eq!(layer.features[0].area(), Some(2.25));
    }

    #[test]
    fn test_area_sum_matches_geometry() {
        let features = vec![
            tile_feature(vec![rect(0.0, 0.0, 1.333, 1.0), rect(5.0, 5.0, 6.0, 6.777)], "a"),
            tile_feature(vec![rect(1.0, 0.0, 2.5, 1.0), rect(9.0, 9.0, 9.5, 9.5)], "b"),
            tile_feature(vec![rect(20.0, 20.0, 21.111, 21.0)], "c"),
        ];
        let (layer, _) = PatchMerger::default().merge(vec![features]).unwrap();

        let reported = layer.total_area();
        let direct: f64 = layer.features.iter().map(|f| f.geometry.unsigned_area()).sum();
        assert!((reported - direct).abs() <= 0.01 * layer.len() as f64);
    }

    #[test]
    fn test_empty_input_is_aggregation_error() {
        let err = PatchMerger::default().merge(vec![vec![], vec![]]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Aggregation);
    }

    #[test]
    fn test_union_all_handles_odd_counts() {
        let parts = (0..5)
            .map(|i| MultiPolygon::new(vec![rect(i as f64, 0.0, i as f64 + 1.5, 1.0)]))
            .collect();
        let union = union_all(parts);
        assert_eq!(union.0.len(), 1);
        assert!((union.unsigned_area() - 5.5).abs() < 1e-9);
        assert!(union_all(Vec::new()).0.is_empty());
    }
}
