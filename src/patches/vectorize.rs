//! Patch boundary tracing
//!
//! Every foreground pixel side that faces a different label is a directed
//! boundary edge running clockwise on screen, so the patch is always on the
//! right. Edges are chained into rings; where two edges leave the same vertex
//! (pixels touching only at a corner) the trace turns right, which keeps
//! diagonal neighbours in separate rings. A ring that revisits a vertex is
//! split there, so every emitted ring is simple.
//!
//! In pixel space (y down) exteriors have positive shoelace area and holes
//! negative. Rings are mapped to world coordinates only at the end.

use std::collections::HashMap;
use log::warn;

use geo::{Contains, Coord, LineString, MultiPolygon, Point, Polygon};

use crate::patches::labeling::LabelGrid;
use crate::raster::GeoTransform;

type Vertex = (i64, i64);

#[derive(Debug, Clone, Copy)]
struct Edge {
    from: Vertex,
    to: Vertex,
}

impl Edge {
    fn heading(&self) -> (i64, i64) {
        (self.to.0 - self.from.0, self.to.1 - self.from.1)
    }
}

/// A closed ring in pixel-corner coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
struct Ring {
    vertices: Vec<Vertex>,
    /// Twice the signed area
    twice_area: i64,
}

impl Ring {
    fn new(vertices: Vec<Vertex>) -> Self {
        let vertices = drop_collinear(vertices);
        let twice_area = shoelace(&vertices);
        Ring { vertices, twice_area }
    }

    fn is_exterior(&self) -> bool {
        self.twice_area > 0
    }

    /// Centre of the pixel left of the first edge, i.e. outside the patch
    fn outside_probe(&self) -> Point<f64> {
        let (x0, y0) = self.vertices[0];
        let (x1, y1) = self.vertices[1 % self.vertices.len()];
        let (dx, dy) = ((x1 - x0).signum() as f64, (y1 - y0).signum() as f64);
        Point::new(x0 as f64 + 0.5 * dx + 0.5 * dy, y0 as f64 + 0.5 * dy - 0.5 * dx)
    }

    fn pixel_polygon(&self) -> Polygon<f64> {
        let coords: Vec<(f64, f64)> = self.vertices.iter().map(|(x, y)| (*x as f64, *y as f64)).collect();
        Polygon::new(LineString::from(coords), vec![])
    }

    fn to_world(&self, transform: &GeoTransform) -> LineString<f64> {
        let mut coords: Vec<Coord<f64>> = self.vertices.iter()
            .map(|(x, y)| {
                let (wx, wy) = transform.apply(*x as f64, *y as f64);
                Coord { x: wx, y: wy }
            })
            .collect();
        if let Some(first) = coords.first().copied() {
            coords.push(first);
        }
        LineString::new(coords)
    }
}

fn shoelace(vertices: &[Vertex]) -> i64 {
    let n = vertices.len();
    (0..n).map(|i| {
        let (x0, y0) = vertices[i];
        let (x1, y1) = vertices[(i + 1) % n];
        x0 * y1 - x1 * y0
    }).sum()
}

fn drop_collinear(vertices: Vec<Vertex>) -> Vec<Vertex> {
    let n = vertices.len();
    if n < 4 {
        return vertices;
    }
    (0..n)
        .filter(|&i| {
            let (px, py) = vertices[(i + n - 1) % n];
            let (cx, cy) = vertices[i];
            let (nx, ny) = vertices[(i + 1) % n];
            (cx - px) * (ny - cy) - (cy - py) * (nx - cx) != 0
        })
        .map(|i| vertices[i])
        .collect()
}

/// Boundary edges of every patch, indexed by `label - 1`
fn boundary_edges(grid: &LabelGrid) -> Vec<Vec<Edge>> {
    let mut edges = vec![Vec::new(); grid.count as usize];

    for y in 0..grid.height as i64 {
        for x in 0..grid.width as i64 {
            let label = grid.label_or_background(x, y);
            if label == 0 {
                continue;
            }
            let list = &mut edges[label as usize - 1];
            if grid.label_or_background(x, y - 1) != label {
                list.push(Edge { from: (x, y), to: (x + 1, y) });
            }
            if grid.label_or_background(x + 1, y) != label {
                list.push(Edge { from: (x + 1, y), to: (x + 1, y + 1) });
            }
            if grid.label_or_background(x, y + 1) != label {
                list.push(Edge { from: (x + 1, y + 1), to: (x, y + 1) });
            }
            if grid.label_or_background(x - 1, y) != label {
                list.push(Edge { from: (x, y + 1), to: (x, y) });
            }
        }
    }

    edges
}

/// Preference of turning from `heading` into `next`: right, straight, left
fn turn_rank(heading: (i64, i64), next: (i64, i64)) -> u8 {
    let (dx, dy) = (heading.0.signum(), heading.1.signum());
    let next = (next.0.signum(), next.1.signum());
    if next == (-dy, dx) {
        0
    } else if next == (dx, dy) {
        1
    } else if next == (dy, -dx) {
        2
    } else {
        3
    }
}

/// Chains edges into simple closed rings
fn trace_rings(edges: &[Edge]) -> Vec<Ring> {
    let mut outgoing: HashMap<Vertex, Vec<usize>> = HashMap::new();
    for (i, edge) in edges.iter().enumerate() {
        outgoing.entry(edge.from).or_default().push(i);
    }

    let mut used = vec![false; edges.len()];
    let mut rings = Vec::new();

    for start in 0..edges.len() {
        if used[start] {
            continue;
        }
        used[start] = true;

        let mut path = vec![edges[start].from];
        let mut positions: HashMap<Vertex, usize> = HashMap::new();
        positions.insert(edges[start].from, 0);
        let mut vertex = edges[start].to;
        let mut heading = edges[start].heading();

        loop {
            match positions.get(&vertex).copied() {
                Some(i) => {
                    let closed = path.split_off(i);
                    for v in &closed[1..] {
                        positions.remove(v);
                    }
                    path.push(vertex);
                    rings.push(Ring::new(closed));
                }
                None => {
                    positions.insert(vertex, path.len());
                    path.push(vertex);
                }
            }

            let next = outgoing.get(&vertex).and_then(|candidates| {
                candidates.iter()
                    .copied()
                    .filter(|e| !used[*e])
                    .min_by_key(|e| turn_rank(heading, edges[*e].heading()))
            });

            match next {
                Some(e) => {
                    used[e] = true;
                    vertex = edges[e].to;
                    heading = edges[e].heading();
                }
                None => break,
            }
        }

        if path.len() > 1 {
            warn!("Boundary trace ended with {} dangling vertices", path.len() - 1);
        }
    }

    rings
}

/// Groups rings into polygons: each hole goes to the smallest exterior
/// containing the pixel just outside its first edge
fn assemble(rings: Vec<Ring>, transform: &GeoTransform) -> Vec<Polygon<f64>> {
    let (exteriors, holes): (Vec<Ring>, Vec<Ring>) = rings.into_iter()
        .filter(|r| r.twice_area != 0)
        .partition(Ring::is_exterior);

    let footprints: Vec<Polygon<f64>> = exteriors.iter().map(Ring::pixel_polygon).collect();
    let mut interiors: Vec<Vec<LineString<f64>>> = vec![Vec::new(); exteriors.len()];

    for hole in holes {
        let probe = hole.outside_probe();
        let owner = footprints.iter()
            .enumerate()
            .filter(|(_, footprint)| footprint.contains(&probe))
            .min_by_key(|(i, _)| exteriors[*i].twice_area)
            .map(|(i, _)| i);

        match owner {
            Some(i) => interiors[i].push(hole.to_world(transform)),
            None => warn!("Dropping hole with no enclosing exterior at {:?}", hole.vertices.first()),
        }
    }

    exteriors.iter()
        .zip(interiors)
        .map(|(exterior, holes)| Polygon::new(exterior.to_world(transform), holes))
        .collect()
}

/// Traces every patch of a label grid into world-coordinate polygons
///
/// # Arguments
/// * `grid` - Labels from `label_components`
/// * `transform` - Pixel-to-world mapping of the labelled window
///
/// # Returns
/// One `(label, geometry)` pair per patch, in label order
pub fn vectorize(grid: &LabelGrid, transform: &GeoTransform) -> Vec<(u32, MultiPolygon<f64>)> {
    boundary_edges(grid)
        .into_iter()
        .enumerate()
        .map(|(i, edges)| {
            let polygons = assemble(trace_rings(&edges), transform);
            (i as u32 + 1, MultiPolygon::new(polygons))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;
    use crate::patches::labeling::{label_components, Connectivity};
    use crate::patches::test_support::window_from_ascii;

    fn trace(rows: &[&str]) -> Vec<(u32, MultiPolygon<f64>)> {
        let grid = label_components(&window_from_ascii(rows), Connectivity::Eight);
        vectorize(&grid, &GeoTransform::identity())
    }

    #[test]
    fn test_rectangle_has_four_corners() {
        let patches = trace(&["...", "###", "###"]);
        assert_eq!(patches.len(), 1);
        let polygon = &patches[0].1 .0[0];
        // four corners plus the closing coordinate
        assert_eq!(polygon.exterior().0.len(), 5);
        assert_eq!(polygon.unsigned_area(), 6.0);
        assert!(polygon.interiors().is_empty());
    }

    #[test]
    fn test_hole_is_interior_ring() {
        let patches = trace(&["###", "#.#", "###"]);
        let mp = &patches[0].1;
        assert_eq!(mp.0.len(), 1);
        assert_eq!(mp.0[0].interiors().len(), 1);
        assert_eq!(mp.unsigned_area(), 8.0);
    }

    #[test]
    fn test_diagonal_pieces_become_multipart() {
        let patches = trace(&["#.", ".#"]);
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].1 .0.len(), 2);
        assert_eq!(patches[0].1.unsigned_area(), 2.0);
    }

    #[test]
    fn test_hole_closed_at_a_corner() {
        // The hole at (1,1) touches the outside cell (0,2) at a single vertex
        let patches = trace(&["###", "#.#", ".##"]);
        let mp = &patches[0].1;
        assert_eq!(mp.0.len(), 1);
        assert_eq!(mp.0[0].interiors().len(), 1);
        assert_eq!(mp.unsigned_area(), 7.0);
    }

    #[test]
    fn test_diamond_around_background() {
        let patches = trace(&[".#.", "#.#", ".#."]);
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].1 .0.len(), 4);
        assert_eq!(patches[0].1.unsigned_area(), 4.0);
    }

    #[test]
    fn test_island_inside_hole_is_separate_patch() {
        let patches = trace(&[
            "#####",
            "#...#",
            "#.#.#",
            "#...#",
            "#####",
        ]);
        assert_eq!(patches.len(), 2);
        let (frame, island) = (&patches[0].1, &patches[1].1);
        assert_eq!(frame.0[0].interiors().len(), 1);
        assert_eq!(frame.unsigned_area(), 16.0);
        assert_eq!(island.unsigned_area(), 1.0);
    }

    #[test]
    fn test_area_matches_pixel_count() {
        let rows = [
            "##..#.##",
            "#.##..#.",
            "###.#.##",
            "..#..###",
            "#.#.#..#",
        ];
        let grid = label_components(&window_from_ascii(&rows), Connectivity::Eight);
        let counts = grid.pixel_counts();
        for (label, mp) in vectorize(&grid, &GeoTransform::identity()) {
            assert_eq!(mp.unsigned_area(), counts[label as usize] as f64, "label {}", label);
        }
    }

    #[test]
    fn test_world_coordinates() {
        let grid = label_components(&window_from_ascii(&["...", ".##"]), Connectivity::Eight);
        let transform = GeoTransform::new(100.0, 200.0, 10.0, -10.0);
        let patches = vectorize(&grid, &transform);
        let mp = &patches[0].1;
        assert_eq!(mp.unsigned_area(), 200.0);

        let xs: Vec<f64> = mp.0[0].exterior().0.iter().map(|c| c.x).collect();
        let ys: Vec<f64> = mp.0[0].exterior().0.iter().map(|c| c.y).collect();
        assert_eq!(xs.iter().cloned().fold(f64::INFINITY, f64::min), 110.0);
        assert_eq!(xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max), 130.0);
        assert_eq!(ys.iter().cloned().fold(f64::INFINITY, f64::min), 180.0);
        assert_eq!(ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max), 190.0);
    }
}
