//! Connected-component labelling of valid pixels
//!
//! Two-pass union-find: the first pass gives every foreground pixel a
//! provisional label and records equivalences with already visited
//! neighbours, the second pass resolves them to dense labels `1..=count` in
//! raster scan order. Label 0 is background.

use crate::raster::RasterWindow;

/// Pixel neighbourhood used to join pixels into one patch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// Edge neighbours only
    Four,
    /// Edge and corner neighbours
    #[default]
    Eight,
}

impl Connectivity {
    /// Neighbours visited before (x, y) in scan order, as (dx, dy)
    fn backward_offsets(&self) -> &'static [(i64, i64)] {
        match self {
            Connectivity::Four => &[(-1, 0), (0, -1)],
            Connectivity::Eight => &[(-1, 0), (-1, -1), (0, -1), (1, -1)],
        }
    }
}

/// Per-pixel patch labels of one window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelGrid {
    pub width: u32,
    pub height: u32,
    /// Row-major labels, 0 for background
    pub labels: Vec<u32>,
    /// Number of patches
    pub count: u32,
}

impl LabelGrid {
    pub fn label(&self, x: u32, y: u32) -> u32 {
        self.labels[y as usize * self.width as usize + x as usize]
    }

    /// Label at signed coordinates, background outside the grid
    pub fn label_or_background(&self, x: i64, y: i64) -> u32 {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return 0;
        }
        self.label(x as u32, y as u32)
    }

    /// Pixel count per label; index 0 counts background
    pub fn pixel_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.count as usize + 1];
        for label in &self.labels {
            counts[*label as usize] += 1;
        }
        counts
    }
}

struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    fn new() -> Self {
        // Slot 0 stands for background and is never joined
        UnionFind { parent: vec![0] }
    }

    fn make_set(&mut self) -> u32 {
        let id = self.parent.len() as u32;
        self.parent.push(id);
        id
    }

    fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grandparent = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
        x
    }

    fn union(&mut self, a: u32, b: u32) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (low, high) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[high as usize] = low;
        }
    }
}

/// Labels the valid pixels of a window
pub fn label_components(window: &RasterWindow, connectivity: Connectivity) -> LabelGrid {
    let (width, height) = (window.width as i64, window.height as i64);
    let mut provisional = vec![0u32; window.values.len()];
    let mut sets = UnionFind::new();
    let offsets = connectivity.backward_offsets();

    for y in 0..height {
        for x in 0..width {
            let index = (y * width + x) as usize;
            if !window.is_valid_value(window.values[index]) {
                continue;
            }

            let mut current = 0u32;
            for (dx, dy) in offsets {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= width {
                    continue;
                }
                let neighbour = provisional[(ny * width + nx) as usize];
                if neighbour == 0 {
                    continue;
                }
                if current == 0 {
                    current = neighbour;
                } else {
                    sets.union(current, neighbour);
                }
            }

            provisional[index] = if current == 0 { sets.make_set() } else { current };
        }
    }

    // Dense renumbering in order of first appearance
    let mut dense = vec![0u32; sets.parent.len()];
    let mut count = 0u32;
    let labels = provisional.iter()
        .map(|&label| {
            if label == 0 {
                return 0;
            }
            let root = sets.find(label) as usize;
            if dense[root] == 0 {
                count += 1;
                dense[root] = count;
            }
            dense[root]
        })
        .collect();

    LabelGrid { width: window.width, height: window.height, labels, count }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patches::test_support::window_from_ascii;
    use crate::raster::SampleType;

    #[test]
    fn test_diagonal_pixels_join_only_with_eight_connectivity() {
        let window = window_from_ascii(&[
            "#..",
            ".#.",
            "..#",
        ]);
        assert_eq!(label_components(&window, Connectivity::Eight).count, 1);
        assert_eq!(label_components(&window, Connectivity::Four).count, 3);
    }

    #[test]
    fn test_labels_dense_in_scan_order() {
        let window = window_from_ascii(&[
            "..#..#",
            "#.....",
            "#..##.",
        ]);
        let grid = label_components(&window, Connectivity::Eight);
        assert_eq!(grid.count, 4);
        assert_eq!(grid.label(2, 0), 1);
        assert_eq!(grid.label(5, 0), 2);
        assert_eq!(grid.label(0, 1), 3);
        assert_eq!(grid.label(0, 2), 3);
        assert_eq!(grid.label(3, 2), 4);
        assert_eq!(grid.label(1, 1), 0);
        assert_eq!(grid.pixel_counts(), vec![12, 1, 1, 2, 2]);
    }

    #[test]
    fn test_u_shape_merges_late() {
        // The two arms only meet on the last row
        let window = window_from_ascii(&[
            "#...#",
            "#...#",
            "#####",
        ]);
        let grid = label_components(&window, Connectivity::Four);
        assert_eq!(grid.count, 1);
        assert!(grid.labels.iter().all(|l| *l <= 1));
    }

    #[test]
    fn test_anti_diagonal_uses_north_east_neighbour() {
        let window = window_from_ascii(&[
            "..#",
            ".#.",
            "#..",
        ]);
        assert_eq!(label_components(&window, Connectivity::Eight).count, 1);
    }

    #[test]
    fn test_empty_and_full_windows() {
        let empty = window_from_ascii(&["...", "..."]);
        let grid = label_components(&empty, Connectivity::Eight);
        assert_eq!(grid.count, 0);
        assert!(grid.labels.iter().all(|l| *l == 0));

        let full = window_from_ascii(&["###", "###"]);
        assert_eq!(label_components(&full, Connectivity::Eight).count, 1);
    }

    #[test]
    fn test_zero_as_nodata_flag() {
        let mut window = RasterWindow::new(3, 1, SampleType::U8, vec![5.0, 0.0, 5.0], None);
        assert_eq!(label_components(&window, Connectivity::Eight).count, 1);
        window.zero_as_nodata = true;
        assert_eq!(label_components(&window, Connectivity::Eight).count, 2);
    }
}
