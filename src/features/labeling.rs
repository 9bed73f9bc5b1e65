//! Two-pass union-find connected-component labeling (4-connectivity).
//!
//! Any non-zero pixel is foreground. The first pass joins each pixel with its
//! already-visited west and north neighbours; the second pass compacts the
//! surviving roots to `1..=n` in order of their smallest provisional label.
use crate::raster::{GrayImage, LabelMap};

/// Disjoint-set forest over provisional labels. Index 0 is unused.
#[derive(Debug, Default)]
struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    fn new() -> Self {
        Self { parent: vec![0] }
    }

    fn make_set(&mut self) -> u32 {
        let id = self.parent.len() as u32;
        self.parent.push(id);
        id
    }

    /// Root lookup with path halving.
    fn find(&mut self, mut a: u32) -> u32 {
        while self.parent[a as usize] != a {
            let grand = self.parent[self.parent[a as usize] as usize];
            self.parent[a as usize] = grand;
            a = grand;
        }
        a
    }

    /// Attach the root of `b` under the root of `a`.
    fn union(&mut self, a: u32, b: u32) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[rb as usize] = ra;
        }
    }

    fn len(&self) -> usize {
        self.parent.len()
    }
}

/// Label 4-connected foreground regions. Returns the label map and `n`.
pub fn connected_components(mask: &GrayImage) -> (LabelMap, usize) {
    let (w, h) = (mask.w, mask.h);
    let mut labels = LabelMap::new(w, h);
    let mut sets = UnionFind::new();

    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            if mask.data[i] == 0 {
                continue;
            }
            let west = if x > 0 && mask.data[i - 1] != 0 { labels.data[i - 1] } else { 0 };
            let north = if y > 0 && mask.data[i - w] != 0 { labels.data[i - w] } else { 0 };
            labels.data[i] = match (west, north) {
                (0, 0) => sets.make_set(),
                (l, 0) | (0, l) => l,
                (a, b) => {
                    let lbl = a.min(b);
                    if a != b {
                        sets.union(lbl, a.max(b));
                    }
                    lbl
                }
            };
        }
    }

    let mut remap = vec![0u32; sets.len()];
    let mut next = 0u32;
    for provisional in 1..sets.len() as u32 {
        let root = sets.find(provisional);
        if remap[root as usize] == 0 {
            next += 1;
            remap[root as usize] = next;
        }
        remap[provisional as usize] = remap[root as usize];
    }
    for l in labels.data.iter_mut().filter(|l| **l != 0) {
        *l = remap[*l as usize];
    }
    (labels, next as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::FOREGROUND;

    fn mask_from(rows: &[&str]) -> GrayImage {
        let h = rows.len();
        let w = rows[0].len();
        let data = rows
            .iter()
            .flat_map(|r| r.bytes().map(|b| if b == b'#' { FOREGROUND } else { 0 }))
            .collect();
        GrayImage::from_vec(w, h, data).unwrap()
    }

    #[test]
    fn diagonal_neighbours_are_separate_components() {
        let m = mask_from(&["#.", ".#"]);
        let (labels, n) = connected_components(&m);
        assert_eq!(n, 2);
        assert_eq!(labels.data, vec![1, 0, 0, 2]);
    }

    #[test]
    fn u_shape_merges_into_one_label() {
        let m = mask_from(&[
            "#...#", //
            "#...#",
            "#####",
        ]);
        let (labels, n) = connected_components(&m);
        assert_eq!(n, 1);
        assert!(labels.data.iter().all(|&l| l == 0 || l == 1));
    }

    #[test]
    fn labels_are_dense_in_first_seen_order() {
        let m = mask_from(&[
            "..#..#", //
            "#.....",
            "#..##.",
        ]);
        let (labels, n) = connected_components(&m);
        assert_eq!(n, 4);
        assert_eq!(labels.get(2, 0), 1);
        assert_eq!(labels.get(5, 0), 2);
        assert_eq!(labels.get(0, 1), 3);
        assert_eq!(labels.get(0, 2), 3);
        assert_eq!(labels.get(3, 2), 4);
        assert_eq!(labels.get(4, 2), 4);
    }

    #[test]
    fn empty_mask_has_no_components() {
        let (labels, n) = connected_components(&GrayImage::new(5, 5));
        assert_eq!(n, 0);
        assert!(labels.data.iter().all(|&l| l == 0));
        assert_eq!(connected_components(&GrayImage::empty()).1, 0);
    }
}
