//! Distance-based watershed approximation.
//!
//! Steps:
//! 1. Otsu foreground and its chamfer distance map `D`.
//! 2. Seeds: foreground pixels with `D ≥ 3` that are not lower than any of
//!    their 8 neighbours; touching seed pixels form one plateau marker.
//! 3. Breadth-first flooding from all markers at once assigns every reachable
//!    foreground pixel to a basin.
//! 4. A pixel's depth is `peak(basin) − D`. A foreground pixel is an edge when
//!    an 8-neighbour lies in another basin or its depth differs by more than
//!    [`DEPTH_JUMP`] (see [`basin_boundaries`]).
//!
//! No priority ordering by height is performed, so this is not a true
//! watershed; it splits touching blobs along distance-map saddles.
use super::otsu::otsu_threshold;
use crate::morphology::distance_transform;
use crate::raster::{GrayImage, ImageF32, LabelMap, FOREGROUND};
use std::collections::VecDeque;

/// Minimum distance value for a seed pixel.
pub const MIN_SEED_DISTANCE: f32 = 3.0;
/// Depth difference that marks a discontinuity.
pub const DEPTH_JUMP: f32 = 2.0;

const NEIGHBORS_8: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

#[inline]
fn neighbor(
    w: usize,
    h: usize,
    x: usize,
    y: usize,
    d: (isize, isize),
) -> Option<(usize, usize)> {
    let nx = x as isize + d.0;
    let ny = y as isize + d.1;
    (nx >= 0 && ny >= 0 && (nx as usize) < w && (ny as usize) < h)
        .then_some((nx as usize, ny as usize))
}

/// Label regional maxima of `dist` that reach [`MIN_SEED_DISTANCE`].
///
/// Returns the marker map and the number of markers.
pub fn seed_markers(dist: &ImageF32) -> (LabelMap, u32) {
    let (w, h) = (dist.w, dist.h);
    let mut is_seed = vec![false; w * h];
    for y in 0..h {
        for x in 0..w {
            let v = dist.get(x, y);
            if v < MIN_SEED_DISTANCE {
                continue;
            }
            is_seed[y * w + x] = NEIGHBORS_8
                .iter()
                .filter_map(|&d| neighbor(w, h, x, y, d))
                .all(|(nx, ny)| dist.get(nx, ny) <= v);
        }
    }

    let mut markers = LabelMap::new(w, h);
    let mut next = 0u32;
    let mut queue = VecDeque::new();
    for start in 0..w * h {
        if !is_seed[start] || markers.data[start] != 0 {
            continue;
        }
        next += 1;
        markers.data[start] = next;
        queue.push_back(start);
        while let Some(i) = queue.pop_front() {
            let (x, y) = (i % w, i / w);
            for &d in &NEIGHBORS_8 {
                if let Some((nx, ny)) = neighbor(w, h, x, y, d) {
                    let j = ny * w + nx;
                    if is_seed[j] && markers.data[j] == 0 {
                        markers.data[j] = next;
                        queue.push_back(j);
                    }
                }
            }
        }
    }
    (markers, next)
}

/// Multi-source BFS over the foreground of `mask`, starting from `markers`.
pub fn flood_basins(mask: &GrayImage, markers: &LabelMap) -> LabelMap {
    let (w, h) = (mask.w, mask.h);
    let mut basins = markers.clone();
    let mut queue: VecDeque<usize> = (0..w * h).filter(|&i| markers.data[i] != 0).collect();
    while let Some(i) = queue.pop_front() {
        let (x, y) = (i % w, i / w);
        let label = basins.data[i];
        for &d in &NEIGHBORS_8 {
            if let Some((nx, ny)) = neighbor(w, h, x, y, d) {
                let j = ny * w + nx;
                if mask.data[j] != 0 && basins.data[j] == 0 {
                    basins.data[j] = label;
                    queue.push_back(j);
                }
            }
        }
    }
    basins
}

/// Edge map over flooded `basins`.
///
/// Basin peaks are the largest `dist` value under each marker. A labeled
/// pixel is an edge when a labeled 8-neighbour belongs to another basin or
/// their depths below the peak differ by more than [`DEPTH_JUMP`]. On a map
/// from [`distance_transform`] neighbouring values differ by at most √2, so
/// only basin changes produce edges there; the depth test fires on maps with
/// steeper discontinuities.
pub fn basin_boundaries(markers: &LabelMap, basins: &LabelMap, dist: &ImageF32) -> GrayImage {
    let (w, h) = (basins.w, basins.h);
    let n_labels = markers.data.iter().chain(&basins.data).copied().max().unwrap_or(0);
    let mut peaks = vec![0.0f32; n_labels as usize + 1];
    for (i, &label) in markers.data.iter().enumerate() {
        let slot = &mut peaks[label as usize];
        *slot = slot.max(dist.data[i]);
    }
    let depth = |i: usize| peaks[basins.data[i] as usize] - dist.data[i];

    let mut edges = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            let basin = basins.data[i];
            if basin == 0 {
                continue;
            }
            let boundary = NEIGHBORS_8
                .iter()
                .filter_map(|&d| neighbor(w, h, x, y, d))
                .map(|(nx, ny)| ny * w + nx)
                .filter(|&j| basins.data[j] != 0)
                .any(|j| basins.data[j] != basin || (depth(i) - depth(j)).abs() > DEPTH_JUMP);
            if boundary {
                edges.data[i] = FOREGROUND;
            }
        }
    }
    edges
}

/// Watershed-style boundary map of `gray`.
pub fn watershed_edges(gray: &GrayImage) -> GrayImage {
    let (mask, threshold) = otsu_threshold(gray);
    let dist = distance_transform(&mask);
    let (markers, n_markers) = seed_markers(&dist);
    let basins = flood_basins(&mask, &markers);
    let edges = basin_boundaries(&markers, &basins, &dist);
    log::debug!(
        "watershed_edges threshold={} markers={} edges={}",
        threshold,
        n_markers,
        edges.foreground_count()
    );
    edges
}
