//! Per-component geometric descriptors derived from a label map.
use super::labeling::connected_components;
use crate::raster::{GrayImage, LabelMap};
use serde::Serialize;
use std::f64::consts::PI;

/// Mean pixel position of a component.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Centroid {
    pub x: f64,
    pub y: f64,
}

impl Centroid {
    pub fn distance(&self, other: &Centroid) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Tight axis-aligned bounding box in pixel units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Descriptors of one connected component. Immutable once computed.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Label id in the owning label map (≥ 1)
    pub label: u32,
    /// Pixel count
    pub area: u32,
    pub centroid: Centroid,
    pub bounding_box: BoundingBox,
    /// Boundary pixel count: pixels with an 8-neighbour of another label or off-raster
    pub perimeter: u32,
    /// `width / height` of the bounding box, 0 when degenerate
    pub aspect_ratio: f64,
    /// `area / (width · height)`, 0 when degenerate
    pub extent: f64,
    /// `4π · area / perimeter²`, 0 when the perimeter is 0
    pub circularity: f64,
    pub touches_border: bool,
}

/// Label map plus descriptors for every component.
#[derive(Clone, Debug)]
pub struct ComponentAnalysis {
    pub n_components: usize,
    pub components: Vec<Component>,
    pub labels: LabelMap,
}

#[derive(Clone, Copy)]
struct Accumulator {
    area: u32,
    sum_x: f64,
    sum_y: f64,
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
    perimeter: u32,
    touches_border: bool,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            area: 0,
            sum_x: 0.0,
            sum_y: 0.0,
            min_x: usize::MAX,
            min_y: usize::MAX,
            max_x: 0,
            max_y: 0,
            perimeter: 0,
            touches_border: false,
        }
    }
}

fn is_boundary(labels: &LabelMap, x: usize, y: usize, label: u32) -> bool {
    let (w, h) = (labels.w, labels.h);
    if x == 0 || y == 0 || x + 1 == w || y + 1 == h {
        return true;
    }
    (y - 1..=y + 1).any(|ny| (x - 1..=x + 1).any(|nx| labels.get(nx, ny) != label))
}

/// Compute descriptors for labels `1..=n` of `labels`.
pub fn describe_components(labels: &LabelMap, n: usize) -> Vec<Component> {
    let (w, h) = (labels.w, labels.h);
    let mut acc = vec![Accumulator::default(); n + 1];

    for y in 0..h {
        for x in 0..w {
            let label = labels.get(x, y);
            if label == 0 {
                continue;
            }
            let a = &mut acc[label as usize];
            a.area += 1;
            a.sum_x += x as f64;
            a.sum_y += y as f64;
            a.min_x = a.min_x.min(x);
            a.min_y = a.min_y.min(y);
            a.max_x = a.max_x.max(x);
            a.max_y = a.max_y.max(y);
            if x == 0 || y == 0 || x + 1 == w || y + 1 == h {
                a.touches_border = true;
            }
            if is_boundary(labels, x, y, label) {
                a.perimeter += 1;
            }
        }
    }

    acc.iter()
        .enumerate()
        .skip(1)
        .map(|(label, a)| {
            let (centroid, bounding_box) = if a.area == 0 {
                (Centroid::default(), BoundingBox::default())
            } else {
                (
                    Centroid {
                        x: a.sum_x / a.area as f64,
                        y: a.sum_y / a.area as f64,
                    },
                    BoundingBox {
                        x: a.min_x,
                        y: a.min_y,
                        width: a.max_x - a.min_x + 1,
                        height: a.max_y - a.min_y + 1,
                    },
                )
            };
            let area = a.area as f64;
            let box_area = (bounding_box.width * bounding_box.height) as f64;
            let aspect_ratio = if bounding_box.height == 0 {
                0.0
            } else {
                bounding_box.width as f64 / bounding_box.height as f64
            };
            let extent = if box_area == 0.0 { 0.0 } else { area / box_area };
            let circularity = if a.perimeter == 0 {
                0.0
            } else {
                4.0 * PI * area / (a.perimeter as f64).powi(2)
            };
            Component {
                label: label as u32,
                area: a.area,
                centroid,
                bounding_box,
                perimeter: a.perimeter,
                aspect_ratio,
                extent,
                circularity,
                touches_border: a.touches_border,
            }
        })
        .collect()
}

/// Label `mask` and describe every component.
pub fn analyze_components(mask: &GrayImage) -> ComponentAnalysis {
    let (labels, n) = connected_components(mask);
    let components = describe_components(&labels, n);
    log::debug!("analyze_components n={n} size={}x{}", mask.w, mask.h);
    ComponentAnalysis {
        n_components: n,
        components,
        labels,
    }
}

/// Symmetric matrix of pairwise centroid distances.
pub fn centroid_distance_matrix(components: &[Component]) -> Vec<Vec<f64>> {
    let n = components.len();
    let mut out = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in i + 1..n {
            let d = components[i].centroid.distance(&components[j].centroid);
            out[i][j] = d;
            out[j][i] = d;
        }
    }
    out
}
