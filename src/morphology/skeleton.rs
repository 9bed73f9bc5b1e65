//! Iterative thinning.
//!
//! Each pass marks every interior foreground pixel whose 8-neighbourhood has
//! between 2 and 6 foreground pixels and exactly one background→foreground
//! transition around the ring N, NE, E, SE, S, SW, W, NW. A pixel with both
//! N and E set and both S and W set is kept. Marked pixels are removed
//! simultaneously; thinning stops when a pass removes nothing.
use crate::raster::{GrayImage, FOREGROUND};

/// Ring offsets in clockwise order starting north.
const RING: [(isize, isize); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

fn removable(skel: &GrayImage, x: usize, y: usize) -> bool {
    let mut ring = [false; 8];
    for (slot, &(dx, dy)) in ring.iter_mut().zip(&RING) {
        let nx = (x as isize + dx) as usize;
        let ny = (y as isize + dy) as usize;
        *slot = skel.get(nx, ny) == FOREGROUND;
    }
    let count = ring.iter().filter(|&&v| v).count();
    if !(2..=6).contains(&count) {
        return false;
    }
    let transitions = (0..8).filter(|&i| !ring[i] && ring[(i + 1) % 8]).count();
    if transitions != 1 {
        return false;
    }
    let (north, east, south, west) = (ring[0], ring[2], ring[4], ring[6]);
    !(north && east) || !(south && west)
}

/// Thin `mask` for at most `max_iterations` passes.
pub fn skeletonize(mask: &GrayImage, max_iterations: usize) -> GrayImage {
    let (w, h) = (mask.w, mask.h);
    let mut skel = mask.to_binary();
    if w < 3 || h < 3 {
        return skel;
    }
    let mut marked = Vec::new();
    for iter in 0..max_iterations {
        marked.clear();
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                if skel.get(x, y) == FOREGROUND && removable(&skel, x, y) {
                    marked.push(y * w + x);
                }
            }
        }
        if marked.is_empty() {
            log::debug!("skeletonize converged after {iter} passes");
            break;
        }
        for &i in &marked {
            skel.data[i] = 0;
        }
    }
    skel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thick_bar_thins_to_its_centre_line() {
        let mut m = GrayImage::new(40, 30);
        for y in 10..13 {
            for x in 5..25 {
                m.set(x, y, FOREGROUND);
            }
        }
        let skel = skeletonize(&m, 100);
        let points: Vec<(usize, usize)> = (0..30)
            .flat_map(|y| (0..40).map(move |x| (x, y)))
            .filter(|&(x, y)| skel.get(x, y) == FOREGROUND)
            .collect();
        let expected: Vec<(usize, usize)> = (6..24).map(|x| (x, 11)).collect();
        assert_eq!(points, expected);
    }

    #[test]
    fn one_pixel_line_is_stable() {
        let mut m = GrayImage::new(12, 5);
        for x in 2..10 {
            m.set(x, 2, FOREGROUND);
        }
        assert_eq!(skeletonize(&m, 100), m);
    }

    #[test]
    fn zero_iterations_returns_input() {
        let m = GrayImage::filled(6, 6, FOREGROUND);
        assert_eq!(skeletonize(&m, 0), m);
    }
}
