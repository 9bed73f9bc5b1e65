//! Principal-axis colinearity test over component centroids.
//!
//! Centroids lying close to one straight line with small, regular spacing
//! suggest normal anatomy (e.g. a row of vertebrae or phalanges) rather than
//! displaced fragments.
use crate::features::Centroid;
use nalgebra::{Matrix2, SymmetricEigen, Vector2};
use serde::Serialize;

/// Maximum perpendicular spread, as a fraction of the image diagonal.
pub const PERPENDICULAR_FRACTION: f64 = 0.005;
/// Maximum median spacing along the axis, in millimetres.
pub const MAX_GAP_MM: f64 = 1.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentDetails {
    /// Principal axis direction in degrees, `[0, 180)`
    pub axis_angle_deg: f64,
    pub max_perpendicular_px: f64,
    pub median_gap_px: f64,
    pub perpendicular_limit_px: f64,
    pub gap_limit_px: f64,
    pub px_per_mm: f64,
    pub aligned: bool,
}

fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    match n {
        0 => 0.0,
        _ if n % 2 == 1 => sorted[n / 2],
        _ => 0.5 * (sorted[n / 2 - 1] + sorted[n / 2]),
    }
}

fn round_to(v: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (v * f).round() / f
}

/// Run the colinearity test. Returns `None` for fewer than two points.
pub fn check_alignment(
    points: &[Centroid],
    diagonal: f64,
    px_per_mm: f64,
) -> Option<AlignmentDetails> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean = points
        .iter()
        .fold(Vector2::zeros(), |acc: Vector2<f64>, p| acc + Vector2::new(p.x, p.y))
        / n;

    let mut cov = Matrix2::<f64>::zeros();
    for p in points {
        let d = Vector2::new(p.x, p.y) - mean;
        cov += d * d.transpose();
    }
    cov /= n;

    let eig = SymmetricEigen::new(cov);
    let major = eig.eigenvalues.imax();
    let axis: Vector2<f64> = eig.eigenvectors.column(major).into_owned();
    let axis = if axis.norm() > 0.0 {
        axis.normalize()
    } else {
        Vector2::x()
    };
    let normal = Vector2::new(-axis.y, axis.x);

    let mut projections = Vec::with_capacity(points.len());
    let mut max_perpendicular = 0.0f64;
    for p in points {
        let d = Vector2::new(p.x, p.y) - mean;
        projections.push(d.dot(&axis));
        max_perpendicular = max_perpendicular.max(d.dot(&normal).abs());
    }
    projections.sort_by(f64::total_cmp);
    let mut gaps: Vec<f64> = projections.windows(2).map(|w| w[1] - w[0]).collect();
    gaps.sort_by(f64::total_cmp);
    let median_gap = median(&gaps);

    let perpendicular_limit = PERPENDICULAR_FRACTION * diagonal;
    let gap_limit = MAX_GAP_MM * px_per_mm;
    let aligned = max_perpendicular <= perpendicular_limit && median_gap <= gap_limit;

    let angle = axis.y.atan2(axis.x).to_degrees().rem_euclid(180.0);
    log::debug!(
        "check_alignment n={} perp={:.3} gap={:.3} aligned={}",
        points.len(),
        max_perpendicular,
        median_gap,
        aligned
    );
    Some(AlignmentDetails {
        axis_angle_deg: round_to(angle, 2),
        max_perpendicular_px: round_to(max_perpendicular, 2),
        median_gap_px: round_to(median_gap, 2),
        perpendicular_limit_px: round_to(perpendicular_limit, 2),
        gap_limit_px: round_to(gap_limit, 2),
        px_per_mm,
        aligned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<Centroid> {
        coords.iter().map(|&(x, y)| Centroid { x, y }).collect()
    }

    #[test]
    fn closely_spaced_collinear_points_are_aligned() {
        let p = pts(&[(10.0, 10.0), (12.0, 12.0), (14.0, 14.0), (16.0, 16.0)]);
        let d = check_alignment(&p, 1000.0, 3.0).expect("details");
        assert!(d.aligned, "{d:?}");
        assert!((d.axis_angle_deg - 45.0).abs() < 1e-6);
        assert!(d.max_perpendicular_px < 1e-9);
        assert!((d.median_gap_px - 2.83).abs() < 1e-9);
    }

    #[test]
    fn widely_spaced_points_are_not_aligned() {
        let p = pts(&[(10.0, 100.0), (60.0, 100.0), (110.0, 100.0)]);
        let d = check_alignment(&p, 1000.0, 3.0).expect("details");
        assert!(!d.aligned);
        assert_eq!(d.median_gap_px, 50.0);
        assert!(d.axis_angle_deg.abs() < 1e-9 || (d.axis_angle_deg - 180.0).abs() < 1e-9);
    }

    #[test]
    fn scattered_points_fail_the_perpendicular_limit() {
        let p = pts(&[(10.0, 10.0), (11.0, 13.0), (12.0, 10.0)]);
        let d = check_alignment(&p, 100.0, 3.0).expect("details");
        assert!(d.max_perpendicular_px > d.perpendicular_limit_px);
        assert!(!d.aligned);
    }

    #[test]
    fn needs_two_points() {
        assert!(check_alignment(&pts(&[(1.0, 1.0)]), 100.0, 3.0).is_none());
    }
}
