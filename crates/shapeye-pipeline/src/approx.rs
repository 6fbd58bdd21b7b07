//! Polygon approximation of closed contours.
//!
//! Uses the Ramer-Douglas-Peucker algorithm, adapted to closed curves:
//! the curve is split at two mutually distant points and each half is
//! simplified as an open polyline. The tolerance is a fraction of the
//! contour's perimeter, so large and small shapes simplify alike.
//!
//! The resulting vertices are translated from region-local to frame
//! coordinates. No attempt is made to snap the result to three or four
//! vertices.

use crate::types::{Contour, Point, Polygon};

/// Approximate `contour` with a polygon and move it into frame coordinates.
///
/// `tolerance_factor` scales the contour's perimeter into the maximum
/// distance (in pixels) a dropped point may lie from the simplified
/// outline. `origin` is the region's top-left corner in the frame.
#[must_use = "returns the approximated polygon"]
pub fn approximate(contour: &Contour, tolerance_factor: f64, origin: Point) -> Polygon {
    let tolerance = tolerance_factor * contour.perimeter();
    let vertices = simplify_closed(contour.points(), tolerance)
        .into_iter()
        .map(|p| p.offset_by(origin))
        .collect();
    Polygon::new(vertices)
}

/// Simplify a closed curve, keeping points farther than `tolerance` from
/// the simplified outline.
///
/// Curves with three or fewer points are returned unchanged.
#[must_use = "returns the simplified vertices"]
pub fn simplify_closed(points: &[Point], tolerance: f64) -> Vec<Point> {
    let n = points.len();
    if n <= 3 {
        return points.to_vec();
    }

    // Two mutually distant points split the curve into halves whose
    // chords are long; both are guaranteed to survive.
    let a = farthest_from(points, 0);
    let b = farthest_from(points, a);
    if points[a] == points[b] {
        return vec![points[a]];
    }

    // Rotate so the curve starts at `a`, and repeat `a` at the end so the
    // second half (b -> a) is a plain open range.
    let mut ring: Vec<Point> = Vec::with_capacity(n + 1);
    ring.extend_from_slice(&points[a..]);
    ring.extend_from_slice(&points[..a]);
    ring.push(points[a]);
    let split = (b + n - a) % n;

    let mut kept = vec![false; n + 1];
    kept[0] = true;
    kept[split] = true;
    rdp_recurse(&ring, 0, split, tolerance, &mut kept);
    rdp_recurse(&ring, split, n, tolerance, &mut kept);

    ring[..n]
        .iter()
        .zip(&kept[..n])
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect()
}

/// Index of the point farthest from `points[from]`. Ties go to the
/// earliest index.
fn farthest_from(points: &[Point], from: usize) -> usize {
    let origin = points[from];
    let mut best = from;
    let mut best_dist = 0.0;
    for (i, &p) in points.iter().enumerate() {
        let d = origin.distance(p);
        if d > best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Recursive step of the Ramer-Douglas-Peucker algorithm.
///
/// Finds the point between `start` and `end` that is farthest from the
/// line segment between them. If that distance exceeds `tolerance`, the
/// point is kept and both sub-segments are processed recursively.
fn rdp_recurse(points: &[Point], start: usize, end: usize, tolerance: f64, kept: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_idx = start;

    for i in (start + 1)..end {
        let d = perpendicular_distance(points[i], points[start], points[end]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > tolerance {
        kept[max_idx] = true;
        rdp_recurse(points, start, max_idx, tolerance, kept);
        rdp_recurse(points, max_idx, end, tolerance, kept);
    }
}

/// Perpendicular distance from point `p` to the line defined by `a` and `b`.
///
/// Uses the formula: |cross(b-a, p-a)| / |b-a|.
/// When `a` and `b` coincide, returns the distance from `p` to `a`.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let (px, py) = (f64::from(p.x), f64::from(p.y));
    let (ax, ay) = (f64::from(a.x), f64::from(a.y));
    let (bx, by) = (f64::from(b.x), f64::from(b.y));
    let dx = bx - ax;
    let dy = by - ay;
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let cross = dx.mul_add(ay - py, -(dy * (ax - px)));
    cross.abs() / length_sq.sqrt()
}
