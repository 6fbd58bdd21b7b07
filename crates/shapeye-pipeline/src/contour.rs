//! Contour extraction: closed boundary curves from a binary mask.
//!
//! This module defines the [`ContourExtractor`] trait for pluggable
//! extraction algorithms and the [`ContourExtractorKind`] enum for
//! selecting which algorithm to use at runtime.
//!
//! Retrieval is flat: outer borders and hole borders come back as
//! independent entries with no parent/child links. A hole inside a shape,
//! or a shape sitting in a hole of the background, is just another
//! contour. Points are compressed so that only the ends of each straight
//! run remain.
//!
//! No size filtering happens here; see [`crate::filter`].

use serde::{Deserialize, Serialize};

use crate::types::{Contour, Mask, Point};

/// Selects which contour extraction algorithm to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContourExtractorKind {
    /// Suzuki-Abe border following via `imageproc::contours::find_contours`.
    #[default]
    BorderFollowing,
}

/// Trait for contour extraction strategies.
///
/// Input: a binary mask (non-zero pixels = foreground).
/// Output: every closed border, in region-local coordinates.
pub trait ContourExtractor {
    /// Extract contours from the given mask.
    fn extract(&self, mask: &Mask) -> Vec<Contour>;
}

impl ContourExtractor for ContourExtractorKind {
    fn extract(&self, mask: &Mask) -> Vec<Contour> {
        match *self {
            Self::BorderFollowing => extract_border_following(mask),
        }
    }
}

/// Suzuki-Abe border following, flattened and compressed.
///
/// The tracer never starts an outer border in column 0, so the mask is
/// framed with one pixel of background first and the points shifted back
/// afterwards. Pixels outside the mask therefore count as background.
fn extract_border_following(mask: &Mask) -> Vec<Contour> {
    let padded = pad(mask);
    let contours: Vec<imageproc::contours::Contour<u32>> =
        imageproc::contours::find_contours(&padded);

    contours
        .into_iter()
        .filter(|c| !c.points.is_empty())
        .map(|c| {
            let points: Vec<Point> = c
                .points
                .into_iter()
                .map(|p| Point::new(p.x.saturating_sub(1), p.y.saturating_sub(1)))
                .collect();
            Contour::new(compress_collinear(&points))
        })
        .collect()
}

/// Copy of `mask` surrounded by a one-pixel background border.
fn pad(mask: &Mask) -> Mask {
    let mut padded = Mask::new(mask.width() + 2, mask.height() + 2);
    image::imageops::replace(&mut padded, mask, 1, 1);
    padded
}

/// Drop points that sit in the middle of a straight run of a closed
/// curve, keeping only the vertices where the direction changes.
///
/// Consecutive duplicates are merged first. A point is dropped when the
/// incoming and outgoing segments are parallel and point the same way;
/// reversals (a curve doubling back on a one-pixel line) are kept.
#[must_use = "returns the compressed point list"]
pub fn compress_collinear(points: &[Point]) -> Vec<Point> {
    let mut deduped: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if deduped.last() != Some(&p) {
            deduped.push(p);
        }
    }
    while deduped.len() > 1 && deduped.first() == deduped.last() {
        deduped.pop();
    }

    let n = deduped.len();
    if n < 3 {
        return deduped;
    }

    let kept: Vec<Point> = (0..n)
        .filter(|&i| {
            let prev = deduped[(i + n - 1) % n];
            let cur = deduped[i];
            let next = deduped[(i + 1) % n];
            !continues_straight(prev, cur, next)
        })
        .map(|i| deduped[i])
        .collect();

    // A perfectly straight closed curve has no turning points; fall back
    // to its two ends.
    if kept.is_empty() {
        let first = deduped[0];
        let far = deduped
            .iter()
            .copied()
            .max_by(|a, b| first.distance(*a).total_cmp(&first.distance(*b)))
            .unwrap_or(first);
        return vec![first, far];
    }
    kept
}

/// `true` if `cur` lies on the straight segment from `prev` to `next`,
/// travelling in a consistent direction.
fn continues_straight(prev: Point, cur: Point, next: Point) -> bool {
    let (ax, ay) = delta(prev, cur);
    let (bx, by) = delta(cur, next);
    let cross = ax * by - ay * bx;
    let dot = ax * bx + ay * by;
    cross == 0 && dot > 0
}

fn delta(from: Point, to: Point) -> (i64, i64) {
    (
        i64::from(to.x) - i64::from(from.x),
        i64::from(to.y) - i64::from(from.y),
    )
}
