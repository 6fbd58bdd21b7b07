//! Contour filtering, applied before polygon approximation.
//!
//! Two rules, checked in order:
//!
//! 1. A contour touching the region border is rejected. A shape cut by
//!    the region edge would otherwise be classified from its truncated
//!    outline.
//! 2. A contour whose bounding box is narrower or shorter than the
//!    minimum dimension is rejected as noise.

use crate::config::BorderPolicy;
use crate::types::{Contour, Point};

/// Why a contour was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// A point lies on the region border.
    TouchesBorder,
    /// The bounding box is below the minimum size in some dimension.
    TooSmall,
}

/// Decide whether a contour survives filtering.
///
/// `region_width` and `region_height` are the size of the region the
/// contour was extracted from; border lines are at `x == 0`,
/// `x == region_width`, `y == 0`, and `y == region_height`.
///
/// # Errors
///
/// Returns the reason for rejection. Rejection is a normal outcome, not a
/// failure of the pipeline.
pub fn check(
    contour: &Contour,
    region_width: u32,
    region_height: u32,
    policy: BorderPolicy,
    min_dim: u32,
) -> Result<(), Rejection> {
    if touches_border(contour.points(), region_width, region_height, policy) {
        return Err(Rejection::TouchesBorder);
    }
    match contour.bounding_rect() {
        Some(bounds) if bounds.width >= min_dim && bounds.height >= min_dim => Ok(()),
        _ => Err(Rejection::TooSmall),
    }
}

/// Returns `true` if any point is on the border under `policy`.
#[must_use]
pub fn touches_border(points: &[Point], width: u32, height: u32, policy: BorderPolicy) -> bool {
    points.iter().any(|p| {
        let on_vertical = p.x == 0 || p.x == width;
        let on_horizontal = p.y == 0 || p.y == height;
        match policy {
            BorderPolicy::AnyEdge => on_vertical || on_horizontal,
            BorderPolicy::CornerOnly => on_vertical && on_horizontal,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: u32, y: u32, side: u32) -> Contour {
        let (r, b) = (x + side - 1, y + side - 1);
        Contour::new(vec![
            Point::new(x, y),
            Point::new(r, y),
            Point::new(r, b),
            Point::new(x, b),
        ])
    }

    #[test]
    fn interior_shape_of_minimum_size_passes() {
        let c = square(10, 10, 30);
        assert_eq!(check(&c, 100, 100, BorderPolicy::AnyEdge, 30), Ok(()));
    }

    #[test]
    fn point_on_left_border_is_rejected() {
        let c = square(0, 10, 40);
        assert_eq!(
            check(&c, 100, 100, BorderPolicy::AnyEdge, 30),
            Err(Rejection::TouchesBorder)
        );
    }

    #[test]
    fn every_border_line_counts() {
        let width = 100;
        let height = 80;
        let cases = [
            Point::new(0, 40),
            Point::new(width, 40),
            Point::new(50, 0),
            Point::new(50, height),
        ];
        for p in cases {
            assert!(
                touches_border(&[p], width, height, BorderPolicy::AnyEdge),
                "{p:?}"
            );
        }
        assert!(!touches_border(
            &[Point::new(1, 1), Point::new(width - 1, height - 1)],
            width,
            height,
            BorderPolicy::AnyEdge
        ));
    }

    #[test]
    fn corner_only_policy_ignores_edge_midpoints() {
        let c = square(0, 10, 40);
        assert_eq!(check(&c, 100, 100, BorderPolicy::CornerOnly, 30), Ok(()));
        assert!(touches_border(
            &[Point::new(0, 0)],
            100,
            100,
            BorderPolicy::CornerOnly
        ));
        assert!(touches_border(
            &[Point::new(100, 100)],
            100,
            100,
            BorderPolicy::CornerOnly
        ));
    }

    #[test]
    fn twenty_pixel_box_is_too_small() {
        let c = square(10, 10, 20);
        assert_eq!(
            check(&c, 100, 100, BorderPolicy::AnyEdge, 30),
            Err(Rejection::TooSmall)
        );
    }

    #[test]
    fn one_short_dimension_is_enough_to_reject() {
        let c = Contour::new(vec![
            Point::new(10, 10),
            Point::new(69, 10),
            Point::new(69, 38),
            Point::new(10, 38),
        ]);
        // 60 wide, 29 high.
        assert_eq!(
            check(&c, 100, 100, BorderPolicy::AnyEdge, 30),
            Err(Rejection::TooSmall)
        );
    }

    #[test]
    fn border_check_runs_before_size_check() {
        let c = square(0, 0, 5);
        assert_eq!(
            check(&c, 100, 100, BorderPolicy::AnyEdge, 30),
            Err(Rejection::TouchesBorder)
        );
    }

    #[test]
    fn empty_contour_is_too_small() {
        let c = Contour::new(vec![]);
        assert_eq!(
            check(&c, 100, 100, BorderPolicy::AnyEdge, 30),
            Err(Rejection::TooSmall)
        );
    }
}
