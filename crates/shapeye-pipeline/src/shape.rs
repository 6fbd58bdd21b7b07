//! Shape classification from vertex count and bounding-box proportions.

use crate::types::{Polygon, ShapeLabel};

/// Label a polygon.
///
/// Three vertices make a triangle. Four vertices make a square when the
/// bounding box's `height / width` lies strictly inside `square_ratio`,
/// and a rectangle otherwise (including exactly on either bound). Any
/// other vertex count is [`ShapeLabel::Unclassified`].
#[must_use]
pub fn classify(polygon: &Polygon, square_ratio: (f64, f64)) -> ShapeLabel {
    match polygon.vertex_count() {
        3 => ShapeLabel::Triangle,
        4 => polygon
            .bounding_rect()
            .map_or(ShapeLabel::Unclassified, |bounds| {
                quadrilateral_kind(bounds.aspect_ratio(), square_ratio)
            }),
        _ => ShapeLabel::Unclassified,
    }
}

/// Square or rectangle for a given `height / width` ratio.
#[must_use]
pub fn quadrilateral_kind(ratio: f64, (low, high): (f64, f64)) -> ShapeLabel {
    if ratio > low && ratio < high {
        ShapeLabel::Square
    } else {
        ShapeLabel::Rectangle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    const BAND: (f64, f64) = (0.9, 1.1);

    fn quad(width: u32, height: u32) -> Polygon {
        let (r, b) = (10 + width - 1, 10 + height - 1);
        Polygon::new(vec![
            Point::new(10, 10),
            Point::new(r, 10),
            Point::new(r, b),
            Point::new(10, b),
        ])
    }

    #[test]
    fn three_vertices_is_a_triangle() {
        let tri = Polygon::new(vec![Point::new(0, 0), Point::new(40, 0), Point::new(20, 35)]);
        assert_eq!(classify(&tri, BAND), ShapeLabel::Triangle);
    }

    #[test]
    fn equal_sides_make_a_square() {
        assert_eq!(classify(&quad(40, 40), BAND), ShapeLabel::Square);
        assert_eq!(classify(&quad(40, 42), BAND), ShapeLabel::Square);
    }

    #[test]
    fn elongated_quad_is_a_rectangle() {
        assert_eq!(classify(&quad(80, 40), BAND), ShapeLabel::Rectangle);
        assert_eq!(classify(&quad(40, 80), BAND), ShapeLabel::Rectangle);
    }

    #[test]
    fn ratio_exactly_on_a_bound_is_a_rectangle() {
        // 45 / 50 == 0.9 exactly in floating point.
        assert_eq!(classify(&quad(50, 45), BAND), ShapeLabel::Rectangle);
        assert_eq!(quadrilateral_kind(0.9, BAND), ShapeLabel::Rectangle);
        assert_eq!(quadrilateral_kind(1.1, BAND), ShapeLabel::Rectangle);
    }

    #[test]
    fn ratio_just_inside_a_bound_is_a_square() {
        assert_eq!(quadrilateral_kind(0.900_001, BAND), ShapeLabel::Square);
        assert_eq!(quadrilateral_kind(1.099_999, BAND), ShapeLabel::Square);
    }

    #[test]
    fn other_vertex_counts_are_unclassified() {
        let line = Polygon::new(vec![Point::new(0, 0), Point::new(40, 40)]);
        assert_eq!(classify(&line, BAND), ShapeLabel::Unclassified);
        let pentagon = Polygon::new(vec![
            Point::new(20, 0),
            Point::new(40, 15),
            Point::new(32, 40),
            Point::new(8, 40),
            Point::new(0, 15),
        ]);
        assert_eq!(classify(&pentagon, BAND), ShapeLabel::Unclassified);
        assert_eq!(
            classify(&Polygon::new(vec![]), BAND),
            ShapeLabel::Unclassified
        );
    }
}
