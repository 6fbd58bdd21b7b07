//! Annotation rendering: region outline, polygon outlines, and labels.
//!
//! Drawing happens in place on the frame handed in by the display side.
//! Labels use the 8x8 bitmap glyphs from `font8x8`, scaled by an integer
//! factor, so no font file has to be shipped or located at runtime.

use font8x8::UnicodeFonts;
use image::Rgb;
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use serde::{Deserialize, Serialize};

use crate::types::{Detection, Frame, Point, Rect};

/// Width and height of one unscaled glyph cell.
pub const GLYPH_SIZE: u32 = 8;

/// Colors and sizes used for annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationStyle {
    /// Outline color of the region of interest.
    pub roi_color: [u8; 3],
    /// Outline color of detected polygons.
    pub outline_color: [u8; 3],
    /// Label text color.
    pub text_color: [u8; 3],
    /// Polygon outline thickness in pixels.
    pub outline_thickness: u32,
    /// Integer glyph scale; 1 draws 8x8 pixel glyphs.
    pub text_scale: u32,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            roi_color: [255, 0, 0],
            outline_color: [0, 255, 0],
            text_color: [255, 0, 0],
            outline_thickness: 2,
            text_scale: 1,
        }
    }
}

/// Draw the region outline, every detection's outline, and the label of
/// each fully classified detection.
///
/// A label is placed with its lower-left corner at the top-left corner of
/// the detection's bounding box, so the text sits just above the shape.
pub fn annotate(frame: &mut Frame, roi: Rect, detections: &[Detection], style: &AnnotationStyle) {
    for detection in detections {
        if let Some(label) = detection.label() {
            let top =
                i64::from(detection.bounds.y) - i64::from(text_extent(&label, style.text_scale).1);
            draw_text(
                frame,
                &label,
                i64::from(detection.bounds.x),
                top,
                style.text_scale,
                Rgb(style.text_color),
            );
        }
    }

    draw_roi(frame, roi, Rgb(style.roi_color));

    for detection in detections {
        draw_outline(
            frame,
            detection.polygon.vertices(),
            style.outline_thickness,
            Rgb(style.outline_color),
        );
    }
}

/// One-pixel outline of the region of interest.
pub fn draw_roi(frame: &mut Frame, roi: Rect, color: Rgb<u8>) {
    if roi.is_empty() {
        return;
    }
    let (Ok(x), Ok(y)) = (i32::try_from(roi.x), i32::try_from(roi.y)) else {
        return;
    };
    draw_hollow_rect_mut(
        frame,
        imageproc::rect::Rect::at(x, y).of_size(roi.width, roi.height),
        color,
    );
}

/// Closed outline through `vertices`, `thickness` pixels wide (grown
/// towards +x/+y).
#[allow(clippy::cast_precision_loss)]
pub fn draw_outline(frame: &mut Frame, vertices: &[Point], thickness: u32, color: Rgb<u8>) {
    if vertices.len() < 2 {
        return;
    }
    let thickness = thickness.max(1);
    let n = vertices.len();
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        for dy in 0..thickness {
            for dx in 0..thickness {
                let (ox, oy) = (dx as f32, dy as f32);
                draw_line_segment_mut(
                    frame,
                    (a.x as f32 + ox, a.y as f32 + oy),
                    (b.x as f32 + ox, b.y as f32 + oy),
                    color,
                );
            }
        }
    }
}

/// Render `text` with its top-left corner at `(x, y)`. Pixels falling
/// outside the frame are skipped; characters without a glyph render as
/// blanks.
pub fn draw_text(frame: &mut Frame, text: &str, x: i64, y: i64, scale: u32, color: Rgb<u8>) {
    let scale = i64::from(scale.max(1));
    let cell = i64::from(GLYPH_SIZE) * scale;
    let (width, height) = (i64::from(frame.width()), i64::from(frame.height()));

    for (index, ch) in text.chars().enumerate() {
        let Some(glyph) = font8x8::BASIC_FONTS.get(ch) else {
            continue;
        };
        let Ok(index) = i64::try_from(index) else {
            return;
        };
        let origin_x = x + index * cell;
        for (row, bits) in (0_i64..).zip(glyph) {
            for col in 0..i64::from(GLYPH_SIZE) {
                if bits & (1 << col) == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        let px = origin_x + col * scale + sx;
                        let py = y + row * scale + sy;
                        if (0..width).contains(&px) && (0..height).contains(&py) {
                            if let (Ok(px), Ok(py)) = (u32::try_from(px), u32::try_from(py)) {
                                frame.put_pixel(px, py, color);
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Pixel extent of `text` at `scale`: `(width, height)`.
#[must_use]
pub fn text_extent(text: &str, scale: u32) -> (u32, u32) {
    let cell = GLYPH_SIZE.saturating_mul(scale.max(1));
    let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
    (chars.saturating_mul(cell), cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColorLabel, Polygon, ShapeLabel};

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    fn blank(width: u32, height: u32) -> Frame {
        Frame::from_pixel(width, height, WHITE)
    }

    fn count(frame: &Frame, color: [u8; 3]) -> usize {
        frame.pixels().filter(|p| p.0 == color).count()
    }

    fn detection(shape: ShapeLabel, color: ColorLabel) -> Detection {
        let vertices = vec![
            Point::new(40, 40),
            Point::new(79, 40),
            Point::new(79, 79),
            Point::new(40, 79),
        ];
        Detection {
            bounds: Rect::new(40, 40, 40, 40),
            polygon: Polygon::new(vertices),
            shape,
            color,
        }
    }

    #[test]
    fn roi_outline_is_drawn_on_its_border() {
        let mut frame = blank(50, 50);
        draw_roi(&mut frame, Rect::new(10, 10, 20, 20), Rgb([255, 0, 0]));
        assert_eq!(frame.get_pixel(10, 10), &Rgb([255, 0, 0]));
        assert_eq!(frame.get_pixel(29, 29), &Rgb([255, 0, 0]));
        assert_eq!(frame.get_pixel(20, 20), &WHITE);
    }

    #[test]
    fn outline_connects_all_vertices() {
        let mut frame = blank(60, 60);
        let square = [
            Point::new(10, 10),
            Point::new(40, 10),
            Point::new(40, 40),
            Point::new(10, 40),
        ];
        draw_outline(&mut frame, &square, 1, Rgb([0, 255, 0]));
        // Midpoint of the closing edge (10,40) -> (10,10).
        assert_eq!(frame.get_pixel(10, 25), &Rgb([0, 255, 0]));
        assert_eq!(frame.get_pixel(25, 25), &WHITE);
    }

    #[test]
    fn thick_outline_covers_more_pixels() {
        let square = [
            Point::new(10, 10),
            Point::new(40, 10),
            Point::new(40, 40),
            Point::new(10, 40),
        ];
        let mut thin = blank(60, 60);
        draw_outline(&mut thin, &square, 1, Rgb([0, 255, 0]));
        let mut thick = blank(60, 60);
        draw_outline(&mut thick, &square, 2, Rgb([0, 255, 0]));
        assert!(count(&thick, [0, 255, 0]) > count(&thin, [0, 255, 0]));
    }

    #[test]
    fn text_renders_inside_its_extent() {
        let mut frame = blank(100, 20);
        draw_text(&mut frame, "blue", 2, 2, 1, Rgb([0, 0, 0]));
        let (w, h) = text_extent("blue", 1);
        assert_eq!((w, h), (32, 8));
        let inked = count(&frame, [0, 0, 0]);
        assert!(inked > 0, "no glyph pixels drawn");
        for (x, y, p) in frame.enumerate_pixels() {
            if p.0 == [0, 0, 0] {
                assert!(
                    (2..2 + w).contains(&x) && (2..2 + h).contains(&y),
                    "({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn text_off_the_top_is_clipped_not_panicking() {
        let mut frame = blank(30, 30);
        draw_text(&mut frame, "red", -5, -6, 2, Rgb([0, 0, 0]));
        draw_text(&mut frame, "red", 100, 100, 1, Rgb([0, 0, 0]));
    }

    #[test]
    fn label_is_drawn_only_for_full_classification() {
        let style = AnnotationStyle::default();
        let roi = Rect::new(0, 0, 120, 120);
        let text = style.text_color;

        let mut labeled = blank(120, 120);
        annotate(
            &mut labeled,
            roi,
            &[detection(ShapeLabel::Square, ColorLabel::Blue)],
            &style,
        );
        let mut unlabeled = blank(120, 120);
        annotate(
            &mut unlabeled,
            roi,
            &[detection(ShapeLabel::Square, ColorLabel::Unknown)],
            &style,
        );

        // Text sits in the band just above the box, clear of the region
        // outline at x = 119.
        let text_pixels = |frame: &Frame| {
            (32..40)
                .flat_map(|y| (40..100).map(move |x| (x, y)))
                .filter(|&(x, y)| frame.get_pixel(x, y).0 == text)
                .count()
        };
        assert!(text_pixels(&labeled) > 0);
        assert_eq!(text_pixels(&unlabeled), 0);

        // Both still get an outline.
        assert_eq!(labeled.get_pixel(60, 40), &Rgb(style.outline_color));
        assert_eq!(unlabeled.get_pixel(60, 40), &Rgb(style.outline_color));
    }
}
