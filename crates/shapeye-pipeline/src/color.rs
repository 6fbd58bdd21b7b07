//! Color classification inside a polygon's bounding box.
//!
//! The box is cut from the frame and converted to HSV on the 8-bit scale
//! common to camera tooling: hue in `0..180` (degrees halved), saturation
//! and value in `0..=255`. Pixels outside the saturation/value gate
//! (white paper, shadows, grey) are ignored. The mean hue of the rest
//! picks the color.
//!
//! Hue is averaged linearly, not circularly: a mix of hues just above 0
//! and just below 180 averages to the middle of the scale and comes out
//! as [`ColorLabel::Unknown`].

use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::config::{HsvGate, HueBands};
use crate::types::{ColorLabel, Frame, Polygon, Rect};

/// A color in 8-bit HSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hsv {
    /// Hue, `0..180`.
    pub h: u8,
    /// Saturation, `0..=255`.
    pub s: u8,
    /// Value, `0..=255`.
    pub v: u8,
}

/// Mean over the gated pixels of a region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanHsv {
    /// Mean hue.
    pub h: f64,
    /// Mean saturation.
    pub s: f64,
    /// Mean value.
    pub v: f64,
    /// Number of pixels that passed the gate.
    pub pixel_count: u64,
}

/// Label the dominant color inside the polygon's bounding box.
#[must_use]
pub fn classify(polygon: &Polygon, frame: &Frame, gate: &HsvGate, bands: &HueBands) -> ColorLabel {
    polygon
        .bounding_rect()
        .and_then(|bounds| mean_hsv(frame, bounds, gate))
        .map_or(ColorLabel::Unknown, |mean| hue_label(mean.h, bands))
}

/// Mean HSV of the pixels inside `bounds` that pass `gate`.
///
/// `bounds` is clipped to the frame. Returns `None` when no pixel passes.
#[must_use]
pub fn mean_hsv(frame: &Frame, bounds: Rect, gate: &HsvGate) -> Option<MeanHsv> {
    let x_end = bounds.right().min(frame.width());
    let y_end = bounds.bottom().min(frame.height());

    let mut sums = [0_u64; 3];
    let mut count = 0_u64;
    for y in bounds.y..y_end {
        for x in bounds.x..x_end {
            let hsv = rgb_to_hsv(*frame.get_pixel(x, y));
            if gate.accepts(hsv.s, hsv.v) {
                sums[0] += u64::from(hsv.h);
                sums[1] += u64::from(hsv.s);
                sums[2] += u64::from(hsv.v);
                count += 1;
            }
        }
    }

    if count == 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = |sum: u64| sum as f64 / count as f64;
    Some(MeanHsv {
        h: mean(sums[0]),
        s: mean(sums[1]),
        v: mean(sums[2]),
        pixel_count: count,
    })
}

/// Map a mean hue to a color label. Every band is open: hues exactly on
/// a bound are [`ColorLabel::Unknown`].
#[must_use]
pub fn hue_label(hue: f64, bands: &HueBands) -> ColorLabel {
    let inside = |(low, high): (f64, f64)| hue > low && hue < high;
    if inside(bands.green) {
        ColorLabel::Green
    } else if inside(bands.blue) {
        ColorLabel::Blue
    } else if hue < bands.red_below || hue > bands.red_above {
        ColorLabel::Red
    } else {
        ColorLabel::Unknown
    }
}

/// Convert one RGB pixel to 8-bit HSV.
///
/// `v = max(r, g, b)`, `s = 255 * (v - min) / v`, and hue is the usual
/// hexcone angle halved so it fits in a byte.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rgb_to_hsv(Rgb([r, g, b]): Rgb<u8>) -> Hsv {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = f64::from(max - min);

    let s = if max == 0 {
        0.0
    } else {
        255.0 * diff / f64::from(max)
    };

    let (rf, gf, bf) = (f64::from(r), f64::from(g), f64::from(b));
    let degrees = if diff == 0.0 {
        0.0
    } else if max == r {
        60.0 * (gf - bf) / diff
    } else if max == g {
        60.0_f64.mul_add((bf - rf) / diff, 120.0)
    } else {
        60.0_f64.mul_add((rf - gf) / diff, 240.0)
    };
    let degrees = if degrees < 0.0 { degrees + 360.0 } else { degrees };

    // Rounded, then wrapped so 359.x degrees maps back to 0.
    let h = (degrees / 2.0).round() as u16 % 180;

    Hsv {
        h: h as u8,
        s: s.round() as u8,
        v: max,
    }
}
