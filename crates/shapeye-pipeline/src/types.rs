//! Shared types for the shapeye detection pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Re-export `RgbImage` so downstream crates can hand frames to the
/// pipeline without depending on `image` directly.
pub use image::RgbImage;

/// Re-export `GrayImage`, the representation of a binary mask.
pub use image::GrayImage;

/// A frame from the capture collaborator: 8-bit, three channels.
pub type Frame = RgbImage;

/// A single-channel binary image: 255 is foreground, 0 is background.
pub type Mask = GrayImage;

/// A pixel position.
///
/// Depending on context the origin is either the top-left corner of the
/// region of interest (contours) or of the whole frame (polygons).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from the left edge).
    pub x: u32,
    /// Vertical position (pixels from the top edge).
    pub y: u32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Translate by `offset`, saturating at `u32::MAX`.
    #[must_use]
    pub const fn offset_by(self, offset: Self) -> Self {
        Self {
            x: self.x.saturating_add(offset.x),
            y: self.y.saturating_add(offset.y),
        }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy)
    }
}

/// An axis-aligned rectangle in pixel units.
///
/// Used both for the region of interest, which always lies inside the
/// frame, and for bounding boxes derived from geometry, which carry no
/// such guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner.
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// One past the right-most column (`x + width`).
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// One past the bottom-most row (`y + height`).
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Returns `true` if the rectangle has no area.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if the rectangle lies fully inside a
    /// `frame_width x frame_height` frame.
    #[must_use]
    pub const fn fits_within(&self, frame_width: u32, frame_height: u32) -> bool {
        self.right() <= frame_width && self.bottom() <= frame_height
    }

    /// `height / width`. Returns infinity for a zero-width rectangle.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.height) / f64::from(self.width)
    }

    /// Smallest rectangle enclosing every point, counting pixels
    /// inclusively (a single point yields a 1x1 rectangle).
    ///
    /// Returns `None` for an empty point set.
    #[must_use]
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }
}

/// A closed boundary curve in region-local coordinates.
///
/// Only the vertices needed to reconstruct straight runs are stored;
/// collinear midpoints have been dropped by the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour(Vec<Point>);

impl Contour {
    /// Create a new contour from its ordered points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns the number of points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the contour has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Length of the closed curve, including the segment from the last
    /// point back to the first.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        closed_length(&self.0)
    }

    /// Inclusive bounding box, or `None` for an empty contour.
    #[must_use]
    pub fn bounding_rect(&self) -> Option<Rect> {
        Rect::bounding(&self.0)
    }
}

/// A simplified closed polygon in frame-global coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polygon(Vec<Point>);

impl Polygon {
    /// Create a new polygon from its ordered vertices.
    #[must_use]
    pub const fn new(vertices: Vec<Point>) -> Self {
        Self(vertices)
    }

    /// Number of vertices.
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all vertices.
    #[must_use]
    pub fn vertices(&self) -> &[Point] {
        &self.0
    }

    /// Inclusive bounding box, or `None` for an empty polygon.
    #[must_use]
    pub fn bounding_rect(&self) -> Option<Rect> {
        Rect::bounding(&self.0)
    }
}

/// Sum of segment lengths around a closed point sequence.
fn closed_length(points: &[Point]) -> f64 {
    match points {
        [] | [_] => 0.0,
        [.., last] => {
            let open: f64 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
            open + last.distance(points[0])
        }
    }
}

/// Geometric label assigned from vertex count and aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeLabel {
    /// Three vertices.
    Triangle,
    /// Four vertices, bounding box close to square.
    Square,
    /// Four vertices, bounding box clearly elongated.
    Rectangle,
    /// Any other vertex count. Outlined but never labeled.
    Unclassified,
}

impl ShapeLabel {
    /// Lower-case display name, or `None` for [`ShapeLabel::Unclassified`].
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        match self {
            Self::Triangle => Some("triangle"),
            Self::Square => Some("square"),
            Self::Rectangle => Some("rectangle"),
            Self::Unclassified => None,
        }
    }
}

impl fmt::Display for ShapeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("unclassified"))
    }
}

/// Color label assigned from the mean hue inside a polygon's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorLabel {
    /// Mean hue below the red low bound or above the red high bound.
    Red,
    /// Mean hue inside the green band.
    Green,
    /// Mean hue inside the blue band.
    Blue,
    /// No saturated pixels, or a hue outside every band.
    Unknown,
}

impl ColorLabel {
    /// Lower-case display name, or `None` for [`ColorLabel::Unknown`].
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        match self {
            Self::Red => Some("red"),
            Self::Green => Some("green"),
            Self::Blue => Some("blue"),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for ColorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("unknown"))
    }
}

/// One classified polygon from a detection cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// The approximated outline in frame coordinates.
    pub polygon: Polygon,
    /// Inclusive bounding box of `polygon`.
    pub bounds: Rect,
    /// Shape classification.
    pub shape: ShapeLabel,
    /// Color classification. Always `Unknown` when `shape` is
    /// `Unclassified`, since color is not sampled for those.
    pub color: ColorLabel,
}

impl Detection {
    /// Text label `"<color> <shape>"`, present only when both
    /// classifications succeeded.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        let color = self.color.name()?;
        let shape = self.shape.name()?;
        Some(format!("{color} {shape}"))
    }
}

/// Counts describing what happened to the contours of one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleStats {
    /// Raw contours returned by the extractor.
    pub contours_found: usize,
    /// Contours rejected for touching the region border.
    pub rejected_border: usize,
    /// Contours rejected for a bounding box below the minimum dimension.
    pub rejected_small: usize,
    /// Contours that survived filtering and were approximated.
    pub polygons: usize,
    /// Polygons that received a text label.
    pub labeled: usize,
}

/// Output of one detection cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleResult {
    /// Every polygon that survived filtering, in extraction order.
    pub detections: Vec<Detection>,
    /// Per-stage counts.
    pub stats: CycleStats,
}

impl CycleResult {
    /// Iterate over the text labels of this cycle, skipping detections
    /// that are not fully classified.
    pub fn labels(&self) -> impl Iterator<Item = String> + '_ {
        self.detections.iter().filter_map(Detection::label)
    }
}

/// Errors raised by the pipeline.
///
/// Classification misses are not errors: they surface as
/// [`ShapeLabel::Unclassified`] and [`ColorLabel::Unknown`].
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Pipeline configuration is invalid.
    #[error("invalid detector configuration: {0}")]
    InvalidConfig(String),

    /// The frame is larger than the region controller can address.
    #[error("frame {width}x{height} exceeds the supported maximum of 65535 per axis")]
    FrameTooLarge {
        /// Frame width in pixels.
        width: u32,
        /// Frame height in pixels.
        height: u32,
    },

    /// An explicit region of interest does not fit inside the frame.
    #[error("region {roi:?} does not fit inside a {frame_width}x{frame_height} frame")]
    RoiOutOfBounds {
        /// The rejected region.
        roi: Rect,
        /// Frame width in pixels.
        frame_width: u32,
        /// Frame height in pixels.
        frame_height: u32,
    },

    /// A frame's size differs from the size the region was built for.
    #[error("frame is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    FrameSizeMismatch {
        /// Size the region controller was built for.
        expected_width: u32,
        /// Size the region controller was built for.
        expected_height: u32,
        /// Size of the offending frame.
        actual_width: u32,
        /// Size of the offending frame.
        actual_height: u32,
    },
}
